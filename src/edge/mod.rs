//! Edge header subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → classifier.rs (PathClass)
//!     → pipeline.rs (run policies in fixed order)
//!         → policy.rs: Http2HintPolicy, CdnPolicy, ImmutableCachePolicy
//!     → downstream handler runs
//!     → composed headers stamped onto the response
//! ```
//!
//! # Design Decisions
//! - Policies are pure: (PathClass, EnvConfig) → header writes
//! - Overlapping keys resolved by order, last writer wins
//! - Fail open: a broken policy never blocks a response
//! - Cookie-setting and admin responses are `private, no-store`

pub mod classifier;
pub mod pipeline;
pub mod policy;

pub use classifier::PathClass;
pub use pipeline::{edge_headers_middleware, mark_private, private_responses, EdgePipeline, PrivateResponse};
pub use policy::{HeaderMutations, HeaderPolicy, PolicyError, PolicyInput};
