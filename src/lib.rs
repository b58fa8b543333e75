//! Edge layer for the marketing site: response header policies and the
//! admin session guard.

pub mod admin;
pub mod api;
pub mod config;
pub mod edge;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::{EdgeConfig, EnvConfig};
pub use edge::{EdgePipeline, PathClass};
pub use http::{AppState, EdgeServer};
pub use lifecycle::Shutdown;
