//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID, request span)
//!     → edge + admin middleware
//!     → edge endpoints, or origin.rs (forward to rendering layer)
//!     → Send to client
//! ```

pub mod origin;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, EdgeServer, StartupError};
