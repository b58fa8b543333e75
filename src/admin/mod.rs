//! Administrative surface.
//!
//! # States
//! ```text
//! Anonymous ──login (credentials match)──▶ Authenticated
//! Authenticated ──logout / token expiry──▶ Anonymous
//! ```
//!
//! # Design Decisions
//! - Session state lives entirely in a signed cookie
//! - Fail closed: any token problem means Anonymous
//! - Logout is idempotent and never errors

pub mod auth;
pub mod cookies;
pub mod handlers;
pub mod session;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::edge::private_responses;
use crate::http::server::AppState;
use self::handlers::*;

pub use auth::{admin_session_middleware, AdminSession};
pub use session::{GuardError, SessionClaims, SessionGuard, TokenError};

/// Admin API routes. Page gating happens in [`admin_session_middleware`].
/// Every response here, rejections included, is kept out of shared caches.
pub fn setup_admin_router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/admin/logout", post(logout))
        .route("/api/admin/session", get(session_status))
        .route("/api/admin/setup-complete", post(setup_complete))
        .layer(middleware::map_response(private_responses))
}
