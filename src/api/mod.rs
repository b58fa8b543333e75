//! Operational endpoints that sit beside the admin surface.
//!
//! - `GET /api/debug-env`: presence of each environment variable
//! - `POST /api/revalidate?path=..`: ask the origin to refresh a path

pub mod diagnostics;
pub mod revalidate;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::edge::private_responses;
use crate::http::server::AppState;

pub use revalidate::RevalidationLog;

pub fn setup_api_router() -> Router<AppState> {
    Router::new()
        .route("/api/debug-env", get(diagnostics::debug_env))
        .route("/api/revalidate", post(revalidate::revalidate))
        .layer(middleware::map_response(private_responses))
}
