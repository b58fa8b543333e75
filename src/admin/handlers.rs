//! Admin API handlers: login, logout, session status and setup completion.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::auth::{credentials_match, session_from_headers, AdminSession};
use crate::admin::cookies::{clear_session_cookie, session_cookie, setup_complete_cookie};
use crate::admin::session::unix_now;
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub expires_at: Option<u64>,
}

pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> Response {
    if !credentials_match(&state.env, &body.username, &body.password) {
        tracing::warn!("Admin login rejected");
        metrics::record_auth_event("login_failed");
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "success": false, "error": "Invalid credentials" })),
        )
            .into_response();
    }

    let issued = match state.guard.issue() {
        Ok(issued) => issued,
        Err(e) => {
            tracing::error!(error = %e, "Failed to issue admin session token");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "success": false, "error": "Could not start session" })),
            )
                .into_response();
        }
    };

    tracing::info!(expires_at = issued.claims.exp, "Admin login succeeded");
    metrics::record_auth_event("login");

    let cookie = session_cookie(&issued.token, state.guard.ttl(), state.env.is_production());
    (
        [(SET_COOKIE, cookie)],
        Json(serde_json::json!({ "success": true, "expires_at": issued.claims.exp })),
    )
        .into_response()
}

/// Always clears the cookie, whether or not one was present.
pub async fn logout(State(state): State<AppState>) -> Response {
    tracing::info!("Admin logout");
    metrics::record_auth_event("logout");

    (
        [(SET_COOKIE, clear_session_cookie(state.env.is_production()))],
        Json(serde_json::json!({ "success": true })),
    )
        .into_response()
}

pub async fn session_status(State(state): State<AppState>, headers: HeaderMap) -> Json<SessionStatus> {
    let claims = session_from_headers(&state.guard, &headers);
    Json(SessionStatus {
        authenticated: claims.is_some(),
        expires_at: claims.map(|c| c.exp),
    })
}

pub async fn setup_complete(_session: AdminSession, State(state): State<AppState>) -> Response {
    tracing::info!("Invoice setup marked complete");
    (
        [(SET_COOKIE, setup_complete_cookie(unix_now(), state.env.is_production()))],
        Json(serde_json::json!({ "success": true })),
    )
        .into_response()
}
