//! Admin access control.
//!
//! Two entry points share the same decision:
//! - [`admin_session_middleware`] guards admin pages and redirects
//!   anonymous visitors to the login page.
//! - [`AdminSession`] is an extractor for admin API handlers and rejects
//!   anonymous callers with 401.
//!
//! Any problem with the cookie (missing, malformed, bad signature, expired)
//! means anonymous. Failures never surface as 5xx.
//!
//! Paths are matched after [`normalize_path`], so encoded or dotted spellings
//! of an admin path are guarded like the plain one. A path that cannot be
//! normalized is treated as an admin path.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use percent_encoding::percent_decode_str;
use sha2::{Digest, Sha256};

use crate::admin::cookies::{read_cookie, SESSION_COOKIE};
use crate::admin::session::{SessionClaims, SessionGuard};
use crate::config::EnvConfig;
use crate::edge::mark_private;
use crate::http::server::AppState;
use crate::observability::metrics;

/// True when `path` is `prefix` itself or lies below it.
/// `/admin` covers `/admin` and `/admin/x` but not `/administrator`.
pub fn is_admin_path(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Canonical form of a request path as an origin would resolve it.
///
/// Percent-decodes once, collapses repeated `/` and resolves `.` and `..`
/// (`..` never climbs above the root). Returns `None` when the decoded path
/// is not valid UTF-8 or still contains `%`, `\` or control characters,
/// since an origin may decode or reinterpret those again.
pub fn normalize_path(raw: &str) -> Option<String> {
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    if decoded.contains('%') || decoded.contains('\\') || decoded.chars().any(char::is_control) {
        return None;
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut path = String::with_capacity(decoded.len());
    for segment in &segments {
        path.push('/');
        path.push_str(segment);
    }
    if path.is_empty() || (decoded.ends_with('/') && !segments.is_empty()) {
        path.push('/');
    }
    Some(path)
}

/// Validate the session cookie carried in `headers`.
pub fn session_from_headers(guard: &SessionGuard, headers: &HeaderMap) -> Option<SessionClaims> {
    let token = read_cookie(headers, SESSION_COOKIE)?;
    match guard.verify(token) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!(reason = %e, "Rejected admin session cookie");
            None
        }
    }
}

/// Exact match against the configured admin credentials.
///
/// Unconfigured credentials never match. Both fields are always compared so
/// the time taken does not reveal which one was wrong.
pub fn credentials_match(env: &EnvConfig, username: &str, password: &str) -> bool {
    let (Some(expected_user), Some(expected_password)) =
        (env.admin_username.as_deref(), env.admin_password.as_ref())
    else {
        return false;
    };

    let user_ok = digest_eq(expected_user.as_bytes(), username.as_bytes());
    let password_ok = digest_eq(expected_password.expose_secret().as_bytes(), password.as_bytes());
    user_ok & password_ok
}

/// Compare fixed-length digests without early exit.
fn digest_eq(a: &[u8], b: &[u8]) -> bool {
    let a = Sha256::digest(a);
    let b = Sha256::digest(b);
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Gate for admin pages. Every response for a guarded path, redirect or
/// not, is marked private so shared caches never store it.
pub async fn admin_session_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let session = &state.config.session;
    let raw_path = request.uri().path();

    let (guarded, on_login_page) = match normalize_path(raw_path) {
        Some(path) => (
            is_admin_path(&path, &session.admin_prefix),
            path == session.login_path,
        ),
        None => {
            tracing::debug!(path = %raw_path, "Path does not normalize, guarding it");
            (true, false)
        }
    };

    if !guarded {
        return next.run(request).await;
    }

    let authenticated = session_from_headers(&state.guard, request.headers()).is_some();

    let mut response = match (authenticated, on_login_page) {
        (false, false) => {
            tracing::debug!(path = %raw_path, "Anonymous admin request, redirecting to login");
            metrics::record_auth_event("redirect_to_login");
            Redirect::temporary(&session.login_path).into_response()
        }
        (true, true) => Redirect::temporary(&session.home_path).into_response(),
        _ => next.run(request).await,
    };
    mark_private(&mut response);
    response
}

/// Extractor that only succeeds for callers holding a valid session.
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionClaims);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match session_from_headers(&state.guard, &parts.headers) {
            Some(claims) => Ok(AdminSession(claims)),
            None => {
                metrics::record_auth_event("denied");
                Err((
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({ "success": false, "error": "Unauthorized" })),
                )
                    .into_response())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env::{ADMIN_PASSWORD, ADMIN_USERNAME};

    fn env(user: Option<&str>, password: Option<&str>) -> EnvConfig {
        let user = user.map(str::to_string);
        let password = password.map(str::to_string);
        EnvConfig::from_lookup(move |key| match key {
            ADMIN_USERNAME => user.clone(),
            ADMIN_PASSWORD => password.clone(),
            _ => None,
        })
    }

    #[test]
    fn test_admin_path_matching() {
        assert!(is_admin_path("/admin", "/admin"));
        assert!(is_admin_path("/admin/", "/admin"));
        assert!(is_admin_path("/admin/invoices/1", "/admin"));
        assert!(is_admin_path("/admin/login", "/admin/"));
        assert!(!is_admin_path("/administrator", "/admin"));
        assert!(!is_admin_path("/", "/admin"));
        assert!(!is_admin_path("/api/admin/login", "/admin"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/admin/invoices").as_deref(), Some("/admin/invoices"));
        assert_eq!(normalize_path("/%61dmin/invoices").as_deref(), Some("/admin/invoices"));
        assert_eq!(normalize_path("//admin//invoices").as_deref(), Some("/admin/invoices"));
        assert_eq!(normalize_path("/x/../admin/./invoices").as_deref(), Some("/admin/invoices"));
        assert_eq!(normalize_path("/../../admin").as_deref(), Some("/admin"));
        assert_eq!(normalize_path("/admin/").as_deref(), Some("/admin/"));
        assert_eq!(normalize_path("/").as_deref(), Some("/"));
        assert_eq!(normalize_path("").as_deref(), Some("/"));
        assert_eq!(normalize_path("/admin/..").as_deref(), Some("/"));
    }

    #[test]
    fn test_unclean_paths_do_not_normalize() {
        assert_eq!(normalize_path("/%2561dmin"), None);
        assert_eq!(normalize_path("/%5Cadmin"), None);
        assert_eq!(normalize_path("/admin%00"), None);
        assert_eq!(normalize_path("/%ff%fe"), None);
    }

    #[test]
    fn test_credentials_exact_match() {
        let env = env(Some("admin"), Some("s3cret"));
        assert!(credentials_match(&env, "admin", "s3cret"));
        assert!(!credentials_match(&env, "admin", "s3cret "));
        assert!(!credentials_match(&env, "Admin", "s3cret"));
        assert!(!credentials_match(&env, "admin", ""));
    }

    #[test]
    fn test_unconfigured_credentials_never_match() {
        assert!(!credentials_match(&env(None, None), "", ""));
        assert!(!credentials_match(&env(Some("admin"), None), "admin", ""));
    }
}
