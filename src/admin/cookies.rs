//! Cookie helpers for the admin surface.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Session cookie carrying the signed admin token.
pub const SESSION_COOKIE: &str = "admin-auth-token";

/// Long-lived flag set once the invoice setup flow is finished.
pub const SETUP_COOKIE: &str = "invoice-setup-complete";

/// One year, in seconds.
pub const SETUP_COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 365;

const EPOCH_HTTP_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// `Set-Cookie` value carrying a session token.
pub fn session_cookie(token: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Expires={}",
        SESSION_COOKIE, EPOCH_HTTP_DATE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value for the setup flag, expiring one year after `now`.
pub fn setup_complete_cookie(now: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}=true; Path=/; SameSite=Lax; Max-Age={}",
        SETUP_COOKIE, SETUP_COOKIE_MAX_AGE
    );
    if let Some(expires) = http_date(now.saturating_add(SETUP_COOKIE_MAX_AGE)) {
        cookie.push_str("; Expires=");
        cookie.push_str(&expires);
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// First value of cookie `name` across all `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}

fn http_date(secs: u64) -> Option<String> {
    let secs = i64::try_from(secs).ok()?;
    let date = DateTime::<Utc>::from_timestamp(secs, 0)?;
    Some(date.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}
