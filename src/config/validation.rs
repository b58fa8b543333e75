//! Configuration validation.
//!
//! Serde handles syntax; this module checks values that parse but make no
//! sense (zero timeouts, relative paths, a login page outside the admin
//! area). Every failure is reported, not just the first.

use std::fmt;
use std::net::SocketAddr;
use url::Url;

use crate::config::schema::EdgeConfig;

/// A single semantic problem found in an [`EdgeConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g., "session.ttl_secs").
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let session = &config.session;
    if session.ttl_secs == 0 {
        errors.push(ValidationError::new("session.ttl_secs", "must be greater than zero"));
    }
    if !session.admin_prefix.starts_with('/') {
        errors.push(ValidationError::new("session.admin_prefix", "must start with '/'"));
    } else if session.admin_prefix.trim_matches('/').is_empty() {
        errors.push(ValidationError::new(
            "session.admin_prefix",
            "must name a path below '/', the root would guard the login endpoint too",
        ));
    }
    if !session.login_path.starts_with('/') {
        errors.push(ValidationError::new("session.login_path", "must start with '/'"));
    } else if !crate::admin::auth::is_admin_path(&session.login_path, &session.admin_prefix) {
        errors.push(ValidationError::new(
            "session.login_path",
            format!("must lie under admin prefix '{}'", session.admin_prefix),
        ));
    }
    if !session.home_path.starts_with('/') {
        errors.push(ValidationError::new("session.home_path", "must start with '/'"));
    } else if session.home_path == session.login_path {
        errors.push(ValidationError::new("session.home_path", "must differ from session.login_path"));
    }

    if let Err(message) = check_http_url(&config.hints.primary_preconnect) {
        errors.push(ValidationError::new("hints.primary_preconnect", message));
    }

    if let Some(origin) = &config.origin.url {
        match check_http_url(origin) {
            Ok(url) if url.scheme() != "http" => {
                errors.push(ValidationError::new("origin.url", "origin must use plain http"));
            }
            Ok(_) => {}
            Err(message) => errors.push(ValidationError::new("origin.url", message)),
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accepts absolute `http`/`https` URLs only.
pub(crate) fn check_http_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("'{}' is not a valid URL: {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}
