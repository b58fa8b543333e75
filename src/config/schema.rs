//! Configuration schema definitions.
//!
//! This module defines the file-backed configuration for the edge layer.
//! All types derive Serde traits for deserialization from config files.
//! Process environment (credentials, secrets, CDN URL) lives in
//! [`crate::config::env`] instead.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EdgeConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Resource hint settings for the HTTP/2 hint policy.
    pub hints: HintsConfig,

    /// Admin session settings.
    pub session: SessionConfig,

    /// Upstream rendering origin.
    pub origin: OriginConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Resource hint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HintsConfig {
    /// Origin that every page preconnects to, regardless of CDN settings.
    pub primary_preconnect: String,
}

impl Default for HintsConfig {
    fn default() -> Self {
        Self {
            primary_preconnect: "https://fonts.gstatic.com".to_string(),
        }
    }
}

/// Admin session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Validity window of an issued session token in seconds.
    pub ttl_secs: u64,

    /// Path prefix of the administrative area.
    pub admin_prefix: String,

    /// Login entry point; anonymous admin requests are redirected here.
    pub login_path: String,

    /// Where an already authenticated visitor of the login page is sent.
    pub home_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 60 * 60 * 24,
            admin_prefix: "/admin".to_string(),
            login_path: "/admin/login".to_string(),
            home_path: "/admin".to_string(),
        }
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Base URL of the rendering layer (e.g., "http://127.0.0.1:3001").
    /// Without it, unclaimed requests get 404.
    pub url: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
