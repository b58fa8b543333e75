//! Process environment, read once at startup.
//!
//! Values here are never logged. Only their presence is reported, both in
//! startup logs and through the diagnostics endpoint.

use std::collections::BTreeMap;

use crate::config::secret::Secret;
use crate::config::validation::check_http_url;

pub const ADMIN_USERNAME: &str = "ADMIN_USERNAME";
pub const ADMIN_PASSWORD: &str = "ADMIN_PASSWORD";
pub const JWT_SECRET: &str = "JWT_SECRET";
pub const CDN_URL: &str = "NEXT_PUBLIC_CDN_URL";
pub const SITE_URL: &str = "NEXT_PUBLIC_SITE_URL";
pub const NODE_ENV: &str = "NODE_ENV";

/// Every variable the edge layer consumes, in reporting order.
pub const ENV_VARS: [&str; 6] = [ADMIN_USERNAME, ADMIN_PASSWORD, JWT_SECRET, CDN_URL, SITE_URL, NODE_ENV];

/// Read-only view of the environment.
#[derive(Debug, Default)]
pub struct EnvConfig {
    pub admin_username: Option<String>,
    pub admin_password: Option<Secret<String>>,
    pub jwt_secret: Option<Secret<String>>,
    /// CDN base URL for the preconnect hint; `None` when unset or unusable.
    pub cdn_url: Option<String>,
    pub site_url: Option<String>,
    pub node_env: Option<String>,
    presence: BTreeMap<&'static str, bool>,
}

impl EnvConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary lookup. Empty values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let presence = ENV_VARS.iter().map(|&key| (key, get(key).is_some())).collect();

        let cdn_url = get(CDN_URL).and_then(|raw| match check_http_url(&raw) {
            Ok(_) => Some(raw),
            Err(_) => {
                tracing::warn!(var = CDN_URL, "Ignoring unusable CDN URL, preconnect hint disabled");
                None
            }
        });

        Self {
            admin_username: get(ADMIN_USERNAME),
            admin_password: get(ADMIN_PASSWORD).map(Secret::new),
            jwt_secret: get(JWT_SECRET).map(Secret::new),
            cdn_url,
            site_url: get(SITE_URL),
            node_env: get(NODE_ENV),
            presence,
        }
    }

    /// True when `NODE_ENV` is `production`.
    pub fn is_production(&self) -> bool {
        self.node_env.as_deref() == Some("production")
    }

    /// Presence flag for every consumed variable.
    pub fn presence(&self) -> &BTreeMap<&'static str, bool> {
        &self.presence
    }

    /// Log which variables are set. Values are never included.
    pub fn log_presence(&self) {
        for (key, present) in &self.presence {
            tracing::info!(var = %key, present = *present, "Environment variable");
        }
    }
}
