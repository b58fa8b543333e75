//! Startup orchestration.
//!
//! Config and environment are loaded by the caller; this module turns them
//! into a ready server. Any error here is fatal: in particular the admin
//! guard refuses to start without a signing secret.

use std::net::SocketAddr;

use crate::config::{EdgeConfig, EnvConfig};
use crate::http::server::{EdgeServer, StartupError};
use crate::observability::metrics;

/// Log the environment, start metrics if enabled and assemble the server.
pub fn prepare(config: EdgeConfig, env: EnvConfig) -> Result<EdgeServer, StartupError> {
    env.log_presence();

    if env.cdn_url.is_none() {
        tracing::info!("No CDN URL configured, CDN preconnect hint disabled");
    }
    if env.admin_username.is_none() || env.admin_password.is_none() {
        tracing::warn!("Admin credentials not configured, every login will be rejected");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = EdgeServer::new(config, env)?;
    tracing::info!(
        session_ttl_secs = server.state().guard.ttl().as_secs(),
        origin = server.state().origin.is_some(),
        "Edge layer initialized"
    );
    Ok(server)
}
