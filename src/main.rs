//! Edge layer for the marketing site.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌───────────────────────────────────────────────────────┐
//!                  │                      SITE EDGE                        │
//!   Request        │  ┌──────────┐   ┌──────────────┐   ┌───────────────┐  │
//!   ───────────────┼─▶│ request  │──▶│ edge headers │──▶│ admin session │  │
//!                  │  │ id/trace │   │  classifier  │   │     guard     │  │
//!                  │  └──────────┘   │  + policies  │   └───────┬───────┘  │
//!                  │                 └──────▲───────┘           │          │
//!                  │                        │                   ▼          │
//!   Response       │                        │        ┌─────────────────┐   │      Rendering
//!   ◀──────────────┼────────────────────────┴────────│ admin/api routes│   │      origin
//!                  │                                 │ or origin fwd   │───┼────▶
//!                  │                                 └─────────────────┘   │
//!                  └───────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use site_edge::config::{load_config, EdgeConfig, EnvConfig};
use site_edge::lifecycle::{signals::shutdown_signal, startup, Shutdown};
use site_edge::observability::logging::init_tracing;

#[derive(Parser)]
#[command(name = "site-edge")]
#[command(about = "Edge header policies and admin session guard", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => EdgeConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    init_tracing(&config.observability.log_level);
    tracing::info!("site-edge v{} starting", env!("CARGO_PKG_VERSION"));

    let bind_address = config.listener.bind_address.clone();
    tracing::info!(
        bind_address = %bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let server = startup::prepare(config, EnvConfig::from_env())?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on(shutdown_signal());

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
