//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)                    process environment
//!     → loader.rs (parse)                   → env.rs (presence + secrets)
//!     → validation.rs (semantic checks)     → EnvConfig (immutable)
//!     → EdgeConfig (validated, immutable)
//!     → both shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All file fields have defaults to allow minimal configs
//! - Missing optional environment disables a feature instead of failing
//!   requests; only the session signing secret is mandatory

pub mod env;
pub mod loader;
pub mod schema;
pub mod secret;
pub mod validation;

pub use env::EnvConfig;
pub use loader::{load_config, ConfigError};
pub use schema::EdgeConfig;
pub use schema::{HintsConfig, ListenerConfig, ObservabilityConfig, OriginConfig, SessionConfig};
pub use secret::Secret;
