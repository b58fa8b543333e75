//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::EdgeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<EdgeConfig, ConfigError> {
    let config: EdgeConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<EdgeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_config() {
        let config = parse_config(
            r#"
            [hints]
            primary_preconnect = "https://static.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.hints.primary_preconnect, "https://static.example.com");
    }

    #[test]
    fn test_validation_errors_surface() {
        let err = parse_config(
            r#"
            [session]
            ttl_secs = 0
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert_eq!(
            err.to_string(),
            "Validation failed: session.ttl_secs: must be greater than zero"
        );
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let err = parse_config("[session\nttl_secs = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("does-not-exist/edge.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
