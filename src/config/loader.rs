//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AggregatorConfig;
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

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AggregatorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AggregatorConfig, ConfigError> {
    let config: AggregatorConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides on top of a loaded configuration.
///
/// `PORT` rebinds the listener on all interfaces, matching how the service is
/// usually deployed behind a platform router.
pub fn apply_env_overrides(config: &mut AggregatorConfig) {
    if let Ok(port) = std::env::var("PORT") {
        apply_port_override(config, &port);
    }
}

fn apply_port_override(config: &mut AggregatorConfig, port: &str) {
    match port.trim().parse::<u16>() {
        Ok(port) => config.listener.bind_address = format!("0.0.0.0:{}", port),
        Err(_) => tracing::warn!(port = %port, "Ignoring invalid PORT override"),
    }
}
