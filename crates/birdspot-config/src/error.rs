//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::loader::DEFAULT_CONFIG_PATH;

/// Errors raised while loading or validating BirdSpot configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {} (pass --config or create {})", .0.display(), DEFAULT_CONFIG_PATH)]
    NotFound(PathBuf),

    #[error("Invalid variable pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Config references ${{{0}}} but that environment variable is not set")]
    EnvVarNotSet(String),

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config is not valid TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}
