//! Error types for configuration operations

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid option '{name}': {reason}")]
    InvalidOption { name: String, reason: String },

    #[error("Invalid option override: {0}")]
    InvalidOverride(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),
}

impl ConfigError {
    pub(crate) fn invalid_option(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidOption {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
