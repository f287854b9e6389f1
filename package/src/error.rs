//! Error types for the recipe resolver

use recipe_config::ConfigError;
use thiserror::Error;

/// Result type alias for resolver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Resolver errors
///
/// None of these are retried: each one describes a static misconfiguration.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Unsupported environment: {precondition}: {detail}")]
    UnsupportedEnvironment { precondition: String, detail: String },

    #[error("Duplicate requirement for {package}: {first} and {second}")]
    DuplicateRequirement {
        package: String,
        first: String,
        second: String,
    },

    #[error("Override {package}:{option} targets a package that is not required")]
    Propagation { package: String, option: String },

    #[error("Conflicting overrides for {package}:{option}: {first} and {second}")]
    ConflictingOverride {
        package: String,
        option: String,
        first: String,
        second: String,
    },

    #[error("Option '{option}' referenced by {context} is not declared")]
    UndeclaredOption { option: String, context: String },

    #[error("Invalid package specification: {0}")]
    InvalidPackageSpec(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
