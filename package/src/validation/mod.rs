//! Environment validation
//!
//! Checks toolchain preconditions before any dependency work starts. The only
//! precondition is a minimum C++ standard, fixed by the recipe and not
//! affected by option values.

use crate::error::{Error, Result};
use crate::settings::{CppStd, Settings};
use recipe_config::ConfigurationState;
use tracing::debug;

/// Validator for toolchain preconditions
#[derive(Debug, Clone)]
pub struct Validator {
    min_cppstd: CppStd,
}

impl Validator {
    /// Create a validator requiring at least `min_cppstd`
    pub fn new(min_cppstd: CppStd) -> Self {
        Self { min_cppstd }
    }

    /// Required minimum standard
    pub fn min_cppstd(&self) -> CppStd {
        self.min_cppstd
    }

    /// Check the environment; failure aborts the pipeline
    pub fn validate(&self, state: &ConfigurationState, settings: &Settings) -> Result<()> {
        debug!(
            "Validating {} with {} options resolved",
            settings.compiler,
            state.values().count()
        );

        let precondition = format!("minimum cppstd {}", self.min_cppstd.standard.number());

        let current = settings
            .effective_cppstd()
            .ok_or_else(|| Error::UnsupportedEnvironment {
                precondition: precondition.clone(),
                detail: format!(
                    "cppstd is not set and {} has no known default",
                    settings.compiler
                ),
            })?;

        if current.standard < self.min_cppstd.standard {
            let origin = if settings.cppstd.is_some() {
                "requested"
            } else {
                "default"
            };
            return Err(Error::UnsupportedEnvironment {
                precondition,
                detail: format!(
                    "{} cppstd {} of {} is too old",
                    origin, current, settings.compiler
                ),
            });
        }

        Ok(())
    }
}
