//! Hand-off to the dependency index
//!
//! The index resolves package references to artifacts. It is driven through
//! two calls: `requires` once per requirement in order, then `configure` once
//! per recorded dependency option.

use crate::error::Result;
use crate::types::PackageRef;
use recipe_config::OptionValue;
use serde::Serialize;

/// External dependency index
pub trait DependencyIndex {
    fn requires(&mut self, reference: &PackageRef) -> Result<()>;
    fn configure(&mut self, package: &str, option: &str, value: &OptionValue) -> Result<()>;
}

/// A call made on a [`RecordingIndex`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "lowercase")]
pub enum IndexCall {
    Requires {
        reference: String,
    },
    Configure {
        package: String,
        option: String,
        value: OptionValue,
    },
}

impl std::fmt::Display for IndexCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexCall::Requires { reference } => write!(f, "requires {}", reference),
            IndexCall::Configure {
                package,
                option,
                value,
            } => write!(f, "configure {}:{}={}", package, option, value),
        }
    }
}

/// Index that only records the calls it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingIndex {
    calls: Vec<IndexCall>,
}

impl RecordingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[IndexCall] {
        &self.calls
    }
}

impl DependencyIndex for RecordingIndex {
    fn requires(&mut self, reference: &PackageRef) -> Result<()> {
        self.calls.push(IndexCall::Requires {
            reference: reference.to_string(),
        });
        Ok(())
    }

    fn configure(&mut self, package: &str, option: &str, value: &OptionValue) -> Result<()> {
        self.calls.push(IndexCall::Configure {
            package: package.to_string(),
            option: option.to_string(),
            value: value.clone(),
        });
        Ok(())
    }
}
