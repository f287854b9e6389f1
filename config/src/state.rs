//! Configuration state
//!
//! Resolved option values for one invocation plus the options recorded for
//! dependencies. A [`ConfigurationState`] is built by the registry, receives
//! dependency overrides during propagation, and is then frozen into a
//! read-only [`FrozenState`].

use crate::options::{OptionDomain, OptionValue};
use crate::{ConfigError, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Options recorded per dependency, ordered by package then option name
pub type DependencyOverrides = BTreeMap<String, BTreeMap<String, OptionValue>>;

/// Dependency-scoped override supplied by the caller
#[derive(Debug, Clone)]
pub struct ScopedOverride {
    /// Package name or glob as written by the caller
    pub pattern: String,
    /// Dependency option name
    pub option: String,
    /// Requested value
    pub value: OptionValue,
    matcher: glob::Pattern,
}

impl ScopedOverride {
    /// Create a scoped override, compiling its package pattern.
    ///
    /// Boolean spellings (`True`, `false`, ...) are stored as booleans so they
    /// compare equal to values recorded by recipe rules.
    pub fn new(
        pattern: impl Into<String>,
        option: impl Into<String>,
        value: OptionValue,
    ) -> Result<Self> {
        let pattern = pattern.into();
        let matcher = glob::Pattern::new(&pattern)
            .map_err(|e| ConfigError::InvalidGlob(format!("{}: {}", pattern, e)))?;
        let value = OptionDomain::Boolean.accept(&value).unwrap_or(value);
        Ok(Self {
            pattern,
            option: option.into(),
            value,
            matcher,
        })
    }

    /// Whether the pattern names a single package rather than a glob
    pub fn is_literal(&self) -> bool {
        !self.pattern.contains(['*', '?', '['])
    }

    /// Check a package name against the pattern
    pub fn matches(&self, package: &str) -> bool {
        self.matcher.matches(package)
    }
}

/// Mutable configuration for the current invocation
#[derive(Debug, Clone, Default)]
pub struct ConfigurationState {
    values: IndexMap<String, OptionValue>,
    dependency_options: DependencyOverrides,
    scoped: Vec<ScopedOverride>,
}

impl ConfigurationState {
    /// Create a state from resolved option values
    pub fn new(values: IndexMap<String, OptionValue>) -> Self {
        Self {
            values,
            dependency_options: BTreeMap::new(),
            scoped: Vec::new(),
        }
    }

    pub(crate) fn assign(&mut self, name: &str, value: OptionValue) {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
        }
    }

    pub(crate) fn push_scoped(&mut self, scoped: ScopedOverride) {
        self.scoped.push(scoped);
    }

    /// Resolved value of an option
    pub fn value(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Truthiness of an option, `None` when it is not present
    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.values.get(name).map(OptionValue::is_truthy)
    }

    /// Whether an option is present
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Resolved values in declaration order
    pub fn values(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.values.iter()
    }

    /// Record an option value on a dependency, returning any previous value
    pub fn record_override(
        &mut self,
        package: impl Into<String>,
        option: impl Into<String>,
        value: OptionValue,
    ) -> Option<OptionValue> {
        self.dependency_options
            .entry(package.into())
            .or_default()
            .insert(option.into(), value)
    }

    /// Option value recorded on a dependency
    pub fn dependency_option(&self, package: &str, option: &str) -> Option<&OptionValue> {
        self.dependency_options
            .get(package)
            .and_then(|options| options.get(option))
    }

    /// All recorded dependency options
    pub fn dependency_options(&self) -> &DependencyOverrides {
        &self.dependency_options
    }

    /// Caller-supplied dependency overrides in application order
    pub fn scoped_overrides(&self) -> &[ScopedOverride] {
        &self.scoped
    }

    /// Finish the state; no further changes are possible
    pub fn freeze(self) -> FrozenState {
        FrozenState {
            options: self.values,
            dependency_options: self.dependency_options,
        }
    }
}

/// Read-only snapshot of a finished configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrozenState {
    options: IndexMap<String, OptionValue>,
    dependency_options: DependencyOverrides,
}

impl FrozenState {
    /// Resolved value of an option
    pub fn value(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }

    /// Resolved values in declaration order
    pub fn values(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.options.iter()
    }

    /// Options recorded on dependencies
    pub fn dependency_options(&self) -> &DependencyOverrides {
        &self.dependency_options
    }
}
