//! Option registry
//!
//! Declares the options a recipe recognizes, their value domains and their
//! defaults, and turns caller overrides into a [`ConfigurationState`].
//!
//! Overrides use the recipe tooling's command-line spelling:
//! - `tests=False` sets one of the recipe's own options
//! - `sentry-native:backend=breakpad` sets an option on a dependency
//! - `*:shared=True` sets an option on every dependency matching a glob

use crate::state::{ConfigurationState, ScopedOverride};
use crate::{ConfigError, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Value of an option
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
}

impl OptionValue {
    /// Create a string value
    pub fn str(value: impl Into<String>) -> Self {
        OptionValue::Str(value.into())
    }

    /// Get the boolean value, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Str(_) => None,
        }
    }

    /// Truthiness used by requirement and override gates.
    ///
    /// Strings are true unless empty, `False` or `None`.
    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Bool(b) => *b,
            OptionValue::Str(s) => !(s.is_empty() || s == "False" || s == "None"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(true) => write!(f, "True"),
            OptionValue::Bool(false) => write!(f, "False"),
            OptionValue::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Set of values an option accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionDomain {
    /// `True` or `False`
    Boolean,
    /// One of a fixed list of strings
    Choices(Vec<String>),
    /// Any value
    Any,
}

impl OptionDomain {
    /// Create a choices domain
    pub fn choices<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionDomain::Choices(values.into_iter().map(Into::into).collect())
    }

    /// Check a value against the domain, returning it in canonical form.
    ///
    /// Boolean domains accept `True`/`true`/`False`/`false` spelled as strings.
    pub fn accept(&self, value: &OptionValue) -> Option<OptionValue> {
        match (self, value) {
            (OptionDomain::Boolean, OptionValue::Bool(b)) => Some(OptionValue::Bool(*b)),
            (OptionDomain::Boolean, OptionValue::Str(s)) => match s.as_str() {
                "True" | "true" => Some(OptionValue::Bool(true)),
                "False" | "false" => Some(OptionValue::Bool(false)),
                _ => None,
            },
            (OptionDomain::Choices(choices), value) => {
                let text = value.to_string();
                choices
                    .iter()
                    .any(|c| *c == text)
                    .then_some(OptionValue::Str(text))
            }
            (OptionDomain::Any, value) => Some(value.clone()),
        }
    }
}

impl fmt::Display for OptionDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionDomain::Boolean => write!(f, "[True, False]"),
            OptionDomain::Choices(choices) => write!(f, "[{}]", choices.join(", ")),
            OptionDomain::Any => write!(f, "ANY"),
        }
    }
}

/// A declared option
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionDecl {
    /// Option name, unique within the registry
    pub name: String,
    /// Accepted values
    pub domain: OptionDomain,
    /// Value used when the caller does not override it
    pub default: OptionValue,
}

/// Registry of declared options
///
/// Iteration follows declaration order.
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    options: IndexMap<String, OptionDecl>,
}

impl OptionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an option
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        domain: OptionDomain,
        default: impl Into<OptionValue>,
    ) -> Result<&OptionDecl> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(ConfigError::invalid_option(name, "not a valid option name"));
        }
        if self.options.contains_key(&name) {
            return Err(ConfigError::invalid_option(name, "declared more than once"));
        }

        let default = default.into();
        let default = domain.accept(&default).ok_or_else(|| {
            ConfigError::invalid_option(
                &name,
                format!("default '{}' is outside domain {}", default, domain),
            )
        })?;

        let entry = self.options.entry(name.clone()).or_insert(OptionDecl {
            name,
            domain,
            default,
        });
        Ok(&*entry)
    }

    /// Look up a declared option
    pub fn get(&self, name: &str) -> Option<&OptionDecl> {
        self.options.get(name)
    }

    /// Check whether an option is declared
    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Declared options in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &OptionDecl> {
        self.options.values()
    }

    /// Number of declared options
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether no options are declared
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Apply caller overrides on top of the declared defaults
    pub fn resolve(&self, overrides: &Overrides) -> Result<ConfigurationState> {
        let mut state = ConfigurationState::new(
            self.options
                .values()
                .map(|decl| (decl.name.clone(), decl.default.clone()))
                .collect(),
        );

        for entry in overrides.iter() {
            match &entry.target {
                OverrideTarget::Own => {
                    let decl = self
                        .options
                        .get(&entry.name)
                        .ok_or_else(|| ConfigError::invalid_option(&entry.name, "not declared"))?;
                    let value = decl.domain.accept(&entry.value).ok_or_else(|| {
                        ConfigError::invalid_option(
                            &entry.name,
                            format!("value '{}' is outside domain {}", entry.value, decl.domain),
                        )
                    })?;
                    tracing::debug!("Option {} = {}", entry.name, value);
                    state.assign(&entry.name, value);
                }
                OverrideTarget::Dependency(pattern) => {
                    state.push_scoped(ScopedOverride::new(
                        pattern,
                        &entry.name,
                        entry.value.clone(),
                    )?);
                }
            }
        }

        Ok(state)
    }
}

/// What an override applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideTarget {
    /// One of the recipe's own options
    Own,
    /// Options of dependencies whose name matches the pattern
    Dependency(String),
}

/// A single caller-supplied override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionOverride {
    pub target: OverrideTarget,
    pub name: String,
    pub value: OptionValue,
}

impl OptionOverride {
    /// Parse `name=value` or `pattern:name=value`
    pub fn parse(input: &str) -> Result<Self> {
        let (lhs, value) = input
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidOverride(format!("missing '=' in '{}'", input)))?;

        let (target, name) = match lhs.split_once(':') {
            Some((pattern, name)) => {
                let pattern = pattern.trim();
                if pattern.is_empty() {
                    return Err(ConfigError::InvalidOverride(format!(
                        "empty package pattern in '{}'",
                        input
                    )));
                }
                (OverrideTarget::Dependency(pattern.to_string()), name.trim())
            }
            None => (OverrideTarget::Own, lhs.trim()),
        };

        if !is_valid_name(name) {
            return Err(ConfigError::InvalidOverride(format!(
                "invalid option name in '{}'",
                input
            )));
        }

        Ok(Self {
            target,
            name: name.to_string(),
            value: OptionValue::Str(value.trim().to_string()),
        })
    }
}

/// Ordered list of caller overrides; later entries win
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    entries: Vec<OptionOverride>,
}

impl Overrides {
    /// Create an empty override list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list of `-o` style arguments
    pub fn parse_all<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut overrides = Self::new();
        for arg in args {
            overrides.push(OptionOverride::parse(arg.as_ref())?);
        }
        Ok(overrides)
    }

    /// Override one of the recipe's own options
    pub fn set(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.entries.push(OptionOverride {
            target: OverrideTarget::Own,
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Override an option on dependencies matching `pattern`
    pub fn set_dependency(
        mut self,
        pattern: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Self {
        self.entries.push(OptionOverride {
            target: OverrideTarget::Dependency(pattern.into()),
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Append an override
    pub fn push(&mut self, entry: OptionOverride) {
        self.entries.push(entry);
    }

    /// Append all overrides from another list after this one's
    pub fn merge(&mut self, other: &Overrides) {
        self.entries.extend(other.entries.iter().cloned());
    }

    /// Iterate in application order
    pub fn iter(&self) -> impl Iterator<Item = &OptionOverride> {
        self.entries.iter()
    }

    /// Number of overrides
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no overrides
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_valid_name(name: &str) -> bool {
    static NAME: OnceLock<Regex> = OnceLock::new();
    NAME.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("valid regex"))
        .is_match(name)
}
