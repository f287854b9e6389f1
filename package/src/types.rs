//! Core type definitions for the recipe resolver

use crate::{Error, Result};
use recipe_config::{ConfigurationState, OptionValue};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::sync::OnceLock;

/// Package reference: `name/version[@user/channel][#revision]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageRef {
    pub name: String,
    pub version: String,
    pub user: Option<String>,
    pub channel: Option<String>,
    pub revision: Option<String>,
}

impl PackageRef {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            user: None,
            channel: None,
            revision: None,
        }
    }

    /// Parse a package reference (e.g., "openssl/3.2.1" or "gtest/1.12.1@org/stable")
    pub fn parse(s: &str) -> Result<Self> {
        static REFERENCE: OnceLock<Regex> = OnceLock::new();
        let re = REFERENCE.get_or_init(|| {
            Regex::new(
                r"^([a-z0-9_][a-z0-9_+.\-]*)/([^/@#\s]+)(?:@([^/@#\s]+)/([^/@#\s]+))?(?:#([A-Za-z0-9]+))?$",
            )
            .expect("valid regex")
        });

        let caps = re
            .captures(s.trim())
            .ok_or_else(|| Error::InvalidPackageSpec(s.to_string()))?;
        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());

        Ok(Self {
            name: caps[1].to_string(),
            version: caps[2].to_string(),
            user: group(3),
            channel: group(4),
            revision: group(5),
        })
    }
}

impl std::fmt::Display for PackageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.version)?;
        if let (Some(user), Some(channel)) = (&self.user, &self.channel) {
            write!(f, "@{}/{}", user, channel)?;
        }
        if let Some(revision) = &self.revision {
            write!(f, "#{}", revision)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for PackageRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for PackageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Gate over resolved option values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Always,
    Enabled(String),
    Disabled(String),
    Equals(String, OptionValue),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn enabled(option: impl Into<String>) -> Self {
        Condition::Enabled(option.into())
    }

    pub fn disabled(option: impl Into<String>) -> Self {
        Condition::Disabled(option.into())
    }

    pub fn equals(option: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        Condition::Equals(option.into(), value.into())
    }

    /// Evaluate against the state; every referenced option must be present
    pub fn evaluate(&self, state: &ConfigurationState) -> Result<bool> {
        let lookup = |option: &str| self.lookup(state, option);

        match self {
            Condition::Always => Ok(true),
            Condition::Enabled(option) => Ok(lookup(option)?.is_truthy()),
            Condition::Disabled(option) => Ok(!lookup(option)?.is_truthy()),
            Condition::Equals(option, expected) => {
                Ok(lookup(option)?.to_string() == expected.to_string())
            }
            Condition::All(conditions) => {
                for condition in conditions {
                    if !condition.evaluate(state)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Condition::Any(conditions) => {
                for condition in conditions {
                    if condition.evaluate(state)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    fn lookup<'s>(&self, state: &'s ConfigurationState, option: &str) -> Result<&'s OptionValue> {
        state.value(option).ok_or_else(|| Error::UndeclaredOption {
            option: option.to_string(),
            context: format!("condition '{}'", self),
        })
    }

    /// Get all option names referenced by this condition
    pub fn options(&self) -> Vec<&str> {
        match self {
            Condition::Always => Vec::new(),
            Condition::Enabled(option)
            | Condition::Disabled(option)
            | Condition::Equals(option, _) => vec![option.as_str()],
            Condition::All(cs) | Condition::Any(cs) => {
                cs.iter().flat_map(|c| c.options()).collect()
            }
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let join = |cs: &[Condition]| {
            cs.iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            Condition::Always => write!(f, "always"),
            Condition::Enabled(option) => write!(f, "{}", option),
            Condition::Disabled(option) => write!(f, "!{}", option),
            Condition::Equals(option, value) => write!(f, "{} == {}", option, value),
            Condition::All(cs) => write!(f, "all({})", join(cs)),
            Condition::Any(cs) => write!(f, "any({})", join(cs)),
        }
    }
}

/// Where a requirement was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequirementSource {
    /// Declared by the recipe itself
    Static,
    /// Read from the recipe's side-channel data
    ExternalData,
}

/// A requirement together with the gate that enables it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementEntry {
    pub reference: PackageRef,
    pub condition: Condition,
    pub source: RequirementSource,
    /// Whether the dependency takes part in the shared/static cascade
    pub link_sensitive: bool,
}

impl RequirementEntry {
    /// Unconditional entry from the side-channel data
    pub fn base(reference: PackageRef) -> Self {
        Self {
            reference,
            condition: Condition::Always,
            source: RequirementSource::ExternalData,
            link_sensitive: true,
        }
    }

    /// Recipe-declared entry gated by `condition`
    pub fn when(reference: PackageRef, condition: Condition) -> Self {
        Self {
            reference,
            condition,
            source: RequirementSource::Static,
            link_sensitive: true,
        }
    }

    pub fn with_link_sensitive(mut self, link_sensitive: bool) -> Self {
        self.link_sensitive = link_sensitive;
        self
    }

    /// Parse base entries from side-channel references, keeping their order
    pub fn from_data<S: AsRef<str>>(references: &[S]) -> Result<Vec<Self>> {
        references
            .iter()
            .map(|r| PackageRef::parse(r.as_ref()).map(Self::base))
            .collect()
    }
}

/// A requirement selected by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRequirement {
    pub reference: PackageRef,
    pub source: RequirementSource,
    pub link_sensitive: bool,
}

/// Ordered set of resolved requirements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementSet {
    entries: Vec<ResolvedRequirement>,
}

impl RequirementSet {
    pub(crate) fn push(&mut self, entry: ResolvedRequirement) {
        self.entries.push(entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedRequirement> {
        self.entries.iter()
    }

    /// References in declaration order
    pub fn references(&self) -> impl Iterator<Item = &PackageRef> {
        self.entries.iter().map(|e| &e.reference)
    }

    /// Package names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.reference.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedRequirement> {
        self.entries.iter().find(|e| e.reference.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for RequirementSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.references())
    }
}
