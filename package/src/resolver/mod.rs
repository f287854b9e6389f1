//! Dependency resolution
//!
//! Turns resolved option values into the ordered list of required packages.
//! Base entries from the recipe's side-channel data come first, in their own
//! order, followed by the recipe's conditional entries in declaration order.
//! The output order is what the external dependency index sees, so it must be
//! identical for identical inputs.

use crate::error::{Error, Result};
use crate::types::{RequirementEntry, RequirementSet, ResolvedRequirement};
use indexmap::IndexMap;
use recipe_config::ConfigurationState;
use tracing::debug;

/// Resolver over a recipe's conditional requirements
#[derive(Debug, Clone, Default)]
pub struct DependencyResolver {
    conditional: Vec<RequirementEntry>,
}

impl DependencyResolver {
    /// Create a resolver with conditional entries in declaration order
    pub fn new(conditional: Vec<RequirementEntry>) -> Self {
        Self { conditional }
    }

    /// Conditional entries in declaration order
    pub fn conditional(&self) -> &[RequirementEntry] {
        &self.conditional
    }

    /// Compute the ordered requirement set
    pub fn resolve_requirements(
        &self,
        state: &ConfigurationState,
        base_requirements: &[RequirementEntry],
    ) -> Result<RequirementSet> {
        let mut seen: IndexMap<&str, &RequirementEntry> = IndexMap::new();
        let mut resolved = RequirementSet::default();

        for entry in base_requirements.iter().chain(self.conditional.iter()) {
            if !entry.condition.evaluate(state)? {
                debug!(
                    "Skipping {} ({} is not satisfied)",
                    entry.reference, entry.condition
                );
                continue;
            }

            if let Some(first) = seen.get(entry.reference.name.as_str()) {
                return Err(Error::DuplicateRequirement {
                    package: entry.reference.name.clone(),
                    first: first.reference.to_string(),
                    second: entry.reference.to_string(),
                });
            }
            seen.insert(entry.reference.name.as_str(), entry);

            debug!("Requiring {}", entry.reference);
            resolved.push(ResolvedRequirement {
                reference: entry.reference.clone(),
                source: entry.source,
                link_sensitive: entry.link_sensitive,
            });
        }

        Ok(resolved)
    }
}
