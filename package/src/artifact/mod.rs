//! Artifact description
//!
//! What the built package exposes to consumers: its library names and the
//! aliases build tools may use to discover it.

use crate::types::RequirementSet;
use indexmap::IndexMap;
use serde::Serialize;

/// How the exposed library names are decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryNames {
    /// Always the same libraries
    Fixed(Vec<String>),
    /// `base` plus one `base-suffix` library per variant whose package is required
    Variants {
        base: String,
        variants: Vec<(String, String)>,
    },
}

impl LibraryNames {
    fn resolve(&self, requirements: &RequirementSet) -> Vec<String> {
        match self {
            LibraryNames::Fixed(names) => names.clone(),
            LibraryNames::Variants { base, variants } => {
                let mut names = vec![base.clone()];
                names.extend(
                    variants
                        .iter()
                        .filter(|(package, _)| requirements.contains(package))
                        .map(|(_, suffix)| format!("{}-{}", base, suffix)),
                );
                names
            }
        }
    }
}

/// Recipe's description of its artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub libraries: LibraryNames,
    /// Discovery aliases, alias to canonical name
    pub aliases: IndexMap<String, String>,
}

impl ArtifactSpec {
    pub fn fixed<I, S>(libraries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            libraries: LibraryNames::Fixed(libraries.into_iter().map(Into::into).collect()),
            aliases: IndexMap::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), canonical.into());
        self
    }

    /// Describe the artifact for the resolved requirements
    pub fn describe(&self, requirements: &RequirementSet) -> ArtifactDescriptor {
        ArtifactDescriptor {
            library_names: self.libraries.resolve(requirements),
            discovery_metadata: self.aliases.clone(),
        }
    }
}

/// Description handed to packaging steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDescriptor {
    pub library_names: Vec<String>,
    pub discovery_metadata: IndexMap<String, String>,
}
