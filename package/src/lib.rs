//! Covent Recipe Resolver
//!
//! Turns a recipe, caller option overrides and build settings into everything
//! a build needs: the ordered requirement list, options recorded on
//! dependencies, toolchain variables and the artifact description.
//!
//! # Architecture
//!
//! Each invocation runs four stages in a fixed order:
//!
//! - **Registry**: resolves declared options against caller overrides
//! - **Validator**: rejects build environments the recipe cannot support
//! - **Resolver**: evaluates requirement conditions into an ordered set
//! - **Emitter**: propagates options to dependencies, derives toolchain
//!   variables and freezes the configuration
//!
//! Any failure aborts the invocation before output is produced.
//!
//! # Example
//!
//! ```rust
//! use recipe_config::Overrides;
//! use recipe_package::settings::{Compiler, CompilerKind, Settings};
//! use recipe_package::{Pipeline, Recipe, RequirementEntry};
//!
//! let recipe = Recipe::covent().unwrap();
//! let settings = Settings::new(Compiler::new(CompilerKind::Gcc, "13"))
//!     .with_cppstd("20".parse().unwrap());
//! let base = RequirementEntry::from_data(&["fmt/10.2.1"]).unwrap();
//!
//! let resolution = Pipeline::new(&recipe)
//!     .run(&Overrides::new().set("sentry", false), &base, &settings)
//!     .unwrap();
//! assert_eq!(resolution.requirement_refs(), vec!["fmt/10.2.1", "gtest/1.12.1"]);
//! ```

pub mod artifact;
pub mod emitter;
pub mod error;
pub mod index;
pub mod layout;
pub mod propagation;
pub mod recipe;
pub mod resolver;
pub mod settings;
pub mod toolchain;
pub mod types;
pub mod validation;

pub use artifact::{ArtifactDescriptor, ArtifactSpec, LibraryNames};
pub use emitter::{Emission, Emitter};
pub use error::{Error, Result};
pub use index::{DependencyIndex, IndexCall, RecordingIndex};
pub use layout::{CMakeLayout, Layout};
pub use propagation::{OverrideRule, Propagator};
pub use recipe::{Recipe, RecipeBuilder};
pub use resolver::DependencyResolver;
pub use settings::Settings;
pub use toolchain::{CMakeToolchain, ToolchainGenerator, ToolchainMapping, ToolchainVariableSet};
pub use types::*;
pub use validation::Validator;

use indexmap::IndexMap;
use recipe_config::{DependencyOverrides, FrozenState, OptionValue, Overrides, RecipeData};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Runs a recipe's stages for one invocation
pub struct Pipeline<'a> {
    recipe: &'a Recipe,
}

impl<'a> Pipeline<'a> {
    pub fn new(recipe: &'a Recipe) -> Self {
        Self { recipe }
    }

    /// Run every stage with explicit base requirements
    pub fn run(
        &self,
        overrides: &Overrides,
        base_requirements: &[RequirementEntry],
        settings: &Settings,
    ) -> Result<Resolution> {
        info!(
            "Configuring {} for {} {} ({})",
            self.recipe.reference(),
            settings.os,
            settings.arch,
            settings.build_type
        );

        let state = self.recipe.registry().resolve(overrides)?;
        debug!(
            "Resolved options: {}",
            state
                .values()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(", ")
        );

        self.recipe.validator().validate(&state, settings)?;

        let requirements = self
            .recipe
            .resolver()
            .resolve_requirements(&state, base_requirements)?;
        info!("Resolved {} requirements", requirements.len());

        let emission = self.recipe.emitter().emit(state, &requirements)?;

        Ok(Resolution {
            requirements,
            emission,
        })
    }

    /// Run every stage, taking base requirements from recipe data
    pub fn run_with_data(
        &self,
        overrides: &Overrides,
        data: &RecipeData,
        settings: &Settings,
    ) -> Result<Resolution> {
        let base = RequirementEntry::from_data(&data.requirements()?)?;
        self.run(overrides, &base, settings)
    }
}

/// Result of a successful invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    requirements: RequirementSet,
    emission: Emission,
}

#[derive(Serialize)]
struct ResolutionReport<'a> {
    requirements: &'a RequirementSet,
    options: IndexMap<&'a str, &'a OptionValue>,
    dependency_options: &'a DependencyOverrides,
    toolchain_vars: &'a ToolchainVariableSet,
    artifact: &'a ArtifactDescriptor,
}

impl Resolution {
    pub fn requirements(&self) -> &RequirementSet {
        &self.requirements
    }

    /// Requirement references as strings, in order
    pub fn requirement_refs(&self) -> Vec<String> {
        self.requirements.references().map(|r| r.to_string()).collect()
    }

    pub fn state(&self) -> &FrozenState {
        &self.emission.state
    }

    pub fn overrides(&self) -> &DependencyOverrides {
        self.emission.overrides()
    }

    pub fn toolchain_vars(&self) -> &ToolchainVariableSet {
        &self.emission.toolchain_vars
    }

    pub fn artifact(&self) -> &ArtifactDescriptor {
        &self.emission.artifact
    }

    /// Drive the dependency index: every requirement in order, then every
    /// recorded dependency option sorted by package and option
    pub fn hand_off(&self, index: &mut dyn DependencyIndex) -> Result<()> {
        for reference in self.requirements.references() {
            index.requires(reference)?;
        }
        for (package, options) in self.overrides() {
            for (option, value) in options {
                index.configure(package, option, value)?;
            }
        }
        Ok(())
    }

    /// Materialize the toolchain variables
    pub fn generate(
        &self,
        generator: &dyn ToolchainGenerator,
        settings: &Settings,
    ) -> Result<PathBuf> {
        generator.generate(self.toolchain_vars(), settings)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        let report = ResolutionReport {
            requirements: &self.requirements,
            options: self.state().values().map(|(k, v)| (k.as_str(), v)).collect(),
            dependency_options: self.overrides(),
            toolchain_vars: self.toolchain_vars(),
            artifact: self.artifact(),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}
