//! Propagation and toolchain emission
//!
//! Final stage of the pipeline. Records dependency overrides, derives the
//! toolchain variables and describes the artifact, all from the same state,
//! which is frozen once this stage completes.

use crate::artifact::{ArtifactDescriptor, ArtifactSpec};
use crate::error::Result;
use crate::propagation::Propagator;
use crate::toolchain::{ToolchainMapping, ToolchainVariableSet};
use crate::types::RequirementSet;
use recipe_config::{ConfigurationState, DependencyOverrides, FrozenState};
use tracing::info;

/// Output of the emitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub state: FrozenState,
    pub toolchain_vars: ToolchainVariableSet,
    pub artifact: ArtifactDescriptor,
}

impl Emission {
    /// Options recorded on dependencies
    pub fn overrides(&self) -> &DependencyOverrides {
        self.state.dependency_options()
    }
}

#[derive(Debug, Clone)]
pub struct Emitter {
    propagator: Propagator,
    toolchain: ToolchainMapping,
    artifact: ArtifactSpec,
}

impl Emitter {
    pub fn new(
        propagator: Propagator,
        toolchain: ToolchainMapping,
        artifact: ArtifactSpec,
    ) -> Self {
        Self {
            propagator,
            toolchain,
            artifact,
        }
    }

    pub fn propagator(&self) -> &Propagator {
        &self.propagator
    }

    pub fn toolchain(&self) -> &ToolchainMapping {
        &self.toolchain
    }

    pub fn artifact(&self) -> &ArtifactSpec {
        &self.artifact
    }

    pub fn emit(
        &self,
        mut state: ConfigurationState,
        requirements: &RequirementSet,
    ) -> Result<Emission> {
        self.propagator.apply(&mut state, requirements)?;
        let toolchain_vars = self.toolchain.derive(&state)?;
        let artifact = self.artifact.describe(requirements);

        info!(
            "Emitted {} dependency overrides and {} toolchain variables",
            state.dependency_options().values().map(|o| o.len()).sum::<usize>(),
            toolchain_vars.len()
        );

        Ok(Emission {
            state: state.freeze(),
            toolchain_vars,
            artifact,
        })
    }
}
