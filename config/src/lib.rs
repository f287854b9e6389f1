//! Recipe Configuration
//!
//! Option handling for the covent recipe resolver.
//!
//! # Overview
//!
//! - [`options`]: option declarations, value domains and caller overrides
//! - [`state`]: resolved option values and dependency option records
//! - [`loader`]: profile and recipe data loading
//!
//! # Quick Start
//!
//! ```rust
//! use recipe_config::{OptionDomain, OptionRegistry, Overrides};
//!
//! let mut registry = OptionRegistry::new();
//! registry.declare("shared", OptionDomain::Boolean, true).unwrap();
//!
//! let state = registry
//!     .resolve(&Overrides::new().set("shared", "False"))
//!     .unwrap();
//! assert_eq!(state.is_enabled("shared"), Some(false));
//! ```

pub mod error;
pub mod loader;
pub mod options;
pub mod state;

pub use error::{ConfigError, Result};
pub use loader::{env_vars, get_config_root, paths, ConfigLoader, Profile, RecipeData};
pub use options::{
    OptionDecl, OptionDomain, OptionOverride, OptionRegistry, OptionValue, OverrideTarget,
    Overrides,
};
pub use state::{ConfigurationState, DependencyOverrides, FrozenState, ScopedOverride};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ConfigError, ConfigLoader, ConfigurationState, FrozenState, OptionDomain, OptionRegistry,
        OptionValue, Overrides, Result,
    };
}
