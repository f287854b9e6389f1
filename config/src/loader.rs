//! Configuration loading utilities
//!
//! Loads the caller's option profile and the recipe's side-channel data file
//! from the filesystem.

use crate::options::{OptionValue, Overrides};
use crate::{ConfigError, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Option profile supplied by the caller
///
/// ```toml
/// [options]
/// tests = false
///
/// [dependency_options."sentry-native"]
/// backend = "breakpad"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    /// Values for the recipe's own options
    pub options: IndexMap<String, OptionValue>,
    /// Values for dependency options, keyed by package name or glob
    pub dependency_options: IndexMap<String, IndexMap<String, OptionValue>>,
}

impl Profile {
    /// Parse a profile from TOML
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Convert to an override list; own options come first
    pub fn to_overrides(&self) -> Overrides {
        let mut overrides = Overrides::new();
        for (name, value) in &self.options {
            overrides = overrides.set(name.clone(), value.clone());
        }
        for (pattern, options) in &self.dependency_options {
            for (name, value) in options {
                overrides = overrides.set_dependency(pattern.clone(), name.clone(), value.clone());
            }
        }
        overrides
    }
}

/// Side-channel data attached to a recipe, read by key
#[derive(Debug, Clone, Default)]
pub struct RecipeData {
    table: toml::Table,
}

impl RecipeData {
    /// Key holding the base requirement list
    pub const REQUIREMENTS: &'static str = "requirements";

    /// Parse recipe data from TOML
    pub fn parse(content: &str) -> Result<Self> {
        Ok(Self {
            table: toml::from_str(content)?,
        })
    }

    /// Read a list of strings; a missing key is an empty list
    pub fn get_list(&self, key: &str) -> Result<Vec<String>> {
        let Some(value) = self.table.get(key) else {
            return Ok(Vec::new());
        };

        let items = value.as_array().ok_or_else(|| {
            ConfigError::Invalid(format!("recipe data key '{}' is not a list", key))
        })?;

        items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ConfigError::Invalid(format!(
                        "recipe data key '{}' contains a non-string entry: {}",
                        key, item
                    ))
                })
            })
            .collect()
    }

    /// Base requirement references in file order
    pub fn requirements(&self) -> Result<Vec<String>> {
        self.get_list(Self::REQUIREMENTS)
    }
}

/// Loader for profile and recipe data files
pub struct ConfigLoader {
    /// Directory the default file names are resolved against
    root: PathBuf,
    /// Explicit profile path
    profile: Option<PathBuf>,
    /// Explicit recipe data path
    data: Option<PathBuf>,
    /// Whether missing files fall back to empty defaults
    use_defaults: bool,
}

impl ConfigLoader {
    /// Create a loader rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            profile: None,
            data: None,
            use_defaults: true,
        }
    }

    /// Create a loader rooted at the configured or current directory
    pub fn from_env() -> Self {
        let mut loader = Self::new(get_config_root());
        if let Ok(profile) = std::env::var(env_vars::PROFILE) {
            loader = loader.profile(profile);
        }
        loader
    }

    /// Use an explicit profile file
    pub fn profile(mut self, path: impl Into<PathBuf>) -> Self {
        self.profile = Some(path.into());
        self
    }

    /// Use an explicit recipe data file
    pub fn data(mut self, path: impl Into<PathBuf>) -> Self {
        self.data = Some(path.into());
        self
    }

    /// Set whether missing files fall back to defaults
    pub fn use_defaults(mut self, use_defaults: bool) -> Self {
        self.use_defaults = use_defaults;
        self
    }

    /// Get the configuration root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the profile file that will be read
    pub fn profile_path(&self) -> PathBuf {
        self.profile
            .clone()
            .unwrap_or_else(|| self.root.join(paths::PROFILE_FILE))
    }

    /// Path of the recipe data file that will be read
    pub fn data_path(&self) -> PathBuf {
        self.data
            .clone()
            .unwrap_or_else(|| self.root.join(paths::DATA_FILE))
    }

    /// Load the caller's profile
    pub fn load_profile(&self) -> Result<Profile> {
        let path = self.profile_path();
        match self.read_optional(&path, self.profile.is_some())? {
            Some(content) => {
                tracing::debug!("Loading profile from {}", path.display());
                Profile::parse(&content)
            }
            None => Ok(Profile::default()),
        }
    }

    /// Load the recipe's side-channel data
    pub fn load_data(&self) -> Result<RecipeData> {
        let path = self.data_path();
        match self.read_optional(&path, self.data.is_some())? {
            Some(content) => {
                tracing::debug!("Loading recipe data from {}", path.display());
                RecipeData::parse(&content)
            }
            None => Ok(RecipeData::default()),
        }
    }

    fn read_optional(&self, path: &Path, explicit: bool) -> Result<Option<String>> {
        if path.exists() {
            return Ok(Some(std::fs::read_to_string(path)?));
        }
        if explicit || !self.use_defaults {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        tracing::debug!("{} not found, using defaults", path.display());
        Ok(None)
    }
}

/// Default file names
pub mod paths {
    /// Caller option profile
    pub const PROFILE_FILE: &str = "profile.toml";
    /// Recipe side-channel data
    pub const DATA_FILE: &str = "recipe-data.toml";
}

/// Environment variable names used by the configuration system
pub mod env_vars {
    /// Configuration root override
    pub const CONFIG_ROOT: &str = "COVENT_RECIPE_ROOT";
    /// Profile path override
    pub const PROFILE: &str = "COVENT_PROFILE";
}

/// Get configuration root from environment or the current directory
pub fn get_config_root() -> PathBuf {
    std::env::var(env_vars::CONFIG_ROOT)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
