//! Toolchain variables and CMake toolchain generation
//!
//! A recipe declares which of its options are visible to the build system and
//! under which variable names. The mapping is a direct copy; there is no
//! conditional logic here. [`CMakeToolchain`] materializes the variables into
//! a toolchain file that CMake loads with `-DCMAKE_TOOLCHAIN_FILE`.

use crate::error::{Error, Result};
use crate::settings::Settings;
use indexmap::IndexMap;
use recipe_config::{ConfigurationState, OptionValue};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Variables handed to the build system, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ToolchainVariableSet {
    variables: IndexMap<String, OptionValue>,
}

impl ToolchainVariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: OptionValue) {
        self.variables.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.variables.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Declared mapping from option names to toolchain variable names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainMapping {
    entries: Vec<(String, String)>,
}

impl ToolchainMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose `option` as `variable`
    pub fn map(&mut self, variable: impl Into<String>, option: impl Into<String>) -> &mut Self {
        self.entries.push((variable.into(), option.into()));
        self
    }

    /// Options read by the mapping
    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, option)| option.as_str())
    }

    /// Copy the mapped options out of the state
    pub fn derive(&self, state: &ConfigurationState) -> Result<ToolchainVariableSet> {
        let mut variables = ToolchainVariableSet::new();
        for (variable, option) in &self.entries {
            let value = state.value(option).ok_or_else(|| Error::UndeclaredOption {
                option: option.clone(),
                context: format!("toolchain variable {}", variable),
            })?;
            variables.insert(variable.clone(), value.clone());
        }
        Ok(variables)
    }
}

/// Consumer of the variable set ("generate" step)
pub trait ToolchainGenerator {
    /// Materialize the variables, returning the written file
    fn generate(&self, variables: &ToolchainVariableSet, settings: &Settings) -> Result<PathBuf>;
}

/// Writes a CMake toolchain file
#[derive(Debug, Clone)]
pub struct CMakeToolchain {
    output_folder: PathBuf,
    file_name: String,
}

impl CMakeToolchain {
    /// Default toolchain file name
    pub const FILE_NAME: &'static str = "covent_toolchain.cmake";

    pub fn new(output_folder: impl Into<PathBuf>) -> Self {
        Self {
            output_folder: output_folder.into(),
            file_name: Self::FILE_NAME.to_string(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Path the toolchain file is written to
    pub fn path(&self) -> PathBuf {
        self.output_folder.join(&self.file_name)
    }

    /// Render the toolchain file contents
    pub fn render(&self, variables: &ToolchainVariableSet, settings: &Settings) -> String {
        let mut output = String::new();
        output.push_str("# Generated by covent-recipe; changes will be overwritten.\n\n");

        output.push_str(&format!(
            "set(CMAKE_BUILD_TYPE \"{}\" CACHE STRING \"\" FORCE)\n",
            settings.build_type
        ));
        if let Some(cppstd) = settings.effective_cppstd() {
            output.push_str(&format!(
                "set(CMAKE_CXX_STANDARD {})\n",
                cppstd.standard.number()
            ));
            output.push_str(&format!(
                "set(CMAKE_CXX_EXTENSIONS {})\n",
                if cppstd.gnu { "ON" } else { "OFF" }
            ));
        }

        if !variables.is_empty() {
            output.push('\n');
        }
        for (name, value) in variables.iter() {
            output.push_str(&format!(
                "set({} {} CACHE {} \"\")\n",
                name,
                cmake_value(value),
                cmake_type(value)
            ));
        }

        output
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::create_dir_all(&self.output_folder)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl ToolchainGenerator for CMakeToolchain {
    fn generate(&self, variables: &ToolchainVariableSet, settings: &Settings) -> Result<PathBuf> {
        let path = self.path();
        self.write(&path, &self.render(variables, settings))?;
        info!("Wrote toolchain file {}", path.display());
        Ok(path)
    }
}

fn cmake_value(value: &OptionValue) -> String {
    match value {
        OptionValue::Bool(true) => "ON".to_string(),
        OptionValue::Bool(false) => "OFF".to_string(),
        OptionValue::Str(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
    }
}

fn cmake_type(value: &OptionValue) -> &'static str {
    match value {
        OptionValue::Bool(_) => "BOOL",
        OptionValue::Str(_) => "STRING",
    }
}
