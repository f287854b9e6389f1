//! Recipe definitions
//!
//! A [`Recipe`] bundles everything the pipeline needs for one package: the
//! option registry, the minimum language standard, the conditional
//! requirements, the override rules, the toolchain mapping and the artifact
//! description. Recipes are immutable once built and are passed by reference
//! through each invocation.
//!
//! # Example
//!
//! ```rust
//! use recipe_package::recipe::Recipe;
//! use recipe_package::settings::{CppStd, Standard};
//! use recipe_package::Condition;
//! use recipe_config::OptionDomain;
//!
//! let recipe = Recipe::builder("demo", "1.0.0")
//!     .option("tests", OptionDomain::Boolean, false)
//!     .min_cppstd(CppStd::new(Standard::Cpp17))
//!     .test_requires("gtest/1.12.1", Condition::enabled("tests"))
//!     .toolchain_var("DEMO_BUILD_TESTS", "tests")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(recipe.name(), "demo");
//! ```

use crate::artifact::ArtifactSpec;
use crate::emitter::Emitter;
use crate::error::{Error, Result};
use crate::propagation::{OverrideRule, Propagator};
use crate::resolver::DependencyResolver;
use crate::settings::{CppStd, Standard};
use crate::toolchain::ToolchainMapping;
use crate::types::{Condition, PackageRef, RequirementEntry};
use crate::validation::Validator;
use recipe_config::{OptionDomain, OptionRegistry, OptionValue};

/// A complete, checked recipe
#[derive(Debug, Clone)]
pub struct Recipe {
    name: String,
    version: String,
    package_type: String,
    registry: OptionRegistry,
    validator: Validator,
    resolver: DependencyResolver,
    emitter: Emitter,
}

impl Recipe {
    pub fn builder(name: impl Into<String>, version: impl Into<String>) -> RecipeBuilder {
        RecipeBuilder::new(name, version)
    }

    /// The covent library recipe
    pub fn covent() -> Result<Self> {
        Recipe::builder("covent", "0.1.0")
            .package_type("library")
            .option("tests", OptionDomain::Boolean, true)
            .option("sentry", OptionDomain::Boolean, true)
            .option("shared", OptionDomain::Boolean, true)
            .min_cppstd(CppStd::new(Standard::Cpp20))
            .requires("sentry-native/0.7.11", Condition::enabled("sentry"))
            .test_requires("gtest/1.12.1", Condition::enabled("tests"))
            .cascade("shared", "shared")
            .pin(
                Condition::enabled("sentry"),
                "sentry-native",
                "backend",
                "inproc",
            )
            .toolchain_var("COVENT_SENTRY", "sentry")
            .toolchain_var("COVENT_BUILD_TESTS", "tests")
            .artifact(
                ArtifactSpec::fixed(["covent"])
                    .with_alias("covent", "covent::covent")
                    .with_alias("Covent::Covent", "covent::covent"),
            )
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn package_type(&self) -> &str {
        &self.package_type
    }

    /// `name/version`
    pub fn reference(&self) -> PackageRef {
        PackageRef::new(&self.name, &self.version)
    }

    pub fn registry(&self) -> &OptionRegistry {
        &self.registry
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn resolver(&self) -> &DependencyResolver {
        &self.resolver
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }
}

/// Builder for [`Recipe`]; all checks run in [`RecipeBuilder::build`]
#[derive(Debug, Clone)]
pub struct RecipeBuilder {
    name: String,
    version: String,
    package_type: String,
    options: Vec<(String, OptionDomain, OptionValue)>,
    min_cppstd: CppStd,
    requirements: Vec<(String, Condition, bool)>,
    rules: Vec<OverrideRule>,
    toolchain: ToolchainMapping,
    artifact: Option<ArtifactSpec>,
}

impl RecipeBuilder {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            package_type: "library".to_string(),
            options: Vec::new(),
            min_cppstd: CppStd::new(Standard::Cpp11),
            requirements: Vec::new(),
            rules: Vec::new(),
            toolchain: ToolchainMapping::new(),
            artifact: None,
        }
    }

    pub fn package_type(mut self, package_type: impl Into<String>) -> Self {
        self.package_type = package_type.into();
        self
    }

    /// Declare an option
    pub fn option(
        mut self,
        name: impl Into<String>,
        domain: OptionDomain,
        default: impl Into<OptionValue>,
    ) -> Self {
        self.options.push((name.into(), domain, default.into()));
        self
    }

    /// Minimum C++ standard the toolchain must support
    pub fn min_cppstd(mut self, cppstd: CppStd) -> Self {
        self.min_cppstd = cppstd;
        self
    }

    /// Add a requirement that takes part in the link-mode cascade
    pub fn requires(mut self, reference: impl Into<String>, condition: Condition) -> Self {
        self.requirements.push((reference.into(), condition, true));
        self
    }

    /// Add a test-only requirement, outside the link-mode cascade
    pub fn test_requires(mut self, reference: impl Into<String>, condition: Condition) -> Self {
        self.requirements.push((reference.into(), condition, false));
        self
    }

    /// Copy `option` onto every link-mode-sensitive dependency when enabled
    pub fn cascade(
        mut self,
        option: impl Into<String>,
        dependency_option: impl Into<String>,
    ) -> Self {
        self.rules.push(OverrideRule::cascade(option, dependency_option));
        self
    }

    /// Set one option on one dependency when `when` holds
    pub fn pin(
        mut self,
        when: Condition,
        package: impl Into<String>,
        option: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Self {
        self.rules.push(OverrideRule::pin(when, package, option, value));
        self
    }

    /// Expose `option` to the build system as `variable`
    pub fn toolchain_var(mut self, variable: impl Into<String>, option: impl Into<String>) -> Self {
        self.toolchain.map(variable, option);
        self
    }

    pub fn artifact(mut self, artifact: ArtifactSpec) -> Self {
        self.artifact = Some(artifact);
        self
    }

    /// Check and assemble the recipe
    pub fn build(self) -> Result<Recipe> {
        let mut registry = OptionRegistry::new();
        for (name, domain, default) in self.options {
            registry.declare(name, domain, default)?;
        }

        let check = |option: &str, context: String| -> Result<()> {
            if registry.contains(option) {
                Ok(())
            } else {
                Err(Error::UndeclaredOption {
                    option: option.to_string(),
                    context,
                })
            }
        };

        let mut conditional = Vec::with_capacity(self.requirements.len());
        for (reference, condition, link_sensitive) in self.requirements {
            let reference = PackageRef::parse(&reference)?;
            for option in condition.options() {
                check(option, format!("requirement {}", reference))?;
            }
            conditional.push(
                RequirementEntry::when(reference, condition).with_link_sensitive(link_sensitive),
            );
        }

        for rule in &self.rules {
            for option in rule.options() {
                check(option, "an override rule".to_string())?;
            }
        }

        for option in self.toolchain.options() {
            check(option, "the toolchain mapping".to_string())?;
        }

        let artifact = self
            .artifact
            .unwrap_or_else(|| ArtifactSpec::fixed([self.name.clone()]));

        Ok(Recipe {
            name: self.name,
            version: self.version,
            package_type: self.package_type,
            validator: Validator::new(self.min_cppstd),
            resolver: DependencyResolver::new(conditional),
            emitter: Emitter::new(Propagator::new(self.rules), self.toolchain, artifact),
            registry,
        })
    }
}
