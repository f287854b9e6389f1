//! Dependency option propagation
//!
//! Records option values onto resolved dependencies. Two kinds of recipe
//! rules exist and are applied independently of each other:
//!
//! - a cascade copies an enabled option (e.g. `shared`) onto every
//!   link-mode-sensitive dependency, so the whole closure links the same way
//! - a pin sets one option on one dependency when a condition holds
//!   (e.g. `sentry-native:backend=inproc` when `sentry` is enabled)
//!
//! Caller-scoped overrides are applied after the recipe rules. They may set
//! dependency options the recipe leaves alone, or repeat a value a rule
//! already chose, but never contradict one. Every recorded override must
//! target a resolved dependency.

use crate::error::{Error, Result};
use crate::types::{Condition, RequirementSet};
use recipe_config::{ConfigurationState, DependencyOverrides, OptionValue};
use tracing::{debug, warn};

/// Recipe rule deriving dependency options from the recipe's own options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideRule {
    /// When `option` is enabled, set `dependency_option` to the same value
    /// on every link-mode-sensitive dependency
    Cascade {
        option: String,
        dependency_option: String,
    },
    /// When `when` holds, set `option` on `package`
    Pin {
        when: Condition,
        package: String,
        option: String,
        value: OptionValue,
    },
}

impl OverrideRule {
    pub fn cascade(option: impl Into<String>, dependency_option: impl Into<String>) -> Self {
        OverrideRule::Cascade {
            option: option.into(),
            dependency_option: dependency_option.into(),
        }
    }

    pub fn pin(
        when: Condition,
        package: impl Into<String>,
        option: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Self {
        OverrideRule::Pin {
            when,
            package: package.into(),
            option: option.into(),
            value: value.into(),
        }
    }

    /// Options of the recipe this rule reads
    pub fn options(&self) -> Vec<&str> {
        match self {
            OverrideRule::Cascade { option, .. } => vec![option.as_str()],
            OverrideRule::Pin { when, .. } => when.options(),
        }
    }

    /// Assignments this rule makes for the given state and requirements
    fn assignments(
        &self,
        state: &ConfigurationState,
        requirements: &RequirementSet,
    ) -> Result<Vec<(String, String, OptionValue)>> {
        match self {
            OverrideRule::Cascade {
                option,
                dependency_option,
            } => {
                let value = state.value(option).ok_or_else(|| Error::UndeclaredOption {
                    option: option.clone(),
                    context: format!("the {} cascade", dependency_option),
                })?;
                if !value.is_truthy() {
                    return Ok(Vec::new());
                }
                Ok(requirements
                    .iter()
                    .filter(|r| r.link_sensitive)
                    .map(|r| {
                        (
                            r.reference.name.clone(),
                            dependency_option.clone(),
                            value.clone(),
                        )
                    })
                    .collect())
            }
            OverrideRule::Pin {
                when,
                package,
                option,
                value,
            } => {
                if !when.evaluate(state)? {
                    return Ok(Vec::new());
                }
                Ok(vec![(package.clone(), option.clone(), value.clone())])
            }
        }
    }
}

/// Applies override rules and caller overrides to a state
#[derive(Debug, Clone, Default)]
pub struct Propagator {
    rules: Vec<OverrideRule>,
}

impl Propagator {
    pub fn new(rules: Vec<OverrideRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[OverrideRule] {
        &self.rules
    }

    /// Record all overrides onto `state`
    pub fn apply(
        &self,
        state: &mut ConfigurationState,
        requirements: &RequirementSet,
    ) -> Result<()> {
        for rule in &self.rules {
            for (package, option, value) in rule.assignments(state, requirements)? {
                if let Some(first) = state.dependency_option(&package, &option) {
                    if *first != value {
                        return Err(Error::ConflictingOverride {
                            first: first.to_string(),
                            second: value.to_string(),
                            package,
                            option,
                        });
                    }
                }
                debug!("Propagating {}:{}={}", package, option, value);
                state.record_override(package, option, value);
            }
        }

        let recipe_assigned = state.dependency_options().clone();
        let scoped = state.scoped_overrides().to_vec();
        for entry in scoped {
            if entry.is_literal() {
                record_caller(
                    state,
                    &recipe_assigned,
                    &entry.pattern,
                    &entry.option,
                    &entry.value,
                )?;
                continue;
            }

            let matched: Vec<String> = requirements
                .names()
                .filter(|name| entry.matches(name))
                .map(str::to_string)
                .collect();
            if matched.is_empty() {
                warn!(
                    "Override {}:{} matches no required package",
                    entry.pattern, entry.option
                );
            }
            for package in matched {
                record_caller(state, &recipe_assigned, &package, &entry.option, &entry.value)?;
            }
        }

        check_targets(state, requirements)
    }
}

/// Record a caller override; it may not contradict a recipe rule
fn record_caller(
    state: &mut ConfigurationState,
    recipe_assigned: &DependencyOverrides,
    package: &str,
    option: &str,
    value: &OptionValue,
) -> Result<()> {
    if let Some(first) = recipe_assigned
        .get(package)
        .and_then(|options| options.get(option))
    {
        if first != value {
            return Err(Error::ConflictingOverride {
                package: package.to_string(),
                option: option.to_string(),
                first: first.to_string(),
                second: value.to_string(),
            });
        }
    }
    debug!("Caller override {}:{}={}", package, option, value);
    state.record_override(package, option, value.clone());
    Ok(())
}

/// Every recorded override must target a resolved dependency
pub fn check_targets(state: &ConfigurationState, requirements: &RequirementSet) -> Result<()> {
    for (package, options) in state.dependency_options() {
        if !requirements.contains(package) {
            let option = options.keys().next().cloned().unwrap_or_default();
            return Err(Error::Propagation {
                package: package.clone(),
                option,
            });
        }
    }
    Ok(())
}
