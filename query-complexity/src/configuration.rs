//! Configuration for complexity limits.
use std::collections::HashMap;

use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigurationError;

/// Complexity limit configuration.
///
/// Field costs are keyed by bare field name, so two unrelated types that share
/// a field name (`User.posts` and `Tag.posts`, say) always share one cost.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ComplexityLimitConfig {
    /// Operations whose complexity is strictly greater than this are rejected.
    pub max_complexity: u64,

    /// Cost of a field that has no entry in `field_costs`.
    #[serde(default = "default_cost")]
    pub default_cost: u64,

    /// Cost overrides by field name.
    #[serde(default)]
    pub field_costs: HashMap<String, u64>,

    /// Introspection fields (`__schema`, `__type`, ...) and everything selected
    /// below them cost nothing.
    #[serde(default = "default_ignore_introspection")]
    pub ignore_introspection: bool,

    /// Log operations over the limit instead of reporting them.
    #[serde(default)]
    pub warn_only: bool,
}

fn default_cost() -> u64 {
    1
}

fn default_ignore_introspection() -> bool {
    true
}

impl ComplexityLimitConfig {
    /// A configuration with the given ceiling and every other option at its default.
    pub fn new(max_complexity: u64) -> Self {
        Self {
            max_complexity,
            default_cost: default_cost(),
            field_costs: HashMap::new(),
            ignore_introspection: default_ignore_introspection(),
            warn_only: false,
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigurationError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The cost settings handed to the calculator.
    pub fn cost_settings(&self) -> CostSettings {
        CostSettings {
            default_cost: self.default_cost,
            field_costs: self.field_costs.clone(),
            ignore_introspection: self.ignore_introspection,
        }
    }
}

/// How individual fields are costed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostSettings {
    pub default_cost: u64,
    pub field_costs: HashMap<String, u64>,
    pub ignore_introspection: bool,
}

impl Default for CostSettings {
    fn default() -> Self {
        Self {
            default_cost: default_cost(),
            field_costs: HashMap::new(),
            ignore_introspection: default_ignore_introspection(),
        }
    }
}

impl CostSettings {
    /// The cost of a single field, not counting its selections.
    pub fn field_cost(&self, field_name: &str) -> u64 {
        self.field_costs
            .get(field_name)
            .copied()
            .unwrap_or(self.default_cost)
    }
}
