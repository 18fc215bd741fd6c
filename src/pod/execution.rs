//! Execution options: where and how a pod's task is run.

use super::network::AwsVpcOptions;
use crate::constants::{
    DEFAULT_BINPACK_PARAMETER, DEFAULT_PLACEMENT_STRATEGY, DEFAULT_SPREAD_PARAMETER,
    DISTINCT_INSTANCE_FILTER,
};
use crate::error::{Error, Result, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Placement Strategy
// =============================================================================

/// How tasks are assigned to container instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementStrategy {
    /// Spread tasks evenly over the values of the strategy parameter.
    Spread,
    /// Place tasks randomly.
    Random,
    /// Pack tasks onto as few instances as possible (the default).
    Binpack,
}

impl PlacementStrategy {
    /// All placement strategies.
    pub const ALL: [PlacementStrategy; 3] = [Self::Spread, Self::Random, Self::Binpack];

    /// Returns the ECS name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spread => "spread",
            Self::Random => "random",
            Self::Binpack => "binpack",
        }
    }
}

impl fmt::Display for PlacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlacementStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unrecognized placement strategy '{s}'")))
    }
}

// =============================================================================
// Strategy Parameter
// =============================================================================

/// Field a placement strategy operates on.
///
/// Binpack only understands `memory` and `cpu`. Spread accepts `host` or any
/// other instance attribute, which is carried in [`StrategyParameter::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StrategyParameter {
    /// Binpack by available memory.
    Memory,
    /// Binpack by available CPU.
    Cpu,
    /// Spread across container instances.
    Host,
    /// Spread across an arbitrary instance attribute.
    Custom(String),
}

impl StrategyParameter {
    /// Returns the ECS field name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Memory => "memory",
            Self::Cpu => "cpu",
            Self::Host => "host",
            Self::Custom(s) => s,
        }
    }
}

impl From<String> for StrategyParameter {
    fn from(s: String) -> Self {
        match s.as_str() {
            "memory" => Self::Memory,
            "cpu" => Self::Cpu,
            "host" => Self::Host,
            _ => Self::Custom(s),
        }
    }
}

impl From<&str> for StrategyParameter {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<StrategyParameter> for String {
    fn from(p: StrategyParameter) -> Self {
        match p {
            StrategyParameter::Custom(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for StrategyParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Placement Options
// =============================================================================

/// Options controlling how a pod is placed in the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementOptions {
    /// Task group name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Placement strategy. Defaults to binpack.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<PlacementStrategy>,
    /// Field the strategy applies to. Defaults depend on the strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_parameter: Option<StrategyParameter>,
    /// Cluster query expressions restricting candidate instances.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub instance_filters: Vec<String>,
}

impl PlacementOptions {
    /// Creates empty placement options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the group name.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Sets the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: PlacementStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Sets the strategy parameter.
    #[must_use]
    pub fn with_strategy_parameter(mut self, param: impl Into<StrategyParameter>) -> Self {
        self.strategy_parameter = Some(param.into());
        self
    }

    /// Appends instance filters.
    #[must_use]
    pub fn add_instance_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instance_filters
            .extend(filters.into_iter().map(Into::into));
        self
    }

    /// Returns true if each task must land on a different instance.
    pub fn requires_distinct_instances(&self) -> bool {
        self.instance_filters
            .iter()
            .any(|f| f == DISTINCT_INSTANCE_FILTER)
    }

    /// Collects every violation without modifying the options.
    ///
    /// Random placement ignores the strategy parameter, so any value
    /// (including `host`) is accepted with it.
    pub fn check(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        errs.invalid_when(
            self.group.as_deref().is_some_and(str::is_empty),
            "cannot specify an empty group name",
        );
        errs.invalid_when(
            self.instance_filters.iter().any(String::is_empty),
            "cannot specify an empty instance filter",
        );

        let strategy = self.strategy.unwrap_or(DEFAULT_PLACEMENT_STRATEGY);
        if let Some(param) = &self.strategy_parameter {
            match strategy {
                PlacementStrategy::Binpack => errs.invalid_when(
                    !matches!(param, StrategyParameter::Memory | StrategyParameter::Cpu),
                    format!("strategy parameter cannot be '{param}' when the strategy is binpack"),
                ),
                PlacementStrategy::Spread => errs.invalid_when(
                    param.as_str().is_empty(),
                    "cannot specify an empty strategy parameter",
                ),
                PlacementStrategy::Random => {}
            }
        }
        errs
    }

    /// Validates the options and, if valid, fills in the default strategy and
    /// strategy parameter.
    pub fn validate(&mut self) -> Result<()> {
        self.check().into_result()?;
        self.apply_defaults();
        Ok(())
    }

    pub(crate) fn apply_defaults(&mut self) {
        let strategy = *self.strategy.get_or_insert(DEFAULT_PLACEMENT_STRATEGY);
        if self.strategy_parameter.is_none() {
            self.strategy_parameter = match strategy {
                PlacementStrategy::Binpack => Some(DEFAULT_BINPACK_PARAMETER),
                PlacementStrategy::Spread => Some(DEFAULT_SPREAD_PARAMETER),
                PlacementStrategy::Random => None,
            };
        }
    }
}

// =============================================================================
// Execution Options
// =============================================================================

/// Options for running a pod's task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodExecutionOptions {
    /// Cluster to run in. The account's default cluster if omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    /// Capacity provider supplying the compute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_provider: Option<String>,
    /// Placement options. Defaults to binpack by memory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_opts: Option<PlacementOptions>,
    /// Networking for pods in awsvpc mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awsvpc_opts: Option<AwsVpcOptions>,
    /// Whether commands can be executed inside the running containers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_debug_mode: Option<bool>,
    /// Tags attached to the running task.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
}

impl PodExecutionOptions {
    /// Creates empty execution options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cluster.
    #[must_use]
    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    /// Sets the capacity provider.
    #[must_use]
    pub fn with_capacity_provider(mut self, provider: impl Into<String>) -> Self {
        self.capacity_provider = Some(provider.into());
        self
    }

    /// Sets the placement options.
    #[must_use]
    pub fn with_placement_opts(mut self, opts: PlacementOptions) -> Self {
        self.placement_opts = Some(opts);
        self
    }

    /// Sets the AWSVPC options.
    #[must_use]
    pub fn with_awsvpc_opts(mut self, opts: AwsVpcOptions) -> Self {
        self.awsvpc_opts = Some(opts);
        self
    }

    /// Sets whether debug mode is supported.
    #[must_use]
    pub fn with_supports_debug_mode(mut self, supported: bool) -> Self {
        self.supports_debug_mode = Some(supported);
        self
    }

    /// Adds tags, overwriting existing keys.
    #[must_use]
    pub fn add_tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tags
            .extend(tags.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Collects every violation without modifying the options.
    pub fn check(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        errs.invalid_when(
            self.cluster.as_deref().is_some_and(str::is_empty),
            "cannot specify an empty cluster name",
        );
        errs.invalid_when(
            self.capacity_provider.as_deref().is_some_and(str::is_empty),
            "cannot specify an empty capacity provider",
        );
        if let Some(placement) = &self.placement_opts {
            errs.nest("invalid placement options", placement.check());
        }
        if let Some(awsvpc) = &self.awsvpc_opts {
            errs.nest("invalid AWSVPC options", awsvpc.check());
        }
        errs
    }

    /// Validates the options and, if valid, fills in default placement.
    pub fn validate(&mut self) -> Result<()> {
        self.check().into_result()?;
        self.apply_defaults();
        Ok(())
    }

    pub(crate) fn apply_defaults(&mut self) {
        self.placement_opts
            .get_or_insert_with(PlacementOptions::default)
            .apply_defaults();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parameter_string_conversions() {
        assert_eq!(StrategyParameter::from("memory"), StrategyParameter::Memory);
        assert_eq!(StrategyParameter::from("cpu"), StrategyParameter::Cpu);
        assert_eq!(StrategyParameter::from("host"), StrategyParameter::Host);
        assert_eq!(
            StrategyParameter::from("attribute:ecs.availability-zone"),
            StrategyParameter::Custom("attribute:ecs.availability-zone".to_string())
        );
        assert_eq!(String::from(StrategyParameter::Cpu), "cpu");
    }

    #[test]
    fn test_default_placement() {
        let mut opts = PlacementOptions::new();
        opts.validate().unwrap();
        assert_eq!(opts.strategy, Some(PlacementStrategy::Binpack));
        assert_eq!(opts.strategy_parameter, Some(StrategyParameter::Memory));
    }

    #[test]
    fn test_distinct_instance_filter() {
        let opts = PlacementOptions::new().add_instance_filters(["attribute:gpu exists"]);
        assert!(!opts.requires_distinct_instances());
        let opts = opts.add_instance_filters([DISTINCT_INSTANCE_FILTER]);
        assert!(opts.requires_distinct_instances());
    }
}
