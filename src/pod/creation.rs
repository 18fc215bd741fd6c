//! Pod creation and deletion options.

use super::definition::{check_manifest_size, PodDefinitionOptions};
use super::execution::PodExecutionOptions;
use super::network::NetworkMode;
use crate::error::{Result, ValidationErrors};
use crate::names::{NameGenerator, RandomNameGenerator};
use serde::{Deserialize, Serialize};
use std::path::Path;

// =============================================================================
// Creation Options
// =============================================================================

/// Everything needed to create a pod: its definition plus how to run it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodCreationOptions {
    /// Definition of the pod's task.
    #[serde(flatten)]
    pub definition_opts: PodDefinitionOptions,
    /// How the task is run. Defaulted if omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_opts: Option<PodExecutionOptions>,
}

impl PodCreationOptions {
    /// Creates empty creation options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses creation options from YAML (or JSON) bytes.
    ///
    /// Definition fields sit at the top level next to `execution_opts`.
    pub fn from_yaml(yaml: &[u8]) -> Result<Self> {
        check_manifest_size(yaml)?;
        Ok(serde_yaml::from_slice(yaml)?)
    }

    /// Reads and parses creation options from a YAML or JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_yaml(&bytes)
    }

    /// Sets the definition options.
    #[must_use]
    pub fn with_definition_opts(mut self, opts: PodDefinitionOptions) -> Self {
        self.definition_opts = opts;
        self
    }

    /// Sets the execution options.
    #[must_use]
    pub fn with_execution_opts(mut self, opts: PodExecutionOptions) -> Self {
        self.execution_opts = Some(opts);
        self
    }

    /// Collects every violation without modifying the options.
    pub fn check(&self) -> ValidationErrors {
        let mut errs = self.definition_opts.check();
        if let Some(exec) = &self.execution_opts {
            errs.nest("invalid execution options", exec.check());
        }
        self.check_awsvpc(&mut errs);
        errs
    }

    /// AWSVPC parameters must be given exactly when the mode is awsvpc.
    fn check_awsvpc(&self, errs: &mut ValidationErrors) {
        let is_awsvpc = self.definition_opts.network_mode == Some(NetworkMode::AwsVpc);
        let has_awsvpc_opts = self
            .execution_opts
            .as_ref()
            .is_some_and(|e| e.awsvpc_opts.is_some());
        errs.invalid_when(
            is_awsvpc && !has_awsvpc_opts,
            "must specify AWSVPC options when network mode is awsvpc",
        );
        errs.invalid_when(
            !is_awsvpc && has_awsvpc_opts,
            "cannot specify AWSVPC options when network mode is not awsvpc",
        );
    }

    /// Validates the options, generating missing names with random strings.
    pub fn validate(&mut self) -> Result<()> {
        self.validate_with(&RandomNameGenerator)
    }

    /// Validates the options and, only if every check passes, fills in the
    /// definition defaults and default execution options.
    pub fn validate_with(&mut self, names: &dyn NameGenerator) -> Result<()> {
        self.check().into_result()?;
        self.definition_opts.apply_defaults(names);
        self.execution_opts
            .get_or_insert_with(PodExecutionOptions::default)
            .apply_defaults();
        Ok(())
    }

    /// Splits the options into definition and (defaulted) execution options.
    pub fn into_parts(self) -> (PodDefinitionOptions, PodExecutionOptions) {
        (
            self.definition_opts,
            self.execution_opts.unwrap_or_default(),
        )
    }
}

// =============================================================================
// Deletion Options
// =============================================================================

/// Options for deleting a pod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodDeletionOptions {
    /// Keep the pod's task definition registered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retain_definition: Option<bool>,
}

impl PodDeletionOptions {
    /// Creates empty deletion options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the task definition is kept.
    #[must_use]
    pub fn with_retain_definition(mut self, retain: bool) -> Self {
        self.retain_definition = Some(retain);
        self
    }

    /// Returns true if the task definition should be kept.
    pub fn retains_definition(&self) -> bool {
        self.retain_definition.unwrap_or(false)
    }
}
