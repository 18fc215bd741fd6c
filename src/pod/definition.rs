//! Pod definition options.
//!
//! A [`PodDefinitionOptions`] describes everything needed to register a task
//! definition: the containers, their resources and networking, and the roles
//! they run under. Two validated options values with the same
//! [`PodDefinitionOptions::hash`] describe the same task definition, which is
//! what lets a definition be registered once and reused.
//!
//! # Supported Formats
//!
//! - **YAML**: parsed via `serde_yaml`
//! - **JSON**: also supported (YAML is a superset of JSON)

use super::container::ContainerDefinition;
use super::network::NetworkMode;
use crate::canonical::{ordered_digests, tag_digests};
use crate::constants::{DEFAULT_NETWORK_MODE, MAX_MANIFEST_SIZE};
use crate::error::{Error, Result, ValidationErrors};
use crate::hash::DefinitionHasher;
use crate::names::{NameGenerator, RandomNameGenerator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Options describing a pod's task definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodDefinitionOptions {
    /// Friendly name of the definition. Generated if omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Containers in the pod (at least one).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub container_definitions: Vec<ContainerDefinition>,
    /// Memory in MB shared by all containers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<i32>,
    /// CPU units shared by all containers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<i32>,
    /// Networking mode. Defaults to bridge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<NetworkMode>,
    /// Role the containers assume when calling AWS APIs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_role: Option<String>,
    /// Role ECS assumes to pull images and read secrets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_role: Option<String>,
    /// Tags attached to the registered definition.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
}

impl PodDefinitionOptions {
    /// Creates empty definition options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses definition options from YAML (or JSON) bytes.
    ///
    /// The result is not validated.
    ///
    /// # Errors
    ///
    /// - Size exceeds `MAX_MANIFEST_SIZE`
    /// - YAML parsing fails
    pub fn from_yaml(yaml: &[u8]) -> Result<Self> {
        check_manifest_size(yaml)?;
        Ok(serde_yaml::from_slice(yaml)?)
    }

    /// Reads and parses definition options from a YAML or JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_yaml(&bytes)
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends container definitions.
    #[must_use]
    pub fn add_container_definitions(
        mut self,
        defs: impl IntoIterator<Item = ContainerDefinition>,
    ) -> Self {
        self.container_definitions.extend(defs);
        self
    }

    /// Sets the pod-level memory in MB.
    #[must_use]
    pub fn with_memory_mb(mut self, mem: i32) -> Self {
        self.memory_mb = Some(mem);
        self
    }

    /// Sets the pod-level CPU units.
    #[must_use]
    pub fn with_cpu(mut self, cpu: i32) -> Self {
        self.cpu = Some(cpu);
        self
    }

    /// Sets the network mode.
    #[must_use]
    pub fn with_network_mode(mut self, mode: NetworkMode) -> Self {
        self.network_mode = Some(mode);
        self
    }

    /// Sets the task role.
    #[must_use]
    pub fn with_task_role(mut self, role: impl Into<String>) -> Self {
        self.task_role = Some(role.into());
        self
    }

    /// Sets the execution role.
    #[must_use]
    pub fn with_execution_role(mut self, role: impl Into<String>) -> Self {
        self.execution_role = Some(role.into());
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

    /// Returns true if any container references a secret.
    pub fn uses_secrets(&self) -> bool {
        self.container_definitions
            .iter()
            .any(ContainerDefinition::uses_secrets)
    }

    /// Collects every violation without modifying the options.
    ///
    /// Per-container problems are labelled with the container's name (or its
    /// position when unnamed). Resource totals and network-mode port rules
    /// are only checked once every container is individually valid.
    pub fn check(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();

        errs.invalid_when(
            self.name.as_deref().is_some_and(str::is_empty),
            "cannot specify an empty name",
        );
        errs.invalid_when(
            self.memory_mb.is_some_and(|m| m <= 0),
            "must have positive memory value if non-default",
        );
        errs.invalid_when(
            self.cpu.is_some_and(|c| c <= 0),
            "must have positive CPU value if non-default",
        );
        errs.invalid_when(
            self.task_role.as_deref().is_some_and(str::is_empty),
            "cannot specify an empty task role",
        );
        errs.invalid_when(
            self.execution_role.as_deref().is_some_and(str::is_empty),
            "cannot specify an empty execution role",
        );
        errs.invalid_when(
            self.execution_role.is_none() && self.uses_secrets(),
            "must specify an execution role when containers use secrets",
        );

        if self.container_definitions.is_empty() {
            errs.invalid("must specify at least one container definition");
            return errs;
        }

        let mut containers_valid = true;
        for (i, def) in self.container_definitions.iter().enumerate() {
            let def_errs = def.check();
            containers_valid &= def_errs.is_empty();
            errs.nest(
                format!("invalid container definition '{}'", container_label(def, i)),
                def_errs,
            );
        }
        if !containers_valid {
            return errs;
        }

        self.check_resources(&mut errs);
        self.check_port_mappings(&mut errs);

        errs
    }

    fn check_resources(&self, errs: &mut ValidationErrors) {
        let mut total_mem: i64 = 0;
        let mut total_cpu: i64 = 0;
        for (i, def) in self.container_definitions.iter().enumerate() {
            match def.memory_mb {
                Some(m) => total_mem += i64::from(m),
                None => errs.invalid_when(
                    self.memory_mb.is_none(),
                    format!(
                        "container '{}' must specify memory when pod-level memory is not set",
                        container_label(def, i)
                    ),
                ),
            }
            match def.cpu {
                Some(c) => total_cpu += i64::from(c),
                None => errs.invalid_when(
                    self.cpu.is_none(),
                    format!(
                        "container '{}' must specify CPU when pod-level CPU is not set",
                        container_label(def, i)
                    ),
                ),
            }
        }

        if let Some(mem) = self.memory_mb.filter(|m| *m > 0) {
            errs.invalid_when(
                total_mem > i64::from(mem),
                format!(
                    "total memory requested by containers ({total_mem} MB) exceeds the pod memory ({mem} MB)"
                ),
            );
        }
        if let Some(cpu) = self.cpu.filter(|c| *c > 0) {
            errs.invalid_when(
                total_cpu > i64::from(cpu),
                format!(
                    "total CPU requested by containers ({total_cpu} units) exceeds the pod CPU ({cpu} units)"
                ),
            );
        }
    }

    fn check_port_mappings(&self, errs: &mut ValidationErrors) {
        let Some(mode) = self.network_mode else {
            return;
        };
        for (i, def) in self.container_definitions.iter().enumerate() {
            if def.port_mappings.is_empty() {
                continue;
            }
            if mode == NetworkMode::None {
                errs.invalid(format!(
                    "container '{}' cannot specify port mappings because networking is disabled",
                    container_label(def, i)
                ));
                continue;
            }
            if !mode.requires_matching_ports() {
                continue;
            }
            for pm in &def.port_mappings {
                if let (Some(host), Some(container)) = (pm.host_port, pm.container_port) {
                    errs.invalid_when(
                        host != container,
                        format!(
                            "container '{}' host port {host} must equal container port {container} in network mode '{mode}'",
                            container_label(def, i)
                        ),
                    );
                }
            }
        }
    }

    /// Validates the options, generating missing names with random strings.
    ///
    /// See [`validate_with`](Self::validate_with).
    pub fn validate(&mut self) -> Result<()> {
        self.validate_with(&RandomNameGenerator)
    }

    /// Validates the options and, only if every check passes, fills in
    /// defaults: a generated pod name, generated container names, and the
    /// default network mode.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] carrying every violation found.
    pub fn validate_with(&mut self, names: &dyn NameGenerator) -> Result<()> {
        self.check().into_result()?;
        self.apply_defaults(names);
        Ok(())
    }

    pub(crate) fn apply_defaults(&mut self, names: &dyn NameGenerator) {
        if self.name.is_none() {
            self.name = Some(names.generate());
        }
        for def in &mut self.container_definitions {
            def.apply_defaults(names);
        }
        if self.network_mode.is_none() {
            self.network_mode = Some(DEFAULT_NETWORK_MODE);
        }
    }

    /// Returns the canonical digest of these options.
    ///
    /// The digest ignores the order of containers, tags, environment
    /// variables and port mappings, but not the order of command arguments.
    /// It is meant to be computed on validated options.
    pub fn hash(&self) -> String {
        let mut h = DefinitionHasher::new();
        h.add_str("name", self.name.as_deref());
        h.add_all(
            "container_definition",
            ordered_digests(
                &self.container_definitions,
                |def| def.name.clone(),
                |def| def.hash(),
            ),
        );
        h.add_int("memory_mb", self.memory_mb);
        h.add_int("cpu", self.cpu);
        h.add_str("network_mode", self.network_mode.map(|m| m.as_str()));
        h.add_str("task_role", self.task_role.as_deref());
        h.add_str("execution_role", self.execution_role.as_deref());
        h.add_all("tag", tag_digests(&self.tags));
        h.finish()
    }
}

/// Label used for a container in error messages.
fn container_label(def: &ContainerDefinition, index: usize) -> String {
    match def.name.as_deref() {
        Some(name) => name.to_string(),
        None => format!("#{index}"),
    }
}

pub(crate) fn check_manifest_size(bytes: &[u8]) -> Result<()> {
    if bytes.len() > MAX_MANIFEST_SIZE {
        return Err(Error::InvalidInput(format!(
            "manifest size {} exceeds limit of {}",
            bytes.len(),
            MAX_MANIFEST_SIZE
        )));
    }
    Ok(())
}
