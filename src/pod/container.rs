//! Container definitions and the secrets they reference.

use super::network::PortMapping;
use crate::canonical::{ordered_digests, sorted_entries};
use crate::error::{Result, ValidationErrors};
use crate::hash::DefinitionHasher;
use crate::names::NameGenerator;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Container Definition
// =============================================================================

/// Definition of a single container within a pod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerDefinition {
    /// Container name, unique within the pod. Generated if omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Image reference (required).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Command and arguments. Order is significant.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    /// Working directory inside the container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    /// Hard memory limit in MB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<i32>,
    /// CPU units (1024 = 1 vCPU).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<i32>,
    /// Environment variables.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env_vars: Vec<EnvironmentVariable>,
    /// Credentials for pulling the image from a private repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_creds: Option<RepositoryCredentials>,
    /// Port mappings.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub port_mappings: Vec<PortMapping>,
    /// Log routing for the container's output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_configuration: Option<LogConfiguration>,
}

impl ContainerDefinition {
    /// Creates an empty container definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the container name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the image.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Replaces the command.
    #[must_use]
    pub fn with_command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = command.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Sets the memory limit in MB.
    #[must_use]
    pub fn with_memory_mb(mut self, mem: i32) -> Self {
        self.memory_mb = Some(mem);
        self
    }

    /// Sets the CPU units.
    #[must_use]
    pub fn with_cpu(mut self, cpu: i32) -> Self {
        self.cpu = Some(cpu);
        self
    }

    /// Appends environment variables.
    #[must_use]
    pub fn add_env_vars(mut self, vars: impl IntoIterator<Item = EnvironmentVariable>) -> Self {
        self.env_vars.extend(vars);
        self
    }

    /// Sets the repository credentials.
    #[must_use]
    pub fn with_repo_creds(mut self, creds: RepositoryCredentials) -> Self {
        self.repo_creds = Some(creds);
        self
    }

    /// Appends port mappings.
    #[must_use]
    pub fn add_port_mappings(mut self, mappings: impl IntoIterator<Item = PortMapping>) -> Self {
        self.port_mappings.extend(mappings);
        self
    }

    /// Sets the log configuration.
    #[must_use]
    pub fn with_log_configuration(mut self, config: LogConfiguration) -> Self {
        self.log_configuration = Some(config);
        self
    }

    /// Returns true if the container needs the execution role to read secrets.
    pub fn uses_secrets(&self) -> bool {
        self.repo_creds.is_some() || self.env_vars.iter().any(|ev| ev.secret_opts.is_some())
    }

    /// Collects every violation without modifying the definition.
    pub fn check(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();

        match self.image.as_deref() {
            None => errs.invalid("must specify an image"),
            Some(image) => errs.invalid_when(image.is_empty(), "cannot specify an empty image"),
        }
        errs.invalid_when(
            self.memory_mb.is_some_and(|m| m <= 0),
            "must have positive memory value if non-default",
        );
        errs.invalid_when(
            self.cpu.is_some_and(|c| c <= 0),
            "must have positive CPU value if non-default",
        );

        for ev in &self.env_vars {
            errs.nest(
                format!(
                    "invalid environment variable '{}'",
                    ev.name.as_deref().unwrap_or_default()
                ),
                ev.check(),
            );
        }
        if let Some(creds) = &self.repo_creds {
            errs.nest("invalid repository credentials", creds.check());
        }
        for pm in &self.port_mappings {
            errs.nest("invalid port mapping", pm.check());
        }
        if let Some(log) = &self.log_configuration {
            errs.nest("invalid log configuration", log.check());
        }

        errs
    }

    /// Validates the definition and, only if it is valid, generates a name
    /// when none was given.
    pub fn validate(&mut self, names: &dyn NameGenerator) -> Result<()> {
        self.check().into_result()?;
        self.apply_defaults(names);
        Ok(())
    }

    pub(crate) fn apply_defaults(&mut self, names: &dyn NameGenerator) {
        if self.name.is_none() {
            self.name = Some(names.generate());
        }
    }

    /// Returns the canonical digest of this definition.
    pub fn hash(&self) -> String {
        let mut h = DefinitionHasher::new();
        h.add_str("name", self.name.as_deref());
        h.add_str("image", self.image.as_deref());
        h.add_all("command", &self.command);
        h.add_str("working_dir", self.working_dir.as_deref());
        h.add_int("memory_mb", self.memory_mb);
        h.add_int("cpu", self.cpu);
        h.add_all(
            "env_var",
            ordered_digests(
                &self.env_vars,
                |ev| ev.name.clone(),
                |ev| ev.hash(),
            ),
        );
        if let Some(creds) = &self.repo_creds {
            h.add("repo_creds", creds.hash());
        }
        h.add_all(
            "port_mapping",
            ordered_digests(&self.port_mappings, |pm| pm.sort_key(), |pm| pm.hash()),
        );
        if let Some(log) = &self.log_configuration {
            h.add("log_configuration", log.hash());
        }
        h.finish()
    }
}

// =============================================================================
// Environment Variables
// =============================================================================

/// An environment variable set either to a literal value or to a secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentVariable {
    /// Variable name (required).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Literal value. Mutually exclusive with `secret_opts`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Secret whose value is injected. Mutually exclusive with `value`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_opts: Option<SecretOptions>,
}

impl EnvironmentVariable {
    /// Creates an empty environment variable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the variable name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets a literal value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the secret reference.
    #[must_use]
    pub fn with_secret_opts(mut self, opts: SecretOptions) -> Self {
        self.secret_opts = Some(opts);
        self
    }

    /// Collects every violation.
    pub fn check(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        match self.name.as_deref() {
            None => errs.invalid("must specify a name"),
            Some(name) => errs.invalid_when(name.is_empty(), "cannot specify an empty name"),
        }
        errs.exclusive_when(
            self.value.is_some() && self.secret_opts.is_some(),
            "a value",
            "a secret",
        );
        errs.invalid_when(
            self.value.is_none() && self.secret_opts.is_none(),
            "must specify either a value or a secret",
        );
        if let Some(secret) = &self.secret_opts {
            errs.nest("invalid secret options", secret.check());
        }
        errs
    }

    /// Checks that the environment variable is valid.
    pub fn validate(&self) -> Result<()> {
        self.check().into_result()
    }

    /// Returns the canonical digest of this variable.
    pub fn hash(&self) -> String {
        let mut h = DefinitionHasher::new();
        h.add_str("name", self.name.as_deref());
        h.add_str("value", self.value.as_deref());
        if let Some(secret) = &self.secret_opts {
            h.add("secret_opts", secret.hash());
        }
        h.finish()
    }
}

// =============================================================================
// Secrets
// =============================================================================

/// Reference to a secret: either an existing one or one to be created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretOptions {
    /// Identifier of an existing secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name for a new secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Value of a new secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    /// Whether the secret is deleted along with its pod.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned: Option<bool>,
}

impl SecretOptions {
    /// Creates empty secret options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// References an existing secret.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Names the secret to create.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the value of the secret to create.
    #[must_use]
    pub fn with_new_value(mut self, value: impl Into<String>) -> Self {
        self.new_value = Some(value.into());
        self
    }

    /// Sets whether the pod owns the secret.
    #[must_use]
    pub fn with_owned(mut self, owned: bool) -> Self {
        self.owned = Some(owned);
        self
    }

    /// Collects every violation.
    pub fn check(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        errs.invalid_when(
            self.id.is_none() && self.new_value.is_none(),
            "must specify either an existing secret ID or a new secret value",
        );
        errs.exclusive_when(
            self.id.is_some() && self.new_value.is_some(),
            "an existing secret ID",
            "a new secret value",
        );
        errs.invalid_when(
            self.id.as_deref().is_some_and(str::is_empty),
            "cannot specify an empty secret ID",
        );
        errs.invalid_when(
            self.new_value.is_some() && self.name.as_deref().unwrap_or_default().is_empty(),
            "must specify a name for a new secret",
        );
        errs
    }

    /// Checks that the secret options are valid.
    pub fn validate(&self) -> Result<()> {
        self.check().into_result()
    }

    /// Returns true if the vault must create this secret.
    pub fn needs_creation(&self) -> bool {
        self.id.is_none() && self.new_value.is_some()
    }

    /// Returns the canonical digest of these options.
    pub fn hash(&self) -> String {
        let mut h = DefinitionHasher::new();
        h.add_str("id", self.id.as_deref());
        h.add_str("name", self.name.as_deref());
        h.add_str("new_value", self.new_value.as_deref());
        h.add_bool("owned", self.owned);
        h.finish()
    }
}

// =============================================================================
// Repository Credentials
// =============================================================================

/// Credentials for a private image repository, stored as a secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryCredentials {
    /// Identifier of an existing credentials secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name for a new credentials secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Credentials to store in a new secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_creds: Option<StoredRepositoryCredentials>,
    /// Whether the secret is deleted along with its pod.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned: Option<bool>,
}

impl RepositoryCredentials {
    /// Creates empty repository credentials.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// References an existing credentials secret.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Names the credentials secret to create.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the credentials to store.
    #[must_use]
    pub fn with_new_creds(mut self, creds: StoredRepositoryCredentials) -> Self {
        self.new_creds = Some(creds);
        self
    }

    /// Sets whether the pod owns the secret.
    #[must_use]
    pub fn with_owned(mut self, owned: bool) -> Self {
        self.owned = Some(owned);
        self
    }

    /// Collects every violation.
    pub fn check(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        errs.invalid_when(
            self.id.is_none() && self.new_creds.is_none(),
            "must specify either an existing secret ID or new credentials",
        );
        errs.exclusive_when(
            self.id.is_some() && self.new_creds.is_some(),
            "an existing secret ID",
            "new credentials",
        );
        errs.invalid_when(
            self.id.as_deref().is_some_and(str::is_empty),
            "cannot specify an empty secret ID",
        );
        if let Some(creds) = &self.new_creds {
            errs.invalid_when(
                self.name.as_deref().unwrap_or_default().is_empty(),
                "must specify a name for new credentials",
            );
            errs.nest("invalid new credentials", creds.check());
        }
        errs
    }

    /// Checks that the credentials are valid.
    pub fn validate(&self) -> Result<()> {
        self.check().into_result()
    }

    /// Returns true if the vault must create this secret.
    pub fn needs_creation(&self) -> bool {
        self.id.is_none() && self.new_creds.is_some()
    }

    /// Returns the canonical digest of these credentials.
    pub fn hash(&self) -> String {
        let mut h = DefinitionHasher::new();
        h.add_str("id", self.id.as_deref());
        h.add_str("name", self.name.as_deref());
        if let Some(creds) = &self.new_creds {
            h.add_str("username", creds.username.as_deref());
            h.add_str("password", creds.password.as_deref());
        }
        h.add_bool("owned", self.owned);
        h.finish()
    }
}

/// Username and password for a private repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredRepositoryCredentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl StoredRepositoryCredentials {
    /// Creates credentials from a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Collects every violation.
    pub fn check(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        errs.invalid_when(
            self.username.as_deref().unwrap_or_default().is_empty(),
            "must specify a username",
        );
        errs.invalid_when(
            self.password.as_deref().unwrap_or_default().is_empty(),
            "must specify a password",
        );
        errs
    }

    /// Checks that the credentials are valid.
    pub fn validate(&self) -> Result<()> {
        self.check().into_result()
    }

    /// Encodes the credentials as the JSON document stored in the vault.
    pub fn to_secret_value(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// =============================================================================
// Log Configuration
// =============================================================================

/// Log driver configuration for a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfiguration {
    /// Log driver (e.g. "awslogs").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_driver: Option<String>,
    /// Driver-specific options.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub options: HashMap<String, String>,
}

impl LogConfiguration {
    /// Creates an empty log configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log driver.
    #[must_use]
    pub fn with_log_driver(mut self, driver: impl Into<String>) -> Self {
        self.log_driver = Some(driver.into());
        self
    }

    /// Adds driver options.
    #[must_use]
    pub fn add_options<I, K, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.options
            .extend(options.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Collects every violation.
    pub fn check(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        errs.invalid_when(
            self.log_driver.as_deref().unwrap_or_default().is_empty(),
            "must specify a log driver",
        );
        errs
    }

    /// Checks that the configuration is valid.
    pub fn validate(&self) -> Result<()> {
        self.check().into_result()
    }

    /// Returns the canonical digest of this configuration.
    pub fn hash(&self) -> String {
        let mut h = DefinitionHasher::new();
        h.add_str("log_driver", self.log_driver.as_deref());
        for (k, v) in sorted_entries(&self.options) {
            h.add("option_key", k);
            h.add("option_value", v);
        }
        h.finish()
    }
}
