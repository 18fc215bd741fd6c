//! Networking options: network mode, port mappings and AWSVPC parameters.

use crate::constants::{MAX_PORT, MIN_PORT};
use crate::error::{Error, Result, ValidationErrors};
use crate::hash::DefinitionHasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Network Mode
// =============================================================================

/// Docker networking mode for the containers of a pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    /// Networking disabled; no port mappings allowed.
    None,
    /// Docker's built-in virtual network (the default).
    Bridge,
    /// Containers share the host's network interface.
    Host,
    /// The pod gets its own elastic network interface.
    #[serde(rename = "awsvpc")]
    AwsVpc,
}

impl NetworkMode {
    /// All network modes.
    pub const ALL: [NetworkMode; 4] = [Self::None, Self::Bridge, Self::Host, Self::AwsVpc];

    /// Returns the ECS name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bridge => "bridge",
            Self::Host => "host",
            Self::AwsVpc => "awsvpc",
        }
    }

    /// Returns true if a host port, when given, must equal the container port.
    pub fn requires_matching_ports(&self) -> bool {
        matches!(self, Self::Host | Self::AwsVpc)
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unrecognized network mode '{s}'")))
    }
}

// =============================================================================
// Port Mapping
// =============================================================================

/// Maps a container port to a port on the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortMapping {
    /// Port the container listens on (required).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_port: Option<i32>,
    /// Host port to expose; chosen by ECS if omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_port: Option<i32>,
}

impl PortMapping {
    /// Creates an empty port mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the container port.
    #[must_use]
    pub fn with_container_port(mut self, port: i32) -> Self {
        self.container_port = Some(port);
        self
    }

    /// Sets the host port.
    #[must_use]
    pub fn with_host_port(mut self, port: i32) -> Self {
        self.host_port = Some(port);
        self
    }

    /// Collects every violation without modifying the mapping.
    pub fn check(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        match self.container_port {
            None => errs.invalid("must specify a container port"),
            Some(port) => errs.invalid_when(
                !port_in_range(port),
                format!("container port {port} must be between {MIN_PORT} and {MAX_PORT} (exclusive)"),
            ),
        }
        if let Some(port) = self.host_port {
            errs.invalid_when(
                !port_in_range(port),
                format!("host port {port} must be between {MIN_PORT} and {MAX_PORT} (exclusive)"),
            );
        }
        errs
    }

    /// Checks that the port mapping is valid.
    pub fn validate(&self) -> Result<()> {
        self.check().into_result()
    }

    /// Returns the canonical digest of this mapping.
    pub fn hash(&self) -> String {
        let mut h = DefinitionHasher::new();
        h.add_int("container_port", self.container_port);
        h.add_int("host_port", self.host_port);
        h.finish()
    }

    /// Sort key used when hashing a list of mappings.
    pub(crate) fn sort_key(&self) -> (Option<i32>, Option<i32>) {
        (self.container_port, self.host_port)
    }
}

fn port_in_range(port: i32) -> bool {
    port > MIN_PORT && port < MAX_PORT
}

// =============================================================================
// AWSVPC Options
// =============================================================================

/// Network configuration required by pods using the awsvpc network mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsVpcOptions {
    /// Subnets the pod's network interface may be placed in (at least one).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<String>,
    /// Security groups for the pod's network interface.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_groups: Vec<String>,
}

impl AwsVpcOptions {
    /// Creates empty AWSVPC options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends subnets.
    #[must_use]
    pub fn add_subnets<I, S>(mut self, subnets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subnets.extend(subnets.into_iter().map(Into::into));
        self
    }

    /// Appends security groups.
    #[must_use]
    pub fn add_security_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.security_groups
            .extend(groups.into_iter().map(Into::into));
        self
    }

    /// Collects every violation without modifying the options.
    pub fn check(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        errs.invalid_when(self.subnets.is_empty(), "must specify at least one subnet");
        errs.invalid_when(
            self.subnets.iter().any(String::is_empty),
            "cannot specify an empty subnet",
        );
        errs.invalid_when(
            self.security_groups.iter().any(String::is_empty),
            "cannot specify an empty security group",
        );
        errs
    }

    /// Checks that the options are valid.
    pub fn validate(&self) -> Result<()> {
        self.check().into_result()
    }
}
