//! Pod resource and status types.
//!
//! This module defines what a running pod is made of and what state it is in:
//! - `TaskDefinitionRef`: the task definition the pod runs
//! - `PodSecret`: a secret the pod's containers read
//! - `PodResources`: every external resource backing a pod
//! - `PodStatus`: high-level pod lifecycle state
//! - `PodStatusInfo`: a status snapshot

use crate::error::{Result, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Resources
// =============================================================================

/// Reference to a registered task definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinitionRef {
    /// Task definition identifier (ARN or family:revision).
    pub id: String,
    /// Whether the definition is deregistered when the pod is deleted.
    pub owned: bool,
}

impl TaskDefinitionRef {
    /// Creates a reference to a task definition.
    pub fn new(id: impl Into<String>, owned: bool) -> Self {
        Self {
            id: id.into(),
            owned,
        }
    }
}

/// A named secret used by a pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodSecret {
    /// Secret identifier.
    pub id: String,
    /// Secret name, if known.
    pub name: Option<String>,
    /// Whether the secret is deleted when the pod is deleted.
    pub owned: bool,
}

/// External resources backing a pod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodResources {
    /// Identifier of the running task.
    pub task_id: String,
    /// Cluster the task runs in.
    pub cluster: Option<String>,
    /// Task definition the task was started from.
    pub task_definition: Option<TaskDefinitionRef>,
    /// Secrets referenced by the pod's containers.
    pub secrets: Vec<PodSecret>,
}

impl PodResources {
    /// Collects every violation.
    pub fn check(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        errs.invalid_when(self.task_id.is_empty(), "must specify a task ID");
        errs.invalid_when(
            self.task_definition
                .as_ref()
                .is_some_and(|def| def.id.is_empty()),
            "cannot specify an empty task definition ID",
        );
        errs.invalid_when(
            self.secrets.iter().any(|s| s.id.is_empty()),
            "cannot specify a secret with an empty ID",
        );
        errs
    }

    /// Checks that the resources identify a task.
    pub fn validate(&self) -> Result<()> {
        self.check().into_result()
    }

    /// Secrets the pod is responsible for deleting.
    pub fn owned_secrets(&self) -> impl Iterator<Item = &PodSecret> {
        self.secrets.iter().filter(|s| s.owned)
    }
}

// =============================================================================
// Pod Status
// =============================================================================

/// High-level pod lifecycle status.
///
/// ```text
///   Starting ──▶ Running ──▶ Stopping ──▶ Stopped ──▶ Deleted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PodStatus {
    /// Task is provisioning or pulling images.
    #[default]
    Starting,
    /// Task is running.
    Running,
    /// Task is shutting down.
    Stopping,
    /// Task has stopped.
    Stopped,
    /// Pod's owned resources have been cleaned up.
    Deleted,
    /// Status could not be determined.
    Unknown,
}

impl PodStatus {
    /// Maps an ECS task `lastStatus` to a pod status.
    pub fn from_ecs(last_status: &str) -> Self {
        match last_status {
            "PROVISIONING" | "PENDING" | "ACTIVATING" => Self::Starting,
            "RUNNING" => Self::Running,
            "DEACTIVATING" | "STOPPING" | "DEPROVISIONING" => Self::Stopping,
            "STOPPED" => Self::Stopped,
            _ => Self::Unknown,
        }
    }

    /// Returns true once the task can no longer run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Deleted)
    }
}

impl fmt::Display for PodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PodStatus::Starting => write!(f, "starting"),
            PodStatus::Running => write!(f, "running"),
            PodStatus::Stopping => write!(f, "stopping"),
            PodStatus::Stopped => write!(f, "stopped"),
            PodStatus::Deleted => write!(f, "deleted"),
            PodStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Snapshot of a pod's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodStatusInfo {
    /// High-level status.
    pub status: PodStatus,
    /// Why the task stopped, if it did.
    pub stopped_reason: Option<String>,
    /// When the status was observed.
    pub observed_at: chrono::DateTime<chrono::Utc>,
}

impl PodStatusInfo {
    /// Creates a snapshot observed now.
    pub fn now(status: PodStatus) -> Self {
        Self {
            status,
            stopped_reason: None,
            observed_at: chrono::Utc::now(),
        }
    }
}
