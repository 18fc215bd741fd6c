//! Collaborator interfaces for the orchestration API and the secrets vault.
//!
//! This crate never talks to AWS itself. Callers plug in implementations of
//! [`EcsClient`] and [`SecretVault`] (typically thin wrappers over an AWS SDK
//! client, including whatever retry policy they want). Errors from those
//! implementations should be reported as [`Error::Client`] / [`Error::Vault`],
//! and missing resources as [`Error::NotFound`] so callers can branch on
//! [`Error::is_not_found`].
//!
//! [`Error::Client`]: crate::Error::Client
//! [`Error::Vault`]: crate::Error::Vault
//! [`Error::NotFound`]: crate::Error::NotFound
//! [`Error::is_not_found`]: crate::Error::is_not_found

use crate::error::Result;
use crate::pod::{AwsVpcOptions, PlacementOptions, PodDefinitionOptions, PodExecutionOptions};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

// =============================================================================
// Requests and Responses
// =============================================================================

/// Request to register a task definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterTaskDefinitionRequest {
    /// Task definition family.
    pub family: String,
    /// Validated definition whose secrets all refer to existing IDs.
    pub definition: PodDefinitionOptions,
    /// Tags for the definition, including the cache tag if configured.
    pub tags: HashMap<String, String>,
}

/// Request to run a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTaskRequest {
    /// Task definition to run.
    pub task_definition_id: String,
    /// Cluster to run in.
    pub cluster: Option<String>,
    /// Capacity provider to run on.
    pub capacity_provider: Option<String>,
    /// Placement of the task.
    pub placement: Option<PlacementOptions>,
    /// Network configuration for awsvpc tasks.
    pub awsvpc: Option<AwsVpcOptions>,
    /// Whether to enable command execution in the containers.
    pub enable_execute_command: bool,
    /// Tags for the task.
    pub tags: HashMap<String, String>,
}

impl RunTaskRequest {
    /// Builds a run request for `task_definition_id` from execution options.
    pub fn new(task_definition_id: impl Into<String>, exec: &PodExecutionOptions) -> Self {
        Self {
            task_definition_id: task_definition_id.into(),
            cluster: exec.cluster.clone(),
            capacity_provider: exec.capacity_provider.clone(),
            placement: exec.placement_opts.clone(),
            awsvpc: exec.awsvpc_opts.clone(),
            enable_execute_command: exec.supports_debug_mode.unwrap_or(false),
            tags: exec.tags.clone(),
        }
    }
}

/// Description of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    /// Task identifier.
    pub task_id: String,
    /// Cluster the task runs in.
    pub cluster: Option<String>,
    /// Task definition the task was started from.
    pub task_definition_id: String,
    /// ECS `lastStatus` (e.g. "RUNNING").
    pub last_status: String,
    /// Why the task stopped, if it did.
    pub stopped_reason: Option<String>,
    /// When the task was created.
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Collaborator Traits
// =============================================================================

/// Orchestration API operations used by pods and managers.
#[async_trait]
pub trait EcsClient: Send + Sync {
    /// Registers a task definition and returns its identifier.
    async fn register_task_definition(&self, req: RegisterTaskDefinitionRequest)
        -> Result<String>;

    /// Deregisters a task definition.
    async fn deregister_task_definition(&self, id: &str) -> Result<()>;

    /// Starts a task.
    async fn run_task(&self, req: RunTaskRequest) -> Result<TaskInfo>;

    /// Describes a task.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::NotFound`] if no such task exists
    async fn describe_task(&self, cluster: Option<&str>, task_id: &str) -> Result<TaskInfo>;

    /// Stops a task.
    async fn stop_task(&self, cluster: Option<&str>, task_id: &str, reason: &str) -> Result<()>;
}

/// Secrets vault operations used when creating and deleting pods.
#[async_trait]
pub trait SecretVault: Send + Sync {
    /// Stores a new secret and returns its identifier.
    async fn create_secret(&self, name: &str, value: &str) -> Result<String>;

    /// Deletes a secret. Deleting a missing secret is not an error.
    async fn delete_secret(&self, id: &str) -> Result<()>;
}
