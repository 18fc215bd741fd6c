//! Pod lifecycle trait definitions.
//!
//! This module defines the contracts the orchestration layer is consumed
//! through: a single [`Pod`], the [`PodCreator`] that starts pods, the
//! [`PodDefinitionManager`] that deduplicates task definitions, and the
//! [`PodManager`] that ties creation, stopping and deletion together.

use super::EcsPod;
use crate::cache::PodDefinitionItem;
use crate::error::Result;
use crate::pod::{
    PodCreationOptions, PodDefinitionOptions, PodDeletionOptions, PodExecutionOptions,
    PodResources, PodStatusInfo, TaskDefinitionRef,
};
use async_trait::async_trait;

/// A group of containers running as a single task.
///
/// # Ownership
///
/// A pod only tears down what it owns. A task definition or secret whose
/// ownership flag is unset is left in place on [`Pod::delete`], because other
/// pods may still be using it.
#[async_trait]
pub trait Pod: Send + Sync {
    /// External resources backing the pod.
    fn resources(&self) -> &PodResources;

    /// Last known status, without querying the API.
    fn status_info(&self) -> &PodStatusInfo;

    /// Queries the API for the current status and records it.
    ///
    /// # Errors
    ///
    /// - Task not found (see [`crate::Error::is_not_found`])
    async fn latest_status_info(&mut self) -> Result<PodStatusInfo>;

    /// Stops the pod's task. Stopping a stopped pod is a no-op.
    async fn stop(&mut self) -> Result<()>;

    /// Stops the pod and deletes every resource it owns.
    ///
    /// Deleting a deleted pod is a no-op.
    async fn delete(&mut self) -> Result<()>;
}

/// Starts pods.
#[async_trait]
pub trait PodCreator: Send + Sync {
    /// Merges, validates and starts a pod with its own task definition.
    ///
    /// The pod owns the task definition it registers. Nothing is left behind
    /// if any step fails.
    async fn create_pod(&self, opts: &[PodCreationOptions]) -> Result<EcsPod>;

    /// Starts a pod from an already registered task definition.
    async fn create_pod_from_existing_definition(
        &self,
        def: TaskDefinitionRef,
        opts: &[PodExecutionOptions],
    ) -> Result<EcsPod>;
}

/// Registers task definitions, reusing equivalent ones.
#[async_trait]
pub trait PodDefinitionManager: Send + Sync {
    /// Merges and validates `opts`, then returns a cached definition with the
    /// same hash or registers a new one.
    async fn create_pod_definition(&self, opts: &[PodDefinitionOptions])
        -> Result<PodDefinitionItem>;

    /// Deregisters a definition and evicts it from the cache.
    async fn delete_pod_definition(&self, id: &str) -> Result<()>;
}

/// Creates, stops and deletes pods backed by shared definitions.
#[async_trait]
pub trait PodManager: Send + Sync {
    /// Creates a pod, reusing an equivalent task definition if one exists.
    async fn create_pod(&self, opts: &[PodCreationOptions]) -> Result<EcsPod>;

    /// Stops a pod.
    async fn stop_pod(&self, pod: &mut dyn Pod) -> Result<()>;

    /// Deletes a pod and, unless retained, its task definition.
    async fn delete_pod(&self, pod: &mut dyn Pod, opts: &[PodDeletionOptions]) -> Result<()>;
}
