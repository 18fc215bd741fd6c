//! A pod backed by a single ECS task.

use super::secrets::rollback_secrets;
use super::traits::Pod;
use crate::cache::SecretCache;
use crate::client::{EcsClient, SecretVault};
use crate::constants::STOP_REASON;
use crate::error::{Error, Result, ResultExt};
use crate::pod::{PodResources, PodStatus, PodStatusInfo};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A pod running as one ECS task.
///
/// Created by a [`super::PodCreator`] or [`super::PodManager`]; can also be
/// rebuilt from stored [`PodResources`] with [`EcsPod::new`].
pub struct EcsPod {
    client: Arc<dyn EcsClient>,
    vault: Option<Arc<dyn SecretVault>>,
    secret_cache: Option<Arc<dyn SecretCache>>,
    resources: PodResources,
    status_info: PodStatusInfo,
}

impl EcsPod {
    /// Creates a handle for an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `resources` do not identify a task.
    pub fn new(
        client: Arc<dyn EcsClient>,
        resources: PodResources,
        status: PodStatus,
    ) -> Result<Self> {
        resources.validate()?;
        Ok(Self {
            client,
            vault: None,
            secret_cache: None,
            resources,
            status_info: PodStatusInfo::now(status),
        })
    }

    /// Sets the vault owned secrets are deleted from.
    #[must_use]
    pub fn with_vault(mut self, vault: Arc<dyn SecretVault>) -> Self {
        self.vault = Some(vault);
        self
    }

    /// Sets the cache deleted secrets are evicted from.
    #[must_use]
    pub fn with_secret_cache(mut self, cache: Arc<dyn SecretCache>) -> Self {
        self.secret_cache = Some(cache);
        self
    }

    /// Identifier of the pod's task.
    pub fn task_id(&self) -> &str {
        &self.resources.task_id
    }

    fn set_status(&mut self, status: PodStatus) {
        let stopped_reason = self.status_info.stopped_reason.take();
        self.status_info = PodStatusInfo {
            stopped_reason,
            ..PodStatusInfo::now(status)
        };
    }

    async fn delete_owned_secrets(&self) -> Result<()> {
        let owned: Vec<String> = self
            .resources
            .owned_secrets()
            .map(|s| s.id.clone())
            .collect();
        if owned.is_empty() {
            return Ok(());
        }

        let vault = self.vault.as_deref().ok_or_else(|| Error::InvalidState {
            id: self.resources.task_id.clone(),
            state: self.status_info.status.to_string(),
            operation: "delete owned secrets of".to_string(),
        })?;
        for id in &owned {
            vault
                .delete_secret(id)
                .await
                .context(format!("deleting secret '{id}'"))?;
            if let Some(cache) = self.secret_cache.as_deref() {
                cache.delete(id).await?;
            }
        }
        tracing::debug!(task = %self.resources.task_id, secrets = owned.len(), "deleted owned secrets");
        Ok(())
    }
}

impl fmt::Debug for EcsPod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcsPod")
            .field("resources", &self.resources)
            .field("status_info", &self.status_info)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Pod for EcsPod {
    fn resources(&self) -> &PodResources {
        &self.resources
    }

    fn status_info(&self) -> &PodStatusInfo {
        &self.status_info
    }

    async fn latest_status_info(&mut self) -> Result<PodStatusInfo> {
        let task = self
            .client
            .describe_task(self.resources.cluster.as_deref(), &self.resources.task_id)
            .await
            .context(format!("describing task '{}'", self.resources.task_id))?;

        // A deleted pod stays deleted even though the task is still described.
        if self.status_info.status != PodStatus::Deleted {
            self.status_info = PodStatusInfo {
                stopped_reason: task.stopped_reason,
                ..PodStatusInfo::now(PodStatus::from_ecs(&task.last_status))
            };
        }
        Ok(self.status_info.clone())
    }

    async fn stop(&mut self) -> Result<()> {
        if self.status_info.status.is_terminal() {
            return Ok(());
        }

        let cluster = self.resources.cluster.as_deref();
        match self
            .client
            .stop_task(cluster, &self.resources.task_id, STOP_REASON)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(task = %self.resources.task_id, "task already gone");
            }
            Err(e) => return Err(e.context(format!("stopping task '{}'", self.resources.task_id))),
        }

        self.status_info = PodStatusInfo {
            stopped_reason: Some(STOP_REASON.to_string()),
            ..PodStatusInfo::now(PodStatus::Stopped)
        };
        tracing::info!(task = %self.resources.task_id, "pod stopped");
        Ok(())
    }

    async fn delete(&mut self) -> Result<()> {
        if self.status_info.status == PodStatus::Deleted {
            return Ok(());
        }

        self.stop().await?;

        if let Some(def) = self.resources.task_definition.as_ref().filter(|d| d.owned) {
            match self.client.deregister_task_definition(&def.id).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    return Err(e.context(format!("deregistering task definition '{}'", def.id)))
                }
            }
        }

        self.delete_owned_secrets().await?;

        self.set_status(PodStatus::Deleted);
        tracing::info!(task = %self.resources.task_id, "pod deleted");
        Ok(())
    }
}

/// Best-effort teardown of a pod that failed to start.
pub(crate) async fn cleanup_failed_pod(
    client: &dyn EcsClient,
    vault: Option<&dyn SecretVault>,
    cache: Option<&dyn SecretCache>,
    task_definition_id: Option<&str>,
    created_secrets: &[String],
) {
    if let Some(id) = task_definition_id {
        if let Err(e) = client.deregister_task_definition(id).await {
            tracing::warn!(id, error = %e, "failed to deregister task definition after failed start");
        }
    }
    if let Some(vault) = vault {
        rollback_secrets(vault, cache, created_secrets).await;
    }
}
