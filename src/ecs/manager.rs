//! Pod management on top of shared task definitions.

use super::pod::EcsPod;
use super::secrets::referenced_secrets;
use super::traits::{Pod, PodDefinitionManager, PodManager};
use crate::client::{EcsClient, RunTaskRequest};
use crate::error::{Result, ResultExt};
use crate::merge::{merge_creation_options, merge_deletion_options};
use crate::names::{NameGenerator, RandomNameGenerator};
use crate::pod::{
    PodCreationOptions, PodDeletionOptions, PodResources, PodSecret, PodStatus, TaskDefinitionRef,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Creates pods from definitions obtained through a [`PodDefinitionManager`].
///
/// Pods created here never own their task definition or secrets: both may be
/// shared with other pods. Deleting a pod through [`PodManager::delete_pod`]
/// deletes its definition through the definition manager unless
/// [`PodDeletionOptions::retain_definition`] is set.
pub struct BasicPodManager {
    client: Arc<dyn EcsClient>,
    definitions: Arc<dyn PodDefinitionManager>,
    names: Arc<dyn NameGenerator>,
}

impl BasicPodManager {
    /// Creates a pod manager.
    pub fn new(client: Arc<dyn EcsClient>, definitions: Arc<dyn PodDefinitionManager>) -> Self {
        Self {
            client,
            definitions,
            names: Arc::new(RandomNameGenerator),
        }
    }

    /// Sets the generator for default pod and container names.
    #[must_use]
    pub fn with_name_generator(mut self, names: Arc<dyn NameGenerator>) -> Self {
        self.names = names;
        self
    }
}

#[async_trait]
impl PodManager for BasicPodManager {
    async fn create_pod(&self, opts: &[PodCreationOptions]) -> Result<EcsPod> {
        let mut merged = merge_creation_options(opts);
        merged.validate_with(self.names.as_ref())?;
        let (def, exec) = merged.into_parts();

        let item = self.definitions.create_pod_definition(&[def]).await?;

        let task = self
            .client
            .run_task(RunTaskRequest::new(&item.id, &exec))
            .await
            .context(format!("running task definition '{}'", item.id))?;

        let secrets = referenced_secrets(&item.definition_opts)
            .into_iter()
            .map(|s| PodSecret { owned: false, ..s })
            .collect();
        let resources = PodResources {
            task_id: task.task_id,
            cluster: task.cluster.or(exec.cluster),
            task_definition: Some(TaskDefinitionRef::new(item.id, false)),
            secrets,
        };
        tracing::info!(
            task = %resources.task_id,
            hash = %item.hash,
            "pod created from shared definition"
        );
        EcsPod::new(
            Arc::clone(&self.client),
            resources,
            PodStatus::from_ecs(&task.last_status),
        )
    }

    async fn stop_pod(&self, pod: &mut dyn Pod) -> Result<()> {
        pod.stop().await
    }

    async fn delete_pod(&self, pod: &mut dyn Pod, opts: &[PodDeletionOptions]) -> Result<()> {
        let del = merge_deletion_options(opts);
        pod.delete().await?;

        if del.retains_definition() {
            return Ok(());
        }
        if let Some(def) = pod.resources().task_definition.clone() {
            self.definitions.delete_pod_definition(&def.id).await?;
        }
        Ok(())
    }
}
