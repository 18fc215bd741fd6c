//! Pod creation with per-pod task definitions.
//!
//! ## Atomic Creation
//!
//! Creation runs in two phases. Nothing is started until every input has been
//! merged and validated; once external resources start being created, any
//! failure tears down what was created so far:
//!
//! ```text
//! PHASE 1 (prepare)          PHASE 2 (commit)
//! ─────────────────          ───────────────────────────────────────────
//! merge ─▶ validate ───────▶ secrets ─▶ register definition ─▶ run task
//!                               ▲               │                  │
//!                               └── rollback ◀──┴──── on error ◀───┘
//! ```

use super::pod::{cleanup_failed_pod, EcsPod};
use super::secrets::resolve_secrets;
use super::traits::PodCreator;
use crate::cache::SecretCache;
use crate::client::{EcsClient, RegisterTaskDefinitionRequest, RunTaskRequest, SecretVault};
use crate::error::{Result, ResultExt};
use crate::merge::{merge_creation_options, merge_execution_options};
use crate::names::{NameGenerator, RandomNameGenerator};
use crate::pod::{
    PodCreationOptions, PodExecutionOptions, PodResources, PodStatus, TaskDefinitionRef,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Creates each pod with a task definition of its own.
pub struct BasicPodCreator {
    client: Arc<dyn EcsClient>,
    vault: Option<Arc<dyn SecretVault>>,
    secret_cache: Option<Arc<dyn SecretCache>>,
    names: Arc<dyn NameGenerator>,
}

impl BasicPodCreator {
    /// Creates a pod creator using `client`.
    pub fn new(client: Arc<dyn EcsClient>) -> Self {
        Self {
            client,
            vault: None,
            secret_cache: None,
            names: Arc::new(RandomNameGenerator),
        }
    }

    /// Sets the vault new secrets are stored in.
    #[must_use]
    pub fn with_vault(mut self, vault: Arc<dyn SecretVault>) -> Self {
        self.vault = Some(vault);
        self
    }

    /// Sets the cache created secrets are recorded in.
    #[must_use]
    pub fn with_secret_cache(mut self, cache: Arc<dyn SecretCache>) -> Self {
        self.secret_cache = Some(cache);
        self
    }

    /// Sets the generator for default pod and container names.
    #[must_use]
    pub fn with_name_generator(mut self, names: Arc<dyn NameGenerator>) -> Self {
        self.names = names;
        self
    }

    fn pod(&self, resources: PodResources, status: PodStatus) -> Result<EcsPod> {
        let mut pod = EcsPod::new(Arc::clone(&self.client), resources, status)?;
        if let Some(vault) = &self.vault {
            pod = pod.with_vault(Arc::clone(vault));
        }
        if let Some(cache) = &self.secret_cache {
            pod = pod.with_secret_cache(Arc::clone(cache));
        }
        Ok(pod)
    }
}

#[async_trait]
impl PodCreator for BasicPodCreator {
    async fn create_pod(&self, opts: &[PodCreationOptions]) -> Result<EcsPod> {
        // =====================================================================
        // PHASE 1: PREPARE
        // =====================================================================
        let mut merged = merge_creation_options(opts);
        merged.validate_with(self.names.as_ref())?;
        let (mut def, exec) = merged.into_parts();

        // =====================================================================
        // PHASE 2: COMMIT
        // =====================================================================
        let secrets = resolve_secrets(
            self.vault.as_deref(),
            self.secret_cache.as_deref(),
            &mut def,
        )
        .await?;

        let family = def.name.clone().unwrap_or_default();
        let tags = def.tags.clone();
        let def_id = match self
            .client
            .register_task_definition(RegisterTaskDefinitionRequest {
                family: family.clone(),
                definition: def,
                tags,
            })
            .await
        {
            Ok(id) => id,
            Err(e) => {
                cleanup_failed_pod(
                    self.client.as_ref(),
                    self.vault.as_deref(),
                    self.secret_cache.as_deref(),
                    None,
                    &secrets.created,
                )
                .await;
                return Err(e.context(format!("registering task definition '{family}'")));
            }
        };
        tracing::debug!(family = %family, id = %def_id, "registered task definition");

        let task = match self.client.run_task(RunTaskRequest::new(&def_id, &exec)).await {
            Ok(task) => task,
            Err(e) => {
                cleanup_failed_pod(
                    self.client.as_ref(),
                    self.vault.as_deref(),
                    self.secret_cache.as_deref(),
                    Some(def_id.as_str()),
                    &secrets.created,
                )
                .await;
                return Err(e.context(format!("running task definition '{def_id}'")));
            }
        };

        let resources = PodResources {
            task_id: task.task_id,
            cluster: task.cluster.or(exec.cluster),
            task_definition: Some(TaskDefinitionRef::new(def_id, true)),
            secrets: secrets.secrets,
        };
        tracing::info!(
            task = %resources.task_id,
            family = %family,
            secrets = resources.secrets.len(),
            "pod created"
        );
        self.pod(resources, PodStatus::from_ecs(&task.last_status))
    }

    async fn create_pod_from_existing_definition(
        &self,
        def: TaskDefinitionRef,
        opts: &[PodExecutionOptions],
    ) -> Result<EcsPod> {
        let mut exec = merge_execution_options(opts);
        exec.validate()?;

        let task = self
            .client
            .run_task(RunTaskRequest::new(&def.id, &exec))
            .await
            .context(format!("running task definition '{}'", def.id))?;

        let resources = PodResources {
            task_id: task.task_id,
            cluster: task.cluster.or(exec.cluster),
            task_definition: Some(def),
            secrets: Vec::new(),
        };
        tracing::info!(task = %resources.task_id, "pod created from existing definition");
        self.pod(resources, PodStatus::from_ecs(&task.last_status))
    }
}
