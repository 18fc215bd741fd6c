//! Task definition reuse keyed by option hashes.

use super::pod::cleanup_failed_pod;
use super::secrets::resolve_secrets;
use super::traits::PodDefinitionManager;
use crate::cache::{PodDefinitionCache, PodDefinitionItem, SecretCache};
use crate::client::{EcsClient, RegisterTaskDefinitionRequest, SecretVault};
use crate::constants::DEFAULT_CACHE_TAG;
use crate::error::{Result, ResultExt};
use crate::merge::merge_definition_options;
use crate::names::{NameGenerator, RandomNameGenerator};
use crate::pod::PodDefinitionOptions;
use async_trait::async_trait;
use std::sync::Arc;

/// Registers a task definition only when no equivalent one is cached.
///
/// Two requests are equivalent when their validated options hash to the same
/// digest. Names are part of the hash, so requests that leave the pod or
/// container names unset only share a definition if the configured
/// [`NameGenerator`] is deterministic.
pub struct BasicPodDefinitionManager {
    client: Arc<dyn EcsClient>,
    cache: Arc<dyn PodDefinitionCache>,
    vault: Option<Arc<dyn SecretVault>>,
    secret_cache: Option<Arc<dyn SecretCache>>,
    cache_tag: String,
    names: Arc<dyn NameGenerator>,
}

impl BasicPodDefinitionManager {
    /// Creates a manager registering through `client` and deduplicating
    /// against `cache`.
    pub fn new(client: Arc<dyn EcsClient>, cache: Arc<dyn PodDefinitionCache>) -> Self {
        Self {
            client,
            cache,
            vault: None,
            secret_cache: None,
            cache_tag: DEFAULT_CACHE_TAG.to_string(),
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

    /// Sets the tag key the options hash is stored under on registered
    /// definitions.
    #[must_use]
    pub fn with_cache_tag(mut self, tag: impl Into<String>) -> Self {
        self.cache_tag = tag.into();
        self
    }

    /// Sets the generator for default pod and container names.
    #[must_use]
    pub fn with_name_generator(mut self, names: Arc<dyn NameGenerator>) -> Self {
        self.names = names;
        self
    }
}

#[async_trait]
impl PodDefinitionManager for BasicPodDefinitionManager {
    async fn create_pod_definition(
        &self,
        opts: &[PodDefinitionOptions],
    ) -> Result<PodDefinitionItem> {
        let mut merged = merge_definition_options(opts);
        merged.validate_with(self.names.as_ref())?;
        let hash = merged.hash();

        if let Some(item) = self
            .cache
            .find_by_hash(&hash)
            .await
            .context("looking up cached pod definition")?
        {
            tracing::debug!(id = %item.id, hash = %hash, "reusing cached pod definition");
            return Ok(item);
        }

        let secrets = resolve_secrets(
            self.vault.as_deref(),
            self.secret_cache.as_deref(),
            &mut merged,
        )
        .await?;

        let family = merged.name.clone().unwrap_or_default();
        let mut tags = merged.tags.clone();
        tags.insert(self.cache_tag.clone(), hash.clone());
        let registered = self
            .client
            .register_task_definition(RegisterTaskDefinitionRequest {
                family: family.clone(),
                definition: merged.clone(),
                tags,
            })
            .await;
        let id = match registered {
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

        let item = PodDefinitionItem {
            id,
            hash,
            definition_opts: merged,
        };
        if let Err(e) = self.cache.put(item.clone()).await {
            cleanup_failed_pod(
                self.client.as_ref(),
                self.vault.as_deref(),
                self.secret_cache.as_deref(),
                Some(item.id.as_str()),
                &secrets.created,
            )
            .await;
            return Err(e.context(format!("caching task definition '{}'", item.id)));
        }

        tracing::info!(
            id = %item.id,
            family = %family,
            hash = %item.hash,
            "registered pod definition"
        );
        Ok(item)
    }

    async fn delete_pod_definition(&self, id: &str) -> Result<()> {
        match self.client.deregister_task_definition(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(id, "task definition already deregistered");
            }
            Err(e) => return Err(e.context(format!("deregistering task definition '{id}'"))),
        }
        self.cache
            .delete(id)
            .await
            .context(format!("evicting task definition '{id}'"))?;
        tracing::info!(id, "deleted pod definition");
        Ok(())
    }
}
