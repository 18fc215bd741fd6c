//! # Definition and Secret Caches
//!
//! Caches record which external resources were created from which options so
//! that equivalent requests can reuse them.
//!
//! ## Keys
//!
//! Entries are stored under the external resource identifier (task
//! definition ID or secret ID). Definition entries also carry the hash of the
//! options they were registered from, which is what
//! [`PodDefinitionCache::find_by_hash`] looks up:
//!
//! ```text
//! id ──▶ { id, hash, definition_opts }
//!            ▲
//!            └── find_by_hash(opts.hash())
//! ```
//!
//! ## Idempotence
//!
//! `put` replaces an existing entry with the same ID and `delete` of a
//! missing ID succeeds, so callers can retry either freely.
//!
//! Persistent backends report storage failures as [`crate::Error::Cache`].

use crate::error::Result;
use crate::pod::PodDefinitionOptions;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

// =============================================================================
// Items
// =============================================================================

/// A registered pod definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodDefinitionItem {
    /// Task definition identifier.
    pub id: String,
    /// Hash of the validated options the definition was created from.
    pub hash: String,
    /// The options as registered, with secrets referenced by ID.
    pub definition_opts: PodDefinitionOptions,
}

/// A secret created on behalf of a pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretItem {
    /// Secret identifier.
    pub id: String,
    /// Secret name.
    pub name: String,
}

// =============================================================================
// Traits
// =============================================================================

/// Cache of registered pod definitions.
#[async_trait]
pub trait PodDefinitionCache: Send + Sync {
    /// Records a registered definition.
    async fn put(&self, item: PodDefinitionItem) -> Result<()>;

    /// Removes the definition with the given ID, if cached.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Finds a definition registered from options with the given hash.
    async fn find_by_hash(&self, hash: &str) -> Result<Option<PodDefinitionItem>>;
}

/// Cache of secrets created on behalf of pods.
#[async_trait]
pub trait SecretCache: Send + Sync {
    /// Records a created secret.
    async fn put(&self, item: SecretItem) -> Result<()>;

    /// Removes the secret with the given ID, if cached.
    async fn delete(&self, id: &str) -> Result<()>;
}

// =============================================================================
// In-Memory Implementations
// =============================================================================

/// Process-local [`PodDefinitionCache`].
#[derive(Debug, Default)]
pub struct MemoryPodDefinitionCache {
    items: RwLock<HashMap<String, PodDefinitionItem>>,
}

impl MemoryPodDefinitionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the definition cached under `id`.
    pub async fn get(&self, id: &str) -> Option<PodDefinitionItem> {
        self.items.read().await.get(id).cloned()
    }

    /// Number of cached definitions.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl PodDefinitionCache for MemoryPodDefinitionCache {
    async fn put(&self, item: PodDefinitionItem) -> Result<()> {
        debug!(id = %item.id, hash = %item.hash, "caching pod definition");
        self.items.write().await.insert(item.id.clone(), item);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if self.items.write().await.remove(id).is_some() {
            debug!(id, "evicted pod definition");
        }
        Ok(())
    }

    async fn find_by_hash(&self, hash: &str) -> Result<Option<PodDefinitionItem>> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .find(|item| item.hash == hash)
            .cloned())
    }
}

/// Process-local [`SecretCache`].
#[derive(Debug, Default)]
pub struct MemorySecretCache {
    items: RwLock<HashMap<String, SecretItem>>,
}

impl MemorySecretCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the secret cached under `id`.
    pub async fn get(&self, id: &str) -> Option<SecretItem> {
        self.items.read().await.get(id).cloned()
    }

    /// Number of cached secrets.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl SecretCache for MemorySecretCache {
    async fn put(&self, item: SecretItem) -> Result<()> {
        debug!(id = %item.id, name = %item.name, "caching secret");
        self.items.write().await.insert(item.id.clone(), item);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.items.write().await.remove(id);
        Ok(())
    }
}
