//! # ecspod
//!
//! **Pod Definitions for Amazon ECS**
//!
//! This crate models a pod (a group of containers run as one ECS task) as a
//! set of plain option structs, and provides the core every pod operation is
//! built on: layered merging, aggregate validation with default injection,
//! and canonical content hashing used to reuse equivalent task definitions.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                             ecspod                                  │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────────┐    │
//! │  │              PodCreator / PodManager Traits                 │    │
//! │  │   create_pod(opts) → stop() → delete()   latest_status()    │    │
//! │  └─────────────────────────────────────────────────────────────┘    │
//! │                              │                                      │
//! │  ┌───────────────────────────┼───────────────────────────────┐      │
//! │  │                  Options Pipeline                         │      │
//! │  │  merge_all → validate (check + defaults) → hash           │      │
//! │  │  Every violation reported │ Order-insensitive digests     │      │
//! │  └───────────────────────────┼───────────────────────────────┘      │
//! │                              │                                      │
//! │  ┌───────────────────────────┼───────────────────────────────┐      │
//! │  │                Definition Reuse                           │      │
//! │  │  hash ──▶ PodDefinitionCache ──hit──▶ existing definition │      │
//! │  │                  └──miss──▶ secrets → register → cache    │      │
//! │  └───────────────────────────────────────────────────────────┘      │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                       Collaborators                                 │
//! │      ┌──────────────┐     ┌──────────────┐    ┌──────────────┐      │
//! │      │  EcsClient   │     │ SecretVault  │    │   Caches     │      │
//! │      │ register/run │     │ create/delete│    │ put/find/del │      │
//! │      └──────────────┘     └──────────────┘    └──────────────┘      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Pod Lifecycle
//!
//! ```text
//!   ┌──────────┐  run   ┌─────────┐       ┌──────────┐  stop  ┌─────────┐
//!   │ Starting │ ─────► │ Running │ ────► │ Stopping │ ─────► │ Stopped │
//!   └──────────┘        └─────────┘       └──────────┘        └────┬────┘
//!                                                                  │ delete
//!                                                                  ▼
//!                                                             ┌─────────┐
//!                                                             │ Deleted │
//!                                                             └─────────┘
//! ```
//!
//! # Hashing
//!
//! [`PodDefinitionOptions::hash`] is a SHA-256 digest over labelled,
//! length-prefixed fields. Unordered collections (containers, port mappings,
//! tags, ...) are hashed element-wise and fed in a canonical order, so
//! options that differ only in the order of such collections hash equally.
//! Ordered data, such as a container's command, keeps its order.
//!
//! # Example
//!
//! ```rust,ignore
//! use ecspod::{
//!     BasicPodDefinitionManager, ContainerDefinition, MemoryPodDefinitionCache,
//!     PodDefinitionManager, PodDefinitionOptions,
//! };
//! use std::sync::Arc;
//!
//! async fn register(client: Arc<dyn ecspod::EcsClient>) -> ecspod::Result<()> {
//!     let cache = Arc::new(MemoryPodDefinitionCache::new());
//!     let manager = BasicPodDefinitionManager::new(client, cache);
//!
//!     let opts = PodDefinitionOptions::new()
//!         .with_name("web")
//!         .add_container_definitions([ContainerDefinition::new()
//!             .with_name("nginx")
//!             .with_image("nginx:1.25")])
//!         .with_memory_mb(512)
//!         .with_cpu(256);
//!
//!     // Registers once; the second call is answered from the cache.
//!     let first = manager.create_pod_definition(&[opts.clone()]).await?;
//!     let second = manager.create_pod_definition(&[opts]).await?;
//!     assert_eq!(first.id, second.id);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod canonical;
pub mod client;
pub mod constants;
pub mod ecs;
pub mod error;
pub mod hash;
pub mod merge;
pub mod names;
pub mod pod;

// Re-exports
pub use cache::{
    MemoryPodDefinitionCache, MemorySecretCache, PodDefinitionCache, PodDefinitionItem,
    SecretCache, SecretItem,
};
pub use client::{EcsClient, RegisterTaskDefinitionRequest, RunTaskRequest, SecretVault, TaskInfo};
pub use constants::*;
pub use ecs::{
    BasicPodCreator, BasicPodDefinitionManager, BasicPodManager, EcsPod, Pod, PodCreator,
    PodDefinitionManager, PodManager,
};
pub use error::{Error, Result, ResultExt, ValidationError, ValidationErrors};
pub use hash::DefinitionHasher;
pub use merge::{
    merge_all, merge_creation_options, merge_definition_options, merge_deletion_options,
    merge_execution_options, Merge,
};
pub use names::{NameGenerator, RandomNameGenerator, SequentialNameGenerator};
pub use pod::{
    AwsVpcOptions, ContainerDefinition, EnvironmentVariable, LogConfiguration, NetworkMode,
    PlacementOptions, PlacementStrategy, PodCreationOptions, PodDefinitionOptions,
    PodDeletionOptions, PodExecutionOptions, PodResources, PodSecret, PodStatus, PodStatusInfo,
    PortMapping, RepositoryCredentials, SecretOptions, StoredRepositoryCredentials,
    StrategyParameter, TaskDefinitionRef,
};
