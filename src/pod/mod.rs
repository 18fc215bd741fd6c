//! # Pod Options Model
//!
//! Value types describing a pod: what its containers are, how they are
//! networked, where the task is placed, and which secrets it reads.
//!
//! ## Lifecycle of an Options Value
//!
//! ```text
//!  partial options ──merge──▶ merged ──validate──▶ validated ──hash──▶ digest
//!                                        │
//!                                        └─ defaults injected only if
//!                                           no violation was found
//! ```
//!
//! Every option type offers:
//!
//! - `check()`: collects every violation without touching the value
//! - `validate()`: `check()`, then (if clean) fills in defaults
//! - `hash()` (definition types): canonical content digest
//!
//! ## Tri-State Fields
//!
//! Scalars are `Option`s: "not set" and "set to zero" are different things.
//! A container with no memory limit is fine if the pod has one; a container
//! with a memory limit of zero is always an error.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ecspod::pod::{ContainerDefinition, PodDefinitionOptions};
//!
//! let mut opts = PodDefinitionOptions::new()
//!     .add_container_definitions([ContainerDefinition::new().with_image("nginx:1.25")])
//!     .with_memory_mb(128)
//!     .with_cpu(128);
//! opts.validate()?;
//! let digest = opts.hash();
//! ```

mod container;
mod creation;
mod definition;
mod execution;
mod network;
mod resources;

pub use container::{
    ContainerDefinition, EnvironmentVariable, LogConfiguration, RepositoryCredentials,
    SecretOptions, StoredRepositoryCredentials,
};
pub use creation::{PodCreationOptions, PodDeletionOptions};
pub use definition::PodDefinitionOptions;
pub use execution::{PlacementOptions, PlacementStrategy, PodExecutionOptions, StrategyParameter};
pub use network::{AwsVpcOptions, NetworkMode, PortMapping};
pub use resources::{PodResources, PodSecret, PodStatus, PodStatusInfo, TaskDefinitionRef};
