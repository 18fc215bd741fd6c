//! # ECS Pod Orchestration
//!
//! Turns validated pod options into running ECS tasks and cleans them up
//! again.
//!
//! ## Components
//!
//! | Type                        | Role                                           |
//! |-----------------------------|------------------------------------------------|
//! | [`EcsPod`]                  | One running task and the resources it owns     |
//! | [`BasicPodCreator`]         | Starts pods, each with its own definition      |
//! | [`BasicPodDefinitionManager`] | Registers definitions, reusing cached ones   |
//! | [`BasicPodManager`]         | Starts pods on shared definitions              |
//!
//! ## Ownership
//!
//! ```text
//!                    task definition     secrets
//! BasicPodCreator    owned               owned if requested
//! BasicPodManager    shared              shared
//! ```
//!
//! Deleting a pod only removes owned resources. Shared definitions are
//! removed through [`PodManager::delete_pod`], which asks the definition
//! manager to deregister and evict them.

mod creator;
mod definition_manager;
mod manager;
mod pod;
mod secrets;
mod traits;

pub use creator::BasicPodCreator;
pub use definition_manager::BasicPodDefinitionManager;
pub use manager::BasicPodManager;
pub use pod::EcsPod;
pub use traits::{Pod, PodCreator, PodDefinitionManager, PodManager};
