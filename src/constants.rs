//! # Pod Option Constants
//!
//! Bounds and defaults applied while validating pod options. These constants
//! are the **single source of truth** for the values the validator injects and
//! the limits it enforces.
//!
//! ## Cross-References
//!
//! - [`crate::pod`]: Uses port bounds and defaults during validation
//! - [`crate::ecs`]: Uses the cache tag when registering task definitions

use crate::pod::{NetworkMode, PlacementStrategy, StrategyParameter};

// =============================================================================
// Port Bounds
// =============================================================================

/// Exclusive lower bound for container and host ports.
pub const MIN_PORT: i32 = 0;

/// Exclusive upper bound for container and host ports (`2 << 15`).
///
/// Port 65535 is accepted; 65536 and above are rejected.
pub const MAX_PORT: i32 = 2 << 15;

// =============================================================================
// Defaults
// =============================================================================

/// Network mode assigned to a pod definition that does not specify one.
pub const DEFAULT_NETWORK_MODE: NetworkMode = NetworkMode::Bridge;

/// Placement strategy assigned when none is given.
pub const DEFAULT_PLACEMENT_STRATEGY: PlacementStrategy = PlacementStrategy::Binpack;

/// Strategy parameter assigned to binpack placement when none is given.
pub const DEFAULT_BINPACK_PARAMETER: StrategyParameter = StrategyParameter::Memory;

/// Strategy parameter assigned to spread placement when none is given.
pub const DEFAULT_SPREAD_PARAMETER: StrategyParameter = StrategyParameter::Host;

/// Length of generated pod and container names.
pub const GENERATED_NAME_LEN: usize = 32;

// =============================================================================
// Placement
// =============================================================================

/// Instance filter that places each task on a distinct container instance.
///
/// Any other filter is treated as a cluster query language expression.
pub const DISTINCT_INSTANCE_FILTER: &str = "distinctInstance";

// =============================================================================
// Caching
// =============================================================================

/// Default tag key under which a registered task definition records the hash
/// of the options it was created from.
pub const DEFAULT_CACHE_TAG: &str = "ecspod-definition-hash";

/// Reason recorded on tasks stopped through this crate.
pub const STOP_REASON: &str = "stopped by ecspod";

// =============================================================================
// Manifests
// =============================================================================

/// Maximum size of an options manifest in bytes (1 MiB).
pub const MAX_MANIFEST_SIZE: usize = 1024 * 1024;
