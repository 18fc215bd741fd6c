//! Layered composition of option structs.
//!
//! Options are merged left to right: for every field, the last argument that
//! sets it wins. Collections (containers, tags, subnets, ...) are replaced
//! wholesale by the last non-empty one rather than appended to. Execution
//! options nested in creation options are merged field by field when both
//! sides have them. Inputs are never modified.
//!
//! ```rust,ignore
//! use ecspod::merge::merge_all;
//!
//! let merged = merge_all(&[base_opts, team_overrides, request_opts]);
//! ```

use crate::pod::{
    PodCreationOptions, PodDefinitionOptions, PodDeletionOptions, PodExecutionOptions,
};
use std::collections::HashMap;

/// Override composition for option structs.
pub trait Merge {
    /// Overwrites fields of `self` with the fields `other` sets.
    fn merge_from(&mut self, other: &Self);
}

/// Merges `opts` in order into a new value.
pub fn merge_all<T: Merge + Default>(opts: &[T]) -> T {
    let mut merged = T::default();
    for o in opts {
        merged.merge_from(o);
    }
    merged
}

/// Merges pod definition options.
pub fn merge_definition_options(opts: &[PodDefinitionOptions]) -> PodDefinitionOptions {
    merge_all(opts)
}

/// Merges pod execution options.
pub fn merge_execution_options(opts: &[PodExecutionOptions]) -> PodExecutionOptions {
    merge_all(opts)
}

/// Merges pod creation options.
pub fn merge_creation_options(opts: &[PodCreationOptions]) -> PodCreationOptions {
    merge_all(opts)
}

/// Merges pod deletion options.
pub fn merge_deletion_options(opts: &[PodDeletionOptions]) -> PodDeletionOptions {
    merge_all(opts)
}

fn overwrite<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
    if let Some(v) = src {
        *dst = Some(v.clone());
    }
}

fn overwrite_vec<T: Clone>(dst: &mut Vec<T>, src: &[T]) {
    if !src.is_empty() {
        *dst = src.to_vec();
    }
}

fn overwrite_map(dst: &mut HashMap<String, String>, src: &HashMap<String, String>) {
    if !src.is_empty() {
        *dst = src.clone();
    }
}

impl Merge for PodDefinitionOptions {
    fn merge_from(&mut self, other: &Self) {
        overwrite(&mut self.name, &other.name);
        overwrite_vec(&mut self.container_definitions, &other.container_definitions);
        overwrite(&mut self.memory_mb, &other.memory_mb);
        overwrite(&mut self.cpu, &other.cpu);
        overwrite(&mut self.network_mode, &other.network_mode);
        overwrite(&mut self.task_role, &other.task_role);
        overwrite(&mut self.execution_role, &other.execution_role);
        overwrite_map(&mut self.tags, &other.tags);
    }
}

impl Merge for PodExecutionOptions {
    fn merge_from(&mut self, other: &Self) {
        overwrite(&mut self.cluster, &other.cluster);
        overwrite(&mut self.capacity_provider, &other.capacity_provider);
        overwrite(&mut self.placement_opts, &other.placement_opts);
        overwrite(&mut self.awsvpc_opts, &other.awsvpc_opts);
        overwrite(&mut self.supports_debug_mode, &other.supports_debug_mode);
        overwrite_map(&mut self.tags, &other.tags);
    }
}

impl Merge for PodCreationOptions {
    fn merge_from(&mut self, other: &Self) {
        self.definition_opts.merge_from(&other.definition_opts);
        if let Some(exec) = &other.execution_opts {
            self.execution_opts
                .get_or_insert_with(PodExecutionOptions::default)
                .merge_from(exec);
        }
    }
}

impl Merge for PodDeletionOptions {
    fn merge_from(&mut self, other: &Self) {
        overwrite(&mut self.retain_definition, &other.retain_definition);
    }
}
