//! Integration tests for layered option merging.

mod common;

use common::container;
use ecspod::{
    merge_all, merge_creation_options, merge_definition_options, merge_execution_options,
    NetworkMode, PlacementOptions, PlacementStrategy, PodCreationOptions, PodDefinitionOptions,
    PodExecutionOptions,
};

// =============================================================================
// Definition Options
// =============================================================================

#[test]
fn test_last_set_value_wins() {
    let merged = merge_definition_options(&[
        PodDefinitionOptions::new().with_name("base").with_memory_mb(256),
        PodDefinitionOptions::new().with_memory_mb(512),
        PodDefinitionOptions::new().with_name("override"),
    ]);

    assert_eq!(merged.name.as_deref(), Some("override"));
    assert_eq!(merged.memory_mb, Some(512));
}

#[test]
fn test_unset_fields_do_not_clobber() {
    let merged = merge_definition_options(&[
        PodDefinitionOptions::new()
            .with_cpu(128)
            .with_network_mode(NetworkMode::Host),
        PodDefinitionOptions::new(),
    ]);

    assert_eq!(merged.cpu, Some(128));
    assert_eq!(merged.network_mode, Some(NetworkMode::Host));
}

#[test]
fn test_collections_are_replaced_not_appended() {
    let merged = merge_definition_options(&[
        PodDefinitionOptions::new()
            .add_container_definitions([container("a", "nginx"), container("b", "envoy")])
            .add_tags([("team", "infra"), ("env", "dev")]),
        PodDefinitionOptions::new()
            .add_container_definitions([container("c", "redis")])
            .add_tags([("env", "prod")]),
    ]);

    assert_eq!(merged.container_definitions, vec![container("c", "redis")]);
    assert_eq!(merged.tags.len(), 1);
    assert_eq!(merged.tags["env"], "prod");
}

#[test]
fn test_empty_collection_keeps_earlier_one() {
    let merged = merge_definition_options(&[
        PodDefinitionOptions::new().add_container_definitions([container("a", "nginx")]),
        PodDefinitionOptions::new().with_name("named"),
    ]);
    assert_eq!(merged.container_definitions.len(), 1);
}

#[test]
fn test_inputs_are_not_modified() {
    let inputs = [
        PodDefinitionOptions::new().with_name("a"),
        PodDefinitionOptions::new().with_name("b"),
    ];
    let before = inputs.clone();

    let _ = merge_all(&inputs);

    assert_eq!(inputs, before);
}

// =============================================================================
// Execution and Creation Options
// =============================================================================

#[test]
fn test_execution_options_merge() {
    let merged = merge_execution_options(&[
        PodExecutionOptions::new()
            .with_cluster("dev")
            .with_capacity_provider("spot"),
        PodExecutionOptions::new().with_cluster("prod"),
    ]);

    assert_eq!(merged.cluster.as_deref(), Some("prod"));
    assert_eq!(merged.capacity_provider.as_deref(), Some("spot"));
}

#[test]
fn test_nested_execution_options_merge_field_by_field() {
    let merged = merge_creation_options(&[
        PodCreationOptions::new()
            .with_definition_opts(PodDefinitionOptions::new().with_name("base"))
            .with_execution_opts(PodExecutionOptions::new().with_cluster("prod")),
        PodCreationOptions::new().with_execution_opts(
            PodExecutionOptions::new().with_placement_opts(
                PlacementOptions::new().with_strategy(PlacementStrategy::Spread),
            ),
        ),
        PodCreationOptions::new(),
    ]);

    assert_eq!(merged.definition_opts.name.as_deref(), Some("base"));
    let exec = merged.execution_opts.unwrap();
    assert_eq!(exec.cluster.as_deref(), Some("prod"));
    assert_eq!(
        exec.placement_opts.and_then(|p| p.strategy),
        Some(PlacementStrategy::Spread)
    );
}

#[test]
fn test_merged_options_validate() {
    let mut merged = merge_creation_options(&[
        PodCreationOptions::new().with_definition_opts(
            PodDefinitionOptions::new().add_container_definitions([container("app", "nginx")]),
        ),
        PodCreationOptions::new()
            .with_definition_opts(PodDefinitionOptions::new().with_name("layered")),
    ]);

    merged.validate().unwrap();

    assert_eq!(merged.definition_opts.name.as_deref(), Some("layered"));
    assert!(merged.execution_opts.is_some());
}
