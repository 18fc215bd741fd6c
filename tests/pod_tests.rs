//! Integration tests for pod option validation.
//!
//! These tests verify that:
//! - every violation is reported in one pass
//! - defaults are injected only into valid options
//! - network modes constrain port mappings
//! - container resources fit within the pod's
//! - manifests parse from YAML files

mod common;

use common::container;
use ecspod::{
    AwsVpcOptions, ContainerDefinition, EnvironmentVariable, Error, NetworkMode, PlacementOptions,
    PlacementStrategy, PodCreationOptions, PodDefinitionOptions, PodExecutionOptions, PortMapping,
    RepositoryCredentials, SecretOptions, SequentialNameGenerator, StoredRepositoryCredentials,
    StrategyParameter,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn messages(err: &Error) -> String {
    err.validation_errors()
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn definition_with_ports(mode: NetworkMode, host: i32, container_port: i32) -> PodDefinitionOptions {
    PodDefinitionOptions::new()
        .with_network_mode(mode)
        .add_container_definitions([container("web", "nginx:1.25").add_port_mappings([
            PortMapping::new()
                .with_container_port(container_port)
                .with_host_port(host),
        ])])
}

fn secret_env(name: &str) -> EnvironmentVariable {
    EnvironmentVariable::new()
        .with_name(name)
        .with_secret_opts(SecretOptions::new().with_id("arn:secret:1"))
}

// =============================================================================
// Defaulting Tests
// =============================================================================

#[test]
fn test_valid_definition_receives_defaults() {
    let names = SequentialNameGenerator::new("gen");
    let mut opts = PodDefinitionOptions::new().add_container_definitions([ContainerDefinition::new()
        .with_image("busybox")
        .with_memory_mb(64)
        .with_cpu(64)]);

    opts.validate_with(&names).unwrap();

    assert_eq!(opts.name.as_deref(), Some("gen-0"));
    assert_eq!(opts.container_definitions[0].name.as_deref(), Some("gen-1"));
    assert_eq!(opts.network_mode, Some(NetworkMode::Bridge));
}

#[test]
fn test_given_values_are_not_overridden() {
    let mut opts = PodDefinitionOptions::new()
        .with_name("mine")
        .with_network_mode(NetworkMode::Host)
        .add_container_definitions([container("c", "busybox")]);

    opts.validate().unwrap();

    assert_eq!(opts.name.as_deref(), Some("mine"));
    assert_eq!(opts.container_definitions[0].name.as_deref(), Some("c"));
    assert_eq!(opts.network_mode, Some(NetworkMode::Host));
}

#[test]
fn test_invalid_definition_is_left_untouched() {
    let mut opts = PodDefinitionOptions::new()
        .add_container_definitions([ContainerDefinition::new().with_memory_mb(64).with_cpu(64)]);
    let before = opts.clone();

    let err = opts.validate().unwrap_err();

    assert!(messages(&err).contains("invalid container definition '#0': must specify an image"));
    assert_eq!(opts, before);
}

#[test]
fn test_random_names_are_generated() {
    let mut opts = PodDefinitionOptions::new()
        .add_container_definitions([ContainerDefinition::new()
            .with_image("busybox")
            .with_memory_mb(64)
            .with_cpu(64)]);

    opts.validate().unwrap();

    let name = opts.name.unwrap();
    assert!(!name.is_empty());
    assert_ne!(Some(name), opts.container_definitions[0].name);
}

// =============================================================================
// Aggregation Tests
// =============================================================================

#[test]
fn test_all_violations_are_reported() {
    let opts = PodDefinitionOptions::new().with_memory_mb(0).with_cpu(-1);

    let errs = opts.check();

    assert_eq!(errs.len(), 3);
    let text = errs.to_string();
    assert!(text.contains("must have positive memory value if non-default"));
    assert!(text.contains("must have positive CPU value if non-default"));
    assert!(text.contains("must specify at least one container definition"));
}

#[test]
fn test_errors_from_several_containers_are_labelled() {
    let opts = PodDefinitionOptions::new().add_container_definitions([
        ContainerDefinition::new().with_name("a"),
        ContainerDefinition::new().with_name("b").with_image(""),
    ]);

    let text = opts.check().to_string();

    assert!(text.contains("invalid container definition 'a': must specify an image"));
    assert!(text.contains("invalid container definition 'b': cannot specify an empty image"));
}

// =============================================================================
// Mutual Exclusivity Tests
// =============================================================================

#[test]
fn test_env_var_value_and_secret_are_exclusive() {
    let ev = EnvironmentVariable::new()
        .with_name("TOKEN")
        .with_value("plain")
        .with_secret_opts(SecretOptions::new().with_id("arn:secret:1"));

    let errs = ev.check();

    assert!(errs.has_mutually_exclusive());
    assert!(errs
        .to_string()
        .contains("cannot specify both a value and a secret"));
}

#[test]
fn test_env_var_needs_value_or_secret() {
    let errs = EnvironmentVariable::new().with_name("EMPTY").check();
    assert!(!errs.has_mutually_exclusive());
    assert!(errs
        .to_string()
        .contains("must specify either a value or a secret"));
}

#[test]
fn test_exclusivity_survives_nesting() {
    let opts = PodDefinitionOptions::new()
        .with_execution_role("exec")
        .add_container_definitions([container("c", "busybox").add_env_vars([
            EnvironmentVariable::new()
                .with_name("X")
                .with_value("1")
                .with_secret_opts(SecretOptions::new().with_id("arn:secret:1")),
        ])]);

    let err = opts.clone().validate().unwrap_err();

    let errs = err.validation_errors().unwrap();
    assert!(errs.has_mutually_exclusive());
    assert!(errs.to_string().contains(
        "invalid container definition 'c': invalid environment variable 'X': cannot specify both"
    ));
}

#[test]
fn test_secret_id_and_new_value_are_exclusive() {
    let errs = SecretOptions::new()
        .with_id("arn:secret:1")
        .with_name("s")
        .with_new_value("v")
        .check();
    assert!(errs.has_mutually_exclusive());
}

#[test]
fn test_repo_creds_id_and_new_creds_are_exclusive() {
    let errs = RepositoryCredentials::new()
        .with_id("arn:secret:1")
        .with_name("creds")
        .with_new_creds(StoredRepositoryCredentials::new("user", "pass"))
        .check();
    assert!(errs.has_mutually_exclusive());
}

// =============================================================================
// Secret Role Tests
// =============================================================================

#[test]
fn test_secrets_require_execution_role() {
    let opts = PodDefinitionOptions::new()
        .add_container_definitions([container("c", "busybox").add_env_vars([secret_env("TOKEN")])]);

    assert!(opts
        .check()
        .to_string()
        .contains("must specify an execution role when containers use secrets"));
    assert!(opts.with_execution_role("exec").check().is_empty());
}

#[test]
fn test_repo_creds_require_execution_role() {
    let opts = PodDefinitionOptions::new().add_container_definitions([container(
        "c",
        "private.registry/app",
    )
    .with_repo_creds(RepositoryCredentials::new().with_id("arn:secret:creds"))]);

    assert!(!opts.check().is_empty());
    assert!(opts.with_execution_role("exec").check().is_empty());
}

// =============================================================================
// Port Mapping Tests
// =============================================================================

#[test]
fn test_port_mismatch_rejected_in_host_mode() {
    let errs = definition_with_ports(NetworkMode::Host, 9001, 1337).check();
    assert!(errs
        .to_string()
        .contains("host port 9001 must equal container port 1337 in network mode 'host'"));
}

#[test]
fn test_port_mismatch_rejected_in_awsvpc_mode() {
    let errs = definition_with_ports(NetworkMode::AwsVpc, 9001, 1337).check();
    assert_eq!(errs.len(), 1);
    assert!(errs.to_string().contains("network mode 'awsvpc'"));
}

#[test]
fn test_port_mismatch_allowed_in_bridge_mode() {
    assert!(definition_with_ports(NetworkMode::Bridge, 9001, 1337)
        .check()
        .is_empty());
}

#[test]
fn test_matching_ports_allowed_in_host_mode() {
    assert!(definition_with_ports(NetworkMode::Host, 1337, 1337)
        .check()
        .is_empty());
}

#[test]
fn test_no_port_mappings_with_networking_disabled() {
    let errs = definition_with_ports(NetworkMode::None, 1337, 1337).check();
    assert!(errs
        .to_string()
        .contains("cannot specify port mappings because networking is disabled"));
}

#[test]
fn test_port_mapping_needs_container_port() {
    let errs = PortMapping::new().with_host_port(80).check();
    assert!(errs.to_string().contains("must specify a container port"));
}

#[test]
fn test_port_mapping_range() {
    assert!(!PortMapping::new().with_container_port(0).check().is_empty());
    assert!(!PortMapping::new().with_container_port(65536).check().is_empty());
    assert!(PortMapping::new().with_container_port(65535).check().is_empty());
    assert!(!PortMapping::new()
        .with_container_port(80)
        .with_host_port(-1)
        .check()
        .is_empty());
}

// =============================================================================
// Resource Tests
// =============================================================================

#[test]
fn test_container_resources_must_fit_in_pod() {
    let opts = PodDefinitionOptions::new()
        .with_memory_mb(256)
        .with_cpu(1024)
        .add_container_definitions([
            container("a", "busybox").with_memory_mb(128),
            container("b", "busybox").with_memory_mb(256),
        ]);

    let text = opts.check().to_string();

    assert!(text.contains("total memory requested by containers (384 MB) exceeds the pod memory (256 MB)"));
    assert!(!text.contains("CPU"));
}

#[test]
fn test_container_cpu_must_fit_in_pod() {
    let opts = PodDefinitionOptions::new()
        .with_cpu(128)
        .add_container_definitions([container("a", "busybox").with_cpu(256)]);

    let text = opts.check().to_string();

    assert!(text.contains("total CPU requested by containers (256 units) exceeds the pod CPU (128 units)"));
    assert!(!text.contains("memory"));
}

#[test]
fn test_pod_cpu_covers_unset_container_cpu() {
    let opts = PodDefinitionOptions::new().with_cpu(128).add_container_definitions([
        ContainerDefinition::new()
            .with_name("a")
            .with_image("busybox")
            .with_memory_mb(64),
    ]);

    assert!(opts.check().is_empty());
}

#[test]
fn test_container_resources_required_without_pod_values() {
    let opts = PodDefinitionOptions::new()
        .add_container_definitions([ContainerDefinition::new().with_name("a").with_image("busybox")]);

    let text = opts.check().to_string();

    assert!(text.contains("container 'a' must specify memory when pod-level memory is not set"));
    assert!(text.contains("container 'a' must specify CPU when pod-level CPU is not set"));
}

#[test]
fn test_pod_values_cover_unset_container_resources() {
    let opts = PodDefinitionOptions::new()
        .with_memory_mb(512)
        .with_cpu(256)
        .add_container_definitions([ContainerDefinition::new().with_name("a").with_image("busybox")]);

    assert!(opts.check().is_empty());
}

#[test]
fn test_resource_sums_skipped_when_container_invalid() {
    let opts = PodDefinitionOptions::new()
        .with_memory_mb(64)
        .add_container_definitions([
            container("a", "busybox").with_memory_mb(128),
            ContainerDefinition::new().with_name("b"),
        ]);

    let errs = opts.check();

    assert_eq!(errs.len(), 1);
    assert!(errs.to_string().contains("must specify an image"));
}

// =============================================================================
// Creation Options Tests
// =============================================================================

fn awsvpc() -> AwsVpcOptions {
    AwsVpcOptions::new()
        .add_subnets(["subnet-1"])
        .add_security_groups(["sg-1"])
}

#[test]
fn test_awsvpc_mode_requires_awsvpc_options() {
    let opts = PodCreationOptions::new().with_definition_opts(
        PodDefinitionOptions::new()
            .with_network_mode(NetworkMode::AwsVpc)
            .add_container_definitions([container("c", "busybox")]),
    );

    assert!(opts
        .check()
        .to_string()
        .contains("must specify AWSVPC options when network mode is awsvpc"));

    let opts = opts.with_execution_opts(PodExecutionOptions::new().with_awsvpc_opts(awsvpc()));
    assert!(opts.check().is_empty());
}

#[test]
fn test_awsvpc_options_rejected_in_other_modes() {
    let opts = PodCreationOptions::new()
        .with_definition_opts(
            PodDefinitionOptions::new().add_container_definitions([container("c", "busybox")]),
        )
        .with_execution_opts(PodExecutionOptions::new().with_awsvpc_opts(awsvpc()));

    assert!(opts
        .check()
        .to_string()
        .contains("cannot specify AWSVPC options when network mode is not awsvpc"));
}

#[test]
fn test_awsvpc_options_need_a_subnet() {
    let errs = PodExecutionOptions::new()
        .with_awsvpc_opts(AwsVpcOptions::new())
        .check();
    assert!(errs
        .to_string()
        .contains("invalid AWSVPC options: must specify at least one subnet"));
}

#[test]
fn test_creation_defaults_execution_options() {
    let mut opts = PodCreationOptions::new().with_definition_opts(
        PodDefinitionOptions::new().add_container_definitions([container("c", "busybox")]),
    );

    opts.validate().unwrap();

    let (def, exec) = opts.into_parts();
    assert_eq!(def.network_mode, Some(NetworkMode::Bridge));
    let placement = exec.placement_opts.unwrap();
    assert_eq!(placement.strategy, Some(PlacementStrategy::Binpack));
    assert_eq!(placement.strategy_parameter, Some(StrategyParameter::Memory));
}

// =============================================================================
// Placement Tests
// =============================================================================

#[test]
fn test_binpack_only_accepts_memory_or_cpu() {
    let bad = PlacementOptions::new()
        .with_strategy(PlacementStrategy::Binpack)
        .with_strategy_parameter(StrategyParameter::Host);
    assert!(bad
        .check()
        .to_string()
        .contains("strategy parameter cannot be 'host' when the strategy is binpack"));

    let good = PlacementOptions::new()
        .with_strategy(PlacementStrategy::Binpack)
        .with_strategy_parameter("cpu");
    assert!(good.check().is_empty());
}

#[test]
fn test_spread_accepts_custom_attribute() {
    let opts = PlacementOptions::new()
        .with_strategy(PlacementStrategy::Spread)
        .with_strategy_parameter("attribute:ecs.availability-zone");
    assert!(opts.check().is_empty());

    let empty = PlacementOptions::new()
        .with_strategy(PlacementStrategy::Spread)
        .with_strategy_parameter("");
    assert!(!empty.check().is_empty());
}

#[test]
fn test_random_ignores_strategy_parameter() {
    let opts = PlacementOptions::new()
        .with_strategy(PlacementStrategy::Random)
        .with_strategy_parameter(StrategyParameter::Host);
    assert!(opts.check().is_empty());
}

#[test]
fn test_placement_defaults_per_strategy() {
    let mut spread = PlacementOptions::new().with_strategy(PlacementStrategy::Spread);
    spread.validate().unwrap();
    assert_eq!(spread.strategy_parameter, Some(StrategyParameter::Host));

    let mut random = PlacementOptions::new().with_strategy(PlacementStrategy::Random);
    random.validate().unwrap();
    assert_eq!(random.strategy_parameter, None);

    let mut default = PlacementOptions::new();
    default.validate().unwrap();
    assert_eq!(default.strategy, Some(PlacementStrategy::Binpack));
    assert_eq!(default.strategy_parameter, Some(StrategyParameter::Memory));
}

// =============================================================================
// Manifest Tests
// =============================================================================

const MANIFEST: &str = r#"
name: web
memory_mb: 512
cpu: 256
network_mode: awsvpc
container_definitions:
  - name: nginx
    image: nginx:1.25
    command: ["nginx", "-g", "daemon off;"]
    port_mappings:
      - container_port: 80
        host_port: 80
execution_opts:
  cluster: prod
  awsvpc_opts:
    subnets: [subnet-1]
    security_groups: [sg-1]
"#;

#[test]
fn test_creation_options_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pod.yaml");
    std::fs::write(&path, MANIFEST).unwrap();

    let mut opts = PodCreationOptions::from_file(&path).unwrap();
    opts.validate().unwrap();

    assert_eq!(opts.definition_opts.name.as_deref(), Some("web"));
    assert_eq!(opts.definition_opts.network_mode, Some(NetworkMode::AwsVpc));
    assert_eq!(
        opts.definition_opts.container_definitions[0].command,
        vec!["nginx", "-g", "daemon off;"]
    );
    let exec = opts.execution_opts.unwrap();
    assert_eq!(exec.cluster.as_deref(), Some("prod"));
    assert_eq!(exec.awsvpc_opts.unwrap().subnets, vec!["subnet-1"]);
}

#[test]
fn test_oversized_manifest_rejected() {
    let huge = vec![b'#'; ecspod::MAX_MANIFEST_SIZE + 1];
    let err = PodDefinitionOptions::from_yaml(&huge).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn test_malformed_manifest_rejected() {
    let err = PodDefinitionOptions::from_yaml(b"memory_mb: [not, a, number]").unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
}
