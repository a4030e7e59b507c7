//! Integration tests for vpc-topology
//!
//! These tests run the complete workflow from configuration to plan.

use std::collections::HashSet;
use vpc_topology::config::StackConfig;
use vpc_topology::engine::{ExportValue, RecordingEngine};
use vpc_topology::models::{Environment, Ipv4, ResourceKind};
use vpc_topology::topology::{build_all, BuildSettings, ZonePair};
use vpc_topology::{build_stack, discover_zones, TopologyError};

fn west_engine() -> RecordingEngine {
    RecordingEngine::new(
        "us-west-2",
        vec!["us-west-2a".to_string(), "us-west-2b".to_string()],
    )
}

#[tokio::test]
async fn test_dev_and_prod_are_disjoint() {
    let config = StackConfig::load("src/tests/test_data/stack_01.json")
        .expect("Failed to read stack config");
    let mut engine = west_engine();

    let topologies = build_stack(&mut engine, &config)
        .await
        .expect("Failed to build stack");
    assert_eq!(topologies.len(), 2);

    let dev: HashSet<&str> = topologies[0].handles().iter().map(|h| h.id.as_str()).collect();
    let prod: HashSet<&str> = topologies[1].handles().iter().map(|h| h.id.as_str()).collect();
    assert_eq!(dev.len(), 20);
    assert_eq!(prod.len(), 20);
    assert!(dev.is_disjoint(&prod), "environments share identifiers");

    for topo in &topologies {
        let name = topo.environment.name();
        for h in topo.handles() {
            assert!(
                h.logical_name.starts_with(&format!("{name}-")),
                "{} not owned by {name}",
                h.logical_name
            );
        }
    }

    let keys: Vec<&str> = engine.exports().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "dev_nat_gateway_ids",
            "dev_private_subnets",
            "dev_public_subnets",
            "dev_vpc_id",
            "prod_nat_gateway_ids",
            "prod_private_subnets",
            "prod_public_subnets",
            "prod_vpc_id",
        ]
    );
    assert_eq!(
        engine.exports()["prod_vpc_id"],
        ExportValue::Id(topologies[1].vpc.id.clone())
    );
}

#[tokio::test]
async fn test_subnets_follow_environment_blocks() {
    let mut engine = west_engine();
    let topologies = build_stack(&mut engine, &StackConfig::default())
        .await
        .expect("Failed to build stack");

    let cidrs: Vec<String> = topologies[1]
        .public_subnets
        .iter()
        .chain(topologies[1].private_subnets.iter())
        .map(|s| s.descriptor.cidr.to_string())
        .collect();
    assert_eq!(
        cidrs,
        vec!["10.1.1.0/24", "10.1.2.0/24", "10.1.3.0/24", "10.1.4.0/24"]
    );
    for topo in &topologies {
        for s in topo.public_subnets.iter().chain(topo.private_subnets.iter()) {
            assert!(topo.environment.block().contains(&s.descriptor.cidr));
        }
    }
}

#[tokio::test]
async fn test_plan_orders_dependencies_first() {
    let mut engine = west_engine();
    build_stack(&mut engine, &StackConfig::default())
        .await
        .expect("Failed to build stack");

    let plan = engine.plan("2026-10-17T00:00:00Z").expect("Failed to plan");
    assert_eq!(plan.resources.len(), 40);
    assert_eq!(plan.summary()[&ResourceKind::Subnet], 8);

    let position = |name: &str| {
        plan.resources
            .iter()
            .position(|r| r.logical_name == name)
            .unwrap_or_else(|| panic!("{name} missing from plan"))
    };
    for resource in &plan.resources {
        for dep in &resource.depends_on {
            assert!(
                position(dep) < position(&resource.logical_name),
                "{dep} must precede {}",
                resource.logical_name
            );
        }
    }
    assert!(position("prod-igw") < position("prod-nat-gateway2"));
    assert!(position("prod-nat-gateway2") < position("prod-private-route2"));
}

#[tokio::test]
async fn test_one_zone_region_declares_nothing() {
    let mut engine = RecordingEngine::new("ap-east-9", vec!["ap-east-9a".to_string()]);
    let mut config = StackConfig::default();
    config.region = "ap-east-9".to_string();

    let err = build_stack(&mut engine, &config).await.unwrap_err();
    assert!(matches!(err, TopologyError::Capacity { found: 1, .. }));
    assert!(engine.graph().is_empty());
}

#[tokio::test]
async fn test_overlapping_environments_rejected_up_front() {
    let envs = vec![
        Environment::new("dev", Ipv4::new("10.0.0.0/16").unwrap()).unwrap(),
        Environment::new("prod", Ipv4::new("10.0.128.0/17").unwrap()).unwrap(),
    ];
    let mut engine = west_engine();
    let err = build_all(&mut engine, &envs, &BuildSettings::new("us-west-2"))
        .await
        .unwrap_err();
    assert!(matches!(err, TopologyError::Config(_)));
    assert_eq!(engine.zone_queries(), 0);
}

#[test]
fn test_zones_from_cache_file() {
    let config = StackConfig::default();
    let zones = discover_zones(&config, Some("src/tests/test_data/zones_cache_01.json"))
        .expect("Failed to read zone cache");
    assert_eq!(zones, vec!["us-west-2b", "us-west-2a"]);

    let pair = vpc_topology::topology::pick_zones(zones, config.zone_order, &config.region)
        .expect("Two zones expected");
    assert_eq!(pair, ZonePair::new("us-west-2a", "us-west-2b"));
}

#[test]
fn test_single_zone_cache_is_capacity_error() {
    let mut config = StackConfig::default();
    config.region = "ap-east-9".to_string();
    let zones = discover_zones(&config, Some("src/tests/test_data/zones_cache_02.json"))
        .expect("Failed to read zone cache");
    let err = vpc_topology::topology::pick_zones(zones, config.zone_order, &config.region)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "region ap-east-9 reports 1 usable availability zone(s), two are required"
    );
}
