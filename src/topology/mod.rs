//! Network topology composition.
//!
//! - [`allocator`] - CIDR subnet allocation
//! - [`zones`] - availability-zone selection
//! - [`assembler`] - per-environment resource declarations
//! - [`security`] - security-group rule sets
//! - [`tags`] - resource tags
//! - [`overlap`] - cross-environment block checks

pub mod allocator;
pub mod assembler;
pub mod overlap;
pub mod security;
pub mod tags;
pub mod zones;

use crate::engine::ProvisioningEngine;
use crate::error::TopologyError;
use crate::models::Environment;

// Re-export public functions
pub use allocator::{allocate_subnet, allocate_subnet_str, plan_subnets, subnet_count, SUBNET_PREFIX};
pub use assembler::{build_environment, BuildSettings, EnvironmentTopology};
pub use overlap::{check_environments, find_overlapping_environments, OverlapConflict};
pub use security::{Protocol, SecurityGroupSpec, SecurityRule};
pub use tags::tags_for;
pub use zones::{pick_zones, select_zones, ZoneOrder, ZonePair};

/// Build every environment in order, stopping at the first failure.
///
/// Names and blocks are checked before anything is declared.
pub async fn build_all<E>(
    engine: &mut E,
    environments: &[Environment],
    settings: &BuildSettings,
) -> Result<Vec<EnvironmentTopology>, TopologyError>
where
    E: ProvisioningEngine + ?Sized,
{
    check_environments(environments)?;

    let mut topologies = Vec::with_capacity(environments.len());
    for environment in environments {
        let topology = build_environment(engine, environment, settings)
            .await
            .map_err(|e| {
                log::error!("Environment {} failed: {e}", environment.name());
                e
            })?;
        topologies.push(topology);
    }
    Ok(topologies)
}
