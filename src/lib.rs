//! Declarative VPC topology builder.
//!
//! Computes subnet blocks, picks availability zones and declares the network
//! resources of each environment against a [`engine::ProvisioningEngine`].

pub mod cloud;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod output;
pub mod topology;

use config::StackConfig;
use engine::{ProvisioningEngine, ZONE_STATE_AVAILABLE};
use std::error::Error;
use topology::EnvironmentTopology;

pub use error::{AllocationError, TopologyError};
pub use topology::{allocate_subnet, build_all, build_environment, select_zones, tags_for};

/// Zones for the configured region: the static list if present, otherwise
/// the cached or freshly queried CLI listing.
pub fn discover_zones(
    config: &StackConfig,
    cache_file: Option<&str>,
) -> Result<Vec<String>, Box<dyn Error>> {
    if let Some(zones) = &config.zones {
        log::info!("Using {} configured zones", zones.len());
        return Ok(zones.clone());
    }
    let listing = cloud::read_zone_cache(&config.region, cache_file)?;
    Ok(listing.zone_names(ZONE_STATE_AVAILABLE))
}

/// Build every environment of `config` against `engine`.
pub async fn build_stack<E>(
    engine: &mut E,
    config: &StackConfig,
) -> Result<Vec<EnvironmentTopology>, TopologyError>
where
    E: ProvisioningEngine + ?Sized,
{
    let environments = config.environments()?;
    let settings = config.settings()?;
    build_all(engine, &environments, &settings).await
}
