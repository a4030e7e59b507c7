//! Availability-zone selection.
//!
//! Two distinct zones are a hard requirement: with fewer the build fails
//! before anything is declared.

use crate::engine::{ProvisioningEngine, ZoneFilter};
use crate::error::TopologyError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the zone list is ordered before the first two are taken.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZoneOrder {
    /// Lexicographic, so repeated builds pick the same zones.
    #[default]
    Sorted,
    /// Whatever order the platform returned.
    AsReturned,
}

/// The two zones an environment is spread over.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ZonePair {
    pub primary: String,
    pub secondary: String,
}

impl ZonePair {
    pub fn new(primary: &str, secondary: &str) -> ZonePair {
        ZonePair {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
        }
    }

    /// Zone for a 1-based ordinal: 1 is the primary, 2 the secondary.
    ///
    /// Ordinals come from [`SubnetLayout::offsets`](crate::models::SubnetLayout::offsets)
    /// and are never 0.
    pub fn zone(&self, ordinal: usize) -> &str {
        debug_assert!(
            ordinal == 1 || ordinal == 2,
            "zone ordinal {ordinal} out of range"
        );
        match ordinal {
            1 => &self.primary,
            _ => &self.secondary,
        }
    }
}

impl fmt::Display for ZonePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.primary, self.secondary)
    }
}

/// Pick two distinct zones from a query result.
pub fn pick_zones(
    zones: Vec<String>,
    order: ZoneOrder,
    region: &str,
) -> Result<ZonePair, TopologyError> {
    let mut distinct: Vec<String> = zones
        .into_iter()
        .map(|z| z.trim().to_string())
        .filter(|z| !z.is_empty())
        .unique()
        .collect();
    if order == ZoneOrder::Sorted {
        distinct.sort();
    }

    match distinct.as_slice() {
        [primary, secondary, ..] => Ok(ZonePair::new(primary, secondary)),
        _ => Err(TopologyError::Capacity {
            region: region.to_string(),
            found: distinct.len(),
        }),
    }
}

/// Query the engine for zones in `filter.region` and pick two.
pub async fn select_zones<E>(
    engine: &mut E,
    filter: &ZoneFilter,
    order: ZoneOrder,
) -> Result<ZonePair, TopologyError>
where
    E: ProvisioningEngine + ?Sized,
{
    let zones = engine
        .list_availability_zones(filter)
        .await
        .map_err(|e| TopologyError::declaration("availability zones", &filter.region, e))?;
    log::debug!("Region {} returned zones {:?}", filter.region, zones);

    let pair = pick_zones(zones, order, &filter.region)?;
    log::info!("Region {}: using zones {pair}", filter.region);
    Ok(pair)
}
