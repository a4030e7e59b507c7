//! Availability-zone query through the AWS CLI.

use super::cli;
use serde::{Deserialize, Serialize};
use std::error::Error;

/// Zone type of regular availability zones (not local or wavelength zones).
const ZONE_TYPE_AZ: &str = "availability-zone";

/// One entry of `describe-availability-zones`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ZoneInfo {
    pub zone_name: String,
    pub state: String,
    pub region_name: String,
    #[serde(default = "default_zone_type")]
    pub zone_type: String,
}

fn default_zone_type() -> String {
    ZONE_TYPE_AZ.to_string()
}

/// Response of `describe-availability-zones`.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ZoneListing {
    pub availability_zones: Vec<ZoneInfo>,
}

impl ZoneListing {
    /// Parse CLI output, naming the failing field on error.
    pub fn from_json(json: &str) -> Result<ZoneListing, Box<dyn Error>> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let listing = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
            log::error!("OUTPUT START:\n\n{}\n\nOUTPUT END\n", json);
            format!("Error parsing zone listing: path={} error={}", e.path(), e)
        })?;
        Ok(listing)
    }

    /// Names of available regular zones, in the order the CLI listed them.
    pub fn zone_names(&self, state: &str) -> Vec<String> {
        self.availability_zones
            .iter()
            .filter(|z| z.state == state && z.zone_type == ZONE_TYPE_AZ)
            .map(|z| z.zone_name.clone())
            .collect()
    }
}

/// Query the zones of `region` with the AWS CLI.
pub fn run_aws_zone_query(region: &str) -> Result<ZoneListing, Box<dyn Error>> {
    let cmd = format!(
        "aws ec2 describe-availability-zones --region {region} --filters 'Name=zone-type,Values={ZONE_TYPE_AZ}' --output json"
    );
    let output = cli::run(&cmd)?;
    let listing = ZoneListing::from_json(&output)?;
    log::info!(
        "Got {} zones for region {region} from aws cli",
        listing.availability_zones.len()
    );
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ZONE_STATE_AVAILABLE;

    #[test]
    fn test_zone_names_skip_impaired_and_local_zones() {
        let json = std::fs::read_to_string("src/tests/test_data/zones_cache_01.json").unwrap();
        let listing = ZoneListing::from_json(&json).unwrap();
        assert_eq!(listing.availability_zones.len(), 4);
        assert_eq!(
            listing.zone_names(ZONE_STATE_AVAILABLE),
            vec!["us-west-2b", "us-west-2a"]
        );
    }

    #[test]
    fn test_parse_error_has_path() {
        let err = ZoneListing::from_json(r#"{"AvailabilityZones": [{"ZoneName": 1}]}"#)
            .unwrap_err()
            .to_string();
        assert!(err.contains("AvailabilityZones[0].ZoneName"), "{err}");
    }
}
