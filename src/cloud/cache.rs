//! Cache management for zone listings.
//!
//! Avoids a CLI round trip on every run; one file per region and day.

use super::zones::{run_aws_zone_query, ZoneListing};
use std::error::Error;
use std::path::Path;

/// Default cache file name for `region` on `date` (`YYYY-MM-DD`).
pub fn cache_file_name(region: &str, date: &str) -> String {
    format!("zones_cache_{region}_{date}.json")
}

/// Read the zone listing from cache, or query the AWS CLI and write the cache.
///
/// # Arguments
/// * `region` - Region to query when the cache is missing
/// * `cache_file` - Optional path to a specific cache file. If None, uses default naming.
pub fn read_zone_cache(region: &str, cache_file: Option<&str>) -> Result<ZoneListing, Box<dyn Error>> {
    let cache_file = match cache_file {
        Some(file) => {
            if !Path::new(file).exists() {
                return Err(format!("Cache file does not exist: {file}").into());
            }
            log::info!("Using provided cache file: {file}");
            file.to_string()
        }
        None => {
            let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
            cache_file_name(region, &today)
        }
    };

    let listing = match std::fs::read_to_string(&cache_file) {
        Ok(json) => {
            log::info!("Reading from cache file: {cache_file}");
            ZoneListing::from_json(&json)?
        }
        Err(_) => {
            log::warn!("Cache file not found: {cache_file}");
            let listing = run_aws_zone_query(region)?;

            let json = serde_json::to_string_pretty(&listing)
                .map_err(|e| format!("Error serializing JSON: {e}"))?;
            log::warn!("Writing data to cache file: {cache_file}");
            std::fs::write(&cache_file, json)
                .map_err(|e| format!("Error writing cache file {cache_file}: {e}"))?;
            listing
        }
    };

    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_zone_cache() {
        let listing = read_zone_cache("us-west-2", Some("src/tests/test_data/zones_cache_01.json"))
            .expect("Error reading zone cache");
        assert_eq!(listing.availability_zones[0].zone_name, "us-west-2b");
        assert_eq!(listing.availability_zones[0].region_name, "us-west-2");
    }

    #[test]
    fn test_missing_named_cache_is_an_error() {
        let err = read_zone_cache("us-west-2", Some("src/tests/test_data/nope.json")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_cache_file_name() {
        assert_eq!(
            cache_file_name("eu-west-1", "2026-10-17"),
            "zones_cache_eu-west-1_2026-10-17.json"
        );
    }
}
