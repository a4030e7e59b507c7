//! AWS CLI interaction for zone discovery.
//!
//! This module handles the one query the builder makes of the cloud itself:
//! - [`cli`] - Command execution for the AWS CLI
//! - [`zones`] - `describe-availability-zones` query and parsing
//! - [`cache`] - Dated cache of the zone listing

mod cache;
mod cli;
mod zones;

// Re-export public types and functions
pub use cache::{cache_file_name, read_zone_cache};
pub use cli::run;
pub use zones::{run_aws_zone_query, ZoneInfo, ZoneListing};
