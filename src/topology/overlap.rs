//! Overlapping environment block detection.
//!
//! Environments built in the same run share a routing domain, so their
//! blocks must be disjoint and their names unique.

use crate::config::ConfigError;
use crate::models::Environment;
use itertools::Itertools;

/// Two environments whose blocks share addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapConflict {
    pub first: Environment,
    pub second: Environment,
}

/// Find every pair of environments with overlapping blocks.
pub fn find_overlapping_environments(environments: &[Environment]) -> Vec<OverlapConflict> {
    environments
        .iter()
        .tuple_combinations()
        .filter(|(a, b)| a.block().overlaps(&b.block()))
        .map(|(a, b)| OverlapConflict {
            first: a.clone(),
            second: b.clone(),
        })
        .collect()
}

/// Log overlapping environment conflicts as warnings.
pub fn log_overlapping_environments(conflicts: &[OverlapConflict]) {
    if conflicts.is_empty() {
        log::info!("No overlapping environment blocks found.");
        return;
    }

    log::warn!(
        "Found {} overlapping environment block(s):",
        conflicts.len()
    );
    for conflict in conflicts {
        log::warn!("  {} overlaps {}", conflict.first, conflict.second);
    }
}

/// Reject duplicate names and overlapping blocks.
pub fn check_environments(environments: &[Environment]) -> Result<(), ConfigError> {
    if environments.is_empty() {
        return Err(ConfigError::NoEnvironments);
    }
    if let Some(dup) = environments.iter().map(|e| e.name()).duplicates().next() {
        return Err(ConfigError::DuplicateEnvironment(dup.to_string()));
    }

    let conflicts = find_overlapping_environments(environments);
    log_overlapping_environments(&conflicts);
    match conflicts.into_iter().next() {
        Some(c) => Err(ConfigError::OverlappingBlocks {
            first: c.first.to_string(),
            second: c.second.to_string(),
        }),
        None => Ok(()),
    }
}
