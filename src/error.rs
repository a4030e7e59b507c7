//! Error taxonomy for topology builds.
//!
//! Every component operation returns one of the [`TopologyError`] kinds.
//! Engine failures are wrapped where the call is made so no engine-specific
//! type crosses the builder boundary.

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::models::Ipv4;
use thiserror::Error;

/// CIDR math failures.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum AllocationError {
    /// Text that is not `a.b.c.d/len`.
    #[error("invalid CIDR block '{0}'")]
    MalformedBlock(String),
    /// Prefix length above 32.
    #[error("network length /{0} is too long")]
    PrefixTooLong(u8),
    /// Target prefix is shorter than the block it is carved from.
    #[error("cannot carve /{target} subnets out of {base}")]
    PrefixTooShort {
        /// Block being divided.
        base: Ipv4,
        /// Requested subnet prefix.
        target: u8,
    },
    /// Offset past the last derivable subnet.
    #[error("offset {offset} out of range: {base} holds {available} /{target} subnets")]
    OffsetOutOfRange {
        /// Block being divided.
        base: Ipv4,
        /// Requested subnet prefix.
        target: u8,
        /// Zero-based offset requested.
        offset: u32,
        /// Number of subnets the block holds.
        available: u64,
    },
}

/// Fatal failures of an environment build. None are retried.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    /// Fewer than two distinct availability zones.
    #[error("region {region} reports {found} usable availability zone(s), two are required")]
    Capacity { region: String, found: usize },
    /// The engine rejected or failed a request.
    #[error("failed to declare {what} '{logical_name}': {source}")]
    Declaration {
        what: String,
        logical_name: String,
        #[source]
        source: EngineError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TopologyError {
    /// Wrap an engine error raised while handling `logical_name`.
    pub fn declaration(what: impl ToString, logical_name: &str, source: EngineError) -> Self {
        TopologyError::Declaration {
            what: what.to_string(),
            logical_name: logical_name.to_string(),
            source,
        }
    }
}
