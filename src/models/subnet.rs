//! Subnet descriptors and the offset layout they are allocated from.

use super::Ipv4;
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a subnet routes through the Internet Gateway or a NAT Gateway.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubnetTier {
    Public,
    Private,
}

impl fmt::Display for SubnetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubnetTier::Public => write!(f, "public"),
            SubnetTier::Private => write!(f, "private"),
        }
    }
}

/// A subnet derived from an environment's network block.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SubnetDescriptor {
    /// Public or private.
    pub tier: SubnetTier,
    /// Derived `/24` block.
    pub cidr: Ipv4,
    /// Availability zone the subnet is placed in.
    pub zone: String,
    /// Zero-based offset the block was allocated at.
    pub offset: u32,
    /// 1 for the first zone, 2 for the second.
    pub ordinal: usize,
}

impl SubnetDescriptor {
    /// Resource suffix, e.g. `public-subnet1`.
    pub fn resource_name(&self) -> String {
        format!("{}-subnet{}", self.tier, self.ordinal)
    }
}

/// Allocation offsets for the two public and two private subnets.
///
/// Entry `i` of each array is placed in zone `i`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubnetLayout {
    pub public: [u32; 2],
    pub private: [u32; 2],
}

impl Default for SubnetLayout {
    fn default() -> Self {
        SubnetLayout {
            public: [1, 2],
            private: [3, 4],
        }
    }
}

impl SubnetLayout {
    /// All four offsets must differ, otherwise two subnets would collide.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let offsets = [self.public[0], self.public[1], self.private[0], self.private[1]];
        for (i, a) in offsets.iter().enumerate() {
            if offsets[i + 1..].contains(a) {
                return Err(ConfigError::Layout(*a));
            }
        }
        Ok(())
    }

    /// Offsets paired with their tier, in declaration order.
    pub fn offsets(&self) -> [(SubnetTier, usize, u32); 4] {
        [
            (SubnetTier::Public, 1, self.public[0]),
            (SubnetTier::Public, 2, self.public[1]),
            (SubnetTier::Private, 1, self.private[0]),
            (SubnetTier::Private, 2, self.private[1]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_valid() {
        let layout = SubnetLayout::default();
        assert!(layout.validate().is_ok());
        let offsets: Vec<u32> = layout.offsets().iter().map(|(_, _, o)| *o).collect();
        assert_eq!(offsets, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_layout_rejects_shared_offset() {
        let layout = SubnetLayout {
            public: [10, 11],
            private: [20, 10],
        };
        assert!(matches!(layout.validate(), Err(ConfigError::Layout(10))));
    }

    #[test]
    fn test_resource_name() {
        let subnet = SubnetDescriptor {
            tier: SubnetTier::Private,
            cidr: Ipv4::new("10.0.3.0/24").unwrap(),
            zone: "us-west-2a".to_string(),
            offset: 3,
            ordinal: 1,
        };
        assert_eq!(subnet.resource_name(), "private-subnet1");
    }
}
