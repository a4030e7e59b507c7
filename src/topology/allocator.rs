//! CIDR subnet allocation.
//!
//! Subnets are enumerated from the network address of the base block in
//! ascending order. Offsets are zero-based: offset 0 is the first subnet,
//! so `10.0.0.0/16` at offset 1 gives `10.0.1.0/24`.

use crate::error::AllocationError;
use crate::models::{Ipv4, SubnetDescriptor, SubnetLayout, MAX_LENGTH};
use crate::topology::ZonePair;
use std::net::Ipv4Addr;

/// Prefix length of every subnet the topology declares.
pub const SUBNET_PREFIX: u8 = 24;

/// Number of `/prefix` subnets derivable from `base`.
pub fn subnet_count(base: &Ipv4, prefix: u8) -> Result<u64, AllocationError> {
    if prefix > MAX_LENGTH {
        return Err(AllocationError::PrefixTooLong(prefix));
    }
    if prefix < base.prefix() {
        return Err(AllocationError::PrefixTooShort {
            base: *base,
            target: prefix,
        });
    }
    Ok(base.size() >> (MAX_LENGTH - prefix))
}

/// The `/prefix` subnet at `offset` within `base`.
pub fn allocate_subnet_with_prefix(
    base: &Ipv4,
    prefix: u8,
    offset: u32,
) -> Result<Ipv4, AllocationError> {
    let available = subnet_count(base, prefix)?;
    if u64::from(offset) >= available {
        return Err(AllocationError::OffsetOutOfRange {
            base: *base,
            target: prefix,
            offset,
            available,
        });
    }

    let step = 1u64 << (MAX_LENGTH - prefix);
    let start = u64::from(u32::from(base.lo())) + u64::from(offset) * step;
    // start <= base.hi() because offset < available
    Ipv4::from_parts(Ipv4Addr::from(start as u32), prefix)
}

/// The `/24` subnet at `offset` within `base`.
pub fn allocate_subnet(base: &Ipv4, offset: u32) -> Result<Ipv4, AllocationError> {
    allocate_subnet_with_prefix(base, SUBNET_PREFIX, offset)
}

/// Same as [`allocate_subnet`], parsing the base block first.
pub fn allocate_subnet_str(base: &str, offset: u32) -> Result<Ipv4, AllocationError> {
    allocate_subnet(&Ipv4::new(base)?, offset)
}

/// Derive the four subnet descriptors of an environment.
///
/// Entry 1 of each tier goes to the primary zone, entry 2 to the secondary.
pub fn plan_subnets(
    base: &Ipv4,
    layout: &SubnetLayout,
    zones: &ZonePair,
) -> Result<Vec<SubnetDescriptor>, AllocationError> {
    layout
        .offsets()
        .into_iter()
        .map(|(tier, ordinal, offset)| {
            Ok(SubnetDescriptor {
                tier,
                cidr: allocate_subnet(base, offset)?,
                zone: zones.zone(ordinal).to_string(),
                offset,
                ordinal,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubnetTier;
    use itertools::Itertools;

    fn block(s: &str) -> Ipv4 {
        Ipv4::new(s).unwrap()
    }

    #[test]
    fn test_known_offsets() {
        assert_eq!(
            allocate_subnet_str("10.0.0.0/16", 1).unwrap(),
            block("10.0.1.0/24")
        );
        assert_eq!(
            allocate_subnet_str("10.0.0.0/16", 4).unwrap(),
            block("10.0.4.0/24")
        );
        assert_eq!(
            allocate_subnet_str("10.0.0.0/16", 0).unwrap(),
            block("10.0.0.0/24")
        );
        assert_eq!(
            allocate_subnet_str("10.1.0.0/16", 255).unwrap(),
            block("10.1.255.0/24")
        );
    }

    #[test]
    fn test_offsets_are_disjoint_and_contained() {
        for base in ["10.0.0.0/16", "10.1.0.0/16", "172.16.0.0/16", "192.168.0.0/16"] {
            let base = block(base);
            let subnets: Vec<Ipv4> = (1..=4)
                .map(|k| allocate_subnet(&base, k).unwrap())
                .collect();
            for s in &subnets {
                assert!(base.contains(s), "{s} outside {base}");
                assert_eq!(s.prefix(), SUBNET_PREFIX);
            }
            for (a, b) in subnets.iter().tuple_combinations() {
                assert!(!a.overlaps(b), "{a} overlaps {b}");
            }
        }
    }

    #[test]
    fn test_every_slash16_gives_disjoint_contained_subnets() {
        let layout = SubnetLayout::default();
        let zones = ZonePair::new("a", "b");
        for high in 0..=u16::MAX {
            let base = Ipv4::from_parts(Ipv4Addr::from(u32::from(high) << 16), 16).unwrap();
            let subnets = plan_subnets(&base, &layout, &zones).unwrap();
            assert_eq!(subnets.len(), 4);
            for s in &subnets {
                assert!(base.contains(&s.cidr), "{} outside {base}", s.cidr);
            }
            for (a, b) in subnets.iter().tuple_combinations() {
                assert!(!a.cidr.overlaps(&b.cidr), "{} overlaps {}", a.cidr, b.cidr);
            }
        }
    }

    #[test]
    fn test_host_bits_in_base_are_ignored() {
        assert_eq!(
            allocate_subnet_str("10.0.55.7/16", 2).unwrap(),
            block("10.0.2.0/24")
        );
    }

    #[test]
    fn test_offset_out_of_range() {
        assert_eq!(
            allocate_subnet_str("10.0.0.0/16", 256).unwrap_err(),
            AllocationError::OffsetOutOfRange {
                base: block("10.0.0.0/16"),
                target: 24,
                offset: 256,
                available: 256,
            }
        );
        assert!(allocate_subnet_str("10.0.0.0/22", 4).is_err());
        assert!(allocate_subnet_str("10.0.0.0/24", 0).is_ok());
    }

    #[test]
    fn test_bad_base_blocks() {
        assert!(matches!(
            allocate_subnet_str("10.0.0.0", 1),
            Err(AllocationError::MalformedBlock(_))
        ));
        assert!(matches!(
            allocate_subnet_str("10.0.0.0/25", 0),
            Err(AllocationError::PrefixTooShort { target: 24, .. })
        ));
        assert!(matches!(
            allocate_subnet_with_prefix(&block("10.0.0.0/16"), 33, 0),
            Err(AllocationError::PrefixTooLong(33))
        ));
    }

    #[test]
    fn test_top_of_address_space() {
        let base = block("255.255.0.0/16");
        assert_eq!(
            allocate_subnet(&base, 255).unwrap(),
            block("255.255.255.0/24")
        );
        assert_eq!(subnet_count(&Ipv4::ANY, 24).unwrap(), 1 << 24);
        assert_eq!(subnet_count(&Ipv4::ANY, 32).unwrap(), 1u64 << 32);
        assert_eq!(subnet_count(&block("10.0.0.0/16"), 24).unwrap(), 256);
        assert_eq!(subnet_count(&block("10.0.7.0/24"), 24).unwrap(), 1);
    }

    #[test]
    fn test_plan_subnets_pairs_zones() {
        let zones = ZonePair::new("us-west-2a", "us-west-2b");
        let subnets =
            plan_subnets(&block("10.1.0.0/16"), &SubnetLayout::default(), &zones).unwrap();

        let summary: Vec<(SubnetTier, String, &str)> = subnets
            .iter()
            .map(|s| (s.tier, s.cidr.to_string(), s.zone.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (SubnetTier::Public, "10.1.1.0/24".to_string(), "us-west-2a"),
                (SubnetTier::Public, "10.1.2.0/24".to_string(), "us-west-2b"),
                (SubnetTier::Private, "10.1.3.0/24".to_string(), "us-west-2a"),
                (SubnetTier::Private, "10.1.4.0/24".to_string(), "us-west-2b"),
            ]
        );
    }
}
