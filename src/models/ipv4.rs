//! IPv4 address and CIDR notation utilities.
//!
//! Provides [`Ipv4`] for network blocks: parsing, bounds and the
//! containment checks the subnet allocator is built on.

use crate::error::AllocationError;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 subnet mask (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// IPv4 network block in CIDR notation.
///
/// The prefix length is always within `0..=32`; every constructor checks it.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    addr: Ipv4Addr,
    prefix: u8,
}

impl Ipv4 {
    /// `0.0.0.0/0`, the whole address space.
    pub const ANY: Ipv4 = Ipv4 {
        addr: Ipv4Addr::UNSPECIFIED,
        prefix: 0,
    };

    /// Create a new [`Ipv4`] from a CIDR string (e.g., "10.0.0.0/24").
    pub fn new(addr_cidr: &str) -> Result<Ipv4, AllocationError> {
        let addr_cidr = addr_cidr.trim();
        let malformed = || AllocationError::MalformedBlock(addr_cidr.to_string());

        let (addr, prefix) = addr_cidr.split_once('/').ok_or_else(malformed)?;
        let addr: Ipv4Addr = addr.parse().map_err(|_| malformed())?;
        let prefix: u8 = prefix.parse().map_err(|_| malformed())?;
        Ipv4::from_parts(addr, prefix)
    }

    /// Build a block from an address and prefix length.
    pub fn from_parts(addr: Ipv4Addr, prefix: u8) -> Result<Ipv4, AllocationError> {
        if prefix > MAX_LENGTH {
            return Err(AllocationError::PrefixTooLong(prefix));
        }
        Ok(Ipv4 { addr, prefix })
    }

    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    fn mask(&self) -> u32 {
        // prefix <= 32 holds for every constructed value
        let right_len = MAX_LENGTH - self.prefix;
        ((u32::MAX as u64 >> right_len) << right_len) as u32
    }

    /// Get the lowest (network) address in the block.
    pub fn lo(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) & self.mask())
    }

    /// Get the highest (broadcast) address in the block.
    pub fn hi(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.lo()) | !self.mask())
    }

    /// The same block with host bits cleared.
    pub fn network(&self) -> Ipv4 {
        Ipv4 {
            addr: self.lo(),
            prefix: self.prefix,
        }
    }

    /// True when the address carries no host bits.
    pub fn is_canonical(&self) -> bool {
        self.addr == self.lo()
    }

    /// Number of addresses in the block.
    pub fn size(&self) -> u64 {
        1u64 << (MAX_LENGTH - self.prefix)
    }

    /// True when `other` lies entirely inside this block.
    pub fn contains(&self, other: &Ipv4) -> bool {
        other.prefix >= self.prefix && self.lo() <= other.lo() && other.hi() <= self.hi()
    }

    /// True when the two blocks share at least one address.
    pub fn overlaps(&self, other: &Ipv4) -> bool {
        self.lo() <= other.hi() && other.lo() <= self.hi()
    }
}

impl FromStr for Ipv4 {
    type Err = AllocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ipv4::new(s)
    }
}

impl fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

impl Serialize for Ipv4 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ipv4 {
    fn deserialize<D>(deserializer: D) -> Result<Ipv4, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ipv4::new(&s).map_err(de::Error::custom)
    }
}
