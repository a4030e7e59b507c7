//! Domain models for the network topology.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`Ipv4`] - network block in CIDR notation
//! - [`Environment`] - environment name and its block
//! - [`SubnetDescriptor`] and [`SubnetLayout`] - derived subnets
//! - [`Declaration`] and [`ResourceGraph`] - declared resources and their edges

mod environment;
mod ipv4;
mod resource;
mod subnet;

// Re-export public types
pub use environment::Environment;
pub use ipv4::{Ipv4, MAX_LENGTH};
pub use resource::{
    Attr, Attributes, Declaration, GraphError, ResourceGraph, ResourceHandle, ResourceKind,
    ResourceRef,
};
pub use subnet::{SubnetDescriptor, SubnetLayout, SubnetTier};
