//! Output formatting for built topologies.
//!
//! This module handles reporting what was declared:
//! - [`terminal`] - Coloured summary on stdout
//! - [`json`] - Plan document written to disk

mod json;
mod terminal;

pub use json::{plan_file_name, write_plan};
pub use terminal::{format_field, print_plan_summary, print_topology, topology_lines};
