//! Terminal output utilities.

use crate::engine::{ExportValue, Plan};
use crate::topology::EnvironmentTopology;
use colored::Colorize;

/// Format a value as a quoted, right-aligned field.
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let quoted = format!("\"{}\"", value.to_string());
    if quoted.len() >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}

fn export_text(value: &ExportValue) -> String {
    match value {
        ExportValue::Id(id) => id.clone(),
        ExportValue::Ids(ids) => format!("[{}]", ids.join(", ")),
    }
}

/// Lines describing one environment, without colour codes.
pub fn topology_lines(topology: &EnvironmentTopology) -> Vec<String> {
    let mut lines = vec![format!(
        "ENV: '{}' {} zones: {}",
        topology.environment.name(),
        topology.environment.block(),
        topology.zones
    )];
    lines.push(format!("  vpc      {}", topology.vpc.id));

    for subnet in topology
        .public_subnets
        .iter()
        .chain(topology.private_subnets.iter())
    {
        lines.push(format!(
            "  {:<8} {} {} {}",
            subnet.descriptor.tier.to_string(),
            format_field(subnet.descriptor.cidr, 16),
            format_field(&subnet.descriptor.zone, 14),
            subnet.handle.id
        ));
    }
    for nat in &topology.nat_gateways {
        lines.push(format!(
            "  nat      {} {} via {}",
            format_field(&nat.zone, 14),
            nat.handle.id,
            nat.subnet.logical_name
        ));
    }
    for (key, value) in &topology.exports {
        lines.push(format!("  export {key} = {}", export_text(value)));
    }
    lines
}

/// Print one environment to stdout.
pub fn print_topology(topology: &EnvironmentTopology) {
    for (i, line) in topology_lines(topology).iter().enumerate() {
        if i == 0 {
            println!("{}", line.bold());
        } else {
            println!("{line}");
        }
    }
}

/// Print resource counts of a plan.
pub fn print_plan_summary(plan: &Plan) {
    println!(
        "{} {} resources in {}",
        "PLAN".on_blue(),
        plan.resources.len(),
        plan.region
    );
    for (kind, count) in plan.summary() {
        println!("  {count:>3} x {kind}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_field_short() {
        assert_eq!(format_field("us-west-2a", 14), "  \"us-west-2a\"");
    }

    #[test]
    fn test_format_field_long() {
        assert_eq!(format_field("10.0.1.0/24", 5), "\"10.0.1.0/24\"");
    }

    #[test]
    fn test_export_text() {
        assert_eq!(export_text(&ExportValue::Id("vpc-1".to_string())), "vpc-1");
        assert_eq!(
            export_text(&ExportValue::Ids(vec!["a".to_string(), "b".to_string()])),
            "[a, b]"
        );
    }
}
