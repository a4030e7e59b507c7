//! Resource tags.

use crate::models::{Attr, Environment};
use std::collections::BTreeMap;

/// Value of the `ManagedBy` tag.
pub const MANAGED_BY: &str = "vpc-topology";

/// Base tags for `environment` plus `Name` for the resource.
///
/// `resource_name` is the full logical name, e.g. `dev-public-subnet1`.
pub fn tags_for(environment: &Environment, resource_name: &str) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    tags.insert("Environment".to_string(), environment.name().to_string());
    tags.insert("ManagedBy".to_string(), MANAGED_BY.to_string());
    // per-resource override wins
    tags.insert("Name".to_string(), resource_name.to_string());
    tags
}

/// [`tags_for`] as a declaration attribute.
pub fn tags_attr(environment: &Environment, resource_name: &str) -> Attr {
    Attr::Map(
        tags_for(environment, resource_name)
            .into_iter()
            .map(|(k, v)| (k, Attr::Text(v)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ipv4;

    #[test]
    fn test_tags_for() {
        let env = Environment::new("prod", Ipv4::new("10.1.0.0/16").unwrap()).unwrap();
        let tags = tags_for(&env, "prod-igw");
        assert_eq!(tags.len(), 3);
        assert_eq!(tags["Name"], "prod-igw");
        assert_eq!(tags["Environment"], "prod");
        assert_eq!(tags["ManagedBy"], MANAGED_BY);
    }

    #[test]
    fn test_tags_attr_is_map_of_text() {
        let env = Environment::new("dev", Ipv4::new("10.0.0.0/16").unwrap()).unwrap();
        match tags_attr(&env, "dev-vpc") {
            Attr::Map(map) => assert_eq!(map["Name"], Attr::from("dev-vpc")),
            other => panic!("expected map, got {other:?}"),
        }
    }
}
