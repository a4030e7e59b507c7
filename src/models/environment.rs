//! Deployment environment: a name plus the network block it owns.

use super::Ipv4;
use crate::config::ConfigError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Environment names become resource-name and export-key prefixes.
static NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_name_regex() -> &'static Regex {
    NAME_REGEX.get_or_init(|| Regex::new(r"^[a-z][a-z0-9-]{0,31}$").expect("Invalid Regex"))
}

/// One environment, e.g. `dev` on `10.0.0.0/16`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    name: String,
    block: Ipv4,
}

impl Environment {
    /// Validate the name and normalise the block to its network address.
    pub fn new(name: &str, block: Ipv4) -> Result<Environment, ConfigError> {
        if !get_name_regex().is_match(name) {
            return Err(ConfigError::InvalidName(name.to_string()));
        }
        if !block.is_canonical() {
            log::warn!(
                "Environment '{name}': block {block} has host bits set, using {}",
                block.network()
            );
        }
        Ok(Environment {
            name: name.to_string(),
            block: block.network(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn block(&self) -> Ipv4 {
        self.block
    }

    /// Logical resource name, `<env>-<resource>`.
    pub fn logical_name(&self, resource: &str) -> String {
        format!("{}-{}", self.name, resource)
    }

    /// Export key, `<env>_<suffix>`.
    pub fn export_key(&self, suffix: &str) -> String {
        format!("{}_{}", self.name, suffix)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(s: &str) -> Ipv4 {
        Ipv4::new(s).unwrap()
    }

    #[test]
    fn test_names() {
        let env = Environment::new("dev", block("10.0.0.0/16")).unwrap();
        assert_eq!(env.logical_name("vpc"), "dev-vpc");
        assert_eq!(env.export_key("vpc_id"), "dev_vpc_id");
        assert_eq!(env.to_string(), "dev [10.0.0.0/16]");
    }

    #[test]
    fn test_invalid_names() {
        for bad in ["", "Dev", "1prod", "dev env", "dev_1"] {
            assert!(
                matches!(
                    Environment::new(bad, block("10.0.0.0/16")),
                    Err(ConfigError::InvalidName(_))
                ),
                "'{bad}' should be rejected"
            );
        }
        assert!(Environment::new("prod-eu-2", block("10.0.0.0/16")).is_ok());
    }

    #[test]
    fn test_block_is_normalised() {
        let env = Environment::new("dev", block("10.0.7.9/16")).unwrap();
        assert_eq!(env.block().to_string(), "10.0.0.0/16");
    }
}
