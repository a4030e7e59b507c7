//! Security-group rule sets.

use crate::models::{Attr, Ipv4};
use serde::Serialize;
use std::fmt;

/// Rule protocol. `All` is written as `-1` for the provider.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    #[serde(rename = "tcp")]
    Tcp,
    #[serde(rename = "-1")]
    All,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::All => write!(f, "-1"),
        }
    }
}

/// One allow rule.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecurityRule {
    pub protocol: Protocol,
    pub from_port: u16,
    pub to_port: u16,
    pub cidr_blocks: Vec<Ipv4>,
}

impl SecurityRule {
    pub fn tcp(port: u16, source: Ipv4) -> SecurityRule {
        SecurityRule::tcp_range(port, port, source)
    }

    pub fn tcp_range(from_port: u16, to_port: u16, source: Ipv4) -> SecurityRule {
        SecurityRule {
            protocol: Protocol::Tcp,
            from_port,
            to_port,
            cidr_blocks: vec![source],
        }
    }

    /// Every protocol and port to `target`.
    pub fn all_traffic(target: Ipv4) -> SecurityRule {
        SecurityRule {
            protocol: Protocol::All,
            from_port: 0,
            to_port: 0,
            cidr_blocks: vec![target],
        }
    }

    pub fn to_attr(&self) -> Attr {
        Attr::Map(
            [
                ("protocol", Attr::from(self.protocol.to_string())),
                ("from_port", Attr::from(i64::from(self.from_port))),
                ("to_port", Attr::from(i64::from(self.to_port))),
                (
                    "cidr_blocks",
                    Attr::List(self.cidr_blocks.iter().map(|c| Attr::from(*c)).collect()),
                ),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        )
    }
}

impl fmt::Display for SecurityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<String> = self.cidr_blocks.iter().map(|c| c.to_string()).collect();
        match self.protocol {
            Protocol::All => write!(f, "all from {}", sources.join(",")),
            Protocol::Tcp if self.from_port == self.to_port => {
                write!(f, "tcp/{} from {}", self.from_port, sources.join(","))
            }
            Protocol::Tcp => write!(
                f,
                "tcp/{}-{} from {}",
                self.from_port,
                self.to_port,
                sources.join(",")
            ),
        }
    }
}

/// A security group before it is declared.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroupSpec {
    /// Resource suffix, `public-sg` or `private-sg`.
    pub resource: String,
    pub description: String,
    pub ingress: Vec<SecurityRule>,
    pub egress: Vec<SecurityRule>,
}

/// HTTP and HTTPS from anywhere.
pub fn public_group() -> SecurityGroupSpec {
    SecurityGroupSpec {
        resource: "public-sg".to_string(),
        description: "Allow HTTP and HTTPS inbound".to_string(),
        ingress: vec![
            SecurityRule::tcp(80, Ipv4::ANY),
            SecurityRule::tcp(443, Ipv4::ANY),
        ],
        egress: vec![SecurityRule::all_traffic(Ipv4::ANY)],
    }
}

/// Full TCP port range, only from the environment's own block.
pub fn private_group(block: Ipv4) -> SecurityGroupSpec {
    SecurityGroupSpec {
        resource: "private-sg".to_string(),
        description: "Allow internal service-to-service communication".to_string(),
        ingress: vec![SecurityRule::tcp_range(0, u16::MAX, block)],
        egress: vec![SecurityRule::all_traffic(Ipv4::ANY)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_rules() {
        let sg = public_group();
        let ingress: Vec<String> = sg.ingress.iter().map(|r| r.to_string()).collect();
        assert_eq!(ingress, vec!["tcp/80 from 0.0.0.0/0", "tcp/443 from 0.0.0.0/0"]);
        assert_eq!(sg.egress[0].to_string(), "all from 0.0.0.0/0");
    }

    #[test]
    fn test_private_rules_scoped_to_block() {
        let block = Ipv4::new("10.1.0.0/16").unwrap();
        let sg = private_group(block);
        assert_eq!(sg.ingress.len(), 1);
        assert_eq!(sg.ingress[0].to_string(), "tcp/0-65535 from 10.1.0.0/16");
    }

    #[test]
    fn test_rule_attr_shape() {
        let json = serde_json::to_value(SecurityRule::all_traffic(Ipv4::ANY).to_attr()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "protocol": "-1",
                "from_port": 0,
                "to_port": 0,
                "cidr_blocks": ["0.0.0.0/0"]
            })
        );
    }
}
