//! Stack configuration.
//!
//! Read from a JSON file (`stack.json` unless `VPC_TOPOLOGY_CONFIG` points
//! elsewhere). A missing file falls back to the defaults: `dev` on
//! `10.0.0.0/16` and `prod` on `10.1.0.0/16` in `us-west-2`.

use crate::error::AllocationError;
use crate::models::{Environment, Ipv4, SubnetLayout};
use crate::topology::{BuildSettings, ZoneOrder};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "stack.json";
/// Env var overriding the config file path.
pub const CONFIG_ENV: &str = "VPC_TOPOLOGY_CONFIG";
/// Env var overriding the region.
pub const REGION_ENV: &str = "VPC_TOPOLOGY_REGION";
/// Block used when an environment does not name one.
pub const DEFAULT_CIDR_BLOCK: &str = "10.0.0.0/16";
pub const DEFAULT_REGION: &str = "us-west-2";

/// Configuration problems. All are detected before any declaration.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("invalid environment name '{0}': use lowercase letters, digits and '-', starting with a letter")]
    InvalidName(String),
    #[error("environment '{0}' is configured more than once")]
    DuplicateEnvironment(String),
    #[error("environment blocks overlap: {first} and {second}")]
    OverlappingBlocks { first: String, second: String },
    #[error("invalid cidr_block for environment '{name}': {source}")]
    Block {
        name: String,
        #[source]
        source: AllocationError,
    },
    #[error("no environments configured")]
    NoEnvironments,
    #[error("subnet layout uses offset {0} more than once")]
    Layout(u32),
    #[error("cannot load config {path}: {message}")]
    Load { path: String, message: String },
}

/// One `environments` entry.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    pub name: String,
    #[serde(default = "default_cidr_block")]
    pub cidr_block: String,
}

fn default_cidr_block() -> String {
    DEFAULT_CIDR_BLOCK.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_environments() -> Vec<EnvironmentConfig> {
    vec![
        EnvironmentConfig {
            name: "dev".to_string(),
            cidr_block: "10.0.0.0/16".to_string(),
        },
        EnvironmentConfig {
            name: "prod".to_string(),
            cidr_block: "10.1.0.0/16".to_string(),
        },
    ]
}

fn default_plan_dir() -> String {
    ".".to_string()
}

/// Per-stack configuration.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StackConfig {
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_environments")]
    pub environments: Vec<EnvironmentConfig>,
    /// Static zone list; when absent zones are discovered through the CLI.
    #[serde(default)]
    pub zones: Option<Vec<String>>,
    #[serde(default)]
    pub zone_order: ZoneOrder,
    #[serde(default)]
    pub subnet_layout: SubnetLayout,
    /// Directory plan documents are written to.
    #[serde(default = "default_plan_dir")]
    pub plan_dir: String,
}

impl Default for StackConfig {
    fn default() -> Self {
        StackConfig {
            region: default_region(),
            environments: default_environments(),
            zones: None,
            zone_order: ZoneOrder::default(),
            subnet_layout: SubnetLayout::default(),
            plan_dir: default_plan_dir(),
        }
    }
}

impl StackConfig {
    /// Parse a JSON document, reporting the path of the offending field.
    pub fn from_json(json: &str) -> Result<StackConfig, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|e| ConfigError::Load {
            path: e.path().to_string(),
            message: e.inner().to_string(),
        })
    }

    /// Load `path`, or the defaults when the file does not exist.
    pub fn load(path: &str) -> Result<StackConfig, ConfigError> {
        if !Path::new(path).exists() {
            log::warn!("Config file not found: {path}, using defaults");
            return Ok(StackConfig::default());
        }
        log::info!("Reading config file: {path}");
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Load {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        StackConfig::from_json(&json).map_err(|e| match e {
            ConfigError::Load { path: field, message } => ConfigError::Load {
                path: path.to_string(),
                message: format!("at '{field}': {message}"),
            },
            other => other,
        })
    }

    /// Load from the file named by `VPC_TOPOLOGY_CONFIG` and apply
    /// `VPC_TOPOLOGY_REGION`.
    pub fn from_env() -> Result<StackConfig, ConfigError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = StackConfig::load(&path)?;
        if let Ok(region) = std::env::var(REGION_ENV) {
            log::info!("Region overridden by {REGION_ENV}: {region}");
            config.region = region;
        }
        Ok(config)
    }

    /// Validated environments, in configured order.
    pub fn environments(&self) -> Result<Vec<Environment>, ConfigError> {
        self.environments
            .iter()
            .map(|e| {
                let block = Ipv4::new(&e.cidr_block).map_err(|source| ConfigError::Block {
                    name: e.name.clone(),
                    source,
                })?;
                Environment::new(&e.name, block)
            })
            .collect()
    }

    pub fn settings(&self) -> Result<BuildSettings, ConfigError> {
        self.subnet_layout.validate()?;
        Ok(BuildSettings {
            region: self.region.clone(),
            zone_order: self.zone_order,
            layout: self.subnet_layout.clone(),
        })
    }
}
