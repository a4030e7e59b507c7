//! Contract with the external provisioning engine.
//!
//! The builder only describes resources. Whatever implements
//! [`ProvisioningEngine`] owns planning, state, API calls and rollback.
//! - [`recording`] - in-memory engine that records a plan
//! - [`plan`] - serialisable plan document

mod plan;
mod recording;

use crate::models::{Attributes, GraphError, ResourceHandle, ResourceKind};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use plan::{Plan, PlannedResource};
pub use recording::RecordingEngine;

/// Zone state the builder asks for.
pub const ZONE_STATE_AVAILABLE: &str = "available";

/// Errors raised by an engine implementation.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// The engine refused to create the resource.
    #[error("{kind} rejected: {reason}")]
    Rejected { kind: ResourceKind, reason: String },
    #[error("export key '{0}' is already set")]
    DuplicateExport(String),
    #[error("availability zone query failed: {0}")]
    ZoneQuery(String),
}

/// Filter passed to [`ProvisioningEngine::list_availability_zones`].
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ZoneFilter {
    pub region: String,
    pub state: String,
}

impl ZoneFilter {
    /// Zones in `region` that are currently available.
    pub fn available_in(region: &str) -> ZoneFilter {
        ZoneFilter {
            region: region.to_string(),
            state: ZONE_STATE_AVAILABLE.to_string(),
        }
    }
}

/// Value of a stack export.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ExportValue {
    Id(String),
    Ids(Vec<String>),
}

impl ExportValue {
    pub fn ids(handles: &[&ResourceHandle]) -> ExportValue {
        ExportValue::Ids(handles.iter().map(|h| h.id.clone()).collect())
    }
}

/// Operations the builder requests from the provisioning engine.
#[async_trait]
pub trait ProvisioningEngine: Send {
    /// Declare one resource. `depends_on` lists edges no attribute implies.
    async fn declare(
        &mut self,
        kind: ResourceKind,
        logical_name: &str,
        attributes: Attributes,
        depends_on: &[ResourceHandle],
    ) -> Result<ResourceHandle, EngineError>;

    /// Zone names matching `filter`, in the order the platform returns them.
    async fn list_availability_zones(
        &mut self,
        filter: &ZoneFilter,
    ) -> Result<Vec<String>, EngineError>;

    /// Publish a named output for other stacks.
    async fn export(&mut self, key: &str, value: ExportValue) -> Result<(), EngineError>;
}
