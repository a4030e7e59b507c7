//! In-memory provisioning engine.
//!
//! Records every declaration into a [`ResourceGraph`] and hands out
//! provider-style ids. The recorded graph and exports become a [`Plan`]
//! for the real engine to apply.

use super::{EngineError, ExportValue, Plan, ProvisioningEngine, ZoneFilter};
use crate::models::{Attributes, ResourceGraph, ResourceHandle, ResourceKind};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};

/// Engine that records declarations instead of applying them.
#[derive(Debug)]
pub struct RecordingEngine {
    region: String,
    zones: Vec<String>,
    graph: ResourceGraph,
    exports: BTreeMap<String, ExportValue>,
    next_id: u32,
    rejections: HashMap<ResourceKind, String>,
    zone_queries: usize,
}

impl RecordingEngine {
    /// Engine for `region` reporting `zones` as available.
    pub fn new(region: &str, zones: Vec<String>) -> RecordingEngine {
        RecordingEngine {
            region: region.to_string(),
            zones,
            graph: ResourceGraph::new(),
            exports: BTreeMap::new(),
            next_id: 0,
            rejections: HashMap::new(),
            zone_queries: 0,
        }
    }

    /// Refuse every declaration of `kind` with `reason`.
    pub fn reject(mut self, kind: ResourceKind, reason: &str) -> RecordingEngine {
        self.rejections.insert(kind, reason.to_string());
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn exports(&self) -> &BTreeMap<String, ExportValue> {
        &self.exports
    }

    /// Number of zone queries served so far.
    pub fn zone_queries(&self) -> usize {
        self.zone_queries
    }

    /// Snapshot of everything recorded, in creation order.
    pub fn plan(&self, generated_at: &str) -> Result<Plan, EngineError> {
        Plan::from_graph(&self.region, generated_at, &self.graph, &self.exports)
    }

    fn allocate_id(&mut self, kind: ResourceKind) -> String {
        self.next_id += 1;
        format!("{}-{:08x}", kind.id_prefix(), self.next_id)
    }
}

#[async_trait]
impl ProvisioningEngine for RecordingEngine {
    async fn declare(
        &mut self,
        kind: ResourceKind,
        logical_name: &str,
        attributes: Attributes,
        depends_on: &[ResourceHandle],
    ) -> Result<ResourceHandle, EngineError> {
        if let Some(reason) = self.rejections.get(&kind) {
            log::warn!("Rejecting {kind} '{logical_name}': {reason}");
            return Err(EngineError::Rejected {
                kind,
                reason: reason.clone(),
            });
        }

        let id = self.allocate_id(kind);
        let declaration = crate::models::Declaration {
            kind,
            logical_name: logical_name.to_string(),
            id,
            attributes,
            depends_on: depends_on.iter().map(|h| h.logical_name.clone()).collect(),
        };
        let handle = declaration.handle();
        self.graph.insert(declaration)?;
        log::trace!("recorded {kind} '{logical_name}' as {}", handle.id);
        Ok(handle)
    }

    async fn list_availability_zones(
        &mut self,
        filter: &ZoneFilter,
    ) -> Result<Vec<String>, EngineError> {
        self.zone_queries += 1;
        if filter.region != self.region {
            log::warn!(
                "Zone query for region {} on engine for {}",
                filter.region,
                self.region
            );
            return Ok(Vec::new());
        }
        Ok(self.zones.clone())
    }

    async fn export(&mut self, key: &str, value: ExportValue) -> Result<(), EngineError> {
        if self.exports.contains_key(key) {
            return Err(EngineError::DuplicateExport(key.to_string()));
        }
        self.exports.insert(key.to_string(), value);
        Ok(())
    }
}
