//! Plan document handed to the external engine.

use super::{EngineError, ExportValue};
use crate::models::{Attributes, ResourceGraph, ResourceKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// One resource in creation order.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PlannedResource {
    pub kind: ResourceKind,
    pub logical_name: String,
    pub id: String,
    pub attributes: Attributes,
    /// Explicit and attribute-implied dependencies.
    pub depends_on: Vec<String>,
}

/// Everything recorded during a run.
#[derive(Serialize, Debug, Clone)]
pub struct Plan {
    pub generated_at: String,
    pub region: String,
    pub resources: Vec<PlannedResource>,
    pub exports: BTreeMap<String, ExportValue>,
}

impl Plan {
    pub fn from_graph(
        region: &str,
        generated_at: &str,
        graph: &ResourceGraph,
        exports: &BTreeMap<String, ExportValue>,
    ) -> Result<Plan, EngineError> {
        let resources = graph
            .topological_order()?
            .into_iter()
            .map(|d| PlannedResource {
                kind: d.kind,
                logical_name: d.logical_name.clone(),
                id: d.id.clone(),
                attributes: d.attributes.clone(),
                depends_on: d.dependencies().into_iter().map(str::to_string).collect(),
            })
            .collect();

        Ok(Plan {
            generated_at: generated_at.to_string(),
            region: region.to_string(),
            resources,
            exports: exports.clone(),
        })
    }

    /// Count of planned resources per kind.
    pub fn summary(&self) -> BTreeMap<ResourceKind, usize> {
        let mut counts = BTreeMap::new();
        for r in &self.resources {
            *counts.entry(r.kind).or_insert(0) += 1;
        }
        counts
    }
}
