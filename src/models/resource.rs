//! Declared resources and the dependency graph between them.
//!
//! A [`Declaration`] depends on another resource either explicitly (its
//! `depends_on` list) or implicitly, by referencing it from an attribute.
//! [`ResourceGraph`] keeps declarations in insertion order and derives the
//! creation order from both kinds of edge.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

/// Resource types the topology declares.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Vpc,
    Subnet,
    InternetGateway,
    ElasticIp,
    NatGateway,
    RouteTable,
    RouteTableAssociation,
    Route,
    SecurityGroup,
}

impl ResourceKind {
    /// Prefix used for provider-style identifiers (`vpc-…`, `nat-…`).
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ResourceKind::Vpc => "vpc",
            ResourceKind::Subnet => "subnet",
            ResourceKind::InternetGateway => "igw",
            ResourceKind::ElasticIp => "eipalloc",
            ResourceKind::NatGateway => "nat",
            ResourceKind::RouteTable => "rtb",
            ResourceKind::RouteTableAssociation => "rtbassoc",
            ResourceKind::Route => "r",
            ResourceKind::SecurityGroup => "sg",
        }
    }

    /// Whether the resource accepts a `tags` attribute.
    pub fn is_taggable(&self) -> bool {
        !matches!(
            self,
            ResourceKind::RouteTableAssociation | ResourceKind::Route
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Vpc => "VPC",
            ResourceKind::Subnet => "subnet",
            ResourceKind::InternetGateway => "internet gateway",
            ResourceKind::ElasticIp => "elastic IP",
            ResourceKind::NatGateway => "NAT gateway",
            ResourceKind::RouteTable => "route table",
            ResourceKind::RouteTableAssociation => "route table association",
            ResourceKind::Route => "route",
            ResourceKind::SecurityGroup => "security group",
        };
        f.write_str(name)
    }
}

/// Handle returned by the engine for a declared resource.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    pub kind: ResourceKind,
    pub logical_name: String,
    pub id: String,
}

/// Reference to another resource's id, resolved by the engine.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    #[serde(rename = "ref")]
    pub logical_name: String,
}

/// Attribute value of a declaration.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Attr {
    Ref(ResourceRef),
    Text(String),
    Flag(bool),
    Number(i64),
    List(Vec<Attr>),
    Map(BTreeMap<String, Attr>),
}

pub type Attributes = BTreeMap<String, Attr>;

impl Attr {
    /// Reference to the id of `handle`.
    pub fn reference(handle: &ResourceHandle) -> Attr {
        Attr::Ref(ResourceRef {
            logical_name: handle.logical_name.clone(),
        })
    }

    /// Logical names of every resource referenced from this value.
    pub fn references<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Attr::Ref(r) => {
                out.insert(&r.logical_name);
            }
            Attr::List(items) => items.iter().for_each(|a| a.references(out)),
            Attr::Map(map) => map.values().for_each(|a| a.references(out)),
            Attr::Text(_) | Attr::Flag(_) | Attr::Number(_) => {}
        }
    }
}

impl From<&str> for Attr {
    fn from(value: &str) -> Self {
        Attr::Text(value.to_string())
    }
}

impl From<String> for Attr {
    fn from(value: String) -> Self {
        Attr::Text(value)
    }
}

impl From<bool> for Attr {
    fn from(value: bool) -> Self {
        Attr::Flag(value)
    }
}

impl From<i64> for Attr {
    fn from(value: i64) -> Self {
        Attr::Number(value)
    }
}

impl From<super::Ipv4> for Attr {
    fn from(value: super::Ipv4) -> Self {
        Attr::Text(value.to_string())
    }
}

/// One declared resource as recorded by an engine.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: ResourceKind,
    pub logical_name: String,
    pub id: String,
    pub attributes: Attributes,
    pub depends_on: Vec<String>,
}

impl Declaration {
    /// Explicit and attribute-implied dependencies, deduplicated.
    pub fn dependencies(&self) -> BTreeSet<&str> {
        let mut deps: BTreeSet<&str> = self.depends_on.iter().map(String::as_str).collect();
        for attr in self.attributes.values() {
            attr.references(&mut deps);
        }
        deps
    }

    pub fn handle(&self) -> ResourceHandle {
        ResourceHandle {
            kind: self.kind,
            logical_name: self.logical_name.clone(),
            id: self.id.clone(),
        }
    }
}

/// Graph construction failures.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum GraphError {
    #[error("resource '{0}' is already declared")]
    Duplicate(String),
    #[error("resource '{logical_name}' depends on undeclared resource '{missing}'")]
    UnknownDependency {
        logical_name: String,
        missing: String,
    },
    #[error("dependency cycle through {0:?}")]
    Cycle(Vec<String>),
}

/// Declarations plus the dependency edges between them.
#[derive(Debug, Default, Clone)]
pub struct ResourceGraph {
    declarations: Vec<Declaration>,
    index: HashMap<String, usize>,
}

impl ResourceGraph {
    pub fn new() -> ResourceGraph {
        ResourceGraph::default()
    }

    /// Build a graph from declarations in any order, rejecting cycles.
    pub fn from_declarations(declarations: Vec<Declaration>) -> Result<ResourceGraph, GraphError> {
        let mut graph = ResourceGraph::new();
        for decl in declarations {
            if graph.index.contains_key(&decl.logical_name) {
                return Err(GraphError::Duplicate(decl.logical_name));
            }
            graph
                .index
                .insert(decl.logical_name.clone(), graph.declarations.len());
            graph.declarations.push(decl);
        }
        for decl in &graph.declarations {
            graph.check_dependencies_known(decl)?;
        }
        graph.topological_order()?;
        Ok(graph)
    }

    /// Append a declaration. Every dependency must already be present, so a
    /// graph grown only through `insert` can never contain a cycle.
    pub fn insert(&mut self, decl: Declaration) -> Result<(), GraphError> {
        if self.index.contains_key(&decl.logical_name) {
            return Err(GraphError::Duplicate(decl.logical_name));
        }
        self.check_dependencies_known(&decl)?;
        self.index
            .insert(decl.logical_name.clone(), self.declarations.len());
        self.declarations.push(decl);
        Ok(())
    }

    fn check_dependencies_known(&self, decl: &Declaration) -> Result<(), GraphError> {
        match decl
            .dependencies()
            .into_iter()
            .find(|dep| !self.index.contains_key(*dep))
        {
            Some(missing) => Err(GraphError::UnknownDependency {
                logical_name: decl.logical_name.clone(),
                missing: missing.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn get(&self, logical_name: &str) -> Option<&Declaration> {
        self.index.get(logical_name).map(|&i| &self.declarations[i])
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Declarations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    pub fn by_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(move |d| d.kind == kind)
    }

    /// Creation order (Kahn's algorithm, ties broken by insertion order).
    pub fn topological_order(&self) -> Result<Vec<&Declaration>, GraphError> {
        let n = self.declarations.len();
        let mut in_degree = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (i, decl) in self.declarations.iter().enumerate() {
            for dep in decl.dependencies() {
                if let Some(&j) = self.index.get(dep) {
                    in_degree[i] += 1;
                    dependents[j].push(i);
                }
            }
        }

        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(i) = ready.pop_first() {
            order.push(&self.declarations[i]);
            for &k in &dependents[i] {
                in_degree[k] -= 1;
                if in_degree[k] == 0 {
                    ready.insert(k);
                }
            }
        }

        if order.len() != n {
            let stuck = (0..n)
                .filter(|&i| in_degree[i] > 0)
                .map(|i| self.declarations[i].logical_name.clone())
                .collect();
            return Err(GraphError::Cycle(stuck));
        }
        Ok(order)
    }

    /// Destruction order: creation order reversed.
    pub fn destruction_order(&self) -> Result<Vec<&Declaration>, GraphError> {
        let mut order = self.topological_order()?;
        order.reverse();
        Ok(order)
    }
}
