//! Manifest-backed project graph
//!
//! Loads a project description from `depgauge.json` (or a `.toml` file)
//! and serves it through the provider traits.
//!
//! ```json
//! {
//!   "nodes": [
//!     {
//!       "id": "/Game/BP_Hero",
//!       "references": ["/Game/BP_Weapon", { "target": "/Game/DT_Loot", "kind": "soft" }],
//!       "facts": { "total_elements": 120, "hot_path_entries": 1 }
//!     },
//!     { "id": "/Game/DT_Loot", "unit": false }
//!   ]
//! }
//! ```

use crate::error::ProviderError;
use crate::graph::traits::{EdgeProvider, FactProvider, UnitCatalog, UnitFacts};
use crate::models::{Edge, EdgeKind, NodeId};
use anyhow::Context;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// On-disk project description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectManifest {
    #[serde(default)]
    pub nodes: Vec<NodeEntry>,
}

/// One node of the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeEntry {
    pub id: NodeId,
    /// Whether the node is an analyzable unit (false for plain assets)
    #[serde(default = "default_true")]
    pub unit: bool,
    #[serde(default)]
    pub references: Vec<ReferenceEntry>,
    #[serde(default)]
    pub facts: Option<UnitFacts>,
    /// Edge lookups for this node fail (asset failed to load)
    #[serde(default)]
    pub unavailable: bool,
}

fn default_true() -> bool {
    true
}

impl NodeEntry {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            unit: true,
            references: Vec::new(),
            facts: None,
            unavailable: false,
        }
    }
}

/// Outgoing reference; either a bare id (hard) or a detailed entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceEntry {
    Plain(NodeId),
    Detailed {
        target: NodeId,
        #[serde(default)]
        kind: EdgeKind,
    },
}

impl ReferenceEntry {
    fn target(&self) -> &NodeId {
        match self {
            ReferenceEntry::Plain(target) => target,
            ReferenceEntry::Detailed { target, .. } => target,
        }
    }

    fn kind(&self) -> EdgeKind {
        match self {
            ReferenceEntry::Plain(_) => EdgeKind::Hard,
            ReferenceEntry::Detailed { kind, .. } => *kind,
        }
    }
}

/// Node and edge counts of a loaded graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub units: usize,
    pub edges: usize,
    pub unavailable: usize,
    /// References whose target has no node entry
    pub dangling: usize,
}

/// In-memory project graph. Read-only once built, so it can be shared
/// across scan workers without locking.
#[derive(Debug, Clone, Default)]
pub struct ProjectGraph {
    order: Vec<NodeId>,
    nodes: HashMap<NodeId, NodeEntry>,
}

impl ProjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a parsed manifest. A repeated id replaces the earlier entry.
    pub fn from_manifest(manifest: ProjectManifest) -> Self {
        let mut graph = Self::new();
        for entry in manifest.nodes {
            if graph.nodes.contains_key(&entry.id) {
                warn!("Duplicate node '{}' in manifest; keeping the last entry", entry.id);
            }
            graph.insert(entry);
        }
        graph
    }

    /// Load a manifest file. `.toml` files are parsed as TOML, anything
    /// else as JSON.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project manifest {}", path.display()))?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        let manifest: ProjectManifest = if is_toml {
            toml::from_str(&content)
                .with_context(|| format!("Invalid TOML manifest {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON manifest {}", path.display()))?
        };
        let graph = Self::from_manifest(manifest);
        let stats = graph.stats();
        debug!(
            "Loaded {} nodes ({} units, {} edges) from {}",
            stats.nodes,
            stats.units,
            stats.edges,
            path.display()
        );
        Ok(graph)
    }

    pub fn to_manifest(&self) -> ProjectManifest {
        ProjectManifest {
            nodes: self
                .order
                .iter()
                .filter_map(|id| self.nodes.get(id).cloned())
                .collect(),
        }
    }

    /// Insert or replace a node, keeping its original position
    pub fn insert(&mut self, entry: NodeEntry) {
        if !self.nodes.contains_key(&entry.id) {
            self.order.push(entry.id.clone());
        }
        self.nodes.insert(entry.id.clone(), entry);
    }

    fn entry_mut(&mut self, id: NodeId) -> &mut NodeEntry {
        if !self.nodes.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.nodes
            .entry(id.clone())
            .or_insert_with(|| NodeEntry::new(id))
    }

    /// Add an edge, creating the source node when missing. The target is
    /// left undefined so callers can model dangling references.
    pub fn add_edge(&mut self, from: impl Into<NodeId>, to: impl Into<NodeId>, kind: EdgeKind) {
        let reference = match kind {
            EdgeKind::Hard => ReferenceEntry::Plain(to.into()),
            EdgeKind::Soft => ReferenceEntry::Detailed {
                target: to.into(),
                kind,
            },
        };
        self.entry_mut(from.into()).references.push(reference);
    }

    pub fn set_facts(&mut self, unit: impl Into<NodeId>, facts: UnitFacts) {
        self.entry_mut(unit.into()).facts = Some(facts);
    }

    pub fn mark_unavailable(&mut self, node: impl Into<NodeId>) {
        self.entry_mut(node.into()).unavailable = true;
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            nodes: self.nodes.len(),
            units: 0,
            edges: 0,
            unavailable: 0,
            dangling: 0,
        };
        for entry in self.nodes.values() {
            if entry.unit {
                stats.units += 1;
            }
            if entry.unavailable {
                stats.unavailable += 1;
            }
            stats.edges += entry.references.len();
            stats.dangling += entry
                .references
                .iter()
                .filter(|r| !self.nodes.contains_key(r.target()))
                .count();
        }
        stats
    }

    /// Strongly connected groups of mutually referencing nodes.
    ///
    /// Each cluster is sorted by id and clusters are sorted by their first
    /// member. Single nodes only appear when they reference themselves.
    pub fn cyclic_clusters(&self) -> Vec<Vec<NodeId>> {
        let mut graph: DiGraph<&NodeId, ()> = DiGraph::new();
        let mut index: HashMap<&NodeId, NodeIndex> = HashMap::new();

        for id in &self.order {
            index.insert(id, graph.add_node(id));
        }
        for id in &self.order {
            let Some(entry) = self.nodes.get(id) else {
                continue;
            };
            for reference in &entry.references {
                if let Some(&target) = index.get(reference.target()) {
                    graph.add_edge(index[id], target, ());
                }
            }
        }

        let mut clusters: Vec<Vec<NodeId>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || scc.first().is_some_and(|&n| graph.contains_edge(n, n))
            })
            .map(|scc| {
                let mut members: Vec<NodeId> =
                    scc.into_iter().map(|n| graph[n].clone()).collect();
                members.sort();
                members
            })
            .collect();
        clusters.sort();
        clusters
    }
}

impl EdgeProvider for ProjectGraph {
    fn edges_from(&self, node: &NodeId) -> Result<Vec<Edge>, ProviderError> {
        let entry = self
            .nodes
            .get(node)
            .ok_or_else(|| ProviderError::NotFound(node.clone()))?;
        if entry.unavailable {
            return Err(ProviderError::Unavailable {
                node: node.clone(),
                reason: "marked unavailable in manifest".to_string(),
            });
        }
        Ok(entry
            .references
            .iter()
            .map(|r| Edge::new(node.clone(), r.target().clone(), r.kind()))
            .collect())
    }
}

impl FactProvider for ProjectGraph {
    fn facts(&self, unit: &NodeId) -> Option<UnitFacts> {
        self.nodes.get(unit).and_then(|entry| entry.facts.clone())
    }
}

impl UnitCatalog for ProjectGraph {
    fn units(&self) -> Vec<NodeId> {
        self.order
            .iter()
            .filter(|id| self.nodes.get(*id).is_some_and(|e| e.unit))
            .cloned()
            .collect()
    }
}
