//! Provider traits the engine consumes
//!
//! Hosts (editors, build tools, manifest loaders) supply graph edges and
//! structural facts through these traits. The engine never touches host
//! types directly. Implementations must be safe for concurrent reads:
//! project scans call them from several worker threads at once.

use crate::error::ProviderError;
use crate::models::{Edge, ElementCategory, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source of outgoing reference edges
pub trait EdgeProvider: Send + Sync {
    /// Outgoing edges of `node`, in a stable enumeration order
    fn edges_from(&self, node: &NodeId) -> Result<Vec<Edge>, ProviderError>;
}

/// Source of structural facts about a unit
pub trait FactProvider: Send + Sync {
    /// Facts for `unit`, or `None` when the host knows nothing about it
    fn facts(&self, unit: &NodeId) -> Option<UnitFacts>;
}

/// Enumerates the units of a project
pub trait UnitCatalog: Send + Sync {
    fn units(&self) -> Vec<NodeId>;
}

/// Element count of one grouping (an event graph, a function body...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingFacts {
    pub name: String,
    #[serde(default)]
    pub elements: u32,
}

/// Raw structural facts of a unit. Every field defaults to zero / empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UnitFacts {
    /// Total element count; when zero, the grouping sum is used instead
    pub total_elements: u32,
    pub groupings: Vec<GroupingFacts>,
    /// Elements reachable from hot-path entry points
    pub hot_path_elements: u32,
    /// Number of hot-path entry points (per-frame update events...)
    pub hot_path_entries: u32,
    /// Expensive calls made on the hot path
    pub heavy_hot_path_calls: Vec<String>,
    /// Element counts per category
    pub categories: BTreeMap<ElementCategory, u32>,
}

impl UnitFacts {
    pub fn element_total(&self) -> u32 {
        if self.total_elements > 0 {
            self.total_elements
        } else {
            self.groupings
                .iter()
                .map(|g| g.elements)
                .fold(0u32, u32::saturating_add)
        }
    }
}
