//! Core data models for depgauge
//!
//! These models are shared by the walker, the scoring engine, the
//! project summarizer and the reporters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a unit or any element of the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, used as the unit's display name.
    ///
    /// `/Game/Characters/BP_Hero` -> `BP_Hero`
    pub fn short_name(&self) -> &str {
        let trimmed = self.0.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or(self.0.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Reference classification of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Hard,
    Soft,
}

/// A directed reference between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>, kind: EdgeKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }

    pub fn hard(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self::new(from, to, EdgeKind::Hard)
    }
}

/// Ordinal health classification. Declaration order is the total order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum HealthLevel {
    #[default]
    Green,
    Yellow,
    Red,
}

impl HealthLevel {
    pub const ALL: [HealthLevel; 3] = [HealthLevel::Green, HealthLevel::Yellow, HealthLevel::Red];
}

impl fmt::Display for HealthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthLevel::Green => write!(f, "Green"),
            HealthLevel::Yellow => write!(f, "Yellow"),
            HealthLevel::Red => write!(f, "Red"),
        }
    }
}

impl std::str::FromStr for HealthLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "green" => Ok(HealthLevel::Green),
            "yellow" => Ok(HealthLevel::Yellow),
            "red" => Ok(HealthLevel::Red),
            _ => Err(anyhow::anyhow!(
                "Unknown health level '{}'. Valid levels: green, yellow, red",
                s
            )),
        }
    }
}

/// A scored measurement axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    /// Total reachable element count of the unit
    Size,
    /// Element count of the largest single grouping (graph, function body...)
    GroupingSize,
    /// Number of direct dependencies
    DirectDependencies,
    /// Longest minimum-depth chain from the root
    DependencyDepth,
    /// Elements executed on the hot path (per-frame update...)
    HotPath,
    /// Number of reported reference cycles
    Cycles,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Size,
        Dimension::GroupingSize,
        Dimension::DirectDependencies,
        Dimension::DependencyDepth,
        Dimension::HotPath,
        Dimension::Cycles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Size => "size",
            Dimension::GroupingSize => "grouping-size",
            Dimension::DirectDependencies => "direct-dependencies",
            Dimension::DependencyDepth => "dependency-depth",
            Dimension::HotPath => "hot-path",
            Dimension::Cycles => "cycles",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified dimension of a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub dimension: Dimension,
    pub raw_value: f64,
    /// Badness on a 0-100 scale (higher is worse)
    pub score: f64,
    pub level: HealthLevel,
}

/// One reachable dependency of a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub target: NodeId,
    /// Minimum distance from the root (direct dependencies have depth 1)
    pub depth: u32,
    pub reference_count: u32,
    pub is_circular: bool,
    /// Kind of the edge that first discovered this node
    pub kind: EdgeKind,
}

/// Closed path through the graph; `path.first() == path.last()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub path: Vec<NodeId>,
}

impl CycleReport {
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.path.iter().map(|n| n.short_name()).collect();
        f.write_str(&names.join(" -> "))
    }
}

/// Closed set of element kinds used for the category breakdown.
///
/// Labels that match none of the known kinds map to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum ElementCategory {
    FunctionCall,
    VariableAccess,
    ControlFlow,
    Math,
    Event,
    Macro,
    CustomEvent,
    Tunnel,
    Other,
}

impl ElementCategory {
    pub const ALL: [ElementCategory; 9] = [
        ElementCategory::FunctionCall,
        ElementCategory::VariableAccess,
        ElementCategory::ControlFlow,
        ElementCategory::Math,
        ElementCategory::Event,
        ElementCategory::Macro,
        ElementCategory::CustomEvent,
        ElementCategory::Tunnel,
        ElementCategory::Other,
    ];

    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match normalized.as_str() {
            "functioncall" | "function" | "call" => ElementCategory::FunctionCall,
            "variableaccess" | "variable" | "variableget" | "variableset" => {
                ElementCategory::VariableAccess
            }
            "controlflow" | "branch" => ElementCategory::ControlFlow,
            "math" | "mathoperation" => ElementCategory::Math,
            "event" => ElementCategory::Event,
            "macro" => ElementCategory::Macro,
            "customevent" => ElementCategory::CustomEvent,
            "tunnel" => ElementCategory::Tunnel,
            _ => ElementCategory::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementCategory::FunctionCall => "function-call",
            ElementCategory::VariableAccess => "variable-access",
            ElementCategory::ControlFlow => "control-flow",
            ElementCategory::Math => "math",
            ElementCategory::Event => "event",
            ElementCategory::Macro => "macro",
            ElementCategory::CustomEvent => "custom-event",
            ElementCategory::Tunnel => "tunnel",
            ElementCategory::Other => "other",
        }
    }
}

impl From<String> for ElementCategory {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element count for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: ElementCategory,
    pub count: u32,
    /// Share of the unit's total elements (0-100)
    pub percentage: f64,
}

/// Issue categories produced by the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCategory {
    Size,
    GroupingSize,
    Dependencies,
    DependencyDepth,
    CircularReference,
    HotPath,
    HotPathHeavyCall,
    UnresolvedReference,
    Truncated,
    Migration,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Size => "size",
            IssueCategory::GroupingSize => "grouping-size",
            IssueCategory::Dependencies => "dependencies",
            IssueCategory::DependencyDepth => "dependency-depth",
            IssueCategory::CircularReference => "circular-reference",
            IssueCategory::HotPath => "hot-path",
            IssueCategory::HotPathHeavyCall => "hot-path-heavy-call",
            IssueCategory::UnresolvedReference => "unresolved-reference",
            IssueCategory::Truncated => "truncated",
            IssueCategory::Migration => "migration",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A problem derived from a unit's metrics. Never edited by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub category: IssueCategory,
    pub description: String,
    pub severity: HealthLevel,
    #[serde(default)]
    pub location: Option<String>,
    pub suggested_fix: String,
}

/// Raw structural measurements of one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RawMeasurements {
    pub total_elements: u32,
    pub largest_grouping: Option<String>,
    pub largest_grouping_elements: u32,
    pub direct_dependencies: u32,
    pub transitive_dependencies: u32,
    pub max_dependency_depth: u32,
    pub cycle_count: u32,
    pub hot_path_elements: u32,
    pub hot_path_entries: u32,
    pub math_elements: u32,
    #[serde(default)]
    pub heavy_hot_path_calls: Vec<String>,
}

impl RawMeasurements {
    /// Raw value classified for a dimension
    pub fn raw_value(&self, dimension: Dimension) -> f64 {
        let value = match dimension {
            Dimension::Size => self.total_elements,
            Dimension::GroupingSize => self.largest_grouping_elements,
            Dimension::DirectDependencies => self.direct_dependencies,
            Dimension::DependencyDepth => self.max_dependency_depth,
            Dimension::HotPath => self.hot_path_elements,
            Dimension::Cycles => self.cycle_count,
        };
        f64::from(value)
    }

    pub fn uses_hot_path(&self) -> bool {
        self.hot_path_entries > 0 || self.hot_path_elements > 0
    }

    /// Share of math elements in the unit (0.0-1.0)
    pub fn math_ratio(&self) -> f64 {
        if self.total_elements == 0 {
            0.0
        } else {
            f64::from(self.math_elements) / f64::from(self.total_elements)
        }
    }
}

/// Recommendation to move a unit to native code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationAssessment {
    /// 0-100, higher means migration is more worthwhile
    pub score: f64,
    /// 1 (trivial) to 5 (hard)
    pub difficulty: u8,
    pub priority: HealthLevel,
    pub reasons: Vec<String>,
    pub expected_improvements: Vec<String>,
}

impl Default for MigrationAssessment {
    fn default() -> Self {
        Self {
            score: 0.0,
            difficulty: 1,
            priority: HealthLevel::Green,
            reasons: Vec::new(),
            expected_improvements: Vec::new(),
        }
    }
}

/// Complete analysis of one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub unit: NodeId,
    pub name: String,
    pub metrics: Vec<Metric>,
    pub measurements: RawMeasurements,
    pub dependencies: Vec<DependencyRecord>,
    pub cycles: Vec<CycleReport>,
    pub category_breakdown: Vec<CategoryCount>,
    pub composite_score: f64,
    pub overall_level: HealthLevel,
    pub migration: MigrationAssessment,
    pub issues: Vec<Issue>,
    pub recommended_actions: Vec<String>,
    pub summary: String,
    pub truncated: bool,
    /// A referenced node (or the root itself) could not be found
    pub incomplete: bool,
    #[serde(default)]
    pub incomplete_reason: Option<String>,
    pub unresolved_count: u32,
}

impl Report {
    pub fn metric(&self, dimension: Dimension) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.dimension == dimension)
    }
}
