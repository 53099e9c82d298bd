//! Issue derivation and recommended actions
//!
//! Every rule is evaluated and every match is emitted. Issues are ordered
//! by severity (Red first), ties keep rule order. Actions follow the issue
//! order, deduplicated, with an urgent action first when the unit is Red.

use crate::config::ThresholdConfig;
use crate::graph::walker::WalkResult;
use crate::models::{
    Dimension, HealthLevel, Issue, IssueCategory, Metric, MigrationAssessment, RawMeasurements,
};
use crate::scoring::classifier::composite_level;

pub const URGENT_ACTION: &str = "URGENT: this unit needs refactoring now.";
pub const HEALTHY_ACTION: &str = "Healthy: keep the current structure.";

/// Issues plus the actions that address them
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub issues: Vec<Issue>,
    pub recommended_actions: Vec<String>,
}

struct Matched {
    issue: Issue,
    action: &'static str,
}

impl Matched {
    fn new(
        category: IssueCategory,
        severity: HealthLevel,
        description: String,
        suggested_fix: &str,
        action: &'static str,
    ) -> Self {
        Self {
            issue: Issue {
                category,
                description,
                severity,
                location: None,
                suggested_fix: suggested_fix.to_string(),
            },
            action,
        }
    }

    fn at(mut self, location: impl Into<String>) -> Self {
        self.issue.location = Some(location.into());
        self
    }
}

fn flagged(metrics: &[Metric], dimension: Dimension) -> Option<&Metric> {
    metrics
        .iter()
        .find(|m| m.dimension == dimension)
        .filter(|m| m.level >= HealthLevel::Yellow)
}

fn limits(config: &ThresholdConfig, dimension: Dimension) -> String {
    let t = config.get(dimension);
    format!("warn {}, crit {}", t.warn, t.crit)
}

fn match_rules(
    metrics: &[Metric],
    measurements: &RawMeasurements,
    walk: &WalkResult,
    migration: &MigrationAssessment,
    config: &ThresholdConfig,
) -> Vec<Matched> {
    let mut matched = Vec::new();

    if let Some(m) = flagged(metrics, Dimension::Size) {
        matched.push(Matched::new(
            IssueCategory::Size,
            m.level,
            format!(
                "Unit has {} elements ({})",
                measurements.total_elements,
                limits(config, Dimension::Size)
            ),
            "Split the unit into smaller units or functions.",
            "Split functionality across several smaller units or functions.",
        ));
    }

    if let Some(m) = flagged(metrics, Dimension::GroupingSize) {
        let name = measurements.largest_grouping.as_deref().unwrap_or("<unnamed>");
        matched.push(
            Matched::new(
                IssueCategory::GroupingSize,
                m.level,
                format!(
                    "Grouping '{}' has {} elements ({})",
                    name,
                    measurements.largest_grouping_elements,
                    limits(config, Dimension::GroupingSize)
                ),
                "Extract parts of the grouping into functions or macros.",
                "Extract oversized groupings into functions.",
            )
            .at(name),
        );
    }

    if let Some(m) = flagged(metrics, Dimension::DirectDependencies) {
        matched.push(Matched::new(
            IssueCategory::Dependencies,
            m.level,
            format!(
                "{} direct dependencies ({})",
                measurements.direct_dependencies,
                limits(config, Dimension::DirectDependencies)
            ),
            "Depend on interfaces instead of concrete units, or split responsibilities.",
            "Reduce direct dependencies by introducing interfaces.",
        ));
    }

    if let Some(m) = flagged(metrics, Dimension::DependencyDepth) {
        matched.push(Matched::new(
            IssueCategory::DependencyDepth,
            m.level,
            format!(
                "Dependency chain is {} levels deep ({})",
                measurements.max_dependency_depth,
                limits(config, Dimension::DependencyDepth)
            ),
            "Remove intermediate layers from the dependency chain.",
            "Flatten the dependency chain.",
        ));
    }

    if let Some(first) = walk.cycles.first() {
        let severity = metrics
            .iter()
            .find(|m| m.dimension == Dimension::Cycles)
            .map(|m| m.level)
            .unwrap_or(HealthLevel::Yellow);
        matched.push(
            Matched::new(
                IssueCategory::CircularReference,
                severity,
                format!("{} circular reference(s) detected", walk.cycles.len()),
                "Break the cycle with an interface or by inverting one dependency.",
                "Use interfaces to break circular references.",
            )
            .at(first.to_string()),
        );
    }

    if let Some(m) = flagged(metrics, Dimension::HotPath) {
        matched.push(Matched::new(
            IssueCategory::HotPath,
            m.level,
            format!(
                "{} elements run on the hot path ({})",
                measurements.hot_path_elements,
                limits(config, Dimension::HotPath)
            ),
            "Move the work to timers or events, or implement it natively.",
            "Replace per-frame work with timers or event-driven logic.",
        ));
    }

    for call in &measurements.heavy_hot_path_calls {
        matched.push(
            Matched::new(
                IssueCategory::HotPathHeavyCall,
                HealthLevel::Yellow,
                format!("Expensive call '{}' on the hot path", call),
                "Cache the result outside the hot path.",
                "Move expensive calls out of the hot path.",
            )
            .at(call.as_str()),
        );
    }

    if walk.unresolved_count > 0 {
        matched.push(Matched::new(
            IssueCategory::UnresolvedReference,
            HealthLevel::Yellow,
            format!("{} reference(s) could not be resolved", walk.unresolved_count),
            "Check for missing or failed-to-load dependencies.",
            "Fix or remove unresolved references.",
        ));
    }

    if walk.truncated {
        matched.push(Matched::new(
            IssueCategory::Truncated,
            HealthLevel::Green,
            format!(
                "Dependency walk stopped at depth {}; deeper nodes are not counted",
                measurements.max_dependency_depth
            ),
            "Raise walk.max_depth to analyze the full graph.",
            "Raise the walk depth limit to analyze the full graph.",
        ));
    }

    if migration.score >= config.migration_threshold {
        matched.push(Matched::new(
            IssueCategory::Migration,
            migration.priority.max(HealthLevel::Yellow),
            format!(
                "Migration score {:.0} reaches the threshold ({})",
                migration.score, config.migration_threshold
            ),
            "Consider rewriting the unit in native code.",
            "Consider migrating to native code for performance.",
        ));
    }

    matched
}

/// Derive the issue list and recommended actions of one unit
pub fn aggregate(
    metrics: &[Metric],
    measurements: &RawMeasurements,
    walk: &WalkResult,
    migration: &MigrationAssessment,
    config: &ThresholdConfig,
) -> Aggregation {
    let mut matched = match_rules(metrics, measurements, walk, migration, config);
    matched.sort_by(|a, b| b.issue.severity.cmp(&a.issue.severity));

    let mut recommended_actions: Vec<String> = Vec::new();
    if composite_level(metrics) == HealthLevel::Red {
        recommended_actions.push(URGENT_ACTION.to_string());
    }
    for m in &matched {
        if !recommended_actions.iter().any(|a| a == m.action) {
            recommended_actions.push(m.action.to_string());
        }
    }
    if recommended_actions.is_empty() {
        recommended_actions.push(HEALTHY_ACTION.to_string());
    }

    Aggregation {
        issues: matched.into_iter().map(|m| m.issue).collect(),
        recommended_actions,
    }
}

/// One-line human summary of a unit
pub fn summary_line(
    name: &str,
    overall_level: HealthLevel,
    composite_score: f64,
    measurements: &RawMeasurements,
    migration: &MigrationAssessment,
    config: &ThresholdConfig,
) -> String {
    let mut parts = vec![
        format!(
            "[{}] overall: {} (score {:.0})",
            name, overall_level, composite_score
        ),
        format!("elements: {}", measurements.total_elements),
    ];
    if measurements.uses_hot_path() {
        parts.push(format!(
            "hot path ({} elements)",
            measurements.hot_path_elements
        ));
    }
    if measurements.cycle_count > 0 {
        parts.push(format!("cycles: {}", measurements.cycle_count));
    }
    if migration.score >= config.migration_threshold {
        parts.push("migration recommended".to_string());
    }
    parts.join(" | ")
}
