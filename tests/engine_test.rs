//! Library-level tests for the analysis engine
//!
//! Exercise the public API end to end: custom providers, the manifest
//! graph, threshold replacement and project scans.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use depgauge::config::{ThresholdConfig, Thresholds};
use depgauge::error::{ConfigError, ProviderError, ScanError};
use depgauge::graph::{EdgeProvider, FactProvider, ProjectGraph, UnitCatalog, UnitFacts};
use depgauge::models::{Dimension, Edge, EdgeKind, HealthLevel, IssueCategory, NodeId};
use depgauge::pipeline::{Analyzer, CancellationToken, ScanOptions};
use depgauge::scoring::URGENT_ACTION;

fn fixture_graph() -> Arc<ProjectGraph> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/depgauge.json");
    Arc::new(ProjectGraph::load(&path).expect("load fixture manifest"))
}

/// In-memory provider that records how often each node is looked up
#[derive(Default)]
struct RecordingProvider {
    edges: HashMap<NodeId, Vec<NodeId>>,
    facts: HashMap<NodeId, UnitFacts>,
    lookups: Mutex<HashMap<NodeId, usize>>,
}

impl RecordingProvider {
    fn edge(mut self, from: &str, to: &str) -> Self {
        self.edges.entry(from.into()).or_default().push(to.into());
        self.edges.entry(to.into()).or_default();
        self
    }

    fn with_facts(mut self, unit: &str, facts: UnitFacts) -> Self {
        self.facts.insert(unit.into(), facts);
        self
    }

    fn lookups(&self) -> HashMap<NodeId, usize> {
        self.lookups.lock().unwrap().clone()
    }
}

impl EdgeProvider for RecordingProvider {
    fn edges_from(&self, node: &NodeId) -> Result<Vec<Edge>, ProviderError> {
        *self.lookups.lock().unwrap().entry(node.clone()).or_default() += 1;
        let targets = self
            .edges
            .get(node)
            .ok_or_else(|| ProviderError::NotFound(node.clone()))?;
        Ok(targets
            .iter()
            .map(|t| Edge::hard(node.clone(), t.clone()))
            .collect())
    }
}

impl FactProvider for RecordingProvider {
    fn facts(&self, unit: &NodeId) -> Option<UnitFacts> {
        self.facts.get(unit).cloned()
    }
}

impl UnitCatalog for RecordingProvider {
    fn units(&self) -> Vec<NodeId> {
        let mut units: Vec<NodeId> = self.edges.keys().cloned().collect();
        units.sort();
        units
    }
}

fn analyzer_for(provider: RecordingProvider) -> (Arc<RecordingProvider>, Analyzer) {
    let provider = Arc::new(provider);
    let analyzer = Analyzer::new(provider.clone(), provider.clone(), provider.clone());
    (provider, analyzer)
}

/// U: 342 elements, a dependency chain 7 deep, 45 hot-path elements
fn oversized_unit() -> RecordingProvider {
    let mut provider = RecordingProvider::default();
    let chain = ["/U", "/D1", "/D2", "/D3", "/D4", "/D5", "/D6", "/D7"];
    for pair in chain.windows(2) {
        provider = provider.edge(pair[0], pair[1]);
    }
    provider.with_facts(
        "/U",
        UnitFacts {
            total_elements: 342,
            hot_path_elements: 45,
            hot_path_entries: 1,
            ..Default::default()
        },
    )
}

#[test]
fn test_oversized_unit_end_to_end() {
    let (_, analyzer) = analyzer_for(oversized_unit());
    let report = analyzer.analyze_unit(&"/U".into());

    let size = report.metric(Dimension::Size).unwrap();
    assert_eq!(size.level, HealthLevel::Red);
    assert_eq!(size.score, 100.0);

    let depth = report.metric(Dimension::DependencyDepth).unwrap();
    assert_eq!(depth.raw_value, 7.0);
    assert_eq!(depth.level, HealthLevel::Yellow);
    assert!((depth.score - 70.0).abs() < 1e-9);

    let hot_path = report.metric(Dimension::HotPath).unwrap();
    assert_eq!(hot_path.level, HealthLevel::Red);
    assert_eq!(hot_path.score, 100.0);

    assert_eq!(report.overall_level, HealthLevel::Red);
    assert_eq!(report.issues[0].category, IssueCategory::Size);
    assert_eq!(report.issues[0].severity, HealthLevel::Red);
    assert_eq!(report.issues[1].category, IssueCategory::HotPath);
    assert_eq!(report.issues[1].severity, HealthLevel::Red);
    assert_eq!(report.recommended_actions[0], URGENT_ACTION);
    assert!(report.cycles.is_empty());
    assert!(!report.truncated);
}

#[test]
fn test_each_node_is_looked_up_once() {
    // Diamond with a back-edge to the root
    let provider = RecordingProvider::default()
        .edge("/A", "/B")
        .edge("/A", "/C")
        .edge("/B", "/D")
        .edge("/C", "/D")
        .edge("/D", "/A");
    let (provider, analyzer) = analyzer_for(provider);

    let report = analyzer.analyze_unit(&"/A".into());
    assert_eq!(report.measurements.transitive_dependencies, 3);
    assert_eq!(report.measurements.max_dependency_depth, 2);
    assert_eq!(report.cycles.len(), 1);
    assert!(provider.lookups().values().all(|&count| count == 1));
    assert_eq!(provider.lookups().len(), 4);
}

#[test]
fn test_report_is_idempotent() {
    let analyzer = Analyzer::from_graph(fixture_graph());
    let hero: NodeId = "/Game/Characters/BP_Hero".into();
    let first = analyzer.analyze_unit(&hero);
    let second = analyzer.analyze_unit(&hero);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_fixture_hero_report() {
    let analyzer = Analyzer::from_graph(fixture_graph());
    let report = analyzer.analyze_unit(&"/Game/Characters/BP_Hero".into());

    assert_eq!(report.name, "BP_Hero");
    assert_eq!(report.overall_level, HealthLevel::Red);
    assert_eq!(report.measurements.direct_dependencies, 2);
    assert_eq!(report.measurements.largest_grouping.as_deref(), Some("EventGraph"));
    assert_eq!(report.unresolved_count, 1);
    assert!(report.incomplete);
    assert!(report
        .incomplete_reason
        .as_deref()
        .unwrap()
        .contains("/Game/Core/DT_Deleted"));
    assert_eq!(report.cycles.len(), 1);
    assert_eq!(report.cycles[0].to_string(), "BP_Hero -> BP_Weapon -> BP_Hero");
    assert_eq!(report.migration.score, 90.0);
    assert!((report.composite_score - 380.0 / 6.0).abs() < 1e-9);
    assert!(report
        .issues
        .iter()
        .any(|i| i.category == IssueCategory::HotPathHeavyCall
            && i.location.as_deref() == Some("GetAllActorsOfClass")));
    assert!(report
        .issues
        .iter()
        .any(|i| i.category == IssueCategory::UnresolvedReference));
}

#[test]
fn test_depth_bound_marks_truncation() {
    let (_, analyzer) = analyzer_for(oversized_unit());
    let analyzer = analyzer.with_max_depth(3);
    let report = analyzer.analyze_unit(&"/U".into());

    assert!(report.truncated);
    assert_eq!(report.measurements.max_dependency_depth, 3);
    let truncated = report
        .issues
        .iter()
        .find(|i| i.category == IssueCategory::Truncated)
        .expect("truncation issue");
    assert_eq!(truncated.severity, HealthLevel::Green);
}

#[test]
fn test_missing_root_is_incomplete() {
    let analyzer = Analyzer::from_graph(fixture_graph());
    let report = analyzer.analyze_unit(&"/Game/Nowhere".into());
    assert!(report.incomplete);
    assert!(report.incomplete_reason.unwrap().contains("/Game/Nowhere"));
}

#[test]
fn test_missing_reference_flags_incomplete() {
    let mut graph = ProjectGraph::new();
    graph.add_edge("/Game/A", "/Game/Deleted", EdgeKind::Hard);
    let analyzer = Analyzer::from_graph(Arc::new(graph));

    let report = analyzer.analyze_unit(&"/Game/A".into());
    assert!(report.incomplete);
    assert_eq!(report.unresolved_count, 1);
    assert_eq!(
        report.incomplete_reason.as_deref(),
        Some("Referenced node(s) not found: /Game/Deleted")
    );
    assert_eq!(report.dependencies.len(), 1);
    assert_eq!(report.metrics.len(), Dimension::ALL.len());
}

#[test]
fn test_fixture_units_without_missing_references_are_complete() {
    let analyzer = Analyzer::from_graph(fixture_graph());
    let door = analyzer.analyze_unit(&"/Game/Props/BP_Door".into());
    assert!(!door.incomplete);
    assert_eq!(door.incomplete_reason, None);

    let game_mode = analyzer.analyze_unit(&"/Game/Core/BP_GameMode".into());
    assert!(game_mode.incomplete);
    assert_eq!(game_mode.overall_level, HealthLevel::Green);
}

#[test]
fn test_project_scan_over_fixture() {
    let analyzer = Analyzer::from_graph(fixture_graph());
    let summary = analyzer.analyze_project("").unwrap();

    assert_eq!(summary.unit_count, 4);
    assert_eq!(summary.level_counts.red, 1);
    assert_eq!(summary.level_counts.yellow, 1);
    assert_eq!(summary.level_counts.green, 2);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].unit, NodeId::from("/Game/Broken/BP_Missing"));
    assert!(summary.skipped[0].reason.contains("unavailable"));

    let ranked: Vec<&str> = summary.top_units.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(ranked, vec!["BP_Hero", "BP_Weapon", "BP_GameMode", "BP_Door"]);

    assert_eq!(
        summary.cyclic_units,
        vec![
            NodeId::from("/Game/Characters/BP_Hero"),
            NodeId::from("/Game/Characters/BP_Weapon")
        ]
    );
    assert_eq!(summary.hot_path_units, vec![NodeId::from("/Game/Characters/BP_Hero")]);
    assert_eq!(summary.migration_units, vec![NodeId::from("/Game/Characters/BP_Hero")]);
    assert_eq!(summary.worst_level(), Some(HealthLevel::Red));
}

#[test]
fn test_project_scan_with_filter_and_workers() {
    let analyzer = Analyzer::from_graph(fixture_graph());
    let options = ScanOptions::default().with_workers(2).with_top_n(1);
    let summary = analyzer
        .analyze_project_with("/Game/Core/*", &options)
        .unwrap();
    assert_eq!(summary.unit_count, 1);
    assert_eq!(summary.top_units[0].name, "BP_GameMode");
    assert!(summary.skipped.is_empty());
}

#[test]
fn test_cancelled_scan_discards_results() {
    let analyzer = Analyzer::from_graph(fixture_graph());
    let token = CancellationToken::new();
    token.cancel();
    let options = ScanOptions::default().with_cancel(token);
    assert!(matches!(
        analyzer.analyze_project_with("", &options),
        Err(ScanError::Cancelled)
    ));
}

#[test]
fn test_invalid_thresholds_are_rejected() {
    let analyzer = Analyzer::from_graph(fixture_graph());
    let before = analyzer.thresholds();

    let mut broken = ThresholdConfig::default();
    broken
        .thresholds
        .set(Dimension::Size, Thresholds::new(300.0, 100.0));
    let err = analyzer.set_thresholds(broken).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::WarnNotBelowCrit {
            dimension: Dimension::Size,
            ..
        }
    ));
    assert_eq!(analyzer.thresholds(), before);
}

#[test]
fn test_replaced_thresholds_apply_to_next_analysis() {
    let analyzer = Analyzer::from_graph(fixture_graph());
    let door: NodeId = "/Game/Props/BP_Door".into();
    assert_eq!(analyzer.analyze_unit(&door).overall_level, HealthLevel::Green);

    let mut strict = ThresholdConfig::default();
    strict.thresholds.set(Dimension::Size, Thresholds::new(5.0, 10.0));
    analyzer.set_thresholds(strict).unwrap();
    assert_eq!(analyzer.analyze_unit(&door).overall_level, HealthLevel::Red);
}

#[test]
fn test_soft_edges_are_followed() {
    let mut graph = ProjectGraph::new();
    graph.add_edge("/Game/A", "/Game/B", EdgeKind::Soft);
    graph.add_edge("/Game/B", "/Game/A", EdgeKind::Hard);
    let analyzer = Analyzer::from_graph(Arc::new(graph));

    let report = analyzer.analyze_unit(&"/Game/A".into());
    assert_eq!(report.dependencies.len(), 1);
    assert_eq!(report.dependencies[0].kind, EdgeKind::Soft);
    assert!(report.dependencies[0].is_circular);
    assert_eq!(report.cycles.len(), 1);
}
