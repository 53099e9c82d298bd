//! Analysis pipeline
//!
//! Orchestrates the per-unit analysis:
//! 1. Walk the unit's dependency graph
//! 2. Extract raw measurements from facts and the walk
//! 3. Classify each dimension against the thresholds
//! 4. Derive issues, actions and the migration assessment
//!
//! Project scans run the same pipeline for every catalog unit on a
//! dedicated rayon pool and reduce the reports into a [`ProjectSummary`].

pub mod summary;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{glob_match, ThresholdConfig, DEFAULT_MAX_DEPTH, DEFAULT_TOP_N};
use crate::error::{ConfigError, ProviderError, ScanError};
use crate::graph::traits::{EdgeProvider, FactProvider, UnitCatalog};
use crate::graph::walker;
use crate::graph::ProjectGraph;
use crate::metrics;
use crate::models::{HealthLevel, NodeId, RawMeasurements, Report};
use crate::scoring::{self, Aggregation};

pub use summary::{LevelCounts, ProjectSummary, SkippedUnit};

/// Progress callback for project scans: (unit, completed, total)
pub type ProgressCallback = Box<dyn Fn(&NodeId, usize, usize) + Send + Sync>;

/// Cooperative cancellation flag shared between a scan and its caller
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options for a project scan
pub struct ScanOptions {
    /// Worker threads; 0 lets rayon pick
    pub workers: usize,
    /// Ranking size; 0 keeps every unit
    pub top_n: usize,
    pub cancel: Option<CancellationToken>,
    pub progress: Option<ProgressCallback>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            workers: 0,
            top_n: DEFAULT_TOP_N,
            cancel: None,
            progress: None,
        }
    }
}

impl ScanOptions {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }
}

/// Reports of every filtered unit, in catalog order
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub reports: Vec<Report>,
    pub skipped: Vec<SkippedUnit>,
}

/// Analysis engine bound to a set of providers.
///
/// The threshold config is swapped as a whole; every analysis reads one
/// snapshot taken when it starts.
pub struct Analyzer {
    edges: Arc<dyn EdgeProvider>,
    facts: Arc<dyn FactProvider>,
    catalog: Arc<dyn UnitCatalog>,
    config: RwLock<Arc<ThresholdConfig>>,
    max_depth: u32,
}

impl Analyzer {
    pub fn new(
        edges: Arc<dyn EdgeProvider>,
        facts: Arc<dyn FactProvider>,
        catalog: Arc<dyn UnitCatalog>,
    ) -> Self {
        Self {
            edges,
            facts,
            catalog,
            config: RwLock::new(Arc::new(ThresholdConfig::default())),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Analyzer serving all three roles from one manifest graph
    pub fn from_graph(graph: Arc<ProjectGraph>) -> Self {
        Self::new(graph.clone(), graph.clone(), graph)
    }

    pub fn with_thresholds(self, config: ThresholdConfig) -> Result<Self, ConfigError> {
        self.set_thresholds(config)?;
        Ok(self)
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Copy of the active threshold config
    pub fn thresholds(&self) -> ThresholdConfig {
        self.snapshot().as_ref().clone()
    }

    /// Replace the threshold config. Invalid configs are rejected and the
    /// active config stays in place.
    pub fn set_thresholds(&self, config: ThresholdConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let config = Arc::new(config);
        match self.config.write() {
            Ok(mut guard) => *guard = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
        debug!("Threshold config replaced");
        Ok(())
    }

    fn snapshot(&self) -> Arc<ThresholdConfig> {
        match self.config.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Analyze one unit. Never fails: an unresolvable root yields a report
    /// flagged `incomplete` with empty metrics.
    pub fn analyze_unit(&self, root: &NodeId) -> Report {
        let config = self.snapshot();
        self.analyze_with(root, &config).unwrap_or_else(|err| {
            debug!("Unit {} incomplete: {}", root, err);
            incomplete_report(root, err.to_string(), &config)
        })
    }

    /// Analyze one unit, failing only when the root itself cannot be
    /// resolved. Missing referenced nodes still produce a full report
    /// flagged `incomplete`.
    pub fn try_analyze_unit(&self, root: &NodeId) -> Result<Report, ProviderError> {
        let config = self.snapshot();
        self.analyze_with(root, &config)
    }

    fn analyze_with(
        &self,
        root: &NodeId,
        config: &ThresholdConfig,
    ) -> Result<Report, ProviderError> {
        let mut walk = walker::collect(root, self.edges.as_ref(), self.max_depth);
        if let Some(err) = walk.root_error.take() {
            return Err(err);
        }

        let incomplete_reason = missing_reason(&walk.missing);
        if let Some(ref reason) = incomplete_reason {
            debug!("Unit {} incomplete: {}", root, reason);
        }

        let facts = self.facts.facts(root);
        let measurements = metrics::extract(facts.as_ref(), &walk);
        let category_breakdown = metrics::category_breakdown(facts.as_ref());

        let metrics = scoring::classify_all(&measurements, config);
        let composite_score = scoring::composite_score(&metrics, config);
        let overall_level = scoring::composite_level(&metrics);
        let migration = scoring::assess(&measurements, &metrics, config);
        let Aggregation {
            issues,
            recommended_actions,
        } = scoring::aggregate(&metrics, &measurements, &walk, &migration, config);

        let name = root.short_name().to_string();
        let summary = scoring::summary_line(
            &name,
            overall_level,
            composite_score,
            &measurements,
            &migration,
            config,
        );

        debug!(
            "Analyzed {}: {} (score {:.1}), {} issues",
            root,
            overall_level,
            composite_score,
            issues.len()
        );

        Ok(Report {
            unit: root.clone(),
            name,
            metrics,
            measurements,
            dependencies: walk.dependencies,
            cycles: walk.cycles,
            category_breakdown,
            composite_score,
            overall_level,
            migration,
            issues,
            recommended_actions,
            summary,
            truncated: walk.truncated,
            incomplete: incomplete_reason.is_some(),
            incomplete_reason,
            unresolved_count: walk.unresolved_count,
        })
    }

    /// Analyze every catalog unit matching `path_filter` (empty = all).
    ///
    /// Units run in parallel; units whose root cannot be resolved are
    /// returned as skipped. A cancelled scan discards everything and returns
    /// [`ScanError::Cancelled`].
    pub fn analyze_units(
        &self,
        path_filter: &str,
        options: &ScanOptions,
    ) -> Result<ScanOutcome, ScanError> {
        let config = self.snapshot();
        self.analyze_units_with(&config, path_filter, options)
    }

    fn analyze_units_with(
        &self,
        config: &ThresholdConfig,
        path_filter: &str,
        options: &ScanOptions,
    ) -> Result<ScanOutcome, ScanError> {
        let units: Vec<NodeId> = self
            .catalog
            .units()
            .into_iter()
            .filter(|unit| glob_match(path_filter, unit.as_str()))
            .collect();

        info!(
            "Scanning {} units (filter: {:?}, workers: {})",
            units.len(),
            path_filter,
            options.workers
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .build()?;

        let completed = AtomicUsize::new(0);
        let total = units.len();

        let results: Vec<Option<Result<Report, SkippedUnit>>> = pool.install(|| {
            units
                .par_iter()
                .map(|unit| {
                    if options.is_cancelled() {
                        return None;
                    }
                    let result = self.analyze_with(unit, config).map_err(|err| SkippedUnit {
                        unit: unit.clone(),
                        reason: err.to_string(),
                    });

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(ref callback) = options.progress {
                        callback(unit, done, total);
                    }
                    Some(result)
                })
                .collect()
        });

        if options.is_cancelled() {
            info!("Scan cancelled after {} of {} units", completed.load(Ordering::SeqCst), total);
            return Err(ScanError::Cancelled);
        }

        let mut reports = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();
        for result in results.into_iter().flatten() {
            match result {
                Ok(report) => reports.push(report),
                Err(unit) => skipped.push(unit),
            }
        }

        info!(
            "Scan complete: {} analyzed, {} skipped",
            reports.len(),
            skipped.len()
        );
        Ok(ScanOutcome { reports, skipped })
    }

    pub fn analyze_project(&self, path_filter: &str) -> Result<ProjectSummary, ScanError> {
        self.analyze_project_with(path_filter, &ScanOptions::default())
    }

    pub fn analyze_project_with(
        &self,
        path_filter: &str,
        options: &ScanOptions,
    ) -> Result<ProjectSummary, ScanError> {
        let config = self.snapshot();
        let outcome = self.analyze_units_with(&config, path_filter, options)?;
        Ok(ProjectSummary::from_reports(
            outcome.reports,
            outcome.skipped,
            options.top_n,
            config.migration_threshold,
        ))
    }
}

fn missing_reason(missing: &[NodeId]) -> Option<String> {
    if missing.is_empty() {
        return None;
    }
    let names: Vec<&str> = missing.iter().map(|n| n.as_str()).collect();
    Some(format!("Referenced node(s) not found: {}", names.join(", ")))
}

fn incomplete_report(root: &NodeId, reason: String, config: &ThresholdConfig) -> Report {
    let measurements = RawMeasurements::default();
    let metrics = scoring::classify_all(&measurements, config);
    let name = root.short_name().to_string();
    Report {
        unit: root.clone(),
        summary: format!("[{}] incomplete: {}", name, reason),
        name,
        metrics,
        measurements,
        dependencies: Vec::new(),
        cycles: Vec::new(),
        category_breakdown: Vec::new(),
        composite_score: 0.0,
        overall_level: HealthLevel::Green,
        migration: Default::default(),
        issues: Vec::new(),
        recommended_actions: Vec::new(),
        truncated: false,
        incomplete: true,
        incomplete_reason: Some(reason),
        unresolved_count: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::graph::traits::{GroupingFacts, UnitFacts};
    use crate::models::{Dimension, EdgeKind, IssueCategory};

    fn analyzer(graph: ProjectGraph) -> Analyzer {
        Analyzer::from_graph(Arc::new(graph))
    }

    fn chain_graph() -> ProjectGraph {
        let mut graph = ProjectGraph::new();
        graph.add_edge("/Game/A", "/Game/B", EdgeKind::Hard);
        graph.add_edge("/Game/B", "/Game/C", EdgeKind::Hard);
        graph.add_edge("/Game/C", "/Game/A", EdgeKind::Soft);
        graph.set_facts(
            "/Game/A",
            UnitFacts {
                total_elements: 120,
                ..Default::default()
            },
        );
        graph
    }

    #[test]
    fn test_analyze_unit_is_idempotent() {
        let analyzer = analyzer(chain_graph());
        let first = analyzer.analyze_unit(&"/Game/A".into());
        let second = analyzer.analyze_unit(&"/Game/A".into());
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first.cycles.len(), 1);
        assert_eq!(first.name, "A");
    }

    #[test]
    fn test_unknown_root_is_incomplete() {
        let analyzer = analyzer(chain_graph());
        let report = analyzer.analyze_unit(&"/Game/Missing".into());
        assert!(report.incomplete);
        assert!(report.incomplete_reason.unwrap().contains("not found"));
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_missing_reference_is_incomplete_with_metrics() {
        let mut graph = chain_graph();
        graph.add_edge("/Game/B", "/Game/Deleted", EdgeKind::Hard);
        let analyzer = analyzer(graph);

        let report = analyzer.analyze_unit(&"/Game/A".into());
        assert!(report.incomplete);
        assert!(report
            .incomplete_reason
            .as_deref()
            .unwrap()
            .contains("/Game/Deleted"));
        assert_eq!(report.unresolved_count, 1);
        assert_eq!(report.measurements.total_elements, 120);
        assert_eq!(report.cycles.len(), 1);
        assert!(report
            .issues
            .iter()
            .any(|i| i.category == IssueCategory::UnresolvedReference));

        // Only an unresolved root is skipped by a scan
        let summary = analyzer.analyze_project("").unwrap();
        assert_eq!(summary.unit_count, 3);
        assert!(summary.skipped.is_empty());
        assert!(summary.top_units.iter().all(|r| r.incomplete));
    }

    #[test]
    fn test_unavailable_reference_keeps_report_complete() {
        let mut graph = chain_graph();
        graph.add_edge("/Game/B", "/Game/Flaky", EdgeKind::Hard);
        graph.mark_unavailable("/Game/Flaky");
        let analyzer = analyzer(graph);

        let report = analyzer.analyze_unit(&"/Game/A".into());
        assert!(!report.incomplete);
        assert_eq!(report.incomplete_reason, None);
        assert_eq!(report.unresolved_count, 1);
    }

    #[test]
    fn test_try_analyze_unit_fails_only_on_root() {
        let mut graph = chain_graph();
        graph.add_edge("/Game/C", "/Game/Deleted", EdgeKind::Hard);
        let analyzer = analyzer(graph);

        assert!(matches!(
            analyzer.try_analyze_unit(&"/Game/Missing".into()),
            Err(ProviderError::NotFound(_))
        ));
        let report = analyzer.try_analyze_unit(&"/Game/A".into()).unwrap();
        assert!(report.incomplete);
    }

    #[test]
    fn test_scan_uses_one_threshold_snapshot() {
        let analyzer = Arc::new(analyzer(chain_graph()));
        let replacer = Arc::clone(&analyzer);

        // Replace the config after the first unit finishes
        let options = ScanOptions::default()
            .with_workers(1)
            .with_progress(Box::new(move |_unit: &NodeId, done: usize, _total: usize| {
                if done == 1 {
                    let mut strict = ThresholdConfig::default();
                    strict.thresholds.set(Dimension::Size, Thresholds::new(1.0, 2.0));
                    strict.migration_threshold = 0.0;
                    replacer.set_thresholds(strict).unwrap();
                }
            }));
        let summary = analyzer.analyze_project_with("", &options).unwrap();

        assert_eq!(summary.unit_count, 3);
        assert!(summary.migration_units.is_empty());
        for report in &summary.top_units {
            assert!(report
                .issues
                .iter()
                .all(|i| i.category != IssueCategory::Migration));
            assert_ne!(report.overall_level, HealthLevel::Red);
        }
        assert_eq!(analyzer.thresholds().migration_threshold, 0.0);
    }

    fn sized_unit(elements: u32, largest_grouping: u32) -> UnitFacts {
        UnitFacts {
            total_elements: elements,
            groupings: vec![GroupingFacts {
                name: "EventGraph".to_string(),
                elements: largest_grouping,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_scan_ranks_and_counts_classified_units() {
        let mut graph = ProjectGraph::new();
        graph.set_facts("/Game/Low", sized_unit(280, 10));
        graph.set_facts("/Game/High", sized_unit(900, 100));
        graph.set_facts("/Game/Mid", sized_unit(608, 60));

        // Composite = mean of size (warn 1000, crit 2000) and grouping size
        let mut config = ThresholdConfig::default();
        config.thresholds.set(Dimension::Size, Thresholds::new(1000.0, 2000.0));
        config.weights.direct_dependencies = 0.0;
        config.weights.dependency_depth = 0.0;
        config.weights.hot_path = 0.0;
        config.weights.cycles = 0.0;
        let analyzer = analyzer(graph).with_thresholds(config).unwrap();

        let summary = analyzer.analyze_project("").unwrap();
        let ranked: Vec<(&str, f64, HealthLevel)> = summary
            .top_units
            .iter()
            .map(|r| (r.name.as_str(), r.composite_score, r.overall_level))
            .collect();
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].0, "High");
        assert!((ranked[0].1 - 72.5).abs() < 1e-9);
        assert_eq!(ranked[0].2, HealthLevel::Red);
        assert_eq!(ranked[1].0, "Mid");
        assert!((ranked[1].1 - 45.2).abs() < 1e-9);
        assert_eq!(ranked[1].2, HealthLevel::Yellow);
        assert_eq!(ranked[2].0, "Low");
        assert!((ranked[2].1 - 12.0).abs() < 1e-9);
        assert_eq!(ranked[2].2, HealthLevel::Green);
        assert_eq!(summary.level_counts, LevelCounts { green: 1, yellow: 1, red: 1 });
    }

    #[test]
    fn test_invalid_thresholds_keep_previous() {
        let analyzer = analyzer(chain_graph());
        let mut custom = ThresholdConfig::default();
        custom.thresholds.set(Dimension::Size, Thresholds::new(50.0, 100.0));
        analyzer.set_thresholds(custom.clone()).unwrap();

        let mut broken = custom.clone();
        broken.thresholds.set(Dimension::Cycles, Thresholds::new(5.0, 2.0));
        assert!(analyzer.set_thresholds(broken).is_err());
        assert_eq!(analyzer.thresholds(), custom);

        let report = analyzer.analyze_unit(&"/Game/A".into());
        assert_eq!(report.metric(Dimension::Size).unwrap().level, HealthLevel::Red);
    }

    #[test]
    fn test_scan_skips_unresolved_units() {
        let mut graph = chain_graph();
        graph.mark_unavailable("/Game/C");
        let analyzer = analyzer(graph);

        let summary = analyzer.analyze_project("").unwrap();
        assert_eq!(summary.unit_count, 2);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].unit, NodeId::from("/Game/C"));
    }

    #[test]
    fn test_scan_filter() {
        let mut graph = chain_graph();
        graph.add_edge("/Other/X", "/Game/A", EdgeKind::Hard);
        let analyzer = analyzer(graph);
        let summary = analyzer.analyze_project("/Other/**").unwrap();
        assert_eq!(summary.unit_count, 1);
        assert_eq!(summary.top_units[0].unit, NodeId::from("/Other/X"));
    }

    #[test]
    fn test_cancelled_scan() {
        let analyzer = analyzer(chain_graph());
        let token = CancellationToken::new();
        token.cancel();
        let options = ScanOptions::default().with_cancel(token);
        assert!(matches!(
            analyzer.analyze_project_with("", &options),
            Err(ScanError::Cancelled)
        ));
    }

    #[test]
    fn test_progress_reports_every_unit() {
        let analyzer = analyzer(chain_graph());
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let options = ScanOptions::default()
            .with_workers(2)
            .with_progress(Box::new(move |_unit: &NodeId, _done: usize, total: usize| {
                assert_eq!(total, 3);
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        analyzer.analyze_project_with("", &options).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }
}
