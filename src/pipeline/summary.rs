//! Project-wide reduction of unit reports

use crate::models::{HealthLevel, NodeId, Report};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A unit left out of a scan because its root could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedUnit {
    pub unit: NodeId,
    pub reason: String,
}

/// Number of analyzed units per health level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    pub green: usize,
    pub yellow: usize,
    pub red: usize,
}

impl LevelCounts {
    pub fn get(&self, level: HealthLevel) -> usize {
        match level {
            HealthLevel::Green => self.green,
            HealthLevel::Yellow => self.yellow,
            HealthLevel::Red => self.red,
        }
    }

    fn add(&mut self, level: HealthLevel) {
        match level {
            HealthLevel::Green => self.green += 1,
            HealthLevel::Yellow => self.yellow += 1,
            HealthLevel::Red => self.red += 1,
        }
    }
}

/// Aggregate view over every analyzed unit of a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Analyzed units (skipped units excluded)
    pub unit_count: usize,
    pub level_counts: LevelCounts,
    pub average_score: f64,
    /// Highest composite scores first, ties by unit name
    pub top_units: Vec<Report>,
    pub cyclic_units: Vec<NodeId>,
    pub hot_path_units: Vec<NodeId>,
    pub migration_units: Vec<NodeId>,
    pub skipped: Vec<SkippedUnit>,
    pub generated_at: DateTime<Utc>,
}

/// Ranking order: composite score descending, then name, then id
pub fn rank_order(a: &Report, b: &Report) -> Ordering {
    b.composite_score
        .total_cmp(&a.composite_score)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.unit.cmp(&b.unit))
}

fn sorted_by_name<'a>(reports: impl Iterator<Item = &'a Report>) -> Vec<NodeId> {
    let mut flagged: Vec<&Report> = reports.collect();
    flagged.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.unit.cmp(&b.unit)));
    flagged.into_iter().map(|r| r.unit.clone()).collect()
}

impl ProjectSummary {
    /// Reduce analyzed reports into a summary.
    ///
    /// `top_n == 0` keeps every report in the ranking.
    pub fn from_reports(
        mut reports: Vec<Report>,
        skipped: Vec<SkippedUnit>,
        top_n: usize,
        migration_threshold: f64,
    ) -> Self {
        let unit_count = reports.len();

        let mut level_counts = LevelCounts::default();
        for report in &reports {
            level_counts.add(report.overall_level);
        }

        let average_score = if unit_count > 0 {
            reports.iter().map(|r| r.composite_score).sum::<f64>() / unit_count as f64
        } else {
            0.0
        };

        let cyclic_units = sorted_by_name(reports.iter().filter(|r| r.measurements.cycle_count > 0));
        let hot_path_units = sorted_by_name(reports.iter().filter(|r| r.measurements.uses_hot_path()));
        let migration_units = sorted_by_name(
            reports
                .iter()
                .filter(|r| r.migration.score >= migration_threshold),
        );

        reports.sort_by(rank_order);
        if top_n > 0 {
            reports.truncate(top_n);
        }

        Self {
            unit_count,
            level_counts,
            average_score,
            top_units: reports,
            cyclic_units,
            hot_path_units,
            migration_units,
            skipped,
            generated_at: Utc::now(),
        }
    }

    /// Worst level among the analyzed units
    pub fn worst_level(&self) -> Option<HealthLevel> {
        HealthLevel::ALL
            .iter()
            .rev()
            .find(|level| self.level_counts.get(**level) > 0)
            .copied()
    }
}
