//! Native-code migration assessment
//!
//! A secondary composite score (0-100) estimating how much a unit would
//! gain from being rewritten natively.
//!
//! | Trigger | Points | Difficulty |
//! |---|---|---|
//! | size Red / Yellow | 30 / 15 | 3 / 2 |
//! | runs on the hot path | 25 | 2 |
//! | hot path Red | +15 | 4 |
//! | any cycle | 20 | 4 |
//! | depth at or above crit | 10 | 3 |
//! | math share above 30% | 15 | 2 |

use crate::config::ThresholdConfig;
use crate::models::{Dimension, HealthLevel, Metric, MigrationAssessment, RawMeasurements};

const MATH_RATIO_LIMIT: f64 = 0.3;
const PRIORITY_RED: f64 = 70.0;
const PRIORITY_YELLOW: f64 = 40.0;

fn level_of(metrics: &[Metric], dimension: Dimension) -> HealthLevel {
    metrics
        .iter()
        .find(|m| m.dimension == dimension)
        .map(|m| m.level)
        .unwrap_or_default()
}

pub fn assess(
    measurements: &RawMeasurements,
    metrics: &[Metric],
    config: &ThresholdConfig,
) -> MigrationAssessment {
    let mut score: f64 = 0.0;
    let mut difficulty = 1u8;
    let mut reasons = Vec::new();
    let mut expected_improvements = Vec::new();

    match level_of(metrics, Dimension::Size) {
        HealthLevel::Red => {
            score += 30.0;
            difficulty = difficulty.max(3);
            reasons.push(format!(
                "High element count ({} elements)",
                measurements.total_elements
            ));
            expected_improvements.push("Faster execution".to_string());
        }
        HealthLevel::Yellow => {
            score += 15.0;
            difficulty = difficulty.max(2);
            reasons.push(format!(
                "Elevated element count ({} elements)",
                measurements.total_elements
            ));
        }
        HealthLevel::Green => {}
    }

    if measurements.uses_hot_path() {
        score += 25.0;
        difficulty = difficulty.max(2);
        reasons.push("Runs on the hot path".to_string());
        expected_improvements.push("Cheaper per-frame work".to_string());

        if level_of(metrics, Dimension::HotPath) == HealthLevel::Red {
            score += 15.0;
            difficulty = difficulty.max(4);
            reasons.push(format!(
                "Heavy hot-path workload ({} elements)",
                measurements.hot_path_elements
            ));
        }
    }

    if measurements.cycle_count > 0 {
        score += 20.0;
        difficulty = difficulty.max(4);
        reasons.push("Circular references present".to_string());
        expected_improvements.push("Cleaner dependency structure".to_string());
    }

    let depth_crit = config.get(Dimension::DependencyDepth).crit;
    if f64::from(measurements.max_dependency_depth) >= depth_crit {
        score += 10.0;
        difficulty = difficulty.max(3);
        reasons.push(format!(
            "Deep dependency chain (depth {})",
            measurements.max_dependency_depth
        ));
    }

    let math_ratio = measurements.math_ratio();
    if math_ratio > MATH_RATIO_LIMIT {
        score += 15.0;
        difficulty = difficulty.max(2);
        reasons.push(format!("Math-heavy logic ({:.0}%)", math_ratio * 100.0));
        expected_improvements.push("Faster arithmetic".to_string());
    }

    let score = score.clamp(0.0, 100.0);
    let priority = if score >= PRIORITY_RED {
        HealthLevel::Red
    } else if score >= PRIORITY_YELLOW {
        HealthLevel::Yellow
    } else {
        HealthLevel::Green
    };

    MigrationAssessment {
        score,
        difficulty,
        priority,
        reasons,
        expected_improvements,
    }
}
