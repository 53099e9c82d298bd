//! Threshold classification
//!
//! # Scoring Formula
//!
//! ```text
//! raw < warn          score = 50 × raw / warn              Green
//! warn <= raw < crit  score = 50 + 50 × (raw - warn) / (crit - warn)   Yellow
//! raw >= crit         score = 100                          Red
//! ```
//!
//! Scores are badness on a 0-100 scale, clamped, monotone in `raw`.
//! The composite score is the weighted mean of the dimension scores; the
//! composite level is the worst dimension level.

use crate::config::{ThresholdConfig, Thresholds};
use crate::models::{Dimension, HealthLevel, Metric, RawMeasurements};

/// Level of a raw value under a threshold pair
pub fn level_for(raw: f64, thresholds: Thresholds) -> HealthLevel {
    if raw >= thresholds.crit {
        HealthLevel::Red
    } else if raw >= thresholds.warn {
        HealthLevel::Yellow
    } else {
        HealthLevel::Green
    }
}

/// Piecewise-linear score: 0 at 0, 50 at warn, 100 at crit
pub fn score_for(raw: f64, thresholds: Thresholds) -> f64 {
    if raw.is_nan() || raw <= 0.0 {
        return 0.0;
    }
    let Thresholds { warn, crit } = thresholds;
    let score = if raw < warn {
        50.0 * raw / warn
    } else if raw < crit {
        50.0 + 50.0 * (raw - warn) / (crit - warn)
    } else {
        100.0
    };
    score.clamp(0.0, 100.0)
}

pub fn classify(raw: f64, thresholds: Thresholds) -> (f64, HealthLevel) {
    (score_for(raw, thresholds), level_for(raw, thresholds))
}

pub fn classify_dimension(
    dimension: Dimension,
    measurements: &RawMeasurements,
    config: &ThresholdConfig,
) -> Metric {
    let raw_value = measurements.raw_value(dimension);
    let (score, level) = classify(raw_value, config.get(dimension));
    Metric {
        dimension,
        raw_value,
        score,
        level,
    }
}

/// One metric per dimension, in `Dimension::ALL` order
pub fn classify_all(measurements: &RawMeasurements, config: &ThresholdConfig) -> Vec<Metric> {
    Dimension::ALL
        .iter()
        .map(|d| classify_dimension(*d, measurements, config))
        .collect()
}

/// Weighted mean of the metric scores; zero-weight dimensions are ignored
pub fn composite_score(metrics: &[Metric], config: &ThresholdConfig) -> f64 {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for metric in metrics {
        let weight = config.weight(metric.dimension);
        if weight > 0.0 {
            weighted += metric.score * weight;
            total_weight += weight;
        }
    }
    if total_weight > 0.0 {
        (weighted / total_weight).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Worst level across the metrics
pub fn composite_level(metrics: &[Metric]) -> HealthLevel {
    metrics
        .iter()
        .map(|m| m.level)
        .max()
        .unwrap_or(HealthLevel::Green)
}
