//! Threshold and weighting configuration for the scoring engine

use crate::error::ConfigError;
use crate::models::Dimension;
use serde::{Deserialize, Serialize};

/// Warn / crit boundaries for one dimension. Invariant: `0 < warn < crit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub warn: f64,
    pub crit: f64,
}

impl Thresholds {
    pub const fn new(warn: f64, crit: f64) -> Self {
        Self { warn, crit }
    }

    fn validate(&self, dimension: Dimension) -> Result<(), ConfigError> {
        if !self.warn.is_finite() || !self.crit.is_finite() {
            return Err(ConfigError::NonFinite { dimension });
        }
        if self.warn <= 0.0 {
            return Err(ConfigError::NonPositiveWarn {
                dimension,
                warn: self.warn,
            });
        }
        if self.warn >= self.crit {
            return Err(ConfigError::WarnNotBelowCrit {
                dimension,
                warn: self.warn,
                crit: self.crit,
            });
        }
        Ok(())
    }
}

fn default_size() -> Thresholds {
    Thresholds::new(100.0, 300.0)
}
fn default_grouping_size() -> Thresholds {
    Thresholds::new(50.0, 100.0)
}
fn default_direct_dependencies() -> Thresholds {
    Thresholds::new(10.0, 20.0)
}
fn default_dependency_depth() -> Thresholds {
    Thresholds::new(5.0, 10.0)
}
fn default_hot_path() -> Thresholds {
    Thresholds::new(10.0, 30.0)
}
fn default_cycles() -> Thresholds {
    Thresholds::new(1.0, 3.0)
}

/// Per-dimension thresholds (`[thresholds.<dimension>]` in depgauge.toml)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionThresholds {
    #[serde(default = "default_size")]
    pub size: Thresholds,

    #[serde(default = "default_grouping_size", alias = "grouping-size")]
    pub grouping_size: Thresholds,

    #[serde(default = "default_direct_dependencies", alias = "direct-dependencies")]
    pub direct_dependencies: Thresholds,

    #[serde(default = "default_dependency_depth", alias = "dependency-depth")]
    pub dependency_depth: Thresholds,

    #[serde(default = "default_hot_path", alias = "hot-path")]
    pub hot_path: Thresholds,

    #[serde(default = "default_cycles")]
    pub cycles: Thresholds,
}

impl Default for DimensionThresholds {
    fn default() -> Self {
        Self {
            size: default_size(),
            grouping_size: default_grouping_size(),
            direct_dependencies: default_direct_dependencies(),
            dependency_depth: default_dependency_depth(),
            hot_path: default_hot_path(),
            cycles: default_cycles(),
        }
    }
}

impl DimensionThresholds {
    pub fn get(&self, dimension: Dimension) -> Thresholds {
        match dimension {
            Dimension::Size => self.size,
            Dimension::GroupingSize => self.grouping_size,
            Dimension::DirectDependencies => self.direct_dependencies,
            Dimension::DependencyDepth => self.dependency_depth,
            Dimension::HotPath => self.hot_path,
            Dimension::Cycles => self.cycles,
        }
    }

    pub fn set(&mut self, dimension: Dimension, thresholds: Thresholds) {
        let slot = match dimension {
            Dimension::Size => &mut self.size,
            Dimension::GroupingSize => &mut self.grouping_size,
            Dimension::DirectDependencies => &mut self.direct_dependencies,
            Dimension::DependencyDepth => &mut self.dependency_depth,
            Dimension::HotPath => &mut self.hot_path,
            Dimension::Cycles => &mut self.cycles,
        };
        *slot = thresholds;
    }
}

fn default_weight() -> f64 {
    1.0
}

/// Composite-score weights. A zero weight drops the dimension from the
/// composite score; it still counts toward the overall level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    #[serde(default = "default_weight")]
    pub size: f64,

    #[serde(default = "default_weight", alias = "grouping-size")]
    pub grouping_size: f64,

    #[serde(default = "default_weight", alias = "direct-dependencies")]
    pub direct_dependencies: f64,

    #[serde(default = "default_weight", alias = "dependency-depth")]
    pub dependency_depth: f64,

    #[serde(default = "default_weight", alias = "hot-path")]
    pub hot_path: f64,

    #[serde(default = "default_weight")]
    pub cycles: f64,
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            size: default_weight(),
            grouping_size: default_weight(),
            direct_dependencies: default_weight(),
            dependency_depth: default_weight(),
            hot_path: default_weight(),
            cycles: default_weight(),
        }
    }
}

impl DimensionWeights {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Size => self.size,
            Dimension::GroupingSize => self.grouping_size,
            Dimension::DirectDependencies => self.direct_dependencies,
            Dimension::DependencyDepth => self.dependency_depth,
            Dimension::HotPath => self.hot_path,
            Dimension::Cycles => self.cycles,
        }
    }

    /// Weights must be finite and non-negative, and not all zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut total = 0.0;
        for dimension in Dimension::ALL {
            let weight = self.get(dimension);
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeight { dimension, weight });
            }
            total += weight;
        }
        if total <= 0.0 {
            return Err(ConfigError::ZeroWeights);
        }
        Ok(())
    }
}

pub fn default_migration_threshold() -> f64 {
    60.0
}

/// Complete engine configuration, read as one snapshot per analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default)]
    pub thresholds: DimensionThresholds,

    #[serde(default)]
    pub weights: DimensionWeights,

    /// Migration score at which a unit is flagged migration-worthy
    #[serde(default = "default_migration_threshold")]
    pub migration_threshold: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            thresholds: DimensionThresholds::default(),
            weights: DimensionWeights::default(),
            migration_threshold: default_migration_threshold(),
        }
    }
}

impl ThresholdConfig {
    pub fn get(&self, dimension: Dimension) -> Thresholds {
        self.thresholds.get(dimension)
    }

    pub fn weight(&self, dimension: Dimension) -> f64 {
        self.weights.get(dimension)
    }

    /// Check every invariant; the first violation is returned
    pub fn validate(&self) -> Result<(), ConfigError> {
        for dimension in Dimension::ALL {
            self.thresholds.get(dimension).validate(dimension)?;
        }
        self.weights.validate()?;
        if !(0.0..=100.0).contains(&self.migration_threshold) {
            return Err(ConfigError::InvalidMigrationThreshold(
                self.migration_threshold,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ThresholdConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.get(Dimension::Size), Thresholds::new(100.0, 300.0));
        assert_eq!(config.get(Dimension::GroupingSize), Thresholds::new(50.0, 100.0));
        assert_eq!(config.get(Dimension::DirectDependencies), Thresholds::new(10.0, 20.0));
        assert_eq!(config.get(Dimension::DependencyDepth), Thresholds::new(5.0, 10.0));
        assert_eq!(config.get(Dimension::HotPath), Thresholds::new(10.0, 30.0));
        assert_eq!(config.get(Dimension::Cycles), Thresholds::new(1.0, 3.0));
        assert_eq!(config.migration_threshold, 60.0);
    }

    #[test]
    fn test_rejects_warn_not_below_crit() {
        let mut config = ThresholdConfig::default();
        config.thresholds.set(Dimension::HotPath, Thresholds::new(30.0, 30.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WarnNotBelowCrit {
                dimension: Dimension::HotPath,
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_non_positive_warn() {
        let mut config = ThresholdConfig::default();
        config.thresholds.set(Dimension::Size, Thresholds::new(0.0, 10.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveWarn { .. })
        ));
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut config = ThresholdConfig::default();
        config.thresholds.set(Dimension::Cycles, Thresholds::new(1.0, f64::INFINITY));
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonFinite {
                dimension: Dimension::Cycles
            })
        );
    }

    #[test]
    fn test_rejects_bad_weights() {
        let mut config = ThresholdConfig::default();
        config.weights.size = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeight { .. })
        ));

        let config = ThresholdConfig {
            weights: DimensionWeights {
                size: 0.0,
                grouping_size: 0.0,
                direct_dependencies: 0.0,
                dependency_depth: 0.0,
                hot_path: 0.0,
                cycles: 0.0,
            },
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroWeights));
    }

    #[test]
    fn test_rejects_migration_threshold_out_of_range() {
        let config = ThresholdConfig {
            migration_threshold: 120.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMigrationThreshold(_))
        ));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ThresholdConfig = toml::from_str(
            r#"
migration_threshold = 50

[thresholds.hot-path]
warn = 5
crit = 15

[weights]
cycles = 2.0
"#,
        )
        .unwrap();
        assert_eq!(config.get(Dimension::HotPath), Thresholds::new(5.0, 15.0));
        assert_eq!(config.get(Dimension::Size), Thresholds::new(100.0, 300.0));
        assert_eq!(config.weight(Dimension::Cycles), 2.0);
        assert_eq!(config.weight(Dimension::Size), 1.0);
        assert_eq!(config.migration_threshold, 50.0);
    }
}
