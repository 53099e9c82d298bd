//! Configuration module for depgauge
//!
//! This module handles:
//! - Project-level configuration (depgauge.toml)
//! - Per-dimension threshold and weight overrides
//! - CLI defaults

mod project_config;
mod thresholds;

pub use project_config::{
    glob_match, load_config_file, load_project_config, CliDefaults, ProjectConfig,
    ScoringConfig, WalkConfig, CONFIG_FILE_JSON, CONFIG_FILE_TOML, DEFAULT_CONFIG_TEMPLATE,
    DEFAULT_MAX_DEPTH, DEFAULT_TOP_N,
};
pub use thresholds::{DimensionThresholds, DimensionWeights, ThresholdConfig, Thresholds};
