//! Error types for the analysis engine
//!
//! Per-unit failures never surface here: they are recovered locally and
//! recorded as report flags. Only configuration and scan-level failures are
//! returned to callers.

use crate::models::{Dimension, NodeId};
use thiserror::Error;

/// Rejected threshold or scoring configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid thresholds for {dimension}: warn ({warn}) must be lower than crit ({crit})")]
    WarnNotBelowCrit {
        dimension: Dimension,
        warn: f64,
        crit: f64,
    },

    #[error("Invalid thresholds for {dimension}: warn ({warn}) must be greater than zero")]
    NonPositiveWarn { dimension: Dimension, warn: f64 },

    #[error("Invalid thresholds for {dimension}: values must be finite")]
    NonFinite { dimension: Dimension },

    #[error("Invalid weight for {dimension}: {weight} (weights must be finite and >= 0)")]
    InvalidWeight { dimension: Dimension, weight: f64 },

    #[error("All dimension weights are zero; at least one must be positive")]
    ZeroWeights,

    #[error("Invalid migration threshold {0}: must be within 0-100")]
    InvalidMigrationThreshold(f64),
}

/// Failure of an edge lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Node not found: {0}")]
    NotFound(NodeId),

    #[error("Lookup failed for {node}: {reason}")]
    Unavailable { node: NodeId, reason: String },
}

/// Failure of a whole-project scan
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Scan cancelled")]
    Cancelled,

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
