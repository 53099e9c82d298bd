//! depgauge - dependency-graph health scoring
//!
//! Walks the reference graph of each analyzable unit, detects cycles,
//! and rates size, fan-out, depth, hot-path load and circularity as
//! Green / Yellow / Red. The [`pipeline::Analyzer`] is the entry point;
//! providers plug in through the traits in [`graph::traits`].

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod reporters;
pub mod scoring;

pub use config::ThresholdConfig;
pub use error::{ConfigError, ProviderError, ScanError};
pub use graph::ProjectGraph;
pub use models::{HealthLevel, NodeId, Report};
pub use pipeline::{Analyzer, CancellationToken, ProjectSummary, ScanOptions};
