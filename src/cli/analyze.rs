//! Analyze command - report on a single unit

use super::write_output;
use crate::models::NodeId;
use crate::pipeline::Analyzer;
use crate::reporters::{self, OutputFormat};
use anyhow::Result;
use std::path::Path;
use tracing::{info, warn};

/// Run the analyze command
pub fn run(
    analyzer: &Analyzer,
    unit: &str,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let unit = NodeId::from(unit);
    info!("Analyzing {} (max depth {})", unit, analyzer.max_depth());

    let report = analyzer
        .try_analyze_unit(&unit)
        .map_err(|err| anyhow::anyhow!("Could not analyze {}: {}", unit, err))?;
    if let Some(ref reason) = report.incomplete_reason {
        warn!("{} is incomplete: {}", unit, reason);
    }

    let rendered = reporters::report_with_format(&report, format)?;
    write_output(&rendered, output)
}
