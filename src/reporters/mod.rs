//! Output reporters for depgauge analysis results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON
//! - `markdown` - GitHub-flavored Markdown
//! - `csv` - Fixed-column table, one row per unit
//!
//! Every format renders both a single-unit [`Report`] and a
//! [`ProjectSummary`].

pub mod csv;
mod json;
mod markdown;
mod text;

use crate::models::Report;
use crate::pipeline::ProjectSummary;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown, csv",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Render a unit report using an OutputFormat enum
pub fn report_with_format(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report),
        OutputFormat::Json => json::render(report),
        OutputFormat::Markdown => markdown::render(report),
        OutputFormat::Csv => Ok(csv::render_rows(std::slice::from_ref(report))),
    }
}

/// Render a project summary using an OutputFormat enum
pub fn summary_with_format(summary: &ProjectSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render_summary(summary),
        OutputFormat::Json => json::render(summary),
        OutputFormat::Markdown => markdown::render_summary(summary),
        OutputFormat::Csv => Ok(csv::render_rows(&summary.top_units)),
    }
}
