//! Scan and export commands - analyze every unit in the project

use super::write_output;
use crate::config::DEFAULT_TOP_N;
use crate::models::{HealthLevel, NodeId};
use crate::pipeline::{Analyzer, ProjectSummary, ScanOptions};
use crate::reporters::{self, csv, OutputFormat};
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// Resolved flags for a scan
pub struct ScanArgs<'a> {
    pub filter: &'a str,
    pub top: Option<usize>,
    pub workers: Option<usize>,
    pub format: OutputFormat,
    pub output: Option<&'a Path>,
    pub fail_on: Option<String>,
    pub show_progress: bool,
}

fn create_bar_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .context("Invalid progress bar template")?
        .progress_chars("█▓▒░  "))
}

/// Scan options with a progress bar wired to the scan's progress callback
fn scan_options(workers: Option<usize>, top_n: usize, bar: Option<&ProgressBar>) -> ScanOptions {
    let options = ScanOptions::default()
        .with_workers(workers.unwrap_or(0))
        .with_top_n(top_n);
    match bar {
        Some(bar) => {
            let bar = bar.clone();
            // Workers finish out of order, so count completions instead of
            // trusting `done`
            options.with_progress(Box::new(move |unit: &NodeId, _done: usize, total: usize| {
                bar.set_length(total as u64);
                bar.inc(1);
                bar.set_message(unit.short_name().to_string());
            }))
        }
        None => options,
    }
}

fn progress_bar(show: bool) -> Result<Option<ProgressBar>> {
    if !show {
        return Ok(None);
    }
    let bar = ProgressBar::new(0);
    bar.set_style(create_bar_style()?);
    Ok(Some(bar))
}

/// Run the scan command
pub fn run(analyzer: &Analyzer, args: ScanArgs<'_>) -> Result<()> {
    let fail_on = args
        .fail_on
        .as_deref()
        .map(HealthLevel::from_str)
        .transpose()
        .context("Invalid --fail-on level")?;

    let bar = progress_bar(args.show_progress)?;
    let options = scan_options(args.workers, args.top.unwrap_or(DEFAULT_TOP_N), bar.as_ref());
    let summary = analyzer.analyze_project_with(args.filter, &options);
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    let summary = summary?;

    if summary.unit_count == 0 && summary.skipped.is_empty() {
        eprintln!(
            "{} No units match filter {:?}",
            style("!").yellow(),
            args.filter
        );
    }

    let rendered = reporters::summary_with_format(&summary, args.format)?;
    write_output(&rendered, args.output)?;

    if let Some(threshold) = fail_on {
        check_fail_threshold(&summary, threshold);
    }
    Ok(())
}

/// Exit with code 1 when any unit is at `threshold` or worse
fn check_fail_threshold(summary: &ProjectSummary, threshold: HealthLevel) {
    if exceeds(summary, threshold) {
        eprintln!(
            "Failing due to --fail-on={} threshold",
            threshold.to_string().to_lowercase()
        );
        std::process::exit(1);
    }
}

fn exceeds(summary: &ProjectSummary, threshold: HealthLevel) -> bool {
    summary.worst_level().is_some_and(|worst| worst >= threshold)
}

/// Run the export command
pub fn export(
    analyzer: &Analyzer,
    filter: &str,
    workers: Option<usize>,
    output: Option<&Path>,
) -> Result<()> {
    let options = scan_options(workers, 0, None);
    let outcome = analyzer.analyze_units(filter, &options)?;
    for skipped in &outcome.skipped {
        warn!("Skipped {}: {}", skipped.unit, skipped.reason);
    }
    if !outcome.skipped.is_empty() {
        eprintln!(
            "{} {} unit(s) skipped (unresolved)",
            style("!").yellow(),
            outcome.skipped.len()
        );
    }
    write_output(&csv::render_rows(&outcome.reports), output)
}
