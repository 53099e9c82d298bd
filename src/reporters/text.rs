//! Text (terminal) reporter with colors and formatting

use crate::models::{HealthLevel, Report};
use crate::pipeline::ProjectSummary;
use anyhow::Result;

/// Level colors (ANSI escape codes)
fn level_color(level: HealthLevel) -> &'static str {
    match level {
        HealthLevel::Green => "\x1b[32m",
        HealthLevel::Yellow => "\x1b[33m",
        HealthLevel::Red => "\x1b[31m",
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Level tag
fn level_tag(level: HealthLevel) -> &'static str {
    match level {
        HealthLevel::Green => "[G]",
        HealthLevel::Yellow => "[Y]",
        HealthLevel::Red => "[R]",
    }
}

fn colored_level(level: HealthLevel) -> String {
    format!("{}{BOLD}{}{RESET}", level_color(level), level)
}

/// Render a unit report as formatted terminal output
pub fn render(report: &Report) -> Result<String> {
    let mut out = String::new();

    // Header
    out.push_str(&format!("\n{BOLD}depgauge: {}{RESET}\n", report.name));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!("Unit: {}\n", report.unit));

    if report.incomplete {
        out.push_str(&format!(
            "\x1b[33mIncomplete:{RESET} {}\n",
            report.incomplete_reason.as_deref().unwrap_or("root could not be resolved")
        ));
    }

    out.push_str(&format!(
        "Overall: {}  Score: {BOLD}{:.1}/100{RESET}\n\n",
        colored_level(report.overall_level),
        report.composite_score
    ));

    // Metrics table
    out.push_str(&format!("{BOLD}METRICS{RESET}\n"));
    for metric in &report.metrics {
        out.push_str(&format!(
            "  {:<22} {:>8}  {:>5.1}  {}{}{RESET}\n",
            metric.dimension.as_str(),
            metric.raw_value,
            metric.score,
            level_color(metric.level),
            metric.level
        ));
    }
    out.push('\n');

    let m = &report.measurements;
    out.push_str(&format!(
        "{BOLD}DEPENDENCIES{RESET}  direct {}  transitive {}  max depth {}",
        m.direct_dependencies, m.transitive_dependencies, m.max_dependency_depth
    ));
    if report.truncated {
        out.push_str(&format!("  {DIM}(truncated){RESET}"));
    }
    if report.unresolved_count > 0 {
        out.push_str(&format!("  {DIM}{} unresolved{RESET}", report.unresolved_count));
    }
    out.push('\n');

    if !report.cycles.is_empty() {
        out.push_str(&format!("\n{BOLD}CYCLES{RESET} ({})\n", report.cycles.len()));
        for (i, cycle) in report.cycles.iter().enumerate() {
            out.push_str(&format!("  {DIM}{:>3}{RESET}  {}\n", i + 1, cycle));
        }
    }

    if !report.category_breakdown.is_empty() {
        out.push_str(&format!("\n{BOLD}CATEGORIES{RESET}\n"));
        for row in &report.category_breakdown {
            out.push_str(&format!(
                "  {:<16} {:>6}  {DIM}{:>5.1}%{RESET}\n",
                row.category.as_str(),
                row.count,
                row.percentage
            ));
        }
    }

    let migration = &report.migration;
    out.push_str(&format!(
        "\n{BOLD}MIGRATION{RESET}  score {:.0}  difficulty {}/5  priority {}\n",
        migration.score,
        migration.difficulty,
        colored_level(migration.priority)
    ));
    for reason in &migration.reasons {
        out.push_str(&format!("  - {}\n", reason));
    }

    if !report.issues.is_empty() {
        out.push_str(&format!("\n{BOLD}ISSUES{RESET} ({} total)\n", report.issues.len()));
        for issue in &report.issues {
            out.push_str(&format!(
                "  {}{}{RESET}  {:<20} {}",
                level_color(issue.severity),
                level_tag(issue.severity),
                issue.category.as_str(),
                issue.description
            ));
            if let Some(location) = &issue.location {
                out.push_str(&format!("  {DIM}@ {}{RESET}", location));
            }
            out.push('\n');
            out.push_str(&format!("       {DIM}fix: {}{RESET}\n", issue.suggested_fix));
        }
    }

    if !report.recommended_actions.is_empty() {
        out.push_str(&format!("\n{BOLD}ACTIONS{RESET}\n"));
        for (i, action) in report.recommended_actions.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, action));
        }
    }

    out.push_str(&format!("\n{DIM}{}{RESET}\n", report.summary));
    Ok(out)
}

/// Render a project summary as formatted terminal output
pub fn render_summary(summary: &ProjectSummary) -> Result<String> {
    let mut out = String::new();

    out.push_str(&format!("\n{BOLD}depgauge project summary{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    let counts = &summary.level_counts;
    out.push_str(&format!(
        "Units: {}  {}{} green{RESET} | {}{} yellow{RESET} | {}{} red{RESET}  Average score: {BOLD}{:.1}{RESET}\n\n",
        summary.unit_count,
        level_color(HealthLevel::Green),
        counts.green,
        level_color(HealthLevel::Yellow),
        counts.yellow,
        level_color(HealthLevel::Red),
        counts.red,
        summary.average_score
    ));

    if !summary.top_units.is_empty() {
        out.push_str(&format!("{BOLD}TOP UNITS{RESET}\n"));
        out.push_str(&format!(
            "{DIM}  #   LEVEL  SCORE  MIGR  UNIT{RESET}\n"
        ));
        for (i, report) in summary.top_units.iter().enumerate() {
            out.push_str(&format!(
                "  {DIM}{:>3}{RESET}  {}{}{RESET}    {:>5.1}  {:>4.0}  {}\n",
                i + 1,
                level_color(report.overall_level),
                level_tag(report.overall_level),
                report.composite_score,
                report.migration.score,
                report.name
            ));
        }
        out.push('\n');
    }

    let flagged = [
        ("Cycles", &summary.cyclic_units),
        ("Hot path", &summary.hot_path_units),
        ("Migration", &summary.migration_units),
    ];
    if flagged.iter().any(|(_, units)| !units.is_empty()) {
        out.push_str(&format!("{BOLD}FLAGGED{RESET}\n"));
        for (label, units) in flagged {
            if units.is_empty() {
                continue;
            }
            let names: Vec<&str> = units.iter().map(|u| u.short_name()).collect();
            out.push_str(&format!("  {:<10} {}\n", label, names.join(", ")));
        }
        out.push('\n');
    }

    if !summary.skipped.is_empty() {
        out.push_str(&format!("{BOLD}SKIPPED{RESET} ({})\n", summary.skipped.len()));
        for skipped in &summary.skipped {
            out.push_str(&format!("  {}  {DIM}{}{RESET}\n", skipped.unit, skipped.reason));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "{DIM}Generated {}{RESET}\n",
        summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    Ok(out)
}
