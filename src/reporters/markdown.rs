//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Generates reports suitable for:
//! - Pull request comments
//! - CI job summaries
//! - Project wikis

use crate::models::{HealthLevel, Report};
use crate::pipeline::ProjectSummary;
use anyhow::Result;

fn level_emoji(level: HealthLevel) -> &'static str {
    match level {
        HealthLevel::Green => "🟢",
        HealthLevel::Yellow => "🟡",
        HealthLevel::Red => "🔴",
    }
}

/// Escape characters that would break a table cell
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Render a unit report as GitHub-flavored Markdown
pub fn render(report: &Report) -> Result<String> {
    let mut md = String::new();

    md.push_str(&render_header(report));
    md.push('\n');

    if report.incomplete {
        md.push_str(&format!(
            "> ⚠️ Analysis incomplete: {}\n",
            report.incomplete_reason.as_deref().unwrap_or("root could not be resolved")
        ));
        md.push('\n');
    }

    md.push_str(&render_metrics(report));
    md.push('\n');

    md.push_str(&render_dependencies(report));
    md.push('\n');

    md.push_str(&render_migration(report));
    md.push('\n');

    md.push_str(&render_issues(report));
    md.push('\n');

    md.push_str(&render_footer());

    Ok(md)
}

fn render_header(report: &Report) -> String {
    format!(
        r#"# {} depgauge Report: {}

**Level: {}** | **Score: {:.1}/100** | `{}`
"#,
        level_emoji(report.overall_level),
        report.name,
        report.overall_level,
        report.composite_score,
        report.unit
    )
}

fn render_metrics(report: &Report) -> String {
    let mut md = String::from(
        "## Metrics\n\n| Dimension | Raw | Score | Level |\n|-----------|-----|-------|-------|\n",
    );
    for metric in &report.metrics {
        md.push_str(&format!(
            "| {} | {} | {:.1} | {} {} |\n",
            metric.dimension,
            metric.raw_value,
            metric.score,
            level_emoji(metric.level),
            metric.level
        ));
    }

    if !report.category_breakdown.is_empty() {
        md.push_str("\n### Element Categories\n\n| Category | Count | Share |\n|----------|-------|-------|\n");
        for row in &report.category_breakdown {
            md.push_str(&format!(
                "| {} | {} | {:.1}% |\n",
                row.category, row.count, row.percentage
            ));
        }
    }
    md
}

fn render_dependencies(report: &Report) -> String {
    let m = &report.measurements;
    let mut md = format!(
        r#"## Dependencies

| Metric | Value |
|--------|-------|
| Direct | {} |
| Transitive | {} |
| Max Depth | {} |
| Unresolved | {} |
| Truncated | {} |
"#,
        m.direct_dependencies,
        m.transitive_dependencies,
        m.max_dependency_depth,
        report.unresolved_count,
        if report.truncated { "yes" } else { "no" }
    );

    if !report.cycles.is_empty() {
        md.push_str(&format!("\n### Cycles ({})\n\n", report.cycles.len()));
        for cycle in &report.cycles {
            md.push_str(&format!("- `{}`\n", cycle));
        }
    }
    md
}

fn render_migration(report: &Report) -> String {
    let migration = &report.migration;
    let mut md = format!(
        "## Native Migration\n\n**Score: {:.0}/100** | Difficulty: {}/5 | Priority: {} {}\n",
        migration.score,
        migration.difficulty,
        level_emoji(migration.priority),
        migration.priority
    );
    if !migration.reasons.is_empty() {
        md.push('\n');
        for reason in &migration.reasons {
            md.push_str(&format!("- {}\n", reason));
        }
    }
    if !migration.expected_improvements.is_empty() {
        md.push_str(&format!(
            "\nExpected improvements: {}\n",
            migration.expected_improvements.join(", ")
        ));
    }
    md
}

fn render_issues(report: &Report) -> String {
    let mut md = String::from("## Issues\n\n");

    if report.issues.is_empty() {
        md.push_str("✅ No issues found.\n");
    } else {
        md.push_str("| Severity | Category | Description | Location | Fix |\n|----------|----------|-------------|----------|-----|\n");
        for issue in &report.issues {
            md.push_str(&format!(
                "| {} {} | {} | {} | {} | {} |\n",
                level_emoji(issue.severity),
                issue.severity,
                issue.category,
                cell(&issue.description),
                cell(issue.location.as_deref().unwrap_or("")),
                cell(&issue.suggested_fix)
            ));
        }
    }

    md.push_str("\n### Recommended Actions\n\n");
    for (i, action) in report.recommended_actions.iter().enumerate() {
        md.push_str(&format!("{}. {}\n", i + 1, action));
    }
    md
}

/// Render a project summary as GitHub-flavored Markdown
pub fn render_summary(summary: &ProjectSummary) -> Result<String> {
    let counts = &summary.level_counts;
    let mut md = format!(
        r#"# depgauge Project Summary

Generated: {}

| Metric | Value |
|--------|-------|
| Units Analyzed | {} |
| 🟢 Green | {} |
| 🟡 Yellow | {} |
| 🔴 Red | {} |
| Average Score | {:.1} |
| Skipped | {} |
"#,
        summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        summary.unit_count,
        counts.green,
        counts.yellow,
        counts.red,
        summary.average_score,
        summary.skipped.len()
    );

    if !summary.top_units.is_empty() {
        md.push_str("\n## Top Units\n\n| # | Unit | Level | Score | Migration |\n|---|------|-------|-------|-----------|\n");
        for (i, report) in summary.top_units.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} {} | {:.1} | {:.0} |\n",
                i + 1,
                cell(&report.name),
                level_emoji(report.overall_level),
                report.overall_level,
                report.composite_score,
                report.migration.score
            ));
        }
    }

    for (title, units) in [
        ("Circular References", &summary.cyclic_units),
        ("Hot Path Usage", &summary.hot_path_units),
        ("Migration Candidates", &summary.migration_units),
    ] {
        if units.is_empty() {
            continue;
        }
        md.push_str(&format!("\n## {}\n\n", title));
        for unit in units {
            md.push_str(&format!("- `{}`\n", unit));
        }
    }

    if !summary.skipped.is_empty() {
        md.push_str("\n## Skipped Units\n\n");
        for skipped in &summary.skipped {
            md.push_str(&format!("- `{}`: {}\n", skipped.unit, skipped.reason));
        }
    }

    md.push('\n');
    md.push_str(&render_footer());
    Ok(md)
}

fn render_footer() -> String {
    r#"---

*Generated by depgauge*
"#
    .to_string()
}
