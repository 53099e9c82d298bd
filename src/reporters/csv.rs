//! Tabular export
//!
//! Fixed columns, in this order:
//! `unit,overall_score,health_level,element_count,hot_path,circular_refs,migration_score`.
//! Scores use one decimal; names are quoted per RFC 4180 when needed.

use crate::models::Report;

pub const HEADER: &str =
    "unit,overall_score,health_level,element_count,hot_path,circular_refs,migration_score";

/// Quote a field when it contains a separator, quote or line break
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn render_row(report: &Report) -> String {
    format!(
        "{},{:.1},{},{},{},{},{:.1}",
        escape_field(&report.name),
        report.composite_score,
        report.overall_level,
        report.measurements.total_elements,
        if report.measurements.uses_hot_path() { "Yes" } else { "No" },
        report.measurements.cycle_count,
        report.migration.score
    )
}

/// Header plus one row per report, newline-terminated
pub fn render_rows(reports: &[Report]) -> String {
    let mut out = String::with_capacity(HEADER.len() + 1 + reports.len() * 48);
    out.push_str(HEADER);
    out.push('\n');
    for report in reports {
        out.push_str(&render_row(report));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::{test_report, test_summary};

    #[test]
    fn test_header_column_order() {
        let columns: Vec<&str> = HEADER.split(',').collect();
        assert_eq!(
            columns,
            vec![
                "unit",
                "overall_score",
                "health_level",
                "element_count",
                "hot_path",
                "circular_refs",
                "migration_score"
            ]
        );
    }

    #[test]
    fn test_render_row() {
        assert_eq!(render_row(&test_report()), "BP_Hero,57.5,Red,342,Yes,1,90.0");
    }

    #[test]
    fn test_quoting() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_render_summary_rows_in_rank_order() {
        let out = render_rows(&test_summary().top_units);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].starts_with("BP_Hero,"));
        assert_eq!(lines[2], "\"BP_Door, \"\"front\"\"\",12.0,Green,342,No,0,0.0");
    }
}
