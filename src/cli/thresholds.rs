//! Thresholds command - show the effective scoring configuration

use crate::config::ProjectConfig;
use crate::models::Dimension;
use anyhow::Result;
use console::style;

/// Run the thresholds command
pub fn run(config: &ProjectConfig, format: &str) -> Result<()> {
    let output = match format {
        "json" => serde_json::to_string_pretty(&serde_json::json!({
            "thresholds": config.thresholds,
            "weights": config.scoring.weights,
            "migration_threshold": config.scoring.migration_threshold,
            "max_depth": config.walk.max_depth,
        }))?,
        _ => render_text(config),
    };
    println!("{}", output);
    Ok(())
}

fn render_text(config: &ProjectConfig) -> String {
    let engine = config.threshold_config();
    let mut out = format!(
        "\n{}\n\n  {:<22} {:>8} {:>8} {:>7}\n",
        style("Effective thresholds").bold(),
        "DIMENSION",
        "WARN",
        "CRIT",
        "WEIGHT"
    );
    for dimension in Dimension::ALL {
        let t = engine.get(dimension);
        out.push_str(&format!(
            "  {:<22} {:>8} {:>8} {:>7}\n",
            style(dimension.as_str()).cyan(),
            t.warn,
            t.crit,
            engine.weight(dimension)
        ));
    }
    out.push_str(&format!(
        "\n  Migration threshold: {}\n  Max walk depth:      {}\n",
        engine.migration_threshold, config.walk.max_depth
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_lists_every_dimension() {
        let text = render_text(&ProjectConfig::default());
        for dimension in Dimension::ALL {
            assert!(text.contains(dimension.as_str()));
        }
        assert!(text.contains("Migration threshold: 60"));
    }
}
