//! Init command - write a default config file

use crate::config::{CONFIG_FILE_TOML, DEFAULT_CONFIG_TEMPLATE};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

/// Run the init command
pub fn run(dir: &Path, force: bool) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Path is not a directory: {}", dir.display());
    }

    let config_path = dir.join(CONFIG_FILE_TOML);
    if config_path.exists() && !force {
        println!(
            "{} Already initialized: {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        println!(
            "  Use {} to overwrite it with the defaults.",
            style("depgauge init --force").cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    println!(
        "\nNext: run {} to rank the units in your project.",
        style("depgauge scan").cyan()
    );
    Ok(())
}
