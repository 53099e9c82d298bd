//! CLI command definitions and handlers

mod analyze;
mod graph;
mod init;
mod scan;
mod thresholds;

use crate::config::{load_config_file, load_project_config, ProjectConfig};
use crate::graph::ProjectGraph;
use crate::pipeline::Analyzer;
use crate::reporters::OutputFormat;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// depgauge - dependency-graph health scoring
#[derive(Parser, Debug)]
#[command(name = "depgauge")]
#[command(
    version,
    about = "Dependency-graph health scoring: walk unit references, detect cycles, rate size, depth and hot-path load",
    long_about = "depgauge reads a project manifest (units, their references and structural \
facts), walks each unit's reference graph, detects cycles, and classifies size, \
fan-out, depth, hot-path load and cycles into Green / Yellow / Red health levels.",
    after_help = "\
Examples:
  depgauge init                                   Write a default depgauge.toml
  depgauge analyze /Game/Characters/BP_Hero       Analyze one unit
  depgauge scan --top 20                          Rank the worst units in the project
  depgauge scan --filter '/Game/Maps/**' --fail-on red   CI gate for a subtree
  depgauge export -o health.csv                   CSV export of every unit
  depgauge graph                                  Project-wide cyclic clusters"
)]
pub struct Cli {
    /// Project manifest (JSON, or TOML with a .toml extension)
    #[arg(long, short = 'p', global = true, default_value = "depgauge.json", env = "DEPGAUGE_PROJECT")]
    pub project: PathBuf,

    /// Config file (default: depgauge.toml or .depgaugerc.json in the working directory)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a depgauge.toml with the default thresholds
    Init {
        /// Overwrite an existing depgauge.toml
        #[arg(long)]
        force: bool,
    },

    /// Analyze a single unit
    #[command(after_help = "\
Examples:
  depgauge analyze /Game/BP_Hero                      Text report
  depgauge analyze /Game/BP_Hero --format json        JSON for scripting
  depgauge analyze /Game/BP_Hero --max-depth 8        Bound the walk")]
    Analyze {
        /// Unit id as listed in the manifest
        unit: String,

        /// Output format: text, json, markdown (or md), csv
        #[arg(long, short = 'f', value_parser = ["text", "json", "markdown", "md", "csv"])]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Maximum walk depth (default: walk.max_depth from config)
        #[arg(long)]
        max_depth: Option<u32>,
    },

    /// Analyze every unit and summarize the project
    #[command(after_help = "\
Examples:
  depgauge scan                                  Whole project, top 10
  depgauge scan --top 0 --format json            Every unit as JSON
  depgauge scan --filter '/Game/Characters/*'    One folder
  depgauge scan --fail-on yellow                 Exit code 1 on any Yellow or Red unit")]
    Scan {
        /// Unit filter glob (`*`, `**`, or a path prefix); empty = all units
        #[arg(long, default_value = "")]
        filter: String,

        /// Units kept in the ranking (0 = all)
        #[arg(long)]
        top: Option<usize>,

        /// Output format: text, json, markdown (or md), csv
        #[arg(long, short = 'f', value_parser = ["text", "json", "markdown", "md", "csv"])]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Exit with code 1 if any unit is at this level or worse
        #[arg(long, value_parser = ["yellow", "red"])]
        fail_on: Option<String>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Export one CSV row per unit
    Export {
        /// Unit filter glob; empty = all units
        #[arg(long, default_value = "")]
        filter: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show the effective thresholds and weights
    Thresholds {
        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Manifest statistics and project-wide cyclic clusters
    Graph {
        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

/// Effective configuration for a command
fn load_config(cli: &Cli) -> Result<ProjectConfig> {
    match &cli.config {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(load_project_config(Path::new("."))),
    }
}

/// Load the manifest and build an analyzer configured from `config`
fn open_project(
    cli: &Cli,
    config: &ProjectConfig,
    max_depth: Option<u32>,
) -> Result<(Arc<ProjectGraph>, Analyzer)> {
    if !cli.project.exists() {
        anyhow::bail!(
            "Project manifest not found: {}. Pass {} or set DEPGAUGE_PROJECT.",
            cli.project.display(),
            style("--project <FILE>").cyan()
        );
    }
    let graph = Arc::new(ProjectGraph::load(&cli.project)?);
    let max_depth = max_depth.unwrap_or(config.walk.max_depth);
    let analyzer = Analyzer::from_graph(Arc::clone(&graph))
        .with_max_depth(max_depth)
        .with_thresholds(config.threshold_config())
        .context("Invalid threshold configuration")?;
    debug!(
        "Opened project {} (max depth {})",
        cli.project.display(),
        max_depth
    );
    Ok((graph, analyzer))
}

/// Output format from the flag, then the config default, then text
fn resolve_format(flag: Option<&str>, config: &ProjectConfig) -> Result<OutputFormat> {
    let name = flag
        .or(config.defaults.format.as_deref())
        .unwrap_or("text");
    OutputFormat::from_str(name)
}

/// Print to stdout, or write to `path` and say where it went
fn write_output(output: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, output)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Report written to: {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
        None => print!("{}", output),
    }
    Ok(())
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Init { force } => init::run(Path::new("."), *force),

        Commands::Analyze {
            unit,
            format,
            output,
            max_depth,
        } => {
            let config = load_config(&cli)?;
            let format = resolve_format(format.as_deref(), &config)?;
            let (_, analyzer) = open_project(&cli, &config, *max_depth)?;
            analyze::run(&analyzer, unit, format, output.as_deref())
        }

        Commands::Scan {
            filter,
            top,
            format,
            output,
            fail_on,
            no_progress,
        } => {
            let config = load_config(&cli)?;
            let format = resolve_format(format.as_deref(), &config)?;
            let (_, analyzer) = open_project(&cli, &config, None)?;
            let options = scan::ScanArgs {
                filter,
                top: top.or(config.defaults.top),
                workers: cli.workers.or(config.defaults.workers),
                format,
                output: output.as_deref(),
                fail_on: fail_on.clone().or_else(|| config.defaults.fail_on.clone()),
                show_progress: !*no_progress,
            };
            scan::run(&analyzer, options)
        }

        Commands::Export { filter, output } => {
            let config = load_config(&cli)?;
            let (_, analyzer) = open_project(&cli, &config, None)?;
            scan::export(
                &analyzer,
                filter,
                cli.workers.or(config.defaults.workers),
                output.as_deref(),
            )
        }

        Commands::Thresholds { format } => {
            let config = load_config(&cli)?;
            thresholds::run(&config, format)
        }

        Commands::Graph { format } => {
            let config = load_config(&cli)?;
            let (graph, _) = open_project(&cli, &config, None)?;
            graph::run(&graph, format)
        }
    }
}
