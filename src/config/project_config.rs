//! Project-level configuration support
//!
//! Loads per-project configuration from `depgauge.toml` or
//! `.depgaugerc.json` in the working directory.
//!
//! # Configuration Format
//!
//! ```toml
//! # depgauge.toml
//!
//! [thresholds.size]
//! warn = 100
//! crit = 300
//!
//! [thresholds.hot_path]
//! warn = 10
//! crit = 30
//!
//! [scoring]
//! migration_threshold = 60
//! weights = { size = 1.0, cycles = 2.0 }
//!
//! [walk]
//! max_depth = 64
//!
//! [defaults]
//! format = "text"
//! top = 10
//! workers = 8
//! ```

use crate::config::thresholds::{
    default_migration_threshold, DimensionThresholds, DimensionWeights, ThresholdConfig,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

pub const CONFIG_FILE_TOML: &str = "depgauge.toml";
pub const CONFIG_FILE_JSON: &str = ".depgaugerc.json";

/// Default traversal bound
pub const DEFAULT_MAX_DEPTH: u32 = 64;

/// Default number of units kept in a project summary ranking
pub const DEFAULT_TOP_N: usize = 10;

/// Template written by `depgauge init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# depgauge configuration
#
# Each dimension is classified Green below `warn`, Yellow from `warn`,
# and Red from `crit`. Values must satisfy 0 < warn < crit.

[thresholds.size]
warn = 100
crit = 300

[thresholds.grouping_size]
warn = 50
crit = 100

[thresholds.direct_dependencies]
warn = 10
crit = 20

[thresholds.dependency_depth]
warn = 5
crit = 10

[thresholds.hot_path]
warn = 10
crit = 30

[thresholds.cycles]
warn = 1
crit = 3

[scoring]
# Migration score (0-100) at which a unit is flagged migration-worthy
migration_threshold = 60

# Composite score weights; 0 removes a dimension from the composite score
[scoring.weights]
size = 1.0
grouping_size = 1.0
direct_dependencies = 1.0
dependency_depth = 1.0
hot_path = 1.0
cycles = 1.0

[walk]
max_depth = 64

[defaults]
# format = "text"
# top = 10
# workers = 8
# fail_on = "red"
"#;

/// Complete project configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub thresholds: DimensionThresholds,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub walk: WalkConfig,

    #[serde(default)]
    pub defaults: CliDefaults,
}

impl ProjectConfig {
    /// Engine configuration assembled from the thresholds and scoring sections
    pub fn threshold_config(&self) -> ThresholdConfig {
        ThresholdConfig {
            thresholds: self.thresholds.clone(),
            weights: self.scoring.weights.clone(),
            migration_threshold: self.scoring.migration_threshold,
        }
    }
}

/// Scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: DimensionWeights,

    #[serde(default = "default_migration_threshold")]
    pub migration_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: DimensionWeights::default(),
            migration_threshold: default_migration_threshold(),
        }
    }
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

/// Graph traversal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

/// Default CLI flags that can be set in project config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliDefaults {
    /// Default output format (text, json, markdown, csv)
    #[serde(default)]
    pub format: Option<String>,

    /// Default ranking size for `scan`
    #[serde(default)]
    pub top: Option<usize>,

    /// Default number of workers
    #[serde(default)]
    pub workers: Option<usize>,

    /// Fail-on level threshold for CI
    #[serde(default)]
    pub fail_on: Option<String>,
}

/// Load project configuration from a directory.
///
/// Searches for configuration files in this order:
/// 1. `depgauge.toml`
/// 2. `.depgaugerc.json`
///
/// A file that fails to parse or validate is reported and skipped.
/// Returns default configuration if no usable file is found.
pub fn load_project_config(dir: &Path) -> ProjectConfig {
    let toml_path = dir.join(CONFIG_FILE_TOML);
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {:#}", toml_path.display(), e);
            }
        }
    }

    let json_path = dir.join(CONFIG_FILE_JSON);
    if json_path.exists() {
        match load_json_config(&json_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", json_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {:#}", json_path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

/// Load an explicitly named config file; `.json` files are parsed as JSON,
/// anything else as TOML. Errors are returned, not swallowed.
pub fn load_config_file(path: &Path) -> anyhow::Result<ProjectConfig> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        load_json_config(path)
    } else {
        load_toml_config(path)
    }
}

/// Load configuration from a TOML file
fn load_toml_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ProjectConfig = toml::from_str(&content)?;
    config.threshold_config().validate()?;
    Ok(config)
}

/// Load configuration from a JSON file
fn load_json_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ProjectConfig = serde_json::from_str(&content)?;
    config.threshold_config().validate()?;
    Ok(config)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GlobToken {
    Literal(char),
    /// `*`: any run of characters within one path segment
    Star,
    /// `**`: any run of characters, separators included
    DoubleStar,
    /// `**/`: empty, or any run ending in a separator
    AnyDirs,
}

fn tokenize(pattern: &str) -> Vec<GlobToken> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '*' {
            if chars.get(i + 1) == Some(&'*') {
                if chars.get(i + 2) == Some(&'/') {
                    tokens.push(GlobToken::AnyDirs);
                    i += 3;
                } else {
                    tokens.push(GlobToken::DoubleStar);
                    i += 2;
                }
            } else {
                tokens.push(GlobToken::Star);
                i += 1;
            }
        } else {
            tokens.push(GlobToken::Literal(chars[i]));
            i += 1;
        }
    }
    tokens
}

/// Glob matching for unit ids.
///
/// `*` stays inside a segment, `**` crosses segments, `**/` also matches
/// nothing. A pattern without wildcards matches the id itself and every id
/// below it (`/Game/Maps` matches `/Game/Maps/Arena`). An empty pattern
/// matches everything.
pub fn glob_match(pattern: &str, path: &str) -> bool {
    if pattern.is_empty() {
        return true;
    }
    if !pattern.contains('*') {
        let dir = pattern.trim_end_matches('/');
        return path == pattern
            || path == dir
            || path
                .strip_prefix(dir)
                .is_some_and(|rest| rest.starts_with('/'));
    }

    let tokens = tokenize(pattern);
    let text: Vec<char> = path.chars().collect();

    // matched[j]: the tokens so far match text[..j]
    let mut matched = vec![false; text.len() + 1];
    matched[0] = true;

    for token in tokens {
        let mut next = vec![false; text.len() + 1];
        match token {
            GlobToken::Literal(c) => {
                for j in 1..=text.len() {
                    next[j] = matched[j - 1] && text[j - 1] == c;
                }
            }
            GlobToken::Star => {
                next[0] = matched[0];
                for j in 1..=text.len() {
                    next[j] = matched[j] || (next[j - 1] && text[j - 1] != '/');
                }
            }
            GlobToken::DoubleStar => {
                next[0] = matched[0];
                for j in 1..=text.len() {
                    next[j] = matched[j] || next[j - 1];
                }
            }
            GlobToken::AnyDirs => {
                let mut seen = matched[0];
                next[0] = matched[0];
                for j in 1..=text.len() {
                    next[j] = matched[j] || (seen && text[j - 1] == '/');
                    seen |= matched[j];
                }
            }
        }
        matched = next;
    }

    matched[text.len()]
}
