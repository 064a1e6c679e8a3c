//! Project-level configuration support
//!
//! Loads linkage configuration from `reclink.toml` or `.reclinkrc.json`
//! in the working directory, or from an explicit path.
//!
//! # Configuration Format
//!
//! ```toml
//! # reclink.toml
//! fields = ["name", "city", "address"]
//!
//! [training]
//! mu = 0.005
//! lambda = 0.005
//! unmatch_sample_size = 1000
//! seed = 1234
//!
//! [similarity]
//! high = 0.8
//! medium = 0.6
//!
//! [blocking]
//! field = "city"
//!
//! [sources.left]
//! file = "zagat.csv"
//! columns = ["name", "address", "city", "phone", "type"]
//!
//! [sources.right]
//! file = "fodors.csv"
//! columns = ["name", "address", "city", "phone", "type"]
//!
//! [links]
//! file = "matches.csv"
//! ```

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::linkage::{LevelThresholds, TrainingConfig};

/// Config file names, in lookup order
pub const CONFIG_FILE_NAMES: &[&str] = &["reclink.toml", ".reclinkrc.json"];

/// Linkage configuration loaded from reclink.toml or similar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkageConfig {
    /// Compared field names, in pattern order
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,

    #[serde(default)]
    pub training: TrainingConfig,

    /// Score cut-offs for high / medium similarity
    #[serde(default)]
    pub similarity: LevelThresholds,

    #[serde(default)]
    pub blocking: BlockingConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub links: LinksConfig,
}

fn default_fields() -> Vec<String> {
    vec!["name".into(), "city".into(), "address".into()]
}

impl Default for LinkageConfig {
    fn default() -> Self {
        Self {
            fields: default_fields(),
            training: TrainingConfig::default(),
            similarity: LevelThresholds::default(),
            blocking: BlockingConfig::default(),
            sources: SourcesConfig::default(),
            links: LinksConfig::default(),
        }
    }
}

/// Exact-field blocking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingConfig {
    /// Only compare pairs sharing this field's value
    #[serde(default)]
    pub field: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub left: SourceConfig,
    #[serde(default)]
    pub right: SourceConfig,
}

/// One record collection on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Header-less CSV, key in the first column
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Display name (defaults to the file stem)
    #[serde(default)]
    pub name: Option<String>,

    /// Names of the columns after the key (defaults to `fields`)
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Header-less two-column CSV of (left key, right key)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LinkageConfig {
    /// Column names for a source, falling back to the compared fields
    pub fn columns_for<'a>(&'a self, source: &'a SourceConfig) -> &'a [String] {
        if source.columns.is_empty() {
            &self.fields
        } else {
            &source.columns
        }
    }

    /// Resolve relative source paths against the config file's directory
    pub fn resolve_paths(&mut self, base: &Path) {
        for file in [
            &mut self.sources.left.file,
            &mut self.sources.right.file,
            &mut self.links.file,
        ] {
            if let Some(path) = file.as_mut() {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }
}

/// Load config from the first known file in `dir`.
///
/// A missing or broken config is not fatal: defaults are returned and
/// the problem is logged.
pub fn load_linkage_config(dir: &Path) -> LinkageConfig {
    for name in CONFIG_FILE_NAMES {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => {
                debug!("Loaded linkage config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {:#}", path.display(), e);
            }
        }
    }

    debug!("No linkage config found, using defaults");
    LinkageConfig::default()
}

/// Load an explicit config file; the format follows the extension
pub fn load_config_file(path: &Path) -> anyhow::Result<LinkageConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut config: LinkageConfig = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?,
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in {}", path.display()))?,
        _ => bail!(
            "Unsupported config format for {} (expected .toml or .json)",
            path.display()
        ),
    };

    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }
    Ok(config)
}
