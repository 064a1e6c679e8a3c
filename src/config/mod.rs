//! Configuration module for reclink
//!
//! This module handles:
//! - Project-level configuration (reclink.toml / .reclinkrc.json)
//! - Training and similarity defaults
//! - Source file and column layout

mod project_config;

pub use project_config::{
    load_config_file, load_linkage_config, BlockingConfig, LinkageConfig, LinksConfig,
    SourceConfig, SourcesConfig, CONFIG_FILE_NAMES,
};
