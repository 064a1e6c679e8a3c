//! Resolve run inputs from config and flags, then load them

use anyhow::{bail, Context, Result};
use reclink::config::{LinkageConfig, SourceConfig};
use reclink::linkage::{Blocking, FeatureExtractor, LevelThresholds, TrainingConfig};
use reclink::loader::{load_links, load_records};
use reclink::models::{KnownLink, RecordSet};
use reclink::reporters::ReportContext;
use std::path::{Path, PathBuf};
use tracing::info;

use super::SourceArgs;

/// Everything loaded for one run
pub struct Inputs {
    pub left: RecordSet,
    pub right: RecordSet,
    pub links: Vec<KnownLink>,
    pub fields: Vec<String>,
    pub training: TrainingConfig,
    pub similarity: LevelThresholds,
    pub blocking_field: Option<String>,
}

impl Inputs {
    /// Merge flags over config (flags win) and load the three files
    pub fn load(config: &LinkageConfig, args: &SourceArgs) -> Result<Self> {
        let mut config = config.clone();
        apply_overrides(&mut config, args);

        config
            .training
            .validate()
            .context("Invalid training configuration")?;
        config
            .similarity
            .validate()
            .context("Invalid similarity thresholds")?;

        let left_path = required(config.sources.left.file.as_deref(), "--left", "sources.left.file")?;
        let right_path =
            required(config.sources.right.file.as_deref(), "--right", "sources.right.file")?;
        let links_path = required(config.links.file.as_deref(), "--links", "links.file")?;

        let left = load_source(&config, &config.sources.left, left_path)?;
        let right = load_source(&config, &config.sources.right, right_path)?;
        let links = load_links(links_path)
            .with_context(|| format!("Failed to load links from {}", links_path.display()))?;

        info!(
            "Loaded {} x {} records and {} known links",
            left.len(),
            right.len(),
            links.len()
        );

        Ok(Self {
            left,
            right,
            links,
            fields: config.fields,
            training: config.training,
            similarity: config.similarity,
            blocking_field: config.blocking.field,
        })
    }

    pub fn extractor(&self) -> Result<FeatureExtractor> {
        Ok(FeatureExtractor::for_fields(
            &self.fields,
            &self.left,
            &self.right,
            self.similarity,
        )?)
    }

    pub fn blocking(&self) -> Result<Blocking> {
        match &self.blocking_field {
            Some(field) => Ok(Blocking::on_field(field, &self.left, &self.right)?),
            None => Ok(Blocking::None),
        }
    }

    pub fn context(&self) -> ReportContext<'_> {
        ReportContext {
            left: &self.left,
            right: &self.right,
            fields: &self.fields,
            training: &self.training,
            similarity: self.similarity,
            blocking: self.blocking_field.as_deref(),
        }
    }
}

fn apply_overrides(config: &mut LinkageConfig, args: &SourceArgs) {
    let overrides: [(&Option<PathBuf>, &mut Option<PathBuf>); 3] = [
        (&args.left, &mut config.sources.left.file),
        (&args.right, &mut config.sources.right.file),
        (&args.links, &mut config.links.file),
    ];
    for (flag, slot) in overrides {
        if flag.is_some() {
            slot.clone_from(flag);
        }
    }
    if let Some(fields) = &args.fields {
        config.fields = fields.clone();
    }
    if let Some(mu) = args.mu {
        config.training.mu = mu;
    }
    if let Some(lambda) = args.lambda {
        config.training.lambda = lambda;
    }
    if let Some(size) = args.sample_size {
        config.training.unmatch_sample_size = size;
    }
    if let Some(seed) = args.seed {
        config.training.seed = seed;
    }
}

fn required<'a>(path: Option<&'a Path>, flag: &str, key: &str) -> Result<&'a Path> {
    match path {
        Some(p) => Ok(p),
        None => bail!("No {} given (pass {} or set {} in reclink.toml)", flag.trim_start_matches('-'), flag, key),
    }
}

fn load_source(config: &LinkageConfig, source: &SourceConfig, path: &Path) -> Result<RecordSet> {
    let name = source.name.clone().unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    });
    load_records(path, &name, config.columns_for(source))
        .with_context(|| format!("Failed to load records from {}", path.display()))
}
