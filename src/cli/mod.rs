//! CLI command definitions and handlers

mod init;
mod inputs;
mod link;
mod train;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use reclink::config::{load_config_file, load_linkage_config, LinkageConfig};
use reclink::reporters::OutputFormat;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

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

/// Parse a rate in [0, 1]
fn parse_rate(s: &str) -> Result<f64, String> {
    let v: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(format!("{} is outside [0, 1]", v))
    }
}

/// reclink - Probabilistic record linkage
#[derive(Parser, Debug)]
#[command(name = "reclink")]
#[command(
    version,
    about = "Probabilistic record linkage between two datasets with no shared key",
    long_about = "reclink learns which field-similarity patterns indicate that two records \
describe the same entity (Fellegi-Sunter), then labels every candidate pair as a match, \
a possible match needing review, or an unmatch, within the false-positive (mu) and \
false-negative (lambda) rates you allow.",
    after_help = "\
Examples:
  reclink init                                          Write an example reclink.toml
  reclink train --left zagat.csv --right fodors.csv --links matches.csv
  reclink link --left zagat.csv --right fodors.csv --links matches.csv --block-on city
  reclink link --format csv -o pairs.csv                Sources taken from reclink.toml"
)]
pub struct Cli {
    /// Config file (default: reclink.toml or .reclinkrc.json in the current directory)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64)
    #[arg(long, global = true, default_value = "8", value_parser = parse_workers)]
    pub workers: usize,

    #[command(subcommand)]
    pub command: Commands,
}

/// Inputs and training parameters shared by `train` and `link`
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Left record collection (header-less CSV, key in the first column)
    #[arg(long)]
    pub left: Option<PathBuf>,

    /// Right record collection
    #[arg(long)]
    pub right: Option<PathBuf>,

    /// Known links (header-less CSV of left key, right key)
    #[arg(long)]
    pub links: Option<PathBuf>,

    /// Compared fields, comma separated (default: name,city,address)
    #[arg(long, value_delimiter = ',')]
    pub fields: Option<Vec<String>>,

    /// Maximum false-positive rate
    #[arg(long, value_parser = parse_rate)]
    pub mu: Option<f64>,

    /// Maximum false-negative rate
    #[arg(long, value_parser = parse_rate)]
    pub lambda: Option<f64>,

    /// Number of random pairs in the unmatch sample
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Seed for the unmatch sampler
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an example reclink.toml
    Init {
        /// Directory to write into
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Train a model and show the pattern partition
    #[command(after_help = "\
Examples:
  reclink train --left zagat.csv --right fodors.csv --links matches.csv
  reclink train --mu 0.01 --lambda 0.01 --format json")]
    Train {
        #[command(flatten)]
        sources: SourceArgs,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Train, then classify every candidate pair
    #[command(after_help = "\
Examples:
  reclink link --left zagat.csv --right fodors.csv --links matches.csv
  reclink link --block-on city                          Only compare records in the same city
  reclink link --format csv -o pairs.csv                Joined pair rows")]
    Link {
        #[command(flatten)]
        sources: SourceArgs,

        /// Only compare pairs with identical values in this field
        #[arg(long)]
        block_on: Option<String>,

        /// Compare the full cross product even if the config sets blocking
        #[arg(long, conflicts_with = "block_on")]
        no_blocking: bool,

        /// Output format: text, json, csv
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "csv"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(cli.workers)
        .build_global()
    {
        warn!("Could not size worker pool: {}", e);
    }

    match cli.command {
        Commands::Init { path } => init::run(&path),

        Commands::Train {
            sources,
            format,
            output,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let format: OutputFormat = format.parse()?;
            train::run(&config, &sources, format, output.as_deref())
        }

        Commands::Link {
            sources,
            block_on,
            no_blocking,
            format,
            output,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if no_blocking {
                config.blocking.field = None;
            } else if block_on.is_some() {
                config.blocking.field = block_on;
            }
            let format: OutputFormat = format.parse()?;
            link::run(&config, &sources, format, output.as_deref())
        }
    }
}

/// Explicit config must load; a discovered one falls back to defaults
fn load_config(explicit: Option<&Path>) -> Result<LinkageConfig> {
    match explicit {
        Some(path) => {
            let config = load_config_file(path)?;
            debug!("Loaded linkage config from {}", path.display());
            Ok(config)
        }
        None => {
            let cwd = std::env::current_dir().context("Cannot read current directory")?;
            Ok(load_linkage_config(&cwd))
        }
    }
}

/// Spinner on stderr, hidden for machine-readable formats
fn spinner(format: OutputFormat, message: &'static str) -> ProgressBar {
    if format != OutputFormat::Text {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
    {
        bar.set_style(spinner_style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Write rendered output to a file, or stdout
fn emit(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Wrote {}",
                console::style("✓").green(),
                console::style(path.display()).cyan()
            );
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
