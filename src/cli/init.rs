//! Init command - write an example reclink.toml

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

const EXAMPLE_CONFIG: &str = r#"# reclink configuration
# Command-line flags override every value here.

# Compared fields, in pattern order
fields = ["name", "city", "address"]

[training]
# Maximum false-positive rate (unmatch mass classified MATCH)
mu = 0.005
# Maximum false-negative rate (match mass classified UNMATCH)
lambda = 0.005
# Random pairs drawn for the unmatch sample
unmatch_sample_size = 1000
seed = 1234

[similarity]
# Jaro-Winkler score cut-offs
high = 0.8
medium = 0.6

[blocking]
# Only compare records sharing this field's value
# field = "city"

[sources.left]
# file = "zagat.csv"
# columns = ["name", "address", "city"]

[sources.right]
# file = "fodors.csv"
# columns = ["name", "address", "city"]

[links]
# file = "matches.csv"
"#;

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    let dir = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !dir.is_dir() {
        anyhow::bail!("Path is not a directory: {}", dir.display());
    }

    let config_path = dir.join("reclink.toml");
    if config_path.exists() {
        anyhow::bail!(
            "{} already exists; remove it first to regenerate",
            config_path.display()
        );
    }

    std::fs::write(&config_path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );

    println!("\nNext steps:");
    println!("  {} Point [sources] and [links] at your CSV files", style("edit reclink.toml").cyan());
    println!("  {} Inspect the learned partition", style("reclink train").cyan());
    println!("  {} Classify every pair", style("reclink link").cyan());

    Ok(())
}
