//! CLI flag contract tests
//!
//! Runs the built binary against the restaurant fixtures to verify that
//! --format, --block-on, --output, --config and the training flags work,
//! and that bad input fails with a non-zero exit.

use std::path::{Path, PathBuf};
use std::process::Command;

fn reclink_bin() -> String {
    env!("CARGO_BIN_EXE_reclink").to_string()
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Temp dir holding copies of the fixtures
fn setup_workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in ["zagat.csv", "fodors.csv", "matches.csv"] {
        std::fs::copy(fixture(name), dir.path().join(name)).unwrap();
    }
    dir
}

const SOURCE_FLAGS: &[&str] = &[
    "--left",
    "zagat.csv",
    "--right",
    "fodors.csv",
    "--links",
    "matches.csv",
    "--fields",
    "name,city,address",
];

fn run(dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(reclink_bin())
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run reclink");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

fn run_link(dir: &Path, extra_args: &[&str]) -> (i32, String, String) {
    let mut args = vec!["link"];
    args.extend_from_slice(SOURCE_FLAGS);
    args.extend_from_slice(&["--mu", "0.1", "--lambda", "0.1", "--sample-size", "300"]);
    args.extend_from_slice(extra_args);
    run(dir, &args)
}

/// The fixture files carry columns in (name, address, city) order
fn write_columns_config(dir: &Path, extra: &str) {
    let config = format!(
        "[sources.left]\ncolumns = [\"name\", \"address\", \"city\"]\n\n\
         [sources.right]\ncolumns = [\"name\", \"address\", \"city\"]\n\n{}",
        extra
    );
    std::fs::write(dir.join("reclink.toml"), config).unwrap();
}

// ============================================================================
// link
// ============================================================================

#[test]
fn test_link_text_summary_without_blocking() {
    let dir = setup_workspace();
    write_columns_config(dir.path(), "");
    let (code, stdout, stderr) = run_link(dir.path(), &[]);
    assert_eq!(code, 0, "stderr: {}", stderr);
    let summary = stdout
        .lines()
        .find(|l| l.starts_with("Found "))
        .expect("summary line");
    assert!(summary.ends_with("unmatches without blocking."), "{}", summary);
}

#[test]
fn test_link_block_on_flag() {
    let dir = setup_workspace();
    write_columns_config(dir.path(), "");
    let (code, stdout, stderr) = run_link(dir.path(), &["--block-on", "city"]);
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("with blocking on city."));
}

#[test]
fn test_link_json_counts() {
    let dir = setup_workspace();
    write_columns_config(dir.path(), "");
    let (code, stdout, _) = run_link(dir.path(), &["--format", "json"]);
    assert_eq!(code, 0);

    let v: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON");
    let linkage = &v["linkage"];
    assert_eq!(linkage["candidates"], 64);
    let total = linkage["matches"].as_u64().unwrap()
        + linkage["possible"].as_u64().unwrap()
        + linkage["unmatches"].as_u64().unwrap();
    assert_eq!(total, 64);
    assert_eq!(v["patterns"].as_array().unwrap().len(), 27);
    assert_eq!(v["training"]["unmatch_sample_size"], 300);
}

#[test]
fn test_link_json_blocking_reduces_candidates() {
    let dir = setup_workspace();
    write_columns_config(dir.path(), "");
    let (_, stdout, _) = run_link(dir.path(), &["--format", "json", "--block-on", "city"]);
    let v: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON");
    assert_eq!(v["linkage"]["candidates"], 22);
    assert_eq!(v["blocking"], "city");
}

#[test]
fn test_link_csv_output_file() {
    let dir = setup_workspace();
    write_columns_config(dir.path(), "");
    let (code, stdout, _) = run_link(dir.path(), &["--format", "csv", "--output", "pairs.csv"]);
    assert_eq!(code, 0);
    assert!(stdout.is_empty(), "output file should replace stdout");

    let csv = std::fs::read_to_string(dir.path().join("pairs.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("label,zagat_key,zagat_name,zagat_address,zagat_city,fodors_key,fodors_name,fodors_address,fodors_city")
    );
    assert_eq!(lines.count(), 64);
}

#[test]
fn test_config_blocking_and_no_blocking_override() {
    let dir = setup_workspace();
    write_columns_config(dir.path(), "[blocking]\nfield = \"city\"\n");

    let (_, stdout, _) = run_link(dir.path(), &["--format", "json"]);
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["linkage"]["candidates"], 22);

    let (_, stdout, _) = run_link(dir.path(), &["--format", "json", "--no-blocking"]);
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["linkage"]["candidates"], 64);
}

#[test]
fn test_same_seed_same_output() {
    let dir = setup_workspace();
    write_columns_config(dir.path(), "");
    let (_, a, _) = run_link(dir.path(), &["--format", "json", "--seed", "7"]);
    let (_, b, _) = run_link(dir.path(), &["--format", "json", "--seed", "7"]);
    assert_eq!(a, b);
}

#[test]
fn test_sources_from_explicit_config() {
    let dir = setup_workspace();
    let config_dir = tempfile::tempdir().unwrap();
    let config_path = config_dir.path().join("linkage.toml");
    let zagat = dir.path().join("zagat.csv");
    let fodors = dir.path().join("fodors.csv");
    let matches = dir.path().join("matches.csv");
    std::fs::write(
        &config_path,
        format!(
            "[training]\nmu = 0.1\nlambda = 0.1\nunmatch_sample_size = 200\n\n\
             [sources.left]\nfile = {:?}\ncolumns = [\"name\", \"address\", \"city\"]\n\n\
             [sources.right]\nfile = {:?}\ncolumns = [\"name\", \"address\", \"city\"]\n\n\
             [links]\nfile = {:?}\n",
            zagat.display().to_string(),
            fodors.display().to_string(),
            matches.display().to_string()
        ),
    )
    .unwrap();

    let config_arg = config_path.display().to_string();
    let (code, stdout, stderr) = run(
        config_dir.path(),
        &["--config", &config_arg, "link", "--format", "json"],
    );
    assert_eq!(code, 0, "stderr: {}", stderr);
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["left"], "zagat");
    assert_eq!(v["training"]["unmatch_sample_size"], 200);
}

// ============================================================================
// train
// ============================================================================

#[test]
fn test_train_json_partition_is_total() {
    let dir = setup_workspace();
    write_columns_config(dir.path(), "");
    let mut args = vec!["train"];
    args.extend_from_slice(SOURCE_FLAGS);
    args.extend_from_slice(&["--mu", "0.1", "--format", "json"]);
    let (code, stdout, _) = run(dir.path(), &args);
    assert_eq!(code, 0);

    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let p = &v["partition"];
    let total = p["matches"].as_u64().unwrap()
        + p["possible"].as_u64().unwrap()
        + p["unmatches"].as_u64().unwrap();
    assert_eq!(total, 27);
    assert!(v.get("linkage").is_none());
    assert_eq!(v["match_sample_size"], 5);
}

#[test]
fn test_train_text_lists_patterns() {
    let dir = setup_workspace();
    write_columns_config(dir.path(), "");
    let mut args = vec!["train"];
    args.extend_from_slice(SOURCE_FLAGS);
    let (code, stdout, _) = run(dir.path(), &args);
    assert_eq!(code, 0);
    assert!(stdout.contains("PATTERNS"));
    assert!(stdout.contains("Partition:"));
}

// ============================================================================
// errors
// ============================================================================

#[test]
fn test_rate_outside_unit_interval_rejected() {
    let dir = setup_workspace();
    let mut args = vec!["link"];
    args.extend_from_slice(SOURCE_FLAGS);
    args.extend_from_slice(&["--mu", "1.5"]);
    let (code, _, stderr) = run(dir.path(), &args);
    assert_ne!(code, 0);
    assert!(stderr.contains("1.5 is outside [0, 1]"), "stderr: {}", stderr);
}

#[test]
fn test_missing_links_fails() {
    let dir = setup_workspace();
    write_columns_config(dir.path(), "");
    let (code, _, stderr) = run(
        dir.path(),
        &["link", "--left", "zagat.csv", "--right", "fodors.csv"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("--links"));
}

#[test]
fn test_empty_links_file_fails() {
    let dir = setup_workspace();
    write_columns_config(dir.path(), "");
    std::fs::write(dir.path().join("matches.csv"), "").unwrap();
    let (code, _, stderr) = run_link(dir.path(), &[]);
    assert_ne!(code, 0);
    assert!(stderr.contains("no known links"), "stderr: {}", stderr);
}

#[test]
fn test_unknown_block_field_fails() {
    let dir = setup_workspace();
    write_columns_config(dir.path(), "");
    let (code, _, stderr) = run_link(dir.path(), &["--block-on", "zip"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("zip"));
}

#[test]
fn test_zero_workers_rejected() {
    let dir = setup_workspace();
    let (code, _, _) = run(dir.path(), &["--workers", "0", "init"]);
    assert_ne!(code, 0);
}

// ============================================================================
// init
// ============================================================================

#[test]
fn test_init_writes_config_once() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run(dir.path(), &["init"]);
    assert_eq!(code, 0);
    assert!(dir.path().join("reclink.toml").exists());

    let (code, _, stderr) = run(dir.path(), &["init"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("already exists"));
}
