//! JSON reporter
//!
//! Outputs the full LinkageReport as pretty-printed JSON.

use super::LinkageReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &LinkageReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
