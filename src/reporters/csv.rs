//! CSV reporter
//!
//! One row per classified pair: label, then the left record (key and
//! fields), then the right record. Without a full run there are no pairs
//! and only the header is written.

use super::{columns_header, LinkageReport};
use anyhow::{anyhow, Result};

/// Render classified pairs as CSV
pub fn render(report: &LinkageReport) -> Result<String> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());

    let mut header = vec!["label".to_string(), format!("{}_key", report.left)];
    header.extend(columns_header(&report.left, &report.left_columns));
    header.push(format!("{}_key", report.right));
    header.extend(columns_header(&report.right, &report.right_columns));
    writer.write_record(&header)?;

    if let Some(summary) = &report.linkage {
        for pair in &summary.pairs {
            let mut row = Vec::with_capacity(header.len());
            row.push(pair.label.to_string());
            row.push(pair.left_key.clone());
            row.extend(pair.left_fields.iter().cloned());
            row.push(pair.right_key.clone());
            row.extend(pair.right_fields.iter().cloned());
            writer.write_record(&row)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV output: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}
