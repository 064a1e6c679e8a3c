//! Output reporters for reclink results
//!
//! Supports multiple output formats:
//! - `text` - Terminal summary with colors
//! - `json` - Machine-readable JSON
//! - `csv` - Joined pair rows (label, left record, right record)

mod csv;
mod json;
mod text;

use crate::linkage::{
    Label, LevelThresholds, Linkage, LinkageOutcome, PartitionCounts, PatternStat, TrainedModel,
    TrainingConfig,
};
use crate::models::{PairIndex, RecordSet};
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, csv",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Everything a reporter needs: the model summary and, after a full
/// run, the classified pairs joined back to their records.
#[derive(Debug, Clone, Serialize)]
pub struct LinkageReport {
    pub left: String,
    pub right: String,
    pub left_columns: Vec<String>,
    pub right_columns: Vec<String>,
    pub fields: Vec<String>,
    pub training: TrainingConfig,
    pub similarity: LevelThresholds,
    pub blocking: Option<String>,
    pub match_sample_size: usize,
    pub unmatch_sample_size: usize,
    pub partition: PartitionCounts,
    pub patterns: Vec<PatternStat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkage: Option<LinkageSummary>,
}

/// Classified candidates of a full run
#[derive(Debug, Clone, Serialize)]
pub struct LinkageSummary {
    pub candidates: usize,
    pub matches: usize,
    pub possible: usize,
    pub unmatches: usize,
    pub pairs: Vec<LinkedPair>,
}

/// One classified pair joined to both records
#[derive(Debug, Clone, Serialize)]
pub struct LinkedPair {
    pub label: Label,
    pub left_index: usize,
    pub right_index: usize,
    pub left_key: String,
    pub right_key: String,
    pub left_fields: Vec<String>,
    pub right_fields: Vec<String>,
}

/// What the report echoes back about the run's settings
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub left: &'a RecordSet,
    pub right: &'a RecordSet,
    pub fields: &'a [String],
    pub training: &'a TrainingConfig,
    pub similarity: LevelThresholds,
    pub blocking: Option<&'a str>,
}

impl LinkageReport {
    /// Report on a trained model only
    pub fn from_model(ctx: &ReportContext<'_>, model: &TrainedModel) -> Self {
        Self {
            left: ctx.left.name.clone(),
            right: ctx.right.name.clone(),
            left_columns: ctx.left.columns.clone(),
            right_columns: ctx.right.columns.clone(),
            fields: ctx.fields.to_vec(),
            training: ctx.training.clone(),
            similarity: ctx.similarity,
            blocking: ctx.blocking.map(str::to_string),
            match_sample_size: model.mw.sample_size(),
            unmatch_sample_size: model.uw.sample_size(),
            partition: model.assignment.counts(),
            patterns: model.stats(),
            linkage: None,
        }
    }

    /// Report on a model and every pair it classified
    pub fn from_linkage(ctx: &ReportContext<'_>, linkage: &Linkage) -> Self {
        let mut report = Self::from_model(ctx, &linkage.model);
        report.linkage = Some(LinkageSummary::new(&linkage.outcome, ctx.left, ctx.right));
        report
    }
}

impl LinkageSummary {
    fn new(outcome: &LinkageOutcome, left: &RecordSet, right: &RecordSet) -> Self {
        let mut pairs = Vec::with_capacity(outcome.candidates());
        for label in [Label::Match, Label::Possible, Label::Unmatch] {
            pairs.extend(
                outcome
                    .pairs(label)
                    .iter()
                    .filter_map(|pair| LinkedPair::join(label, *pair, left, right)),
            );
        }
        Self {
            candidates: outcome.candidates(),
            matches: outcome.matches.len(),
            possible: outcome.possible.len(),
            unmatches: outcome.unmatches.len(),
            pairs,
        }
    }
}

impl LinkedPair {
    fn join(label: Label, pair: PairIndex, left: &RecordSet, right: &RecordSet) -> Option<Self> {
        let l = left.get(pair.left)?;
        let r = right.get(pair.right)?;
        Some(Self {
            label,
            left_index: pair.left,
            right_index: pair.right,
            left_key: l.key.clone(),
            right_key: r.key.clone(),
            left_fields: l.fields.clone(),
            right_fields: r.fields.clone(),
        })
    }
}

/// `<collection>_<column>` names for one side of a joined row
fn columns_header<'a>(collection: &'a str, columns: &'a [String]) -> impl Iterator<Item = String> + 'a {
    columns.iter().map(move |c| format!("{}_{}", collection, c))
}

/// Render a report using an OutputFormat enum
pub fn report_with_format(report: &LinkageReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report),
        OutputFormat::Json => json::render(report),
        OutputFormat::Csv => csv::render(report),
    }
}
