//! Errors raised by the linkage engine

use thiserror::Error;

use super::sample::SampleKind;
use crate::models::PairIndex;

/// Errors that can occur while training or applying a linkage model
#[derive(Error, Debug)]
pub enum LinkageError {
    #[error("no known links supplied; a match sample cannot be formed")]
    EmptyKnownLinks,

    #[error("record collection '{collection}' is empty")]
    EmptyCollection { collection: String },

    #[error("{name} must be within [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },

    #[error("unmatch sample size must be at least 1")]
    EmptySampleSize,

    #[error("{kind} sample is empty; cannot estimate frequencies")]
    EmptySample { kind: SampleKind },

    #[error("known link references key '{key}' which is not in '{collection}'")]
    UnknownLinkKey { collection: String, key: String },

    #[error("field '{field}' is not a column of '{collection}'")]
    UnknownField { collection: String, field: String },

    #[error("at least one field must be compared")]
    NoComparedFields,

    #[error("{count} compared fields exceeds the supported maximum of {max}")]
    TooManyFields { count: usize, max: usize },

    #[error("similarity thresholds must satisfy 0 <= medium <= high <= 1 (high={high}, medium={medium})")]
    InvalidThresholds { high: f64, medium: f64 },

    #[error("pattern has {found} levels but the pattern space has {expected}")]
    PatternOutsideSpace { expected: usize, found: usize },

    #[error("{kind} sample pair {pair} is outside the record collections")]
    PairOutOfRange { kind: SampleKind, pair: PairIndex },

    #[error("{source_name}: row {row} has {found} columns, expected {expected}")]
    MalformedRow {
        source_name: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type LinkageResult<T> = Result<T, LinkageError>;
