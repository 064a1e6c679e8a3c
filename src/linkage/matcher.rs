//! Pairwise application of a trained partition
//!
//! Every candidate pair is reduced to its feature pattern and filed under
//! the label the partition assigns to that pattern. Candidates are either
//! the full cross product or, with exact-field blocking, only pairs that
//! share a value on the blocking field.
//!
//! Rows of the left collection are spread across the rayon pool. Each
//! task fills a private [`LinkageOutcome`]; outcomes are merged by an
//! ordered reduction, so pair order is row-major whatever the thread count.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;

use super::error::{LinkageError, LinkageResult};
use super::features::{FeatureExtractor, FieldComparison, SimilarityScorer};
use super::thresholds::{Label, PartitionAssignment};
use crate::models::{PairIndex, Record, RecordSet};

/// Candidate-pair restriction
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Blocking {
    /// Compare every pair of the cross product
    #[default]
    None,
    /// Compare only pairs whose values on these columns are identical
    ExactField { name: String, left: usize, right: usize },
}

impl Blocking {
    /// Exact blocking on a named column present in both collections
    pub fn on_field(name: &str, left: &RecordSet, right: &RecordSet) -> LinkageResult<Self> {
        let field = FieldComparison::resolve(name, left, right)?;
        Ok(Blocking::ExactField {
            name: field.name,
            left: field.left,
            right: field.right,
        })
    }

    pub fn field_name(&self) -> Option<&str> {
        match self {
            Blocking::None => None,
            Blocking::ExactField { name, .. } => Some(name),
        }
    }

    /// Whether a pair is a candidate under this rule
    pub fn admits(&self, left: &Record, right: &Record) -> bool {
        match self {
            Blocking::None => true,
            Blocking::ExactField {
                left: l, right: r, ..
            } => left.field(*l) == right.field(*r),
        }
    }
}

/// The three partitioned pair collections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkageOutcome {
    pub matches: Vec<PairIndex>,
    pub possible: Vec<PairIndex>,
    pub unmatches: Vec<PairIndex>,
}

impl LinkageOutcome {
    pub fn push(&mut self, label: Label, pair: PairIndex) {
        match label {
            Label::Match => self.matches.push(pair),
            Label::Possible => self.possible.push(pair),
            Label::Unmatch => self.unmatches.push(pair),
        }
    }

    /// Append `other` after `self`
    pub fn merge(mut self, other: LinkageOutcome) -> Self {
        self.matches.extend(other.matches);
        self.possible.extend(other.possible);
        self.unmatches.extend(other.unmatches);
        self
    }

    pub fn pairs(&self, label: Label) -> &[PairIndex] {
        match label {
            Label::Match => &self.matches,
            Label::Possible => &self.possible,
            Label::Unmatch => &self.unmatches,
        }
    }

    /// Total number of classified candidates
    pub fn candidates(&self) -> usize {
        self.matches.len() + self.possible.len() + self.unmatches.len()
    }
}

/// Applies a partition assignment to candidate pairs
pub struct PairwiseMatcher<'a, S> {
    extractor: &'a FeatureExtractor<S>,
    assignment: &'a PartitionAssignment,
}

impl<'a, S: SimilarityScorer> PairwiseMatcher<'a, S> {
    pub fn new(
        extractor: &'a FeatureExtractor<S>,
        assignment: &'a PartitionAssignment,
    ) -> LinkageResult<Self> {
        if extractor.space() != assignment.space() {
            return Err(LinkageError::PatternOutsideSpace {
                expected: assignment.space().arity(),
                found: extractor.space().arity(),
            });
        }
        Ok(Self {
            extractor,
            assignment,
        })
    }

    /// Label for a single pair
    pub fn classify(&self, left: &Record, right: &Record) -> LinkageResult<Label> {
        self.assignment.label(&self.extractor.extract(left, right))
    }

    /// Classify every candidate pair of `left` x `right`
    pub fn run(
        &self,
        left: &RecordSet,
        right: &RecordSet,
        blocking: &Blocking,
    ) -> LinkageResult<LinkageOutcome> {
        let started = Instant::now();

        let blocks: Option<HashMap<&str, Vec<usize>>> = match blocking {
            Blocking::None => None,
            Blocking::ExactField { right: col, .. } => {
                let mut blocks: HashMap<&str, Vec<usize>> = HashMap::new();
                for (ri, record) in right.records.iter().enumerate() {
                    blocks.entry(record.field(*col)).or_default().push(ri);
                }
                Some(blocks)
            }
        };

        let outcome = left
            .records
            .par_iter()
            .enumerate()
            .map(|(li, record)| -> LinkageResult<LinkageOutcome> {
                let mut local = LinkageOutcome::default();
                match (&blocks, blocking) {
                    (Some(blocks), Blocking::ExactField { left: col, .. }) => {
                        if let Some(candidates) = blocks.get(record.field(*col)) {
                            for &ri in candidates {
                                let label = self.classify(record, &right.records[ri])?;
                                local.push(label, PairIndex::new(li, ri));
                            }
                        }
                    }
                    _ => {
                        for (ri, other) in right.records.iter().enumerate() {
                            let label = self.classify(record, other)?;
                            local.push(label, PairIndex::new(li, ri));
                        }
                    }
                }
                Ok(local)
            })
            .try_reduce(LinkageOutcome::default, |a, b| Ok(a.merge(b)))?;

        info!(
            "Classified {} candidate pairs in {:.2?} ({} match, {} possible, {} unmatch)",
            outcome.candidates(),
            started.elapsed(),
            outcome.matches.len(),
            outcome.possible.len(),
            outcome.unmatches.len()
        );
        Ok(outcome)
    }
}
