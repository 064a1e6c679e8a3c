//! Conditional pattern frequencies
//!
//! Turns a labeled training sample into a relative-frequency table over
//! the whole pattern space. No smoothing: a pattern never seen in the
//! sample has frequency 0, but it is still present in the table.

use tracing::debug;

use super::error::{LinkageError, LinkageResult};
use super::features::{FeatureExtractor, FeaturePattern, PatternSpace, SimilarityScorer};
use super::sample::{SampleKind, TrainingSample};
use crate::models::RecordSet;

/// P(pattern | condition) for every pattern in the space
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalFrequencyTable {
    kind: SampleKind,
    space: PatternSpace,
    frequencies: Vec<f64>,
    sample_size: usize,
}

impl ConditionalFrequencyTable {
    /// Build a table from per-pattern occurrence counts (indexed in
    /// enumeration order).
    pub fn from_counts(
        kind: SampleKind,
        space: PatternSpace,
        counts: &[usize],
    ) -> LinkageResult<Self> {
        if counts.len() != space.len() {
            return Err(LinkageError::PatternOutsideSpace {
                expected: space.len(),
                found: counts.len(),
            });
        }
        let sample_size: usize = counts.iter().sum();
        if sample_size == 0 {
            return Err(LinkageError::EmptySample { kind });
        }
        let frequencies = counts
            .iter()
            .map(|&c| c as f64 / sample_size as f64)
            .collect();
        Ok(Self {
            kind,
            space,
            frequencies,
            sample_size,
        })
    }

    /// Build a table directly from frequencies, for callers that already
    /// hold estimates. Patterns not listed get frequency 0.
    pub fn from_frequencies<I>(kind: SampleKind, space: PatternSpace, entries: I) -> LinkageResult<Self>
    where
        I: IntoIterator<Item = (FeaturePattern, f64)>,
    {
        let mut frequencies = vec![0.0; space.len()];
        for (pattern, frequency) in entries {
            frequencies[space.index_of(&pattern)?] = frequency;
        }
        Ok(Self {
            kind,
            space,
            frequencies,
            sample_size: 0,
        })
    }

    pub fn kind(&self) -> SampleKind {
        self.kind
    }

    pub fn space(&self) -> PatternSpace {
        self.space
    }

    /// Number of pairs the table was estimated from (0 if built from
    /// frequencies)
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn get(&self, pattern: &FeaturePattern) -> LinkageResult<f64> {
        Ok(self.frequencies[self.space.index_of(pattern)?])
    }

    /// Frequency by dense pattern index
    pub fn at(&self, index: usize) -> f64 {
        self.frequencies.get(index).copied().unwrap_or(0.0)
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn total(&self) -> f64 {
        self.frequencies.iter().sum()
    }

    /// Patterns with non-zero frequency
    pub fn observed(&self) -> impl Iterator<Item = (FeaturePattern, f64)> + '_ {
        self.frequencies
            .iter()
            .enumerate()
            .filter(|(_, f)| **f > 0.0)
            .map(|(i, &f)| (self.space.pattern_at(i), f))
    }
}

/// Estimate P(pattern | condition) from a training sample
pub fn estimate<S: SimilarityScorer>(
    sample: &TrainingSample,
    left: &RecordSet,
    right: &RecordSet,
    extractor: &FeatureExtractor<S>,
) -> LinkageResult<ConditionalFrequencyTable> {
    if sample.is_empty() {
        return Err(LinkageError::EmptySample { kind: sample.kind });
    }

    let space = extractor.space();
    let mut counts = vec![0usize; space.len()];

    for pair in &sample.pairs {
        let (Some(l), Some(r)) = (left.get(pair.left), right.get(pair.right)) else {
            return Err(LinkageError::PairOutOfRange {
                kind: sample.kind,
                pair: *pair,
            });
        };
        let pattern = extractor.extract(l, r);
        counts[space.index_of(&pattern)?] += 1;
    }

    let table = ConditionalFrequencyTable::from_counts(sample.kind, space, &counts)?;
    debug!(
        "{} table: {} of {} patterns observed",
        sample.kind,
        table.observed().count(),
        space.len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linkage::features::{FieldComparison, LevelThresholds, SimilarityLevel};
    use crate::models::{PairIndex, Record};
    use SimilarityLevel::{High, Low};

    fn set(name: &str, names: &[&str]) -> RecordSet {
        RecordSet::new(
            name,
            vec!["name".into()],
            names
                .iter()
                .enumerate()
                .map(|(i, n)| Record::new(i.to_string(), vec![n.to_string()]))
                .collect(),
        )
    }

    fn exact_extractor(
        left: &RecordSet,
        right: &RecordSet,
    ) -> FeatureExtractor<fn(&str, &str) -> f64> {
        fn exact(l: &str, r: &str) -> f64 {
            if l == r {
                1.0
            } else {
                0.0
            }
        }
        FeatureExtractor::new(
            vec![FieldComparison::resolve("name", left, right).unwrap()],
            LevelThresholds::default(),
            exact as fn(&str, &str) -> f64,
        )
        .unwrap()
    }

    #[test]
    fn test_estimate_relative_frequencies() {
        let left = set("left", &["a", "b", "c"]);
        let right = set("right", &["a", "b", "x"]);
        let extractor = exact_extractor(&left, &right);
        let sample = TrainingSample {
            kind: SampleKind::Match,
            pairs: vec![
                PairIndex::new(0, 0),
                PairIndex::new(1, 1),
                PairIndex::new(2, 2),
                PairIndex::new(0, 1),
            ],
        };

        let table = estimate(&sample, &left, &right, &extractor).unwrap();
        assert_eq!(table.sample_size(), 4);
        assert!((table.get(&FeaturePattern::from([High])).unwrap() - 0.5).abs() < 1e-12);
        assert!((table.get(&FeaturePattern::from([Low])).unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(table.get(&FeaturePattern::from([SimilarityLevel::Medium])).unwrap(), 0.0);
        assert!((table.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_table_covers_whole_space() {
        let left = set("left", &["a"]);
        let right = set("right", &["a"]);
        let extractor = exact_extractor(&left, &right);
        let sample = TrainingSample {
            kind: SampleKind::Unmatch,
            pairs: vec![PairIndex::new(0, 0)],
        };
        let table = estimate(&sample, &left, &right, &extractor).unwrap();
        assert_eq!(table.frequencies().len(), 3);
        assert_eq!(table.observed().count(), 1);
    }

    #[test]
    fn test_empty_sample_is_an_error() {
        let left = set("left", &["a"]);
        let right = set("right", &["a"]);
        let extractor = exact_extractor(&left, &right);
        let sample = TrainingSample {
            kind: SampleKind::Unmatch,
            pairs: vec![],
        };
        let err = estimate(&sample, &left, &right, &extractor).unwrap_err();
        assert!(matches!(err, LinkageError::EmptySample { kind: SampleKind::Unmatch }));
    }

    #[test]
    fn test_out_of_range_pair_is_an_error() {
        let left = set("left", &["a"]);
        let right = set("right", &["a"]);
        let extractor = exact_extractor(&left, &right);
        let sample = TrainingSample {
            kind: SampleKind::Match,
            pairs: vec![PairIndex::new(0, 0), PairIndex::new(5, 0)],
        };
        let err = estimate(&sample, &left, &right, &extractor).unwrap_err();
        assert!(matches!(
            err,
            LinkageError::PairOutOfRange {
                kind: SampleKind::Match,
                pair: PairIndex { left: 5, right: 0 },
            }
        ));
    }

    #[test]
    fn test_from_counts_rejects_zero_total() {
        let space = PatternSpace::new(1).unwrap();
        assert!(ConditionalFrequencyTable::from_counts(SampleKind::Match, space, &[0, 0, 0]).is_err());
    }

    #[test]
    fn test_from_frequencies_defaults_to_zero() {
        let space = PatternSpace::new(3).unwrap();
        let table = ConditionalFrequencyTable::from_frequencies(
            SampleKind::Match,
            space,
            [(FeaturePattern::from([High, High, High]), 0.9)],
        )
        .unwrap();
        assert_eq!(table.at(0), 0.9);
        assert_eq!(table.get(&FeaturePattern::from([Low, Low, Low])).unwrap(), 0.0);
    }
}
