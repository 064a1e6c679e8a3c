//! Feature extraction for record pairs
//!
//! A record pair is never scored directly. Each compared field is run
//! through a similarity scorer and bucketed into a [`SimilarityLevel`];
//! the ordered tuple of levels is the pair's [`FeaturePattern`].
//!
//! With `k` compared fields the pattern space has exactly `3^k` members.
//! Patterns are enumerated with the first field varying slowest, and that
//! enumeration order is the tie-break order used by the classifier.

use rapidfuzz::distance::jaro_winkler;
use serde::{Deserialize, Serialize};

use super::error::{LinkageError, LinkageResult};
use crate::models::{Record, RecordSet};

/// Largest supported number of compared fields (3^12 = 531441 patterns)
pub const MAX_FIELDS: usize = 12;

/// Ordinal similarity category for one compared field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityLevel {
    High,
    Medium,
    Low,
}

impl SimilarityLevel {
    /// All levels in enumeration order
    pub const ALL: [SimilarityLevel; 3] = [Self::High, Self::Medium, Self::Low];

    fn ordinal(self) -> usize {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    fn from_ordinal(ordinal: usize) -> Self {
        Self::ALL[ordinal % 3]
    }
}

impl std::fmt::Display for SimilarityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Ordered tuple of similarity levels, one per compared field
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeaturePattern(Vec<SimilarityLevel>);

impl FeaturePattern {
    pub fn new(levels: Vec<SimilarityLevel>) -> Self {
        Self(levels)
    }

    pub fn levels(&self) -> &[SimilarityLevel] {
        &self.0
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }
}

impl<const N: usize> From<[SimilarityLevel; N]> for FeaturePattern {
    fn from(levels: [SimilarityLevel; N]) -> Self {
        Self(levels.to_vec())
    }
}

impl std::fmt::Display for FeaturePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, level) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{level}")?;
        }
        write!(f, ")")
    }
}

/// The full enumerated space of patterns for a fixed number of fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternSpace {
    arity: usize,
}

impl PatternSpace {
    pub fn new(arity: usize) -> LinkageResult<Self> {
        if arity == 0 {
            return Err(LinkageError::NoComparedFields);
        }
        if arity > MAX_FIELDS {
            return Err(LinkageError::TooManyFields {
                count: arity,
                max: MAX_FIELDS,
            });
        }
        Ok(Self { arity })
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Number of patterns (3^arity)
    pub fn len(&self) -> usize {
        3usize.pow(self.arity as u32)
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Dense index of a pattern in enumeration order
    pub fn index_of(&self, pattern: &FeaturePattern) -> LinkageResult<usize> {
        if pattern.arity() != self.arity {
            return Err(LinkageError::PatternOutsideSpace {
                expected: self.arity,
                found: pattern.arity(),
            });
        }
        Ok(pattern
            .levels()
            .iter()
            .fold(0, |acc, level| acc * 3 + level.ordinal()))
    }

    /// Pattern at a dense index. Indices wrap modulo `len()`.
    pub fn pattern_at(&self, index: usize) -> FeaturePattern {
        let mut levels = vec![SimilarityLevel::High; self.arity];
        let mut rest = index % self.len();
        for slot in levels.iter_mut().rev() {
            *slot = SimilarityLevel::from_ordinal(rest % 3);
            rest /= 3;
        }
        FeaturePattern(levels)
    }

    /// All patterns in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = FeaturePattern> + '_ {
        (0..self.len()).map(move |i| self.pattern_at(i))
    }
}

/// String similarity metric producing a score in [0, 1]
pub trait SimilarityScorer: Send + Sync {
    fn score(&self, left: &str, right: &str) -> f64;
}

impl<F> SimilarityScorer for F
where
    F: Fn(&str, &str) -> f64 + Send + Sync,
{
    fn score(&self, left: &str, right: &str) -> f64 {
        self(left, right)
    }
}

/// Jaro-Winkler similarity (default scorer)
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl SimilarityScorer for JaroWinkler {
    fn score(&self, left: &str, right: &str) -> f64 {
        jaro_winkler::similarity(left.chars(), right.chars())
    }
}

/// Cut-offs mapping a similarity score to a [`SimilarityLevel`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelThresholds {
    /// Scores at or above this are `High`
    #[serde(default = "default_high")]
    pub high: f64,
    /// Scores at or above this (and below `high`) are `Medium`
    #[serde(default = "default_medium")]
    pub medium: f64,
}

fn default_high() -> f64 {
    0.8
}

fn default_medium() -> f64 {
    0.6
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            high: default_high(),
            medium: default_medium(),
        }
    }
}

impl LevelThresholds {
    pub fn validate(&self) -> LinkageResult<()> {
        let ordered = 0.0 <= self.medium && self.medium <= self.high && self.high <= 1.0;
        if !ordered {
            return Err(LinkageError::InvalidThresholds {
                high: self.high,
                medium: self.medium,
            });
        }
        Ok(())
    }

    pub fn categorize(&self, score: f64) -> SimilarityLevel {
        if score >= self.high {
            SimilarityLevel::High
        } else if score >= self.medium {
            SimilarityLevel::Medium
        } else {
            SimilarityLevel::Low
        }
    }
}

/// One compared field, addressed by column position in each collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldComparison {
    pub name: String,
    pub left: usize,
    pub right: usize,
}

impl FieldComparison {
    /// Resolve a field by column name in both collections
    pub fn resolve(name: &str, left: &RecordSet, right: &RecordSet) -> LinkageResult<Self> {
        let unknown = |set: &RecordSet| LinkageError::UnknownField {
            collection: set.name.clone(),
            field: name.to_string(),
        };
        Ok(Self {
            name: name.to_string(),
            left: left.column_index(name).ok_or_else(|| unknown(left))?,
            right: right.column_index(name).ok_or_else(|| unknown(right))?,
        })
    }
}

/// Reduces record pairs to feature patterns
#[derive(Debug, Clone)]
pub struct FeatureExtractor<S = JaroWinkler> {
    comparisons: Vec<FieldComparison>,
    thresholds: LevelThresholds,
    scorer: S,
    space: PatternSpace,
}

impl FeatureExtractor<JaroWinkler> {
    /// Extractor over named fields using Jaro-Winkler
    pub fn for_fields(
        fields: &[String],
        left: &RecordSet,
        right: &RecordSet,
        thresholds: LevelThresholds,
    ) -> LinkageResult<Self> {
        let comparisons = fields
            .iter()
            .map(|f| FieldComparison::resolve(f, left, right))
            .collect::<LinkageResult<Vec<_>>>()?;
        Self::new(comparisons, thresholds, JaroWinkler)
    }
}

impl<S: SimilarityScorer> FeatureExtractor<S> {
    pub fn new(
        comparisons: Vec<FieldComparison>,
        thresholds: LevelThresholds,
        scorer: S,
    ) -> LinkageResult<Self> {
        thresholds.validate()?;
        let space = PatternSpace::new(comparisons.len())?;
        Ok(Self {
            comparisons,
            thresholds,
            scorer,
            space,
        })
    }

    pub fn space(&self) -> PatternSpace {
        self.space
    }

    pub fn comparisons(&self) -> &[FieldComparison] {
        &self.comparisons
    }

    pub fn thresholds(&self) -> LevelThresholds {
        self.thresholds
    }

    /// Feature pattern for a (left, right) record pair
    pub fn extract(&self, left: &Record, right: &Record) -> FeaturePattern {
        FeaturePattern(
            self.comparisons
                .iter()
                .map(|c| {
                    let score = self.scorer.score(left.field(c.left), right.field(c.right));
                    self.thresholds.categorize(score)
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SimilarityLevel::{High, Low, Medium};

    fn set(name: &str, columns: &[&str], rows: &[&[&str]]) -> RecordSet {
        RecordSet::new(
            name,
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .enumerate()
                .map(|(i, r)| Record::new(i.to_string(), r.iter().map(|v| v.to_string()).collect()))
                .collect(),
        )
    }

    #[test]
    fn test_pattern_space_enumeration_order() {
        let space = PatternSpace::new(3).unwrap();
        let all: Vec<_> = space.iter().collect();
        assert_eq!(all.len(), 27);
        assert_eq!(all[0], FeaturePattern::from([High, High, High]));
        assert_eq!(all[1], FeaturePattern::from([High, High, Medium]));
        assert_eq!(all[3], FeaturePattern::from([High, Medium, High]));
        assert_eq!(all[26], FeaturePattern::from([Low, Low, Low]));
    }

    #[test]
    fn test_pattern_index_roundtrips_whole_space() {
        let space = PatternSpace::new(3).unwrap();
        for (i, pattern) in space.iter().enumerate() {
            assert_eq!(space.index_of(&pattern).unwrap(), i);
        }
    }

    #[test]
    fn test_pattern_wrong_arity_rejected() {
        let space = PatternSpace::new(3).unwrap();
        let err = space
            .index_of(&FeaturePattern::from([High, Low]))
            .unwrap_err();
        assert!(matches!(
            err,
            LinkageError::PatternOutsideSpace { expected: 3, found: 2 }
        ));
    }

    #[test]
    fn test_pattern_space_bounds() {
        assert!(matches!(PatternSpace::new(0), Err(LinkageError::NoComparedFields)));
        assert!(PatternSpace::new(MAX_FIELDS).is_ok());
        assert!(matches!(
            PatternSpace::new(MAX_FIELDS + 1),
            Err(LinkageError::TooManyFields { .. })
        ));
    }

    #[test]
    fn test_categorize_boundaries() {
        let t = LevelThresholds::default();
        assert_eq!(t.categorize(1.0), High);
        assert_eq!(t.categorize(0.8), High);
        assert_eq!(t.categorize(0.79), Medium);
        assert_eq!(t.categorize(0.6), Medium);
        assert_eq!(t.categorize(0.59), Low);
        assert_eq!(t.categorize(0.0), Low);
    }

    #[test]
    fn test_thresholds_validation() {
        assert!(LevelThresholds::default().validate().is_ok());
        let inverted = LevelThresholds { high: 0.5, medium: 0.7 };
        assert!(inverted.validate().is_err());
        let too_high = LevelThresholds { high: 1.5, medium: 0.7 };
        assert!(too_high.validate().is_err());
    }

    #[test]
    fn test_jaro_winkler_identical_and_disjoint() {
        let jw = JaroWinkler;
        assert!((jw.score("Spago", "Spago") - 1.0).abs() < 1e-9);
        assert!(jw.score("abc", "xyz") < 0.1);
    }

    #[test]
    fn test_extract_uses_per_collection_positions() {
        // Same fields, different column layouts
        let left = set("left", &["name", "city", "address"], &[&["Spago", "Los Angeles", "8795 Sunset Blvd."]]);
        let right = set("right", &["address", "name", "city"], &[&["8795 Sunset Blvd.", "Spago", "Los Angeles"]]);
        let fields = vec!["name".to_string(), "city".to_string(), "address".to_string()];

        let extractor =
            FeatureExtractor::for_fields(&fields, &left, &right, LevelThresholds::default()).unwrap();
        let pattern = extractor.extract(&left.records[0], &right.records[0]);
        assert_eq!(pattern, FeaturePattern::from([High, High, High]));
    }

    #[test]
    fn test_extract_is_deterministic_with_custom_scorer() {
        let left = set("left", &["name", "city"], &[&["a", "b"]]);
        let right = set("right", &["name", "city"], &[&["a", "c"]]);
        let scorer = |l: &str, r: &str| if l == r { 1.0 } else { 0.7 };
        let comparisons = vec![
            FieldComparison::resolve("name", &left, &right).unwrap(),
            FieldComparison::resolve("city", &left, &right).unwrap(),
        ];
        let extractor =
            FeatureExtractor::new(comparisons, LevelThresholds::default(), scorer).unwrap();

        let first = extractor.extract(&left.records[0], &right.records[0]);
        let second = extractor.extract(&left.records[0], &right.records[0]);
        assert_eq!(first, FeaturePattern::from([High, Medium]));
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_field_names_collection() {
        let left = set("zagat", &["name"], &[]);
        let right = set("fodors", &["title"], &[]);
        let err = FieldComparison::resolve("name", &left, &right).unwrap_err();
        assert!(err.to_string().contains("fodors"));
    }

    #[test]
    fn test_pattern_display() {
        let p = FeaturePattern::from([High, Medium, Low]);
        assert_eq!(p.to_string(), "(high, medium, low)");
    }
}
