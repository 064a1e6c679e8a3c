//! Fellegi-Sunter threshold classification
//!
//! Partitions the whole pattern space into MATCH, UNMATCH and POSSIBLE
//! given the two conditional frequency tables and two error bounds:
//!
//! - `mu`: maximum unmatch-probability mass allowed in MATCH (false positives)
//! - `lambda`: maximum match-probability mass allowed in UNMATCH (false negatives)
//!
//! Patterns seen under neither condition are POSSIBLE outright. The rest
//! are ranked by likelihood ratio `m / u`, descending, with `u == 0`
//! ranked ahead of every finite ratio. MATCH is the longest prefix of
//! that ranking whose cumulative `u` stays within `mu`; UNMATCH is the
//! longest suffix whose cumulative `m` stays within `lambda` and does
//! not reach into MATCH. Everything else is POSSIBLE.

use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use tracing::{debug, info};

use super::error::{LinkageError, LinkageResult};
use super::estimate::ConditionalFrequencyTable;
use super::features::{FeaturePattern, PatternSpace};

/// Absolute tolerance for cumulative-mass budget checks
pub const RATE_EPSILON: f64 = 1e-9;

/// Whether a running sum is still within a budget
fn within_budget(cumulative: f64, budget: f64) -> bool {
    cumulative <= budget + RATE_EPSILON
}

/// Classification outcome for a pattern (and every pair reduced to it)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Match,
    Unmatch,
    Possible,
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Match => write!(f, "match"),
            Label::Unmatch => write!(f, "unmatch"),
            Label::Possible => write!(f, "possible"),
        }
    }
}

/// Ordering key `m / u`. `Certain` stands in for `u == 0, m > 0`.
#[derive(Debug, Clone, Copy)]
pub enum LikelihoodRatio {
    Finite(f64),
    Certain,
}

impl LikelihoodRatio {
    /// Ratio for a pattern, or `None` if it was never observed
    pub fn of(m: f64, u: f64) -> Option<Self> {
        if m == 0.0 && u == 0.0 {
            None
        } else if u == 0.0 {
            Some(Self::Certain)
        } else {
            Some(Self::Finite(m / u))
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Finite(r) => *r,
            Self::Certain => f64::INFINITY,
        }
    }
}

impl Ord for LikelihoodRatio {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Certain, Self::Certain) => Ordering::Equal,
            (Self::Certain, Self::Finite(_)) => Ordering::Greater,
            (Self::Finite(_), Self::Certain) => Ordering::Less,
            (Self::Finite(a), Self::Finite(b)) => a.total_cmp(b),
        }
    }
}

impl PartialOrd for LikelihoodRatio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for LikelihoodRatio {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LikelihoodRatio {}

impl Serialize for LikelihoodRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Finite(r) => serializer.serialize_f64(*r),
            Self::Certain => serializer.serialize_str("certain"),
        }
    }
}

impl std::fmt::Display for LikelihoodRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(r) => write!(f, "{r:.4}"),
            Self::Certain => write!(f, "certain"),
        }
    }
}

/// Error-rate bounds for classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorBounds {
    /// Maximum false-positive rate
    pub mu: f64,
    /// Maximum false-negative rate
    pub lambda: f64,
}

impl ErrorBounds {
    pub fn new(mu: f64, lambda: f64) -> LinkageResult<Self> {
        let bounds = Self { mu, lambda };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> LinkageResult<()> {
        for (name, value) in [("mu", self.mu), ("lambda", self.lambda)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(LinkageError::RateOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

/// Label counts over the pattern space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PartitionCounts {
    pub matches: usize,
    pub unmatches: usize,
    pub possible: usize,
}

/// Total mapping from pattern to label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionAssignment {
    space: PatternSpace,
    labels: Vec<Label>,
}

impl PartitionAssignment {
    pub fn space(&self) -> PatternSpace {
        self.space
    }

    /// Label for a pattern. A pattern outside the space is an error,
    /// never defaulted.
    pub fn label(&self, pattern: &FeaturePattern) -> LinkageResult<Label> {
        Ok(self.labels[self.space.index_of(pattern)?])
    }

    /// All (pattern, label) entries in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (FeaturePattern, Label)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, &label)| (self.space.pattern_at(i), label))
    }

    pub fn patterns_with(&self, label: Label) -> impl Iterator<Item = FeaturePattern> + '_ {
        self.iter()
            .filter(move |(_, l)| *l == label)
            .map(|(p, _)| p)
    }

    pub fn counts(&self) -> PartitionCounts {
        let mut counts = PartitionCounts::default();
        for label in &self.labels {
            match label {
                Label::Match => counts.matches += 1,
                Label::Unmatch => counts.unmatches += 1,
                Label::Possible => counts.possible += 1,
            }
        }
        counts
    }
}

/// Per-pattern training summary
#[derive(Debug, Clone, Serialize)]
pub struct PatternStat {
    pub pattern: FeaturePattern,
    /// P(pattern | match)
    pub m: f64,
    /// P(pattern | unmatch)
    pub u: f64,
    /// `None` when the pattern was never observed
    pub ratio: Option<LikelihoodRatio>,
    pub label: Label,
}

/// Observed patterns ranked by descending likelihood ratio.
///
/// The sort is stable, so equal ratios keep enumeration order.
pub fn rank_patterns(
    mw: &ConditionalFrequencyTable,
    uw: &ConditionalFrequencyTable,
) -> Vec<(usize, LikelihoodRatio)> {
    let mut ranked: Vec<(usize, LikelihoodRatio)> = (0..mw.space().len())
        .filter_map(|i| LikelihoodRatio::of(mw.at(i), uw.at(i)).map(|r| (i, r)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Partitions the pattern space under fixed error bounds
#[derive(Debug, Clone, Copy)]
pub struct ThresholdClassifier {
    bounds: ErrorBounds,
}

impl ThresholdClassifier {
    pub fn new(mu: f64, lambda: f64) -> LinkageResult<Self> {
        Ok(Self {
            bounds: ErrorBounds::new(mu, lambda)?,
        })
    }

    pub fn from_bounds(bounds: ErrorBounds) -> LinkageResult<Self> {
        bounds.validate()?;
        Ok(Self { bounds })
    }

    pub fn bounds(&self) -> ErrorBounds {
        self.bounds
    }

    /// Build the partition assignment from the match (`mw`) and unmatch
    /// (`uw`) tables.
    pub fn classify(
        &self,
        mw: &ConditionalFrequencyTable,
        uw: &ConditionalFrequencyTable,
    ) -> LinkageResult<PartitionAssignment> {
        let space = mw.space();
        if uw.space() != space {
            return Err(LinkageError::PatternOutsideSpace {
                expected: space.arity(),
                found: uw.space().arity(),
            });
        }

        let mut labels: Vec<Option<Label>> = vec![None; space.len()];
        for (i, slot) in labels.iter_mut().enumerate() {
            if mw.at(i) == 0.0 && uw.at(i) == 0.0 {
                *slot = Some(Label::Possible);
            }
        }

        let ranked = rank_patterns(mw, uw);

        let mut false_positive_mass = 0.0;
        for &(i, ratio) in &ranked {
            let next = false_positive_mass + uw.at(i);
            if !within_budget(next, self.bounds.mu) {
                break;
            }
            false_positive_mass = next;
            labels[i] = Some(Label::Match);
            debug!("{} -> match (ratio {})", space.pattern_at(i), ratio);
        }

        let mut false_negative_mass = 0.0;
        for &(i, ratio) in ranked.iter().rev() {
            if labels[i] == Some(Label::Match) {
                break;
            }
            let next = false_negative_mass + mw.at(i);
            if !within_budget(next, self.bounds.lambda) {
                break;
            }
            false_negative_mass = next;
            labels[i] = Some(Label::Unmatch);
            debug!("{} -> unmatch (ratio {})", space.pattern_at(i), ratio);
        }

        let labels: Vec<Label> = labels
            .into_iter()
            .map(|l| l.unwrap_or(Label::Possible))
            .collect();
        let assignment = PartitionAssignment { space, labels };

        let counts = assignment.counts();
        info!(
            "Partition: {} match, {} unmatch, {} possible patterns (fp mass {:.4} <= {}, fn mass {:.4} <= {})",
            counts.matches,
            counts.unmatches,
            counts.possible,
            false_positive_mass,
            self.bounds.mu,
            false_negative_mass,
            self.bounds.lambda
        );

        Ok(assignment)
    }
}

/// Per-pattern breakdown of a trained model, in enumeration order
pub fn pattern_stats(
    mw: &ConditionalFrequencyTable,
    uw: &ConditionalFrequencyTable,
    assignment: &PartitionAssignment,
) -> Vec<PatternStat> {
    assignment
        .iter()
        .enumerate()
        .map(|(i, (pattern, label))| PatternStat {
            pattern,
            m: mw.at(i),
            u: uw.at(i),
            ratio: LikelihoodRatio::of(mw.at(i), uw.at(i)),
            label,
        })
        .collect()
}
