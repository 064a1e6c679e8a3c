//! Probabilistic record linkage
//!
//! Fellegi-Sunter linkage between two record collections that share no key:
//!
//! 1. [`FeatureExtractor`] reduces a record pair to a [`FeaturePattern`]
//! 2. [`TrainingSampler`] builds match and unmatch samples
//! 3. [`estimate`] turns each sample into a [`ConditionalFrequencyTable`]
//! 4. [`ThresholdClassifier`] partitions the pattern space into
//!    MATCH / UNMATCH / POSSIBLE under the `mu` / `lambda` error bounds
//! 5. [`PairwiseMatcher`] applies that partition to every candidate pair
//!
//! Training must complete before matching starts; the resulting
//! [`PartitionAssignment`] is immutable and shared read-only by the matcher.

pub mod error;
pub mod estimate;
pub mod features;
pub mod matcher;
pub mod sample;
pub mod thresholds;
pub mod train;

pub use error::{LinkageError, LinkageResult};
pub use estimate::{estimate, ConditionalFrequencyTable};
pub use features::{
    FeatureExtractor, FeaturePattern, FieldComparison, JaroWinkler, LevelThresholds,
    PatternSpace, SimilarityLevel, SimilarityScorer, MAX_FIELDS,
};
pub use matcher::{Blocking, LinkageOutcome, PairwiseMatcher};
pub use sample::{SampleKind, TrainingSample, TrainingSampler};
pub use thresholds::{
    ErrorBounds, Label, LikelihoodRatio, PartitionAssignment, PartitionCounts, PatternStat,
    ThresholdClassifier, RATE_EPSILON,
};
pub use train::{train, train_with_rng, TrainedModel, TrainingConfig};

use crate::models::{KnownLink, RecordSet};

/// A trained model together with the pairs it classified
#[derive(Debug, Clone)]
pub struct Linkage {
    pub model: TrainedModel,
    pub outcome: LinkageOutcome,
}

/// Train on the known links, then classify every candidate pair.
///
/// Training errors surface before any pair is compared.
pub fn find_matches<S: SimilarityScorer>(
    left: &RecordSet,
    right: &RecordSet,
    links: &[KnownLink],
    extractor: &FeatureExtractor<S>,
    config: &TrainingConfig,
    blocking: &Blocking,
) -> LinkageResult<Linkage> {
    let model = train(left, right, links, extractor, config)?;
    let matcher = PairwiseMatcher::new(extractor, &model.assignment)?;
    let outcome = matcher.run(left, right, blocking)?;
    Ok(Linkage { model, outcome })
}
