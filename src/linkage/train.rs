//! Model training
//!
//! Sample, estimate, classify. Configuration is validated before any
//! sampling happens, so a bad config never yields a partial model.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::{LinkageError, LinkageResult};
use super::estimate::{estimate, ConditionalFrequencyTable};
use super::features::{FeatureExtractor, SimilarityScorer};
use super::sample::TrainingSampler;
use super::thresholds::{
    pattern_stats, ErrorBounds, PartitionAssignment, PatternStat, ThresholdClassifier,
};
use crate::models::{KnownLink, RecordSet};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Maximum false-positive rate
    #[serde(default = "default_rate")]
    pub mu: f64,
    /// Maximum false-negative rate
    #[serde(default = "default_rate")]
    pub lambda: f64,
    /// Number of random pairs in the unmatch sample
    #[serde(default = "default_unmatch_sample_size")]
    pub unmatch_sample_size: usize,
    /// Seed for the unmatch sampler
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_rate() -> f64 {
    0.005
}

fn default_unmatch_sample_size() -> usize {
    1000
}

fn default_seed() -> u64 {
    1234
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            mu: default_rate(),
            lambda: default_rate(),
            unmatch_sample_size: default_unmatch_sample_size(),
            seed: default_seed(),
        }
    }
}

impl TrainingConfig {
    pub fn bounds(&self) -> ErrorBounds {
        ErrorBounds {
            mu: self.mu,
            lambda: self.lambda,
        }
    }

    pub fn validate(&self) -> LinkageResult<()> {
        self.bounds().validate()?;
        if self.unmatch_sample_size == 0 {
            return Err(LinkageError::EmptySampleSize);
        }
        Ok(())
    }
}

/// Output of training: both frequency tables and the partition
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub mw: ConditionalFrequencyTable,
    pub uw: ConditionalFrequencyTable,
    pub assignment: PartitionAssignment,
    pub bounds: ErrorBounds,
}

impl TrainedModel {
    pub fn stats(&self) -> Vec<PatternStat> {
        pattern_stats(&self.mw, &self.uw, &self.assignment)
    }
}

/// Train with the configured seed
pub fn train<S: SimilarityScorer>(
    left: &RecordSet,
    right: &RecordSet,
    links: &[KnownLink],
    extractor: &FeatureExtractor<S>,
    config: &TrainingConfig,
) -> LinkageResult<TrainedModel> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    train_with_rng(left, right, links, extractor, config, &mut rng)
}

/// Train drawing the unmatch sample from a caller-supplied generator
pub fn train_with_rng<S: SimilarityScorer, R: Rng + ?Sized>(
    left: &RecordSet,
    right: &RecordSet,
    links: &[KnownLink],
    extractor: &FeatureExtractor<S>,
    config: &TrainingConfig,
    rng: &mut R,
) -> LinkageResult<TrainedModel> {
    config.validate()?;
    let classifier = ThresholdClassifier::from_bounds(config.bounds())?;

    let sampler = TrainingSampler::new(left, right)?;
    let matches = sampler.match_sample(links)?;
    let unmatches = sampler.unmatch_sample(config.unmatch_sample_size, rng)?;

    let mw = estimate(&matches, left, right, extractor)?;
    let uw = estimate(&unmatches, left, right, extractor)?;
    let assignment = classifier.classify(&mw, &uw)?;

    info!(
        "Trained on {} match / {} unmatch pairs over {} patterns",
        mw.sample_size(),
        uw.sample_size(),
        extractor.space().len()
    );

    Ok(TrainedModel {
        mw,
        uw,
        assignment,
        bounds: config.bounds(),
    })
}
