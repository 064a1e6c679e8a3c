//! Training sample construction
//!
//! The match sample joins the two collections through the known links.
//! The unmatch sample pairs records drawn independently, uniformly and
//! with replacement from each collection. A random pair is only assumed
//! to be a non-match: on small collections some sampled pairs will be
//! true matches, and that noise is part of the method.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{LinkageError, LinkageResult};
use crate::models::{KnownLink, PairIndex, RecordSet};

/// Which condition a training sample is drawn under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    Match,
    Unmatch,
}

impl std::fmt::Display for SampleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleKind::Match => write!(f, "match"),
            SampleKind::Unmatch => write!(f, "unmatch"),
        }
    }
}

/// A labeled set of record pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingSample {
    pub kind: SampleKind,
    pub pairs: Vec<PairIndex>,
}

impl TrainingSample {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Builds match and unmatch samples over two record collections
#[derive(Debug, Clone, Copy)]
pub struct TrainingSampler<'a> {
    left: &'a RecordSet,
    right: &'a RecordSet,
}

impl<'a> TrainingSampler<'a> {
    pub fn new(left: &'a RecordSet, right: &'a RecordSet) -> LinkageResult<Self> {
        for set in [left, right] {
            if set.is_empty() {
                return Err(LinkageError::EmptyCollection {
                    collection: set.name.clone(),
                });
            }
        }
        Ok(Self { left, right })
    }

    /// Join the collections through the known links.
    ///
    /// Every link must name a key present in its collection.
    pub fn match_sample(&self, links: &[KnownLink]) -> LinkageResult<TrainingSample> {
        if links.is_empty() {
            return Err(LinkageError::EmptyKnownLinks);
        }

        let left_keys = self.left.key_index();
        let right_keys = self.right.key_index();

        let pairs = links
            .iter()
            .map(|link| {
                let left = *left_keys.get(link.left.as_str()).ok_or_else(|| {
                    LinkageError::UnknownLinkKey {
                        collection: self.left.name.clone(),
                        key: link.left.clone(),
                    }
                })?;
                let right = *right_keys.get(link.right.as_str()).ok_or_else(|| {
                    LinkageError::UnknownLinkKey {
                        collection: self.right.name.clone(),
                        key: link.right.clone(),
                    }
                })?;
                Ok(PairIndex::new(left, right))
            })
            .collect::<LinkageResult<Vec<_>>>()?;

        info!("Match sample: {} pairs from known links", pairs.len());
        Ok(TrainingSample {
            kind: SampleKind::Match,
            pairs,
        })
    }

    /// Draw `size` random pairs, each side sampled with replacement
    pub fn unmatch_sample<R: Rng + ?Sized>(
        &self,
        size: usize,
        rng: &mut R,
    ) -> LinkageResult<TrainingSample> {
        if size == 0 {
            return Err(LinkageError::EmptySampleSize);
        }

        let pairs: Vec<PairIndex> = (0..size)
            .map(|_| {
                let left = rng.random_range(0..self.left.len());
                let right = rng.random_range(0..self.right.len());
                PairIndex::new(left, right)
            })
            .collect();

        debug!(
            "Unmatch sample drawn from {} x {} records",
            self.left.len(),
            self.right.len()
        );
        info!("Unmatch sample: {} random pairs", pairs.len());
        Ok(TrainingSample {
            kind: SampleKind::Unmatch,
            pairs,
        })
    }
}
