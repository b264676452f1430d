use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::allocation::allocate_counts;
use crate::data::Dataset;
use crate::errors::SplitError;
use crate::similarity::{Similarity, Tanimoto};
use crate::splits::SplitAssignment;
use crate::strategies::{SplitRequest, Splitter, require_items};
use crate::types::ItemIndex;

/// Farthest-point sampling over a dataset.
///
/// Tracks, for every item, its minimum distance to the picked set. Picked
/// items hold `0.0`; unpicked items start at `f64::INFINITY`. Entries only
/// ever decrease.
pub struct FarthestPointSampler<'a> {
    dataset: &'a Dataset,
    similarity: &'a dyn Similarity,
    min_distance: Vec<f64>,
    picked: Vec<bool>,
    picks: Vec<ItemIndex>,
    pick_distances: Vec<f64>,
}

impl<'a> FarthestPointSampler<'a> {
    /// Start sampling from one item chosen by `seed`.
    pub fn new(
        dataset: &'a Dataset,
        similarity: &'a dyn Similarity,
        seed: u64,
    ) -> Result<Self, SplitError> {
        require_items(dataset)?;
        let mut sampler = Self {
            dataset,
            similarity,
            min_distance: vec![f64::INFINITY; dataset.len()],
            picked: vec![false; dataset.len()],
            picks: Vec::new(),
            pick_distances: Vec::new(),
        };
        let first = StdRng::seed_from_u64(seed).random_range(0..dataset.len());
        sampler.pick(first)?;
        Ok(sampler)
    }

    /// Pick the unpicked item farthest from the picked set (ties: lowest index).
    ///
    /// Returns `None` once every item has been picked.
    pub fn next_pick(&mut self) -> Result<Option<ItemIndex>, SplitError> {
        let mut best: Option<ItemIndex> = None;
        for idx in 0..self.dataset.len() {
            if self.picked[idx] {
                continue;
            }
            match best {
                Some(current) if self.min_distance[idx] <= self.min_distance[current] => {}
                _ => best = Some(idx),
            }
        }
        if let Some(idx) = best {
            self.pick(idx)?;
        }
        Ok(best)
    }

    fn pick(&mut self, idx: ItemIndex) -> Result<(), SplitError> {
        let items = self.dataset.items();
        self.pick_distances.push(self.min_distance[idx]);
        self.picked[idx] = true;
        self.min_distance[idx] = 0.0;
        self.picks.push(idx);
        for other in 0..items.len() {
            if self.picked[other] {
                continue;
            }
            let distance = self.similarity.distance(&items[idx], &items[other])?;
            if distance < self.min_distance[other] {
                self.min_distance[other] = distance;
            }
        }
        Ok(())
    }

    /// Items picked so far, in pick order (the seed pick first).
    pub fn picks(&self) -> &[ItemIndex] {
        &self.picks
    }

    /// Minimum distance of each pick to the set picked before it.
    ///
    /// The seed pick reports `f64::INFINITY`.
    pub fn pick_distances(&self) -> &[f64] {
        &self.pick_distances
    }

    /// Current minimum distance of every item to the picked set.
    pub fn min_distances(&self) -> &[f64] {
        &self.min_distance
    }
}

/// Builds maximally dispersed evaluation buckets.
///
/// Picks fill test first, then validation; the unpicked items fill train in
/// dataset order, and whatever remains is discarded.
#[derive(Clone)]
pub struct MaxMinSplitter {
    similarity: Arc<dyn Similarity>,
}

impl fmt::Debug for MaxMinSplitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaxMinSplitter").finish_non_exhaustive()
    }
}

impl Default for MaxMinSplitter {
    fn default() -> Self {
        Self {
            similarity: Arc::new(Tanimoto),
        }
    }
}

impl MaxMinSplitter {
    /// Use `similarity`'s distance instead of Tanimoto distance.
    pub fn with_similarity(mut self, similarity: impl Similarity + 'static) -> Self {
        self.similarity = Arc::new(similarity);
        self
    }

    /// Start a sampler with this splitter's distance.
    pub fn sampler<'a>(
        &'a self,
        dataset: &'a Dataset,
        seed: u64,
    ) -> Result<FarthestPointSampler<'a>, SplitError> {
        FarthestPointSampler::new(dataset, self.similarity.as_ref(), seed)
    }
}

impl Splitter for MaxMinSplitter {
    fn name(&self) -> &'static str {
        "maxmin"
    }

    fn split(
        &self,
        dataset: &Dataset,
        request: &SplitRequest,
    ) -> Result<SplitAssignment, SplitError> {
        let fractions = request.validate(dataset)?;
        let counts = allocate_counts(dataset.len(), &fractions);
        let wanted = counts.test + counts.validation;

        let mut picks = Vec::with_capacity(wanted);
        if wanted > 0 {
            let mut sampler = self.sampler(dataset, request.seed)?;
            while sampler.picks().len() < wanted {
                if sampler.next_pick()?.is_none() {
                    break;
                }
            }
            picks.extend_from_slice(sampler.picks());
            debug!(
                picks = picks.len(),
                last_distance = sampler.pick_distances().last().copied().unwrap_or(0.0),
                "maxmin picking complete"
            );
        }

        let test: Vec<ItemIndex> = picks[..counts.test].to_vec();
        let validation: Vec<ItemIndex> = picks[counts.test..].to_vec();
        let mut chosen = vec![false; dataset.len()];
        for &idx in &picks {
            chosen[idx] = true;
        }
        let rest: Vec<ItemIndex> = (0..dataset.len()).filter(|&idx| !chosen[idx]).collect();
        let (train, discarded) = rest.split_at(counts.train.min(rest.len()));
        Ok(SplitAssignment::from_buckets(
            [train.to_vec(), validation, test],
            discarded.to_vec(),
        ))
    }
}
