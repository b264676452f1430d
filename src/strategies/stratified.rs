use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::allocation::{allocate_required_counts, cut_runs};
use crate::constants::stratified::DEFAULT_POSITIVE_THRESHOLD;
use crate::data::{Dataset, Item};
use crate::errors::SplitError;
use crate::splits::{SplitAssignment, SplitFractions};
use crate::strategies::{SplitRequest, Splitter};
use crate::types::ItemIndex;

/// Which labels decide class membership.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StratifyMode {
    /// Positive on the request's `task_index`.
    SingleTask,
    /// Positive on any task.
    AnyTask,
}

/// Splits positives and negatives independently so every bucket keeps the
/// global positive rate (within one item of rounding per class).
#[derive(Clone, Copy, Debug)]
pub struct StratifiedSplitter {
    mode: StratifyMode,
    threshold: f64,
}

impl StratifiedSplitter {
    /// Stratify on one task, chosen per request via `task_index`.
    pub fn single_task() -> Self {
        Self {
            mode: StratifyMode::SingleTask,
            threshold: DEFAULT_POSITIVE_THRESHOLD,
        }
    }

    /// Stratify jointly: an item is positive when any task is positive.
    pub fn multitask() -> Self {
        Self {
            mode: StratifyMode::AnyTask,
            threshold: DEFAULT_POSITIVE_THRESHOLD,
        }
    }

    /// Labels strictly above `threshold` count as positive.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Which label(s) decide positives.
    pub fn mode(&self) -> StratifyMode {
        self.mode
    }

    /// Labels strictly above this value count as positive.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn classify(
        &self,
        dataset: &Dataset,
        request: &SplitRequest,
    ) -> Result<impl Fn(&Item) -> bool, SplitError> {
        if !self.threshold.is_finite() {
            return Err(SplitError::config(format!(
                "positive threshold must be finite, got {}",
                self.threshold
            )));
        }
        let threshold = self.threshold;
        let task = match self.mode {
            StratifyMode::SingleTask => Some(request.task_index.ok_or_else(|| {
                SplitError::config("single-task stratified splitting requires a task_index")
            })?),
            StratifyMode::AnyTask => {
                if dataset.n_tasks() == 0 {
                    return Err(SplitError::config(
                        "multitask stratified splitting requires labeled items",
                    ));
                }
                None
            }
        };
        Ok(move |item: &Item| match task {
            Some(task) => item.is_positive(task, threshold),
            None => item.any_positive(threshold),
        })
    }
}

impl Splitter for StratifiedSplitter {
    fn name(&self) -> &'static str {
        match self.mode {
            StratifyMode::SingleTask => "stratified",
            StratifyMode::AnyTask => "multitask_stratified",
        }
    }

    fn split(
        &self,
        dataset: &Dataset,
        request: &SplitRequest,
    ) -> Result<SplitAssignment, SplitError> {
        let fractions = request.validate(dataset)?;
        let is_positive = self.classify(dataset, request)?;
        let (mut positives, mut negatives): (Vec<ItemIndex>, Vec<ItemIndex>) =
            (0..dataset.len()).partition(|&idx| is_positive(&dataset.items()[idx]));
        debug!(
            positives = positives.len(),
            negatives = negatives.len(),
            threshold = self.threshold,
            "stratifying by positive class"
        );

        let mut rng = StdRng::seed_from_u64(request.seed);
        positives.shuffle(&mut rng);
        negatives.shuffle(&mut rng);

        let positive_part = split_class(&positives, &fractions, "positive class")?;
        let negative_part = split_class(&negatives, &fractions, "negative class")?;
        Ok(merge(positive_part, negative_part))
    }
}

fn split_class(
    members: &[ItemIndex],
    fractions: &SplitFractions,
    what: &str,
) -> Result<SplitAssignment, SplitError> {
    let counts = allocate_required_counts(members.len(), fractions, what)?;
    Ok(cut_runs(members, &counts))
}

fn merge(mut left: SplitAssignment, right: SplitAssignment) -> SplitAssignment {
    left.train.extend(right.train);
    left.validation.extend(right.validation);
    left.test.extend(right.test);
    left.discarded.extend(right.discarded);
    left
}
