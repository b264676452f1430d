//! Splitter capability and its strategy implementations.
//!
//! Ownership model:
//! - `Splitter` is the single contract every item-dimension strategy fulfils.
//! - Strategies own only their configuration (thresholds, injected
//!   providers); all per-call state lives on the stack.
//! - `TaskSplitter` partitions label columns instead of items and therefore
//!   exposes `split_tasks` rather than `Splitter::split`.

use crate::constants::folds::{FOLD_SEED_OFFSET, MIN_FOLDS};
use crate::data::Dataset;
use crate::errors::SplitError;
use crate::hash::derive_seed;
use crate::splits::{SplitAssignment, SplitFractions};
use crate::types::{ItemIndex, TaskIndex};

/// Farthest-point (MaxMin) splitter.
pub mod maxmin;
/// Similarity clustering (Butina) splitter.
pub mod butina;
/// Group (scaffold) and random-group splitters.
pub mod group;
/// Dataset-order splitter.
pub mod index;
/// Numeric-attribute ordered splitter.
pub mod numeric;
/// Seeded random splitter.
pub mod random;
/// Caller-specified splitter.
pub mod specified;
/// Positive-class stratified splitters.
pub mod stratified;
/// Label-column splitter.
pub mod task;

pub use butina::ButinaSplitter;
pub use group::{GroupOrder, GroupSplitter};
pub use index::IndexSplitter;
pub use maxmin::{FarthestPointSampler, MaxMinSplitter};
pub use numeric::NumericOrderSplitter;
pub use random::RandomSplitter;
pub use specified::{SpecifiedSplitter, UnlistedItems};
pub use stratified::{StratifiedSplitter, StratifyMode};
pub use task::TaskSplitter;

/// Per-call split parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitRequest {
    /// Requested bucket fractions; the remainder is discarded.
    pub fractions: SplitFractions,
    /// Seed for every randomized choice made by the strategy.
    pub seed: u64,
    /// Label column used by single-task strategies.
    pub task_index: Option<TaskIndex>,
}

impl SplitRequest {
    /// Request with no task index.
    pub fn new(fractions: SplitFractions, seed: u64) -> Self {
        Self {
            fractions,
            seed,
            task_index: None,
        }
    }

    /// Label column for single-task strategies.
    pub fn with_task_index(mut self, task: TaskIndex) -> Self {
        self.task_index = Some(task);
        self
    }

    /// Check the request against `dataset` and return validated fractions.
    pub fn validate(&self, dataset: &Dataset) -> Result<SplitFractions, SplitError> {
        require_items(dataset)?;
        if let Some(task) = self.task_index
            && task >= dataset.n_tasks()
        {
            return Err(SplitError::config(format!(
                "task_index {task} is out of range for a dataset with {} tasks",
                dataset.n_tasks()
            )));
        }
        self.fractions.validated()
    }
}

pub(crate) fn require_items(dataset: &Dataset) -> Result<(), SplitError> {
    if dataset.is_empty() {
        return Err(SplitError::config("cannot split an empty dataset"));
    }
    Ok(())
}

/// Strategy that partitions a dataset's items into split buckets.
///
/// Implementations must be pure: identical dataset and request produce an
/// identical assignment.
pub trait Splitter: Send + Sync {
    /// Short strategy name used in logs and summaries.
    fn name(&self) -> &'static str;

    /// Partition `dataset` according to `request`.
    fn split(
        &self,
        dataset: &Dataset,
        request: &SplitRequest,
    ) -> Result<SplitAssignment, SplitError>;

    /// Whether [`Splitter::k_fold`] is meaningful for this strategy.
    fn supports_k_fold(&self) -> bool {
        true
    }

    /// Produce `k` folds; each item is in the validation bucket of exactly one.
    ///
    /// Fold `i` is carved off the not-yet-assigned items by splitting them
    /// `1/(k-i)` versus the rest with this same strategy, so grouping and
    /// stratification guarantees carry over to folds. The request's
    /// fractions are ignored.
    fn k_fold(
        &self,
        dataset: &Dataset,
        k: usize,
        request: &SplitRequest,
    ) -> Result<Vec<SplitAssignment>, SplitError> {
        if !self.supports_k_fold() {
            return Err(SplitError::unsupported(format!(
                "{} splitting does not support k-fold",
                self.name()
            )));
        }
        require_items(dataset)?;
        if k < MIN_FOLDS {
            return Err(SplitError::config(format!(
                "k-fold needs at least {MIN_FOLDS} folds, got {k}"
            )));
        }
        if k > dataset.len() {
            return Err(SplitError::insufficient(format!(
                "cannot build {k} folds from {} items",
                dataset.len()
            )));
        }

        let mut remaining: Vec<ItemIndex> = (0..dataset.len()).collect();
        let mut members: Vec<Vec<ItemIndex>> = Vec::with_capacity(k);
        for fold in 0..k - 1 {
            let share = 1.0 / (k - fold) as f64;
            let inner = SplitRequest {
                fractions: SplitFractions::new(share, 1.0 - share, 0.0),
                seed: derive_seed(request.seed, FOLD_SEED_OFFSET, fold),
                task_index: request.task_index,
            };
            let subset = dataset.subset(&remaining)?;
            let part = self.split(&subset, &inner)?;
            let picked: Vec<ItemIndex> = part.train.iter().map(|&idx| remaining[idx]).collect();
            if picked.is_empty() {
                return Err(SplitError::insufficient(format!(
                    "fold {fold} of {k} would be empty under {} splitting",
                    self.name()
                )));
            }
            remaining = part
                .validation
                .iter()
                .chain(&part.test)
                .chain(&part.discarded)
                .map(|&idx| remaining[idx])
                .collect();
            members.push(picked);
        }
        if remaining.is_empty() {
            return Err(SplitError::insufficient(format!(
                "fold {} of {k} would be empty under {} splitting",
                k - 1,
                self.name()
            )));
        }
        members.push(remaining);

        Ok((0..k)
            .map(|fold| {
                let train = members
                    .iter()
                    .enumerate()
                    .filter(|(other, _)| *other != fold)
                    .flat_map(|(_, indices)| indices.iter().copied())
                    .collect();
                SplitAssignment::from_buckets(
                    [train, members[fold].clone(), Vec::new()],
                    Vec::new(),
                )
            })
            .collect())
    }
}
