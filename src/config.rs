use crate::constants::config::DEFAULT_SEED;
use crate::data::Dataset;
use crate::errors::SplitError;
use crate::splits::{SplitAssignment, SplitFractions};
use crate::strategies::{
    ButinaSplitter, GroupSplitter, IndexSplitter, MaxMinSplitter, NumericOrderSplitter,
    RandomSplitter, SpecifiedSplitter, SplitRequest, Splitter, StratifiedSplitter, TaskSplitter,
};
use crate::types::TaskIndex;

/// Strategy selected by a [`SplitConfig`].
///
/// Item strategies dispatch through [`Splitter`]; `TaskWise` is only
/// accepted by task splitting entry points.
#[derive(Clone, Debug)]
pub enum SplitStrategy {
    /// Seeded random permutation.
    Random(RandomSplitter),
    /// Dataset order, no shuffle.
    Index(IndexSplitter),
    /// Positive-class stratification (single task or any task).
    Stratified(StratifiedSplitter),
    /// Whole-group fill (scaffold or random group order).
    Group(GroupSplitter),
    /// Butina similarity clustering.
    Butina(ButinaSplitter),
    /// Farthest-point evaluation buckets.
    MaxMin(MaxMinSplitter),
    /// Ascending numeric attribute.
    NumericOrder(NumericOrderSplitter),
    /// Caller-supplied assignment.
    Specified(SpecifiedSplitter),
    /// Label-column partitioning.
    TaskWise(TaskSplitter),
}

impl Default for SplitStrategy {
    fn default() -> Self {
        Self::Random(RandomSplitter)
    }
}

impl SplitStrategy {
    /// Item splitter behind this strategy.
    ///
    /// Fails with `UnsupportedOperation` for the task-wise strategy.
    pub fn item_splitter(&self) -> Result<&dyn Splitter, SplitError> {
        let splitter: &dyn Splitter = match self {
            Self::Random(splitter) => splitter,
            Self::Index(splitter) => splitter,
            Self::Stratified(splitter) => splitter,
            Self::Group(splitter) => splitter,
            Self::Butina(splitter) => splitter,
            Self::MaxMin(splitter) => splitter,
            Self::NumericOrder(splitter) => splitter,
            Self::Specified(splitter) => splitter,
            Self::TaskWise(_) => {
                return Err(SplitError::unsupported(
                    "task-wise strategy partitions label columns; use split_tasks",
                ));
            }
        };
        Ok(splitter)
    }
}

impl Splitter for SplitStrategy {
    fn name(&self) -> &'static str {
        match self {
            Self::Random(splitter) => splitter.name(),
            Self::Index(splitter) => splitter.name(),
            Self::Stratified(splitter) => splitter.name(),
            Self::Group(splitter) => splitter.name(),
            Self::Butina(splitter) => splitter.name(),
            Self::MaxMin(splitter) => splitter.name(),
            Self::NumericOrder(splitter) => splitter.name(),
            Self::Specified(splitter) => splitter.name(),
            Self::TaskWise(splitter) => splitter.name(),
        }
    }

    fn split(
        &self,
        dataset: &Dataset,
        request: &SplitRequest,
    ) -> Result<SplitAssignment, SplitError> {
        self.item_splitter()?.split(dataset, request)
    }

    fn supports_k_fold(&self) -> bool {
        self.item_splitter()
            .map(|splitter| splitter.supports_k_fold())
            .unwrap_or(false)
    }
}

impl From<RandomSplitter> for SplitStrategy {
    fn from(splitter: RandomSplitter) -> Self {
        Self::Random(splitter)
    }
}

impl From<IndexSplitter> for SplitStrategy {
    fn from(splitter: IndexSplitter) -> Self {
        Self::Index(splitter)
    }
}

impl From<StratifiedSplitter> for SplitStrategy {
    fn from(splitter: StratifiedSplitter) -> Self {
        Self::Stratified(splitter)
    }
}

impl From<GroupSplitter> for SplitStrategy {
    fn from(splitter: GroupSplitter) -> Self {
        Self::Group(splitter)
    }
}

impl From<ButinaSplitter> for SplitStrategy {
    fn from(splitter: ButinaSplitter) -> Self {
        Self::Butina(splitter)
    }
}

impl From<MaxMinSplitter> for SplitStrategy {
    fn from(splitter: MaxMinSplitter) -> Self {
        Self::MaxMin(splitter)
    }
}

impl From<NumericOrderSplitter> for SplitStrategy {
    fn from(splitter: NumericOrderSplitter) -> Self {
        Self::NumericOrder(splitter)
    }
}

impl From<SpecifiedSplitter> for SplitStrategy {
    fn from(splitter: SpecifiedSplitter) -> Self {
        Self::Specified(splitter)
    }
}

impl From<TaskSplitter> for SplitStrategy {
    fn from(splitter: TaskSplitter) -> Self {
        Self::TaskWise(splitter)
    }
}

/// Top-level split configuration.
#[derive(Clone, Debug)]
pub struct SplitConfig {
    /// Strategy used to partition the dataset.
    pub strategy: SplitStrategy,
    /// Requested bucket fractions; the remainder is discarded.
    pub fractions: SplitFractions,
    /// RNG seed that controls every randomized choice.
    pub seed: u64,
    /// Label column used by single-task strategies.
    pub task_index: Option<TaskIndex>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            strategy: SplitStrategy::default(),
            fractions: SplitFractions::default(),
            seed: DEFAULT_SEED,
            task_index: None,
        }
    }
}

impl SplitConfig {
    /// Default fractions and seed with the given strategy.
    pub fn new(strategy: impl Into<SplitStrategy>) -> Self {
        Self {
            strategy: strategy.into(),
            ..Self::default()
        }
    }

    /// Requested bucket fractions.
    pub fn with_fractions(mut self, fractions: SplitFractions) -> Self {
        self.fractions = fractions;
        self
    }

    /// Seed for every randomized choice.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Label column for single-task strategies.
    pub fn with_task_index(mut self, task: TaskIndex) -> Self {
        self.task_index = Some(task);
        self
    }

    /// Per-call parameters handed to the strategy.
    pub fn request(&self) -> SplitRequest {
        SplitRequest {
            fractions: self.fractions,
            seed: self.seed,
            task_index: self.task_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Item;

    #[test]
    fn defaults_match_documented_values() {
        let config = SplitConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.fractions, SplitFractions::new(0.8, 0.1, 0.1));
        assert!(matches!(config.strategy, SplitStrategy::Random(_)));
        assert_eq!(config.request().task_index, None);
    }

    #[test]
    fn strategy_names_follow_the_wrapped_splitter() {
        assert_eq!(SplitStrategy::from(GroupSplitter::scaffold()).name(), "scaffold");
        assert_eq!(SplitStrategy::from(StratifiedSplitter::multitask()).name(), "multitask_stratified");
        assert_eq!(SplitStrategy::from(TaskSplitter).name(), "task");
    }

    #[test]
    fn task_wise_strategy_rejects_item_split() {
        let data = Dataset::new(vec![Item::new("a").with_labels([1.0, 0.0])]).unwrap();
        let strategy = SplitStrategy::from(TaskSplitter);
        let err = strategy
            .split(&data, &SplitConfig::default().request())
            .unwrap_err();
        assert!(matches!(err, SplitError::UnsupportedOperation(_)));
        assert!(!strategy.supports_k_fold());
        assert!(!SplitStrategy::from(SpecifiedSplitter::default()).supports_k_fold());
        assert!(SplitStrategy::from(ButinaSplitter::default()).supports_k_fold());
    }
}
