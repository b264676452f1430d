//! Partition engine entry points.
//!
//! Every function here validates the configuration through the selected
//! strategy, re-checks the produced partition before returning it, and emits
//! `tracing` events. Nothing is written or cached.

use tracing::{debug, info};

use crate::config::{SplitConfig, SplitStrategy};
use crate::data::{Dataset, Item};
use crate::errors::SplitError;
use crate::splits::{SplitAssignment, SplitFractions, SplitLabel, TaskAssignment};
use crate::strategies::Splitter;

/// Partition `dataset` into train/validation/test (plus discard).
pub fn split(dataset: &Dataset, config: &SplitConfig) -> Result<SplitAssignment, SplitError> {
    let splitter = config.strategy.item_splitter()?;
    let assignment = splitter.split(dataset, &config.request())?;
    assignment.validate(dataset.len())?;
    info!(
        strategy = splitter.name(),
        seed = config.seed,
        items = dataset.len(),
        train = assignment.train.len(),
        validation = assignment.validation.len(),
        test = assignment.test.len(),
        discarded = assignment.discarded.len(),
        "dataset split"
    );
    Ok(assignment)
}

/// Partition the label columns of `dataset`; requires the task-wise strategy.
pub fn split_tasks(dataset: &Dataset, config: &SplitConfig) -> Result<TaskAssignment, SplitError> {
    let SplitStrategy::TaskWise(splitter) = &config.strategy else {
        return Err(SplitError::unsupported(format!(
            "{} splitting partitions items, not tasks",
            config.strategy.name()
        )));
    };
    let assignment = splitter.split_tasks(dataset, &config.request())?;
    assignment.validate(dataset.n_tasks())?;
    info!(
        tasks = dataset.n_tasks(),
        train = assignment.train.len(),
        validation = assignment.validation.len(),
        test = assignment.test.len(),
        "tasks split"
    );
    Ok(assignment)
}

/// `k` cross-validation folds built with the configured strategy.
///
/// The configured fractions are ignored; each fold holds one validation
/// bucket and trains on every other fold.
pub fn k_fold(
    dataset: &Dataset,
    config: &SplitConfig,
    k: usize,
) -> Result<Vec<SplitAssignment>, SplitError> {
    let folds = config.strategy.k_fold(dataset, k, &config.request())?;
    for fold in &folds {
        fold.validate(dataset.len())?;
    }
    info!(
        strategy = config.strategy.name(),
        seed = config.seed,
        folds = folds.len(),
        "k-fold split"
    );
    Ok(folds)
}

/// Two-bucket split: `train_fraction` to train, the rest to test.
///
/// Uses every field of `config` except its fractions.
pub fn train_test_split(
    dataset: &Dataset,
    config: &SplitConfig,
    train_fraction: f64,
) -> Result<SplitAssignment, SplitError> {
    if !(0.0..=1.0).contains(&train_fraction) {
        return Err(SplitError::config(format!(
            "train fraction must be within [0, 1], got {train_fraction}"
        )));
    }
    let two_way = SplitConfig {
        fractions: SplitFractions::new(train_fraction, 0.0, 1.0 - train_fraction),
        ..config.clone()
    };
    split(dataset, &two_way)
}

/// Items of one bucket, in assignment order.
pub fn materialize<'a>(
    dataset: &'a Dataset,
    assignment: &SplitAssignment,
    label: SplitLabel,
) -> Result<Vec<&'a Item>, SplitError> {
    assignment.validate(dataset.len())?;
    let items = dataset.items();
    let picked: Vec<&Item> = assignment
        .indices(label)
        .iter()
        .map(|&idx| &items[idx])
        .collect();
    debug!(bucket = %label, items = picked.len(), "bucket materialized");
    Ok(picked)
}

/// Like [`materialize`] but selects the bucket by name (`train`, `valid`, `test`).
pub fn materialize_named<'a>(
    dataset: &'a Dataset,
    assignment: &SplitAssignment,
    bucket: &str,
) -> Result<Vec<&'a Item>, SplitError> {
    materialize(dataset, assignment, bucket.parse()?)
}

/// Dataset holding every item but only the label columns of one task bucket.
pub fn materialize_tasks(
    dataset: &Dataset,
    assignment: &TaskAssignment,
    label: SplitLabel,
) -> Result<Dataset, SplitError> {
    assignment.validate(dataset.n_tasks())?;
    dataset.select_tasks(assignment.tasks(label))
}
