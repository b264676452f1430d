use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::constants::splits::{ALL_SPLITS, DISCARD_NAME};
use crate::constants::stratified::DEFAULT_POSITIVE_THRESHOLD;
use crate::data::Dataset;
use crate::errors::SplitError;
use crate::grouping::{Grouping, ItemGroupKey};
use crate::splits::{SplitAssignment, SplitLabel};
use crate::types::{GroupKey, TaskIndex};

/// Aggregate report for one split assignment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitSummary {
    /// Number of items in the dataset.
    pub total: usize,
    /// Train, validation and test, in that order.
    pub buckets: Vec<BucketShare>,
    /// Items in no requested bucket.
    pub discarded: usize,
    /// Task whose positives are counted per bucket, when requested.
    pub positive_task: Option<TaskIndex>,
    /// Group keys whose items land in more than one bucket.
    pub leaked_groups: usize,
    /// [`SplitAssignment::checksum`] of the summarized assignment.
    pub checksum: u64,
}

/// Per-bucket share of the dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BucketShare {
    /// Which requested bucket this entry describes.
    pub bucket: SplitLabel,
    /// Items in the bucket.
    pub count: usize,
    /// `count` over the dataset size; 0 for an empty dataset.
    pub share: f64,
    /// Items positive on `SplitSummary::positive_task`.
    pub positives: Option<usize>,
}

impl SplitSummary {
    /// Entry for one requested bucket.
    pub fn bucket(&self, label: SplitLabel) -> Option<&BucketShare> {
        self.buckets.iter().find(|entry| entry.bucket == label)
    }
}

/// Summarize `assignment` over `dataset`, counting positives on `positive_task`.
///
/// Uses the default positive threshold and the items' own group keys; see
/// [`summarize_with`] to override either.
pub fn summarize(
    dataset: &Dataset,
    assignment: &SplitAssignment,
    positive_task: Option<TaskIndex>,
) -> Result<SplitSummary, SplitError> {
    summarize_with(
        dataset,
        assignment,
        positive_task,
        DEFAULT_POSITIVE_THRESHOLD,
        &ItemGroupKey,
    )
}

/// Like [`summarize`] with an explicit positive threshold and grouping.
///
/// Labels strictly above `positive_threshold` count as positive; leaked
/// groups are keyed by `grouping`.
pub fn summarize_with(
    dataset: &Dataset,
    assignment: &SplitAssignment,
    positive_task: Option<TaskIndex>,
    positive_threshold: f64,
    grouping: &dyn Grouping,
) -> Result<SplitSummary, SplitError> {
    assignment.validate(dataset.len())?;
    if let Some(task) = positive_task
        && task >= dataset.n_tasks()
    {
        return Err(SplitError::config(format!(
            "task {task} is out of range for a dataset with {} tasks",
            dataset.n_tasks()
        )));
    }
    if !positive_threshold.is_finite() {
        return Err(SplitError::config(format!(
            "positive threshold must be finite, got {positive_threshold}"
        )));
    }
    let total = dataset.len();
    let items = dataset.items();
    let buckets = ALL_SPLITS
        .into_iter()
        .map(|label| {
            let indices = assignment.indices(label);
            BucketShare {
                bucket: label,
                count: indices.len(),
                share: if total == 0 {
                    0.0
                } else {
                    indices.len() as f64 / total as f64
                },
                positives: positive_task.map(|task| {
                    indices
                        .iter()
                        .filter(|&&idx| items[idx].is_positive(task, positive_threshold))
                        .count()
                }),
            }
        })
        .collect();
    Ok(SplitSummary {
        total,
        buckets,
        discarded: assignment.discarded.len(),
        positive_task,
        leaked_groups: leaked_groups_by(dataset, assignment, grouping),
        checksum: assignment.checksum(),
    })
}

/// Number of `Item::group_key` values present in two or more buckets.
pub fn leaked_groups(dataset: &Dataset, assignment: &SplitAssignment) -> usize {
    leaked_groups_by(dataset, assignment, &ItemGroupKey)
}

/// Number of `grouping` keys present in two or more buckets.
///
/// Items without a key never leak.
pub fn leaked_groups_by(
    dataset: &Dataset,
    assignment: &SplitAssignment,
    grouping: &dyn Grouping,
) -> usize {
    let items = dataset.items();
    let mut seen: HashMap<GroupKey, [bool; 3]> = HashMap::new();
    for label in ALL_SPLITS {
        for &idx in assignment.indices(label) {
            if let Some(key) = items.get(idx).and_then(|item| grouping.group_key(item)) {
                seen.entry(key).or_default()[label.position()] = true;
            }
        }
    }
    seen.values()
        .filter(|hits| hits.iter().filter(|hit| **hit).count() > 1)
        .count()
}

impl fmt::Display for SplitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.buckets {
            write!(
                f,
                "{:<8}{:>8}  {:>6.2}%",
                entry.bucket.name(),
                entry.count,
                entry.share * 100.0
            )?;
            if let Some(positives) = entry.positives {
                write!(f, "  positives={positives}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "{DISCARD_NAME:<8}{:>8}", self.discarded)?;
        writeln!(f, "leaked groups: {}", self.leaked_groups)?;
        write!(f, "checksum: {:016x}", self.checksum)
    }
}
