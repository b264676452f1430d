use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::hash::Hash;
use std::path::Path;
use std::str::FromStr;

use crate::constants::fractions::{
    DEFAULT_TEST_FRACTION, DEFAULT_TRAIN_FRACTION, DEFAULT_VALIDATION_FRACTION,
    FRACTION_TOLERANCE,
};
use crate::constants::splits::{ALL_SPLITS, TEST_NAME, TRAIN_NAME, VALIDATION_NAME};
use crate::errors::SplitError;
use crate::hash::stable_hash_with;
use crate::types::{BucketName, ItemIndex, TaskIndex};

/// Logical dataset partitions produced by a splitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SplitLabel {
    /// Training split.
    Train,
    /// Validation split.
    Validation,
    /// Test split.
    Test,
}

impl SplitLabel {
    /// Short bucket name used in summaries and exports.
    pub fn name(self) -> BucketName {
        match self {
            Self::Train => TRAIN_NAME,
            Self::Validation => VALIDATION_NAME,
            Self::Test => TEST_NAME,
        }
    }

    /// Position of this label in the canonical bucket order.
    pub fn position(self) -> usize {
        match self {
            Self::Train => 0,
            Self::Validation => 1,
            Self::Test => 2,
        }
    }
}

impl fmt::Display for SplitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SplitLabel {
    type Err = SplitError;

    /// Accepts bucket names (`train`, `valid`, `test`) and `validation`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            TRAIN_NAME => Ok(Self::Train),
            VALIDATION_NAME | "validation" => Ok(Self::Validation),
            TEST_NAME => Ok(Self::Test),
            other => Err(SplitError::config(format!("unknown bucket name '{other}'"))),
        }
    }
}

/// Requested share of the dataset for each bucket.
///
/// Fractions may sum to less than `1.0`; the remainder is discarded.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitFractions {
    /// Fraction assigned to train.
    pub train: f64,
    /// Fraction assigned to validation.
    pub validation: f64,
    /// Fraction assigned to test.
    pub test: f64,
}

impl Default for SplitFractions {
    fn default() -> Self {
        Self {
            train: DEFAULT_TRAIN_FRACTION,
            validation: DEFAULT_VALIDATION_FRACTION,
            test: DEFAULT_TEST_FRACTION,
        }
    }
}

impl SplitFractions {
    /// Unvalidated fractions; see [`SplitFractions::validated`].
    pub fn new(train: f64, validation: f64, test: f64) -> Self {
        Self {
            train,
            validation,
            test,
        }
    }

    /// Validate that fractions are finite, non-negative, and sum to at most `1.0`.
    pub fn validated(self) -> Result<Self, SplitError> {
        for label in ALL_SPLITS {
            let value = self.get(label);
            if !value.is_finite() || value < 0.0 {
                return Err(SplitError::config(format!(
                    "{label} fraction must be a non-negative number, got {value}"
                )));
            }
        }
        let sum = self.sum();
        if sum > 1.0 + FRACTION_TOLERANCE {
            return Err(SplitError::config(format!(
                "split fractions must sum to at most 1.0, got {sum:.6}"
            )));
        }
        Ok(self)
    }

    /// Fraction for one requested bucket.
    pub fn get(&self, label: SplitLabel) -> f64 {
        match label {
            SplitLabel::Train => self.train,
            SplitLabel::Validation => self.validation,
            SplitLabel::Test => self.test,
        }
    }

    /// Sum of the three requested fractions.
    pub fn sum(&self) -> f64 {
        self.train + self.validation + self.test
    }

    /// Share of the dataset left unassigned.
    pub fn discard(&self) -> f64 {
        (1.0 - self.sum()).max(0.0)
    }

    /// Buckets with a strictly positive fraction, in canonical order.
    pub fn required_buckets(&self) -> Vec<SplitLabel> {
        ALL_SPLITS
            .into_iter()
            .filter(|label| self.get(*label) > 0.0)
            .collect()
    }
}

/// Partition of a dataset's index set into train/validation/test plus discard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SplitAssignment {
    /// Item indices assigned to train.
    pub train: Vec<ItemIndex>,
    /// Item indices assigned to validation.
    pub validation: Vec<ItemIndex>,
    /// Item indices assigned to test.
    pub test: Vec<ItemIndex>,
    /// Item indices left out of every bucket.
    #[serde(default)]
    pub discarded: Vec<ItemIndex>,
}

impl SplitAssignment {
    /// Build from per-bucket lists in canonical order.
    pub fn from_buckets(buckets: [Vec<ItemIndex>; 3], discarded: Vec<ItemIndex>) -> Self {
        let [train, validation, test] = buckets;
        Self {
            train,
            validation,
            test,
            discarded,
        }
    }

    /// Indices of one requested bucket.
    pub fn indices(&self, label: SplitLabel) -> &[ItemIndex] {
        match label {
            SplitLabel::Train => &self.train,
            SplitLabel::Validation => &self.validation,
            SplitLabel::Test => &self.test,
        }
    }

    /// Number of indices across all buckets, discard included.
    pub fn total_len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len() + self.discarded.len()
    }

    /// Bucket holding `idx`, or `None` when discarded or absent.
    pub fn label_of(&self, idx: ItemIndex) -> Option<SplitLabel> {
        ALL_SPLITS
            .into_iter()
            .find(|label| self.indices(*label).contains(&idx))
    }

    /// Check that buckets are disjoint, in range, and cover `0..dataset_len`.
    pub fn validate(&self, dataset_len: usize) -> Result<(), SplitError> {
        validate_partition(
            [
                self.train.as_slice(),
                self.validation.as_slice(),
                self.test.as_slice(),
                self.discarded.as_slice(),
            ],
            dataset_len,
            "item",
        )
    }

    /// Stable checksum of the assignment, used to compare reruns.
    pub fn checksum(&self) -> u64 {
        stable_hash_with(|hasher| self.hash(hasher))
    }

    /// Pretty JSON with `train`, `validation`, `test`, and `discarded` lists.
    pub fn to_json(&self) -> Result<String, SplitError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an exported assignment and validate it against `dataset_len`.
    pub fn from_json(raw: &str, dataset_len: usize) -> Result<Self, SplitError> {
        let assignment: Self = serde_json::from_str(raw)?;
        assignment.validate(dataset_len)?;
        Ok(assignment)
    }

    /// Write [`SplitAssignment::to_json`] to `path`, creating parent directories.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), SplitError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read an exported assignment and validate it against `dataset_len` items.
    pub fn read_json<P: AsRef<Path>>(path: P, dataset_len: usize) -> Result<Self, SplitError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw, dataset_len)
    }
}

/// Partition of a dataset's task (label column) indices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignment {
    /// Task indices assigned to train.
    pub train: Vec<TaskIndex>,
    /// Task indices assigned to validation.
    pub validation: Vec<TaskIndex>,
    /// Task indices assigned to test.
    pub test: Vec<TaskIndex>,
    /// Task indices left out of every bucket.
    #[serde(default)]
    pub discarded: Vec<TaskIndex>,
}

impl TaskAssignment {
    /// Task indices of one requested bucket.
    pub fn tasks(&self, label: SplitLabel) -> &[TaskIndex] {
        match label {
            SplitLabel::Train => &self.train,
            SplitLabel::Validation => &self.validation,
            SplitLabel::Test => &self.test,
        }
    }

    /// Check that task buckets are disjoint, in range, and cover `0..n_tasks`.
    pub fn validate(&self, n_tasks: usize) -> Result<(), SplitError> {
        validate_partition(
            [
                self.train.as_slice(),
                self.validation.as_slice(),
                self.test.as_slice(),
                self.discarded.as_slice(),
            ],
            n_tasks,
            "task",
        )
    }
}

fn validate_partition(
    buckets: [&[usize]; 4],
    domain: usize,
    what: &str,
) -> Result<(), SplitError> {
    let mut seen = vec![false; domain];
    let mut covered = 0usize;
    for bucket in buckets {
        for &idx in bucket {
            let Some(slot) = seen.get_mut(idx) else {
                return Err(SplitError::config(format!(
                    "{what} index {idx} is out of range (domain size {domain})"
                )));
            };
            if *slot {
                return Err(SplitError::config(format!(
                    "{what} index {idx} is assigned more than once"
                )));
            }
            *slot = true;
            covered += 1;
        }
    }
    if covered != domain {
        return Err(SplitError::config(format!(
            "{} of {domain} {what} indices are not assigned to any bucket",
            domain - covered
        )));
    }
    Ok(())
}
