use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::SplitError;
pub use crate::types::{GroupKey, ItemId, ItemIndex, Label, TaskIndex};

/// One dataset record (for example a compound with its assay labels).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier, unique within a dataset.
    pub id: ItemId,
    /// Per-task label values in task order; `None` marks a missing value.
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Opaque grouping key (for example a scaffold) used by group splitting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_key: Option<GroupKey>,
    /// Fixed-length bit or numeric vector used for similarity computation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_vector: Option<Vec<f64>>,
    /// Scalar used by ordered splitting (for example molecular weight).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_attribute: Option<f64>,
}

impl Item {
    /// Create an item with no labels or attributes.
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            labels: Vec::new(),
            group_key: None,
            feature_vector: None,
            numeric_attribute: None,
        }
    }

    /// Attach fully observed label values.
    pub fn with_labels<I>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        self.labels = labels.into_iter().map(Some).collect();
        self
    }

    /// Attach label values where some tasks may be missing.
    pub fn with_sparse_labels<I>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = Label>,
    {
        self.labels = labels.into_iter().collect();
        self
    }

    /// Precomputed group (for example a scaffold SMILES).
    pub fn with_group_key(mut self, key: impl Into<GroupKey>) -> Self {
        self.group_key = Some(key.into());
        self
    }

    /// Feature vector used by similarity providers.
    pub fn with_features<I>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        self.feature_vector = Some(features.into_iter().collect());
        self
    }

    /// Value ordered by the numeric splitter.
    pub fn with_numeric_attribute(mut self, value: f64) -> Self {
        self.numeric_attribute = Some(value);
        self
    }

    /// Label for `task`, or `None` when missing or out of range.
    pub fn label(&self, task: TaskIndex) -> Label {
        self.labels.get(task).copied().flatten()
    }

    /// Whether the label for `task` is present and strictly above `threshold`.
    pub fn is_positive(&self, task: TaskIndex, threshold: f64) -> bool {
        self.label(task).is_some_and(|value| value > threshold)
    }

    /// Whether any task label is present and strictly above `threshold`.
    pub fn any_positive(&self, threshold: f64) -> bool {
        self.labels
            .iter()
            .flatten()
            .any(|value| *value > threshold)
    }
}

/// Ordered collection of items sharing one task count.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Item>", into = "Vec<Item>")]
pub struct Dataset {
    items: Vec<Item>,
    n_tasks: usize,
}

impl Dataset {
    /// Build a dataset, rejecting duplicate ids and ragged label vectors.
    pub fn new(items: Vec<Item>) -> Result<Self, SplitError> {
        let n_tasks = items.first().map(|item| item.labels.len()).unwrap_or(0);
        let mut seen: HashSet<&str> = HashSet::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            if !seen.insert(item.id.as_str()) {
                return Err(SplitError::config(format!(
                    "duplicate item id '{}' at index {idx}",
                    item.id
                )));
            }
            if item.labels.len() != n_tasks {
                return Err(SplitError::config(format!(
                    "item '{}' has {} labels but the dataset has {n_tasks} tasks",
                    item.id,
                    item.labels.len()
                )));
            }
        }
        Ok(Self { items, n_tasks })
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the dataset has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of label columns shared by every item.
    pub fn n_tasks(&self) -> usize {
        self.n_tasks
    }

    /// Items in dataset order; positions are item indices.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Item at `idx`.
    pub fn get(&self, idx: ItemIndex) -> Option<&Item> {
        self.items.get(idx)
    }

    /// Items in dataset order.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// New dataset holding clones of the items at `indices`, in that order.
    pub fn subset(&self, indices: &[ItemIndex]) -> Result<Self, SplitError> {
        let mut items = Vec::with_capacity(indices.len());
        for &idx in indices {
            let item = self.items.get(idx).ok_or_else(|| {
                SplitError::config(format!(
                    "index {idx} is out of range for a dataset of {} items",
                    self.items.len()
                ))
            })?;
            items.push(item.clone());
        }
        Self::new(items)
    }

    /// New dataset with every item but only the label columns in `tasks`.
    pub fn select_tasks(&self, tasks: &[TaskIndex]) -> Result<Self, SplitError> {
        if let Some(&bad) = tasks.iter().find(|&&task| task >= self.n_tasks) {
            return Err(SplitError::config(format!(
                "task index {bad} is out of range for a dataset with {} tasks",
                self.n_tasks
            )));
        }
        let items = self
            .items
            .iter()
            .map(|item| Item {
                labels: tasks.iter().map(|&task| item.labels[task]).collect(),
                ..item.clone()
            })
            .collect();
        Ok(Self {
            items,
            n_tasks: tasks.len(),
        })
    }
}

impl TryFrom<Vec<Item>> for Dataset {
    type Error = SplitError;

    fn try_from(items: Vec<Item>) -> Result<Self, Self::Error> {
        Self::new(items)
    }
}

impl From<Dataset> for Vec<Item> {
    fn from(dataset: Dataset) -> Self {
        dataset.items
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_ids() {
        let err = Dataset::new(vec![Item::new("a"), Item::new("a")]).unwrap_err();
        assert!(
            matches!(err, SplitError::InvalidConfiguration(ref msg) if msg.contains("duplicate"))
        );
    }

    #[test]
    fn rejects_ragged_labels() {
        let err = Dataset::new(vec![
            Item::new("a").with_labels([1.0, 0.0]),
            Item::new("b").with_labels([1.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, SplitError::InvalidConfiguration(ref msg) if msg.contains("tasks")));
    }

    #[test]
    fn missing_labels_are_never_positive() {
        let item = Item::new("a").with_sparse_labels([None, Some(2.0)]);
        assert!(!item.is_positive(0, 0.0));
        assert!(item.is_positive(1, 0.0));
        assert!(!item.is_positive(7, 0.0));
        assert!(item.any_positive(1.5));
        assert!(!item.any_positive(2.0));
    }

    #[test]
    fn select_tasks_keeps_items_and_drops_columns() {
        let dataset = Dataset::new(vec![
            Item::new("a").with_labels([1.0, 2.0, 3.0]),
            Item::new("b").with_sparse_labels([None, Some(5.0), Some(6.0)]),
        ])
        .unwrap();
        let narrowed = dataset.select_tasks(&[2, 0]).unwrap();
        assert_eq!(narrowed.len(), 2);
        assert_eq!(narrowed.n_tasks(), 2);
        assert_eq!(narrowed.items()[0].labels, vec![Some(3.0), Some(1.0)]);
        assert_eq!(narrowed.items()[1].labels, vec![Some(6.0), None]);
        assert!(dataset.select_tasks(&[3]).is_err());
    }

    #[test]
    fn json_round_trip_revalidates() {
        let raw = r#"[{"id":"a","labels":[1.0]},{"id":"a","labels":[0.0]}]"#;
        assert!(serde_json::from_str::<Dataset>(raw).is_err());

        let raw = r#"[{"id":"a","labels":[1.0,null],"group_key":"c1ccccc1"}]"#;
        let dataset: Dataset = serde_json::from_str(raw).unwrap();
        assert_eq!(dataset.n_tasks(), 2);
        assert_eq!(dataset.items()[0].group_key.as_deref(), Some("c1ccccc1"));
    }
}
