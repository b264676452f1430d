use crate::data::Dataset;
use crate::errors::SplitError;
use crate::splits::{SplitAssignment, SplitLabel};
use crate::strategies::{SplitRequest, Splitter, require_items};
use crate::types::ItemIndex;

/// Where items missing from every caller-supplied list end up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnlistedItems {
    /// Left out of every bucket.
    #[default]
    Discard,
    /// Appended to train in dataset order.
    Train,
}

/// Returns a caller-supplied assignment after validating it.
///
/// Fractions and seed are ignored.
#[derive(Clone, Debug, Default)]
pub struct SpecifiedSplitter {
    train: Vec<ItemIndex>,
    validation: Vec<ItemIndex>,
    test: Vec<ItemIndex>,
    unlisted: UnlistedItems,
}

impl SpecifiedSplitter {
    /// Unlisted items are discarded unless [`SpecifiedSplitter::with_unlisted`] says otherwise.
    pub fn new(train: Vec<ItemIndex>, validation: Vec<ItemIndex>, test: Vec<ItemIndex>) -> Self {
        Self {
            train,
            validation,
            test,
            unlisted: UnlistedItems::Discard,
        }
    }

    /// Send unlisted items to train instead of discarding them.
    pub fn with_unlisted(mut self, unlisted: UnlistedItems) -> Self {
        self.unlisted = unlisted;
        self
    }

    fn listed(&self, label: SplitLabel) -> &[ItemIndex] {
        match label {
            SplitLabel::Train => &self.train,
            SplitLabel::Validation => &self.validation,
            SplitLabel::Test => &self.test,
        }
    }
}

impl Splitter for SpecifiedSplitter {
    fn name(&self) -> &'static str {
        "specified"
    }

    fn supports_k_fold(&self) -> bool {
        false
    }

    fn split(
        &self,
        dataset: &Dataset,
        _request: &SplitRequest,
    ) -> Result<SplitAssignment, SplitError> {
        require_items(dataset)?;
        let mut owner: Vec<Option<SplitLabel>> = vec![None; dataset.len()];
        for label in [SplitLabel::Train, SplitLabel::Validation, SplitLabel::Test] {
            for &idx in self.listed(label) {
                let Some(slot) = owner.get_mut(idx) else {
                    return Err(SplitError::config(format!(
                        "{label} index {idx} is out of range for a dataset of {} items",
                        dataset.len()
                    )));
                };
                if let Some(previous) = slot {
                    return Err(SplitError::config(format!(
                        "index {idx} is listed in both {previous} and {label}"
                    )));
                }
                *slot = Some(label);
            }
        }

        let unlisted: Vec<ItemIndex> = (0..dataset.len())
            .filter(|&idx| owner[idx].is_none())
            .collect();
        let mut train = self.train.clone();
        let mut discarded = Vec::new();
        match self.unlisted {
            UnlistedItems::Discard => discarded = unlisted,
            UnlistedItems::Train => train.extend(unlisted),
        }
        Ok(SplitAssignment::from_buckets(
            [train, self.validation.clone(), self.test.clone()],
            discarded,
        ))
    }
}
