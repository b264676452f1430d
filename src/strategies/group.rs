use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::allocation::{allocate_counts, fill_groups};
use crate::constants::splits::ALL_SPLITS;
use crate::data::Dataset;
use crate::errors::SplitError;
use crate::grouping::{Grouping, ItemGroupKey, group_indices, sort_largest_first};
use crate::splits::{SplitAssignment, SplitFractions};
use crate::strategies::{SplitRequest, Splitter};
use crate::types::ItemIndex;

/// Order in which whole groups are offered to the bucket fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupOrder {
    /// Descending size, ties by first occurrence (scaffold splitting).
    LargestFirst,
    /// Seeded random permutation of groups.
    Shuffled,
}

/// Keeps every group in a single bucket.
///
/// Bucket sizes approximate the requested fractions; the error is bounded by
/// the size of the group that crossed a cutoff.
#[derive(Clone)]
pub struct GroupSplitter {
    grouping: Arc<dyn Grouping>,
    order: GroupOrder,
}

impl fmt::Debug for GroupSplitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupSplitter")
            .field("order", &self.order)
            .finish()
    }
}

impl GroupSplitter {
    /// Scaffold-style split over `Item::group_key`, largest groups first.
    pub fn scaffold() -> Self {
        Self {
            grouping: Arc::new(ItemGroupKey),
            order: GroupOrder::LargestFirst,
        }
    }

    /// Random group split over `Item::group_key`.
    pub fn random_groups() -> Self {
        Self {
            grouping: Arc::new(ItemGroupKey),
            order: GroupOrder::Shuffled,
        }
    }

    /// Replace the grouping provider (for example a scaffold function).
    pub fn with_grouping(mut self, grouping: impl Grouping + 'static) -> Self {
        self.grouping = Arc::new(grouping);
        self
    }

    /// How groups are ordered before filling.
    pub fn order(&self) -> GroupOrder {
        self.order
    }
}

impl Splitter for GroupSplitter {
    fn name(&self) -> &'static str {
        match self.order {
            GroupOrder::LargestFirst => "scaffold",
            GroupOrder::Shuffled => "random_group",
        }
    }

    fn split(
        &self,
        dataset: &Dataset,
        request: &SplitRequest,
    ) -> Result<SplitAssignment, SplitError> {
        let fractions = request.validate(dataset)?;
        let mut groups = group_indices(dataset, self.grouping.as_ref());
        match self.order {
            GroupOrder::LargestFirst => sort_largest_first(&mut groups),
            GroupOrder::Shuffled => {
                let mut rng = StdRng::seed_from_u64(request.seed);
                groups.shuffle(&mut rng);
            }
        }
        debug!(
            groups = groups.len(),
            largest = groups.iter().map(Vec::len).max().unwrap_or(0),
            "filling buckets with whole groups"
        );
        Ok(fill_whole_groups(&groups, dataset.len(), &fractions))
    }
}

/// Shared by group and cluster splitters: fill and report starved buckets.
pub(crate) fn fill_whole_groups(
    groups: &[Vec<ItemIndex>],
    total: usize,
    fractions: &SplitFractions,
) -> SplitAssignment {
    let counts = allocate_counts(total, fractions);
    let assignment = fill_groups(groups, &counts);
    for label in ALL_SPLITS {
        if fractions.get(label) > 0.0 && assignment.indices(label).is_empty() {
            warn!(
                bucket = %label,
                target = counts.get(label),
                "group boundaries left a requested bucket empty"
            );
        }
    }
    assignment
}
