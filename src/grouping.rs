//! Deterministic grouping helpers shared by group and cluster splitters.
//!
//! Groups are pure functions of the dataset and the injected [`Grouping`]:
//! same inputs => same groups in the same order.

use indexmap::IndexMap;

use crate::data::{Dataset, Item};
use crate::types::{GroupKey, ItemIndex};

/// Grouping provider (for example a scaffold function).
///
/// Items for which no key is returned form singleton groups.
pub trait Grouping: Send + Sync {
    /// Group of `item`, or `None` for a singleton.
    fn group_key(&self, item: &Item) -> Option<GroupKey>;
}

impl<F> Grouping for F
where
    F: Fn(&Item) -> Option<GroupKey> + Send + Sync,
{
    fn group_key(&self, item: &Item) -> Option<GroupKey> {
        self(item)
    }
}

/// Reads the precomputed `Item::group_key`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ItemGroupKey;

impl Grouping for ItemGroupKey {
    fn group_key(&self, item: &Item) -> Option<GroupKey> {
        item.group_key.clone()
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum GroupSlot {
    Keyed(GroupKey),
    Singleton(ItemIndex),
}

/// Collect item indices per group, groups in first-occurrence order.
pub fn group_indices(dataset: &Dataset, grouping: &dyn Grouping) -> Vec<Vec<ItemIndex>> {
    let mut groups: IndexMap<GroupSlot, Vec<ItemIndex>> = IndexMap::new();
    for (idx, item) in dataset.iter().enumerate() {
        let slot = match grouping.group_key(item) {
            Some(key) => GroupSlot::Keyed(key),
            None => GroupSlot::Singleton(idx),
        };
        groups.entry(slot).or_default().push(idx);
    }
    groups.into_values().collect()
}

/// Order groups by descending size; equal sizes keep their incoming order.
pub fn sort_largest_first(groups: &mut [Vec<ItemIndex>]) {
    groups.sort_by(|a, b| b.len().cmp(&a.len()));
}
