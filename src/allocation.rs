//! Bucket sizing and filling shared by every item-dimension splitter.
//!
//! Sizes use largest-remainder rounding over train, validation, test, and the
//! implicit discard bucket, so the four sizes always sum to the item count.
//! Equal remainders go to the earlier bucket in canonical order.

use crate::constants::fractions::FRACTION_TOLERANCE;
use crate::errors::SplitError;
use crate::splits::{SplitAssignment, SplitFractions, SplitLabel};
use crate::types::ItemIndex;

const BUCKETS: usize = 4;
const DISCARD_SLOT: usize = 3;

/// Integer bucket sizes derived from fractions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BucketCounts {
    /// Items sent to train.
    pub train: usize,
    /// Items sent to validation.
    pub validation: usize,
    /// Items sent to test.
    pub test: usize,
    /// Items left out of every requested bucket.
    pub discard: usize,
}

impl BucketCounts {
    fn from_slots(slots: [usize; BUCKETS]) -> Self {
        Self {
            train: slots[0],
            validation: slots[1],
            test: slots[2],
            discard: slots[DISCARD_SLOT],
        }
    }

    fn slots(&self) -> [usize; BUCKETS] {
        [self.train, self.validation, self.test, self.discard]
    }

    /// Size of one requested bucket.
    pub fn get(&self, label: SplitLabel) -> usize {
        self.slots()[label.position()]
    }

    /// Items placed in train, validation, or test.
    pub fn assigned(&self) -> usize {
        self.train + self.validation + self.test
    }

    /// Every item, discard included.
    pub fn total(&self) -> usize {
        self.assigned() + self.discard
    }
}

/// Split `total` items into bucket sizes proportional to `fractions`.
pub fn allocate_counts(total: usize, fractions: &SplitFractions) -> BucketCounts {
    let discard = fractions.discard();
    let shares = [
        fractions.train,
        fractions.validation,
        fractions.test,
        if discard <= FRACTION_TOLERANCE {
            0.0
        } else {
            discard
        },
    ];
    let share_sum: f64 = shares.iter().sum();
    if total == 0 || share_sum <= 0.0 {
        return BucketCounts::default();
    }

    let mut slots = [0usize; BUCKETS];
    let mut remainders = [0.0f64; BUCKETS];
    for (slot, share) in shares.iter().enumerate() {
        // Renormalize so a sum within tolerance of 1.0 still covers `total`.
        let quota = total as f64 * share / share_sum;
        let floor = quota.floor();
        slots[slot] = floor as usize;
        remainders[slot] = quota - floor;
    }

    let placed: usize = slots.iter().sum();
    let mut order: Vec<usize> = (0..BUCKETS).filter(|&slot| shares[slot] > 0.0).collect();
    order.sort_by(|&a, &b| remainders[b].total_cmp(&remainders[a]).then(a.cmp(&b)));
    for slot in order.into_iter().cycle().take(total.saturating_sub(placed)) {
        slots[slot] += 1;
    }
    BucketCounts::from_slots(slots)
}

/// Like [`allocate_counts`], but every bucket with a non-zero fraction gets
/// at least one item, borrowed from the largest bucket.
///
/// Fails when `total` is smaller than the number of required buckets.
pub fn allocate_required_counts(
    total: usize,
    fractions: &SplitFractions,
    what: &str,
) -> Result<BucketCounts, SplitError> {
    let required = fractions.required_buckets();
    if total < required.len() {
        return Err(SplitError::insufficient(format!(
            "{what} has {total} items but {} buckets need at least one each",
            required.len()
        )));
    }
    let mut slots = allocate_counts(total, fractions).slots();
    for label in required {
        let slot = label.position();
        if slots[slot] > 0 {
            continue;
        }
        let donor = (0..BUCKETS)
            .filter(|&candidate| candidate != slot)
            .filter(|&candidate| candidate == DISCARD_SLOT || slots[candidate] > 1)
            .filter(|&candidate| slots[candidate] > 0)
            .max_by(|&a, &b| slots[a].cmp(&slots[b]).then(b.cmp(&a)));
        let Some(donor) = donor else {
            return Err(SplitError::insufficient(format!(
                "{what} cannot populate the {label} bucket"
            )));
        };
        slots[donor] -= 1;
        slots[slot] += 1;
    }
    Ok(BucketCounts::from_slots(slots))
}

/// Cut `order` into contiguous runs sized by `counts`.
pub fn cut_runs(order: &[ItemIndex], counts: &BucketCounts) -> SplitAssignment {
    let mut rest = order;
    let mut buckets: [Vec<ItemIndex>; BUCKETS] = Default::default();
    for (bucket, size) in buckets.iter_mut().zip(counts.slots()) {
        let take = size.min(rest.len());
        let (head, tail) = rest.split_at(take);
        bucket.extend_from_slice(head);
        rest = tail;
    }
    let [train, validation, test, mut discarded] = buckets;
    discarded.extend_from_slice(rest);
    SplitAssignment::from_buckets([train, validation, test], discarded)
}

/// Place whole groups greedily by cumulative cutoffs, in the given group order.
///
/// A group lands in the first of train, validation, test whose cumulative
/// target still holds it: items already placed in buckets `0..=b` plus the
/// group stay within the summed targets of `0..=b`. A group that fits
/// nowhere goes to discard once every requested bucket has reached its
/// target and discard has room left; otherwise it goes to the last requested
/// bucket with a non-zero target. Groups are never split.
pub fn fill_groups(groups: &[Vec<ItemIndex>], counts: &BucketCounts) -> SplitAssignment {
    let targets = counts.slots();
    let mut cumulative_targets = [0usize; DISCARD_SLOT];
    let mut running = 0usize;
    for (slot, target) in targets[..DISCARD_SLOT].iter().enumerate() {
        running += target;
        cumulative_targets[slot] = running;
    }
    let fallback = (0..DISCARD_SLOT)
        .rev()
        .find(|&slot| targets[slot] > 0)
        .unwrap_or(0);

    let mut buckets: [Vec<ItemIndex>; BUCKETS] = Default::default();
    for group in groups {
        let size = group.len();
        let mut placed_before = 0usize;
        let mut chosen = None;
        for slot in 0..DISCARD_SLOT {
            placed_before += buckets[slot].len();
            if placed_before + size <= cumulative_targets[slot] {
                chosen = Some(slot);
                break;
            }
        }
        let chosen = chosen.unwrap_or_else(|| {
            let requested_full = (0..DISCARD_SLOT).all(|slot| buckets[slot].len() >= targets[slot]);
            if requested_full && buckets[DISCARD_SLOT].len() < targets[DISCARD_SLOT] {
                DISCARD_SLOT
            } else {
                fallback
            }
        });
        buckets[chosen].extend_from_slice(group);
    }
    let [train, validation, test, discarded] = buckets;
    SplitAssignment::from_buckets([train, validation, test], discarded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_sum_to_total_with_largest_remainder() {
        let counts = allocate_counts(10, &SplitFractions::new(0.34, 0.33, 0.33));
        assert_eq!(counts.total(), 10);
        assert_eq!((counts.train, counts.validation, counts.test), (4, 3, 3));

        let counts = allocate_counts(7, &SplitFractions::default());
        assert_eq!(counts.total(), 7);
        // 5.6 / 0.7 / 0.7: the two 0.7 remainders win the leftover items.
        assert_eq!((counts.train, counts.validation, counts.test), (5, 1, 1));
    }

    #[test]
    fn equal_remainders_prefer_earlier_buckets() {
        let counts = allocate_counts(4, &SplitFractions::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0));
        assert_eq!((counts.train, counts.validation, counts.test), (2, 1, 1));
    }

    #[test]
    fn discard_takes_the_unassigned_share() {
        let counts = allocate_counts(10, &SplitFractions::new(0.5, 0.2, 0.1));
        assert_eq!(counts, BucketCounts {
            train: 5,
            validation: 2,
            test: 1,
            discard: 2
        });
    }

    #[test]
    fn required_counts_borrow_from_the_largest_bucket() {
        let counts = allocate_required_counts(3, &SplitFractions::default(), "class").unwrap();
        assert_eq!((counts.train, counts.validation, counts.test), (1, 1, 1));

        let err = allocate_required_counts(2, &SplitFractions::default(), "class").unwrap_err();
        assert!(matches!(err, SplitError::InsufficientData(_)));

        let counts =
            allocate_required_counts(2, &SplitFractions::new(0.9, 0.1, 0.0), "class").unwrap();
        assert_eq!((counts.train, counts.validation, counts.test), (1, 1, 0));
    }

    #[test]
    fn cut_runs_preserves_order() {
        let order = vec![4, 2, 0, 1, 3];
        let counts = BucketCounts {
            train: 2,
            validation: 1,
            test: 1,
            discard: 1,
        };
        let assignment = cut_runs(&order, &counts);
        assert_eq!(assignment.train, vec![4, 2]);
        assert_eq!(assignment.validation, vec![0]);
        assert_eq!(assignment.test, vec![1]);
        assert_eq!(assignment.discarded, vec![3]);
    }

    #[test]
    fn fill_groups_backfills_earlier_buckets() {
        let sizes = [40usize, 30, 20, 5, 5];
        let mut next = 0;
        let groups: Vec<Vec<ItemIndex>> = sizes
            .iter()
            .map(|&size| {
                let group = (next..next + size).collect();
                next += size;
                group
            })
            .collect();
        let counts = allocate_counts(100, &SplitFractions::default());
        let assignment = fill_groups(&groups, &counts);
        assignment.validate(100).unwrap();
        assert_eq!(assignment.train.len(), 80);
        assert_eq!(assignment.validation.len(), 20);
        assert!(assignment.test.is_empty());
    }

    #[test]
    fn fill_groups_overflow_goes_to_last_non_empty_target() {
        let groups = vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]];
        let counts = BucketCounts {
            train: 2,
            validation: 3,
            test: 1,
            discard: 0,
        };
        let assignment = fill_groups(&groups, &counts);
        assert!(assignment.train.is_empty());
        assert_eq!(assignment.validation, vec![0, 1, 2, 3]);
        assert_eq!(assignment.test, vec![4, 5, 6, 7]);
        assert!(assignment.discarded.is_empty());
    }

    #[test]
    fn fill_groups_with_discard_share_favors_requested_buckets() {
        let counts = allocate_counts(10, &SplitFractions::new(0.6, 0.2, 0.1));
        assert_eq!(counts.discard, 1);
        let overflowing: Vec<Vec<ItemIndex>> = vec![(0..6).collect(), (6..10).collect()];
        let assignment = fill_groups(&overflowing, &counts);
        assignment.validate(10).unwrap();
        assert_eq!(assignment.train, (0..6).collect::<Vec<_>>());
        assert_eq!(assignment.test, (6..10).collect::<Vec<_>>());
        assert!(assignment.discarded.is_empty());

        let exact: Vec<Vec<ItemIndex>> = vec![(0..6).collect(), vec![6, 7], vec![8], vec![9]];
        let assignment = fill_groups(&exact, &counts);
        assert_eq!(assignment.validation, vec![6, 7]);
        assert_eq!(assignment.test, vec![8]);
        assert_eq!(assignment.discarded, vec![9]);
    }
}
