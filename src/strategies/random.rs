use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::allocation::{allocate_counts, cut_runs};
use crate::data::Dataset;
use crate::errors::SplitError;
use crate::splits::SplitAssignment;
use crate::strategies::{SplitRequest, Splitter};
use crate::types::ItemIndex;

/// Seeded random permutation cut into contiguous runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomSplitter;

impl Splitter for RandomSplitter {
    fn name(&self) -> &'static str {
        "random"
    }

    fn split(
        &self,
        dataset: &Dataset,
        request: &SplitRequest,
    ) -> Result<SplitAssignment, SplitError> {
        let fractions = request.validate(dataset)?;
        let order = shuffled_indices(dataset.len(), request.seed);
        Ok(cut_runs(&order, &allocate_counts(dataset.len(), &fractions)))
    }
}

/// `0..len` permuted by a `StdRng` seeded from `seed`.
pub(crate) fn shuffled_indices(len: usize, seed: u64) -> Vec<ItemIndex> {
    let mut order: Vec<ItemIndex> = (0..len).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Item;
    use crate::splits::SplitFractions;

    fn dataset(n: usize) -> Dataset {
        Dataset::new((0..n).map(|idx| Item::new(format!("mol_{idx}"))).collect()).unwrap()
    }

    #[test]
    fn same_seed_same_assignment() {
        let data = dataset(50);
        let request = SplitRequest::new(SplitFractions::default(), 9);
        let first = RandomSplitter.split(&data, &request).unwrap();
        let second = RandomSplitter.split(&data, &request).unwrap();
        assert_eq!(first, second);
        first.validate(50).unwrap();
        assert_eq!(
            (first.train.len(), first.validation.len(), first.test.len()),
            (40, 5, 5)
        );
    }

    #[test]
    fn different_seeds_differ() {
        let data = dataset(40);
        let a = RandomSplitter
            .split(&data, &SplitRequest::new(SplitFractions::default(), 1))
            .unwrap();
        let b = RandomSplitter
            .split(&data, &SplitRequest::new(SplitFractions::default(), 2))
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn remainder_is_discarded() {
        let data = dataset(20);
        let request = SplitRequest::new(SplitFractions::new(0.5, 0.25, 0.0), 4);
        let assignment = RandomSplitter.split(&data, &request).unwrap();
        assignment.validate(20).unwrap();
        assert_eq!(assignment.train.len(), 10);
        assert_eq!(assignment.validation.len(), 5);
        assert!(assignment.test.is_empty());
        assert_eq!(assignment.discarded.len(), 5);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut order = shuffled_indices(17, 5);
        order.sort_unstable();
        assert_eq!(order, (0..17).collect::<Vec<_>>());
    }
}
