use crate::allocation::{allocate_counts, cut_runs};
use crate::data::Dataset;
use crate::errors::SplitError;
use crate::splits::SplitAssignment;
use crate::strategies::{SplitRequest, Splitter};
use crate::types::ItemIndex;

/// Contiguous runs in dataset order; seed-independent.
#[derive(Clone, Copy, Debug, Default)]
pub struct IndexSplitter;

impl Splitter for IndexSplitter {
    fn name(&self) -> &'static str {
        "index"
    }

    fn split(
        &self,
        dataset: &Dataset,
        request: &SplitRequest,
    ) -> Result<SplitAssignment, SplitError> {
        let fractions = request.validate(dataset)?;
        let order: Vec<ItemIndex> = (0..dataset.len()).collect();
        Ok(cut_runs(&order, &allocate_counts(dataset.len(), &fractions)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Item;
    use crate::splits::SplitFractions;

    #[test]
    fn keeps_dataset_order() {
        let data =
            Dataset::new((0..10).map(|idx| Item::new(format!("mol_{idx}"))).collect()).unwrap();
        let assignment = IndexSplitter
            .split(&data, &SplitRequest::new(SplitFractions::new(0.6, 0.2, 0.2), 99))
            .unwrap();
        assert_eq!(assignment.train, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(assignment.validation, vec![6, 7]);
        assert_eq!(assignment.test, vec![8, 9]);
    }
}
