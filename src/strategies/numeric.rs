use crate::allocation::{allocate_counts, cut_runs};
use crate::data::Dataset;
use crate::errors::SplitError;
use crate::splits::SplitAssignment;
use crate::strategies::{SplitRequest, Splitter};
use crate::types::ItemIndex;

/// Ascending `numeric_attribute` order cut into contiguous runs.
///
/// With the default fractions the lightest items train and the heaviest are
/// tested. Seed-independent; equal values keep dataset order.
#[derive(Clone, Copy, Debug, Default)]
pub struct NumericOrderSplitter;

impl Splitter for NumericOrderSplitter {
    fn name(&self) -> &'static str {
        "numeric_order"
    }

    fn split(
        &self,
        dataset: &Dataset,
        request: &SplitRequest,
    ) -> Result<SplitAssignment, SplitError> {
        let fractions = request.validate(dataset)?;
        let mut keyed: Vec<(f64, ItemIndex)> = Vec::with_capacity(dataset.len());
        for (idx, item) in dataset.iter().enumerate() {
            match item.numeric_attribute {
                Some(value) if !value.is_nan() => keyed.push((value, idx)),
                Some(_) => {
                    return Err(SplitError::config(format!(
                        "item '{}' has a NaN numeric attribute",
                        item.id
                    )));
                }
                None => {
                    return Err(SplitError::config(format!(
                        "item '{}' has no numeric attribute",
                        item.id
                    )));
                }
            }
        }
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        let order: Vec<ItemIndex> = keyed.into_iter().map(|(_, idx)| idx).collect();
        Ok(cut_runs(&order, &allocate_counts(dataset.len(), &fractions)))
    }
}
