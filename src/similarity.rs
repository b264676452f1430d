//! Injectable pairwise similarity and the parallel neighbor scan built on it.
//!
//! Splitters never compute fingerprints themselves; they ask a [`Similarity`]
//! for scores between two items. Any `Fn(&Item, &Item) -> f64` closure works.

use rayon::prelude::*;

use crate::data::{Dataset, Item};
use crate::errors::SplitError;
use crate::types::ItemIndex;

/// Pairwise similarity provider.
///
/// `similarity` should return a value in `[0, 1]` and be symmetric.
pub trait Similarity: Send + Sync {
    /// Similarity in `[0, 1]`; fails when an item lacks what the provider reads.
    fn similarity(&self, a: &Item, b: &Item) -> Result<f64, SplitError>;

    /// Distance used by farthest-point sampling. Defaults to `1 - similarity`.
    fn distance(&self, a: &Item, b: &Item) -> Result<f64, SplitError> {
        Ok(1.0 - self.similarity(a, b)?)
    }
}

impl<F> Similarity for F
where
    F: Fn(&Item, &Item) -> f64 + Send + Sync,
{
    fn similarity(&self, a: &Item, b: &Item) -> Result<f64, SplitError> {
        Ok(self(a, b))
    }
}

/// Tanimoto (Jaccard on bit vectors) similarity over `feature_vector`.
///
/// Continuous vectors use the generalized form `a·b / (|a|² + |b|² - a·b)`.
/// Two all-zero vectors are treated as identical.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tanimoto;

impl Similarity for Tanimoto {
    fn similarity(&self, a: &Item, b: &Item) -> Result<f64, SplitError> {
        let (left, right) = paired_features(a, b)?;
        let mut dot = 0.0;
        let mut left_sq = 0.0;
        let mut right_sq = 0.0;
        for (x, y) in left.iter().zip(right) {
            dot += x * y;
            left_sq += x * x;
            right_sq += y * y;
        }
        let denominator = left_sq + right_sq - dot;
        if denominator <= 0.0 {
            return Ok(1.0);
        }
        Ok(dot / denominator)
    }
}

/// Euclidean geometry over `feature_vector`.
///
/// Distance is the L2 norm of the difference; similarity is `1 / (1 + d)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Euclidean;

impl Similarity for Euclidean {
    fn similarity(&self, a: &Item, b: &Item) -> Result<f64, SplitError> {
        Ok(1.0 / (1.0 + self.distance(a, b)?))
    }

    fn distance(&self, a: &Item, b: &Item) -> Result<f64, SplitError> {
        let (left, right) = paired_features(a, b)?;
        Ok(left
            .iter()
            .zip(right)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt())
    }
}

fn features(item: &Item) -> Result<&[f64], SplitError> {
    item.feature_vector.as_deref().ok_or_else(|| {
        SplitError::config(format!("item '{}' has no feature vector", item.id))
    })
}

fn paired_features<'a>(a: &'a Item, b: &'a Item) -> Result<(&'a [f64], &'a [f64]), SplitError> {
    let left = features(a)?;
    let right = features(b)?;
    if left.len() != right.len() {
        return Err(SplitError::config(format!(
            "feature vectors differ in length ('{}' has {}, '{}' has {})",
            a.id,
            left.len(),
            b.id,
            right.len()
        )));
    }
    Ok((left, right))
}

/// For every item, the other items whose similarity is at least `threshold`.
///
/// Cost is O(n²) similarity calls; rows are computed in parallel and returned
/// in item order, each row sorted ascending.
pub fn neighbor_lists(
    dataset: &Dataset,
    similarity: &dyn Similarity,
    threshold: f64,
) -> Result<Vec<Vec<ItemIndex>>, SplitError> {
    let items = dataset.items();
    (0..items.len())
        .into_par_iter()
        .map(|i| {
            let mut row = Vec::new();
            for (j, other) in items.iter().enumerate() {
                if i != j && similarity.similarity(&items[i], other)? >= threshold {
                    row.push(j);
                }
            }
            Ok::<_, SplitError>(row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(id: &str, values: &[f64]) -> Item {
        Item::new(id).with_features(values.iter().copied())
    }

    #[test]
    fn tanimoto_matches_jaccard_on_bits() {
        let a = bits("a", &[1.0, 1.0, 0.0, 1.0]);
        let b = bits("b", &[1.0, 0.0, 0.0, 1.0]);
        let score = Tanimoto.similarity(&a, &b).unwrap();
        assert!((score - 2.0 / 3.0).abs() < 1e-12);
        assert!((Tanimoto.distance(&a, &b).unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(Tanimoto.similarity(&a, &a).unwrap(), 1.0);

        let zero = bits("z", &[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(Tanimoto.similarity(&zero, &zero).unwrap(), 1.0);
        assert_eq!(Tanimoto.similarity(&zero, &a).unwrap(), 0.0);
    }

    #[test]
    fn missing_or_mismatched_features_are_configuration_errors() {
        let a = bits("a", &[1.0, 0.0]);
        let b = bits("b", &[1.0]);
        assert!(matches!(
            Tanimoto.similarity(&a, &b),
            Err(SplitError::InvalidConfiguration(_))
        ));
        assert!(Euclidean.distance(&a, &Item::new("c")).is_err());
    }

    #[test]
    fn euclidean_distance_is_l2() {
        let a = bits("a", &[0.0, 0.0]);
        let b = bits("b", &[3.0, 4.0]);
        assert_eq!(Euclidean.distance(&a, &b).unwrap(), 5.0);
        assert!((Euclidean.similarity(&a, &b).unwrap() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn closures_act_as_providers() {
        let by_attribute = |a: &Item, b: &Item| {
            let left = a.numeric_attribute.unwrap_or_default();
            let right = b.numeric_attribute.unwrap_or_default();
            1.0 / (1.0 + (left - right).abs())
        };
        let dataset = Dataset::new(vec![
            Item::new("a").with_numeric_attribute(0.0),
            Item::new("b").with_numeric_attribute(0.5),
            Item::new("c").with_numeric_attribute(9.0),
        ])
        .unwrap();
        let rows = neighbor_lists(&dataset, &by_attribute, 0.5).unwrap();
        assert_eq!(rows, vec![vec![1], vec![0], vec![]]);
    }
}
