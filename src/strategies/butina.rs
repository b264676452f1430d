use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::constants::clustering::DEFAULT_SIMILARITY_THRESHOLD;
use crate::data::Dataset;
use crate::errors::SplitError;
use crate::grouping::sort_largest_first;
use crate::similarity::{Similarity, Tanimoto, neighbor_lists};
use crate::splits::SplitAssignment;
use crate::strategies::group::fill_whole_groups;
use crate::strategies::{SplitRequest, Splitter};
use crate::types::ItemIndex;

/// Butina (sphere exclusion) clustering followed by whole-cluster fill.
///
/// Building the neighbor lists costs O(n²) similarity calls, so this
/// strategy is meant for small and medium datasets.
#[derive(Clone)]
pub struct ButinaSplitter {
    threshold: f64,
    similarity: Arc<dyn Similarity>,
}

impl fmt::Debug for ButinaSplitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButinaSplitter")
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl Default for ButinaSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl ButinaSplitter {
    /// Tanimoto clustering where pairs with similarity `>= threshold` are neighbors.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            similarity: Arc::new(Tanimoto),
        }
    }

    /// Replace the default Tanimoto similarity.
    pub fn with_similarity(mut self, similarity: impl Similarity + 'static) -> Self {
        self.similarity = Arc::new(similarity);
        self
    }

    /// Neighbor similarity cutoff.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Cluster `dataset`; clusters come back in creation order.
    ///
    /// Items are visited by descending neighbor count (ties by index). An
    /// unclustered item opens a cluster and absorbs its unclustered
    /// neighbors; neighbor counts are not recomputed as items are absorbed.
    pub fn clusters(&self, dataset: &Dataset) -> Result<Vec<Vec<ItemIndex>>, SplitError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(SplitError::config(format!(
                "similarity threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        let neighbors = neighbor_lists(dataset, self.similarity.as_ref(), self.threshold)?;

        let mut visit: Vec<ItemIndex> = (0..dataset.len()).collect();
        visit.sort_by(|&a, &b| neighbors[b].len().cmp(&neighbors[a].len()));

        let mut clustered = vec![false; dataset.len()];
        let mut clusters = Vec::new();
        for center in visit {
            if clustered[center] {
                continue;
            }
            clustered[center] = true;
            let mut cluster = vec![center];
            for &neighbor in &neighbors[center] {
                if !clustered[neighbor] {
                    clustered[neighbor] = true;
                    cluster.push(neighbor);
                }
            }
            clusters.push(cluster);
        }
        Ok(clusters)
    }
}

impl Splitter for ButinaSplitter {
    fn name(&self) -> &'static str {
        "butina"
    }

    fn split(
        &self,
        dataset: &Dataset,
        request: &SplitRequest,
    ) -> Result<SplitAssignment, SplitError> {
        let fractions = request.validate(dataset)?;
        let mut clusters = self.clusters(dataset)?;
        sort_largest_first(&mut clusters);
        debug!(
            clusters = clusters.len(),
            threshold = self.threshold,
            "butina clustering complete"
        );
        Ok(fill_whole_groups(&clusters, dataset.len(), &fractions))
    }
}
