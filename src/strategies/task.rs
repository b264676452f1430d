use tracing::debug;

use crate::allocation::{allocate_counts, cut_runs};
use crate::data::Dataset;
use crate::errors::SplitError;
use crate::splits::TaskAssignment;
use crate::strategies::SplitRequest;
use crate::types::TaskIndex;

/// Partitions label columns rather than items.
///
/// Tasks are cut into contiguous runs in task order, so the result does not
/// depend on the seed. Every bucket materializes to a dataset holding all
/// items and only that bucket's label columns.
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskSplitter;

impl TaskSplitter {
    /// Strategy name.
    pub fn name(&self) -> &'static str {
        "task"
    }

    /// Partition `0..dataset.n_tasks()` according to `request.fractions`.
    pub fn split_tasks(
        &self,
        dataset: &Dataset,
        request: &SplitRequest,
    ) -> Result<TaskAssignment, SplitError> {
        let fractions = request.validate(dataset)?;
        let n_tasks = dataset.n_tasks();
        if n_tasks == 0 {
            return Err(SplitError::insufficient(
                "task-wise splitting needs at least one label column",
            ));
        }
        let order: Vec<TaskIndex> = (0..n_tasks).collect();
        let counts = allocate_counts(n_tasks, &fractions);
        let runs = cut_runs(&order, &counts);
        debug!(
            tasks = n_tasks,
            train = runs.train.len(),
            validation = runs.validation.len(),
            test = runs.test.len(),
            "task columns partitioned"
        );
        Ok(TaskAssignment {
            train: runs.train,
            validation: runs.validation,
            test: runs.test,
            discarded: runs.discarded,
        })
    }
}
