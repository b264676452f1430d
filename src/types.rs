/// Stable item identifier (unique within a dataset).
/// Example: `CHEMBL25`, `mol_000183`
pub type ItemId = String;
/// Opaque grouping key supplied by a grouping provider.
/// Example: `c1ccc2ccccc2c1` (a Murcko scaffold SMILES)
pub type GroupKey = String;
/// Per-task label value; `None` marks a missing measurement.
/// Example: `Some(1.0)`, `Some(-0.42)`, `None`
pub type Label = Option<f64>;
/// Index of an item within its dataset.
pub type ItemIndex = usize;
/// Index of a task (label column) within a dataset.
pub type TaskIndex = usize;
/// Name used for a bucket in summaries and exported assignments.
/// Examples: `train`, `valid`, `test`, `discard`
pub type BucketName = &'static str;
