use crate::splits::SplitLabel;

/// Constants used by fraction validation and bucket allocation.
pub mod fractions {
    /// Slack allowed when checking that fractions sum to at most `1.0`.
    pub const FRACTION_TOLERANCE: f64 = 1e-6;
    /// Default train fraction.
    pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;
    /// Default validation fraction.
    pub const DEFAULT_VALIDATION_FRACTION: f64 = 0.1;
    /// Default test fraction.
    pub const DEFAULT_TEST_FRACTION: f64 = 0.1;
}

/// Constants used by split configuration defaults.
pub mod config {
    /// Seed used when a caller does not pick one.
    pub const DEFAULT_SEED: u64 = 42;
}

/// Constants used by stratified splitting.
pub mod stratified {
    /// Labels strictly above this value count as positive.
    pub const DEFAULT_POSITIVE_THRESHOLD: f64 = 0.0;
}

/// Constants used by similarity clustering.
pub mod clustering {
    /// Pairs at or above this similarity are neighbors.
    ///
    /// Equivalent to a Tanimoto distance cutoff of `0.6`.
    pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.4;
}

/// Constants used by k-fold splitting.
pub mod folds {
    /// Offset mixed into per-fold seed derivation.
    pub const FOLD_SEED_OFFSET: u64 = 0xF01D_5EED;
    /// Smallest fold count that yields a meaningful cross-validation.
    pub const MIN_FOLDS: usize = 2;
}

/// Constants used by bucket naming and iteration order.
pub mod splits {
    use super::SplitLabel;

    /// Canonical bucket order used for allocation, fill, and reporting.
    pub const ALL_SPLITS: [SplitLabel; 3] =
        [SplitLabel::Train, SplitLabel::Validation, SplitLabel::Test];
    /// Name of the train bucket.
    pub const TRAIN_NAME: &str = "train";
    /// Name of the validation bucket.
    pub const VALIDATION_NAME: &str = "valid";
    /// Name of the test bucket.
    pub const TEST_NAME: &str = "test";
    /// Name of the implicit discard bucket.
    pub const DISCARD_NAME: &str = "discard";
}

/// Constants used by the command-line runner.
pub mod cli {
    /// Program name reported by `--help`.
    pub const SPLIT_DATASET_BIN: &str = "split_dataset";
    /// Default fractions accepted by `--fractions`.
    pub const DEFAULT_FRACTIONS_ARG: &str = "0.8,0.1,0.1";
}
