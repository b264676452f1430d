#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Bucket sizing and whole-group fill.
pub mod allocation;
/// Split configuration and strategy selection.
pub mod config;
/// Centralized constants used across splitters, the engine, and the CLI.
pub mod constants;
/// Item and dataset types.
pub mod data;
/// Partition engine entry points and bucket materialization.
pub mod engine;
/// Reusable command-line runners.
pub mod example_apps;
/// Grouping providers and group collection.
pub mod grouping;
mod hash;
/// Split summaries.
pub mod metrics;
/// Similarity providers and neighbor search.
pub mod similarity;
/// Split labels, fractions, and assignments.
pub mod splits;
/// Splitter capability and strategy implementations.
pub mod strategies;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::{SplitConfig, SplitStrategy};
pub use data::{Dataset, Item};
pub use engine::{
    k_fold, materialize, materialize_named, materialize_tasks, split, split_tasks,
    train_test_split,
};
pub use errors::SplitError;
pub use grouping::{Grouping, ItemGroupKey};
pub use metrics::{BucketShare, SplitSummary, leaked_groups_by, summarize, summarize_with};
pub use similarity::{Euclidean, Similarity, Tanimoto};
pub use splits::{SplitAssignment, SplitFractions, SplitLabel, TaskAssignment};
pub use strategies::{
    ButinaSplitter, FarthestPointSampler, GroupOrder, GroupSplitter, IndexSplitter,
    MaxMinSplitter, NumericOrderSplitter, RandomSplitter, SpecifiedSplitter, SplitRequest,
    Splitter, StratifiedSplitter, StratifyMode, TaskSplitter, UnlistedItems,
};
pub use types::{GroupKey, ItemId, ItemIndex, Label, TaskIndex};
