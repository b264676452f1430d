use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use splitters::{
    ButinaSplitter, Dataset, GroupSplitter, IndexSplitter, Item, MaxMinSplitter,
    NumericOrderSplitter, RandomSplitter, SpecifiedSplitter, SplitConfig, SplitError,
    SplitFractions, SplitLabel, SplitStrategy, Splitter, StratifiedSplitter, TaskSplitter, k_fold,
    split,
    split_tasks,
};

/// Seeded synthetic assay: 3 tasks, ~25% positives on task 0, 12 scaffolds,
/// 16-bit fingerprints, and a molecular-weight-like attribute.
fn build_dataset(n: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let items = (0..n)
        .map(|idx| {
            let labels = [
                if rng.random_bool(0.25) { 1.0 } else { 0.0 },
                if rng.random_bool(0.5) { 1.0 } else { 0.0 },
                rng.random_range(-1.0..1.0),
            ];
            let bits: Vec<f64> = (0..16)
                .map(|_| if rng.random_bool(0.3) { 1.0 } else { 0.0 })
                .collect();
            Item::new(format!("cpd_{idx:04}"))
                .with_labels(labels)
                .with_group_key(format!("scaffold_{}", rng.random_range(0..12)))
                .with_features(bits)
                .with_numeric_attribute(rng.random_range(50.0..500.0))
        })
        .collect();
    Dataset::new(items).unwrap()
}

fn item_strategies() -> Vec<SplitStrategy> {
    vec![
        RandomSplitter.into(),
        IndexSplitter.into(),
        StratifiedSplitter::single_task().into(),
        StratifiedSplitter::multitask().into(),
        GroupSplitter::scaffold().into(),
        GroupSplitter::random_groups().into(),
        ButinaSplitter::default().into(),
        MaxMinSplitter::default().into(),
        NumericOrderSplitter.into(),
    ]
}

fn assert_partition(indices: [&[usize]; 4], n: usize, context: &str) {
    let mut seen = HashSet::new();
    for bucket in indices {
        for &idx in bucket {
            assert!(idx < n, "{context}: index {idx} out of range");
            assert!(seen.insert(idx), "{context}: index {idx} assigned twice");
        }
    }
    assert_eq!(seen.len(), n, "{context}: union does not cover the dataset");
}

#[test]
fn every_strategy_produces_a_disjoint_covering_partition() {
    let dataset = build_dataset(120, 7);
    for fractions in [
        SplitFractions::default(),
        SplitFractions::new(0.7, 0.15, 0.15),
        SplitFractions::new(0.6, 0.1, 0.1),
    ] {
        for strategy in item_strategies() {
            let config = SplitConfig {
                strategy,
                fractions,
                seed: 11,
                task_index: Some(0),
            };
            let context = format!("{:?} {fractions:?}", config.strategy);
            let assignment = split(&dataset, &config).unwrap();
            assert_partition(
                [
                    &assignment.train,
                    &assignment.validation,
                    &assignment.test,
                    &assignment.discarded,
                ],
                dataset.len(),
                &context,
            );
        }
    }
}

#[test]
fn repeated_runs_are_bit_identical() {
    let dataset = build_dataset(80, 3);
    for strategy in item_strategies() {
        let config = SplitConfig::new(strategy).with_seed(99).with_task_index(0);
        let first = split(&dataset, &config).unwrap();
        let second = split(&dataset, &config).unwrap();
        assert_eq!(first, second, "{}", config.strategy.name());
        assert_eq!(first.checksum(), second.checksum());
    }
}

#[test]
fn random_split_depends_on_seed() {
    let dataset = build_dataset(50, 1);
    let checksums: HashSet<u64> = (0..8)
        .map(|seed| {
            split(&dataset, &SplitConfig::default().with_seed(seed))
                .unwrap()
                .checksum()
        })
        .collect();
    assert!(checksums.len() > 1);
}

#[test]
fn stratified_split_keeps_positives_in_every_bucket() {
    let items = (0..100)
        .map(|idx| Item::new(format!("cpd_{idx}")).with_labels([(idx < 20) as u8 as f64]))
        .collect();
    let dataset = Dataset::new(items).unwrap();
    for seed in 0..10 {
        let config = SplitConfig::new(StratifiedSplitter::single_task())
            .with_task_index(0)
            .with_seed(seed);
        let assignment = split(&dataset, &config).unwrap();
        for label in [SplitLabel::Validation, SplitLabel::Test] {
            let positives = assignment
                .indices(label)
                .iter()
                .filter(|&&idx| idx < 20)
                .count();
            assert!((1..=3).contains(&positives), "seed {seed}: {label} has {positives}");
        }
    }
}

#[test]
fn group_split_never_mixes_groups() {
    let sizes = [40usize, 30, 20, 5, 5];
    let mut items = Vec::new();
    for (group, size) in sizes.iter().enumerate() {
        for member in 0..*size {
            items.push(Item::new(format!("g{group}_{member}")).with_group_key(format!("g{group}")));
        }
    }
    let dataset = Dataset::new(items).unwrap();
    for strategy in [GroupSplitter::scaffold(), GroupSplitter::random_groups()] {
        let assignment = split(&dataset, &SplitConfig::new(strategy)).unwrap();
        let summary = splitters::summarize(&dataset, &assignment, None).unwrap();
        assert_eq!(summary.leaked_groups, 0);
    }
}

/// Four fingerprint families over disjoint 8-bit blocks; every member drops
/// one bit of its block and even members set one bit of the next block.
fn fingerprint_families() -> Dataset {
    let mut items = Vec::new();
    for family in 0..4 {
        for member in 0..6 {
            let mut bits = vec![0.0; 32];
            bits[8 * family..8 * family + 8].fill(1.0);
            bits[8 * family + member] = 0.0;
            if member % 2 == 0 {
                bits[(8 * family + 8 + member) % 32] = 1.0;
            }
            items.push(Item::new(format!("fam{family}_{member}")).with_features(bits));
        }
    }
    Dataset::new(items).unwrap()
}

#[test]
fn butina_cluster_count_grows_with_threshold() {
    let dataset = fingerprint_families();
    let counts: Vec<usize> = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0]
        .into_iter()
        .map(|threshold| ButinaSplitter::new(threshold).clusters(&dataset).unwrap().len())
        .collect();
    assert!(counts.windows(2).all(|pair| pair[0] <= pair[1]), "{counts:?}");
    assert_eq!(counts, vec![1, 4, 4, 4, 24, 24]);

    let assignment = split(&dataset, &SplitConfig::new(ButinaSplitter::default())).unwrap();
    let family_of = |idx: &usize| idx / 6;
    let train: HashSet<usize> = assignment.train.iter().map(family_of).collect();
    let test: HashSet<usize> = assignment.test.iter().map(family_of).collect();
    assert!(train.is_disjoint(&test));
}

#[test]
fn specified_split_round_trips_and_rejects_overlap() {
    let dataset = build_dataset(5, 0);
    let exact = SplitConfig::new(SpecifiedSplitter::new(vec![0, 1, 2], vec![], vec![3, 4]));
    let assignment = split(&dataset, &exact).unwrap();
    assert_eq!(assignment.train, vec![0, 1, 2]);
    assert_eq!(assignment.test, vec![3, 4]);

    let overlapping = SplitConfig::new(SpecifiedSplitter::new(vec![0, 1], vec![], vec![1, 2]));
    assert!(matches!(
        split(&dataset, &overlapping),
        Err(SplitError::InvalidConfiguration(_))
    ));
}

#[test]
fn task_split_covers_every_task_once() {
    let dataset = build_dataset(10, 4);
    let config = SplitConfig::new(TaskSplitter).with_fractions(SplitFractions::new(0.34, 0.33, 0.33));
    let tasks = split_tasks(&dataset, &config).unwrap();
    assert_partition(
        [&tasks.train, &tasks.validation, &tasks.test, &tasks.discarded],
        dataset.n_tasks(),
        "task split",
    );
    assert_eq!(tasks.train, vec![0]);
    assert_eq!(tasks.validation, vec![1]);
    assert_eq!(tasks.test, vec![2]);
}

#[test]
fn k_fold_preserves_group_integrity() {
    let dataset = build_dataset(90, 13);
    let config = SplitConfig::new(GroupSplitter::random_groups()).with_seed(5);
    let folds = k_fold(&dataset, &config, 3).unwrap();
    let mut hits = vec![0usize; dataset.len()];
    for fold in &folds {
        assert!(fold.test.is_empty());
        assert!(!fold.validation.is_empty());
        assert_eq!(splitters::summarize(&dataset, fold, None).unwrap().leaked_groups, 0);
        for &idx in &fold.validation {
            hits[idx] += 1;
        }
    }
    assert!(hits.iter().all(|&count| count == 1));
}
