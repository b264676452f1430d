use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum, error::ErrorKind};
use serde::Deserialize;

use crate::config::{SplitConfig, SplitStrategy};
use crate::constants::cli::{DEFAULT_FRACTIONS_ARG, SPLIT_DATASET_BIN};
use crate::constants::clustering::DEFAULT_SIMILARITY_THRESHOLD;
use crate::constants::config::DEFAULT_SEED;
use crate::constants::splits::ALL_SPLITS;
use crate::constants::stratified::DEFAULT_POSITIVE_THRESHOLD;
use crate::data::Dataset;
use crate::engine;
use crate::grouping::ItemGroupKey;
use crate::metrics::summarize_with;
use crate::splits::SplitFractions;
use crate::strategies::{
    ButinaSplitter, GroupSplitter, IndexSplitter, MaxMinSplitter, NumericOrderSplitter,
    RandomSplitter, SpecifiedSplitter, Splitter, StratifiedSplitter, TaskSplitter, UnlistedItems,
};
use crate::types::ItemIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Random,
    Index,
    Stratified,
    MultitaskStratified,
    Scaffold,
    RandomGroup,
    Butina,
    Maxmin,
    NumericOrder,
    Specified,
    Task,
}

#[derive(Debug, Parser)]
#[command(
    name = SPLIT_DATASET_BIN,
    disable_help_subcommand = true,
    about = "Deterministically split a JSON dataset",
    long_about = "Partition a JSON array of items into train, validation, and test buckets with a chosen strategy, print a summary, and optionally export the assignment.",
    after_help = "Items are objects with an `id` plus optional `labels`, `group_key`, `feature_vector`, and `numeric_attribute` fields."
)]
/// CLI for `split_dataset`.
///
/// Common usage:
/// - Random split with defaults: `--input items.json`
/// - Scaffold split written to disk: `--input items.json --strategy scaffold --output split.json`
/// - Five stratified folds: `--input items.json --strategy stratified --task-index 0 --folds 5`
struct SplitDatasetCli {
    #[arg(long, value_name = "PATH", help = "JSON dataset to split")]
    input: PathBuf,
    #[arg(long, value_enum, default_value_t = StrategyArg::Random, help = "Splitting strategy")]
    strategy: StrategyArg,
    #[arg(
        long,
        value_name = "TRAIN,VALIDATION,TEST",
        value_parser = parse_fractions_arg,
        default_value = DEFAULT_FRACTIONS_ARG,
        help = "Comma-separated fractions summing to at most 1.0; the remainder is discarded"
    )]
    fractions: SplitFractions,
    #[arg(long, default_value_t = DEFAULT_SEED, help = "Deterministic seed for randomized strategies")]
    seed: u64,
    #[arg(long = "task-index", help = "Label column for single-task stratification")]
    task_index: Option<usize>,
    #[arg(
        long,
        default_value_t = DEFAULT_SIMILARITY_THRESHOLD,
        help = "Neighbor similarity threshold for butina clustering"
    )]
    threshold: f64,
    #[arg(
        long = "assignment",
        value_name = "PATH",
        required_if_eq("strategy", "specified"),
        help = "JSON assignment (train/validation/test index lists) used by the specified strategy"
    )]
    assignment: Option<PathBuf>,
    #[arg(
        long = "unlisted-to-train",
        help = "Send items missing from the specified assignment to train instead of discarding them"
    )]
    unlisted_to_train: bool,
    #[arg(
        long,
        value_parser = parse_fold_count,
        conflicts_with = "output",
        help = "Print k cross-validation folds instead of a single split"
    )]
    folds: Option<usize>,
    #[arg(
        long = "positive-threshold",
        default_value_t = DEFAULT_POSITIVE_THRESHOLD,
        help = "Labels strictly above this value count as positive (stratification and summary)"
    )]
    positive_threshold: f64,
    #[arg(
        long = "positive-task",
        help = "Count positives per bucket on this label column (defaults to --task-index)"
    )]
    positive_task: Option<usize>,
    #[arg(long, value_name = "PATH", help = "Write the assignment JSON to this path")]
    output: Option<PathBuf>,
}

/// Index lists read by `--assignment`; any bucket may be omitted.
#[derive(Debug, Default, Deserialize)]
struct SpecifiedLists {
    #[serde(default)]
    train: Vec<ItemIndex>,
    #[serde(default)]
    validation: Vec<ItemIndex>,
    #[serde(default)]
    test: Vec<ItemIndex>,
}

/// Run the `split_dataset` command with arguments after the program name.
pub fn run_split_dataset<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<SplitDatasetCli, _>(
        std::iter::once(SPLIT_DATASET_BIN.to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let dataset: Dataset = serde_json::from_str(&fs::read_to_string(&cli.input)?)?;
    let config = SplitConfig {
        strategy: build_strategy(&cli)?,
        fractions: cli.fractions,
        seed: cli.seed,
        task_index: cli.task_index,
    };
    println!(
        "Splitting {} items ({} tasks) from {} with {} (seed {})",
        dataset.len(),
        dataset.n_tasks(),
        cli.input.display(),
        config.strategy.name(),
        config.seed
    );

    let positive_task = cli.positive_task.or(cli.task_index);
    if let Some(k) = cli.folds {
        let folds = engine::k_fold(&dataset, &config, k)?;
        for (fold, assignment) in folds.iter().enumerate() {
            println!("=== fold {} of {k} ===", fold + 1);
            let summary = summarize_with(
                &dataset,
                assignment,
                positive_task,
                cli.positive_threshold,
                &ItemGroupKey,
            )?;
            println!("{summary}");
        }
        return Ok(());
    }

    if matches!(config.strategy, SplitStrategy::TaskWise(_)) {
        let tasks = engine::split_tasks(&dataset, &config)?;
        for label in ALL_SPLITS {
            println!("{:<8}tasks={:?}", label.name(), tasks.tasks(label));
        }
        println!("discard tasks={:?}", tasks.discarded);
        if let Some(path) = &cli.output {
            fs::write(path, serde_json::to_string_pretty(&tasks)?)?;
            println!("Wrote task assignment to {}", path.display());
        }
        return Ok(());
    }

    let assignment = engine::split(&dataset, &config)?;
    let summary = summarize_with(
        &dataset,
        &assignment,
        positive_task,
        cli.positive_threshold,
        &ItemGroupKey,
    )?;
    println!("{summary}");
    if let Some(path) = &cli.output {
        assignment.write_json(path)?;
        println!("Wrote assignment to {}", path.display());
    }
    Ok(())
}

fn build_strategy(cli: &SplitDatasetCli) -> Result<SplitStrategy, Box<dyn Error>> {
    Ok(match cli.strategy {
        StrategyArg::Random => RandomSplitter.into(),
        StrategyArg::Index => IndexSplitter.into(),
        StrategyArg::Stratified => StratifiedSplitter::single_task()
            .with_threshold(cli.positive_threshold)
            .into(),
        StrategyArg::MultitaskStratified => StratifiedSplitter::multitask()
            .with_threshold(cli.positive_threshold)
            .into(),
        StrategyArg::Scaffold => GroupSplitter::scaffold().into(),
        StrategyArg::RandomGroup => GroupSplitter::random_groups().into(),
        StrategyArg::Butina => ButinaSplitter::new(cli.threshold).into(),
        StrategyArg::Maxmin => MaxMinSplitter::default().into(),
        StrategyArg::NumericOrder => NumericOrderSplitter.into(),
        StrategyArg::Task => TaskSplitter.into(),
        StrategyArg::Specified => {
            let path = cli
                .assignment
                .as_ref()
                .ok_or("--assignment is required with --strategy specified")?;
            let lists: SpecifiedLists = serde_json::from_str(&fs::read_to_string(path)?)?;
            let unlisted = if cli.unlisted_to_train {
                UnlistedItems::Train
            } else {
                UnlistedItems::Discard
            };
            SpecifiedSplitter::new(lists.train, lists.validation, lists.test)
                .with_unlisted(unlisted)
                .into()
        }
    })
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_fold_count(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse --folds value '{raw}' as an integer"))?;
    if parsed < 2 {
        return Err("--folds must be at least 2".to_string());
    }
    Ok(parsed)
}

fn parse_fractions_arg(raw: &str) -> Result<SplitFractions, String> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 3 {
        return Err("--fractions expects exactly 3 comma-separated values".to_string());
    }
    let parse = |name: &str, part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid {name} fraction '{}': must be a float", part.trim()))
    };
    let fractions = SplitFractions::new(
        parse("train", parts[0])?,
        parse("validation", parts[1])?,
        parse("test", parts[2])?,
    );
    fractions.validated().map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractions_arg_accepts_partial_sums() {
        let fractions = parse_fractions_arg("0.7, 0.1 ,0.1").unwrap();
        assert_eq!(fractions, SplitFractions::new(0.7, 0.1, 0.1));
        assert!((fractions.discard() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn fractions_arg_rejects_bad_input() {
        assert!(parse_fractions_arg("0.8,0.2").unwrap_err().contains("exactly 3"));
        assert!(parse_fractions_arg("0.8,x,0.1").unwrap_err().contains("validation"));
        assert!(parse_fractions_arg("0.8,0.2,0.2").is_err());
        assert!(parse_fractions_arg("1.2,-0.1,-0.1").is_err());
    }

    #[test]
    fn specified_strategy_requires_assignment_file() {
        let result = parse_cli::<SplitDatasetCli, _>([
            SPLIT_DATASET_BIN,
            "--input",
            "items.json",
            "--strategy",
            "specified",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn specified_lists_default_missing_buckets() {
        let lists: SpecifiedLists = serde_json::from_str(r#"{"train":[0,1,2],"test":[3,4]}"#).unwrap();
        assert_eq!(lists.train, vec![0, 1, 2]);
        assert!(lists.validation.is_empty());
        assert_eq!(lists.test, vec![3, 4]);
    }

    #[test]
    fn positive_threshold_reaches_stratified_strategies() {
        let cli = parse_cli::<SplitDatasetCli, _>([
            SPLIT_DATASET_BIN,
            "--input",
            "items.json",
            "--strategy",
            "multitask-stratified",
            "--positive-threshold",
            "0.5",
        ])
        .unwrap()
        .unwrap();
        assert_eq!(cli.positive_threshold, 0.5);
        let SplitStrategy::Stratified(splitter) = build_strategy(&cli).unwrap() else {
            panic!("expected a stratified strategy");
        };
        assert_eq!(splitter.threshold(), 0.5);
    }

    #[test]
    fn folds_must_be_at_least_two() {
        assert!(parse_fold_count("1").is_err());
        assert_eq!(parse_fold_count("5").unwrap(), 5);
    }
}
