//! End-to-end experiment: prepare once, then fit and score one model per
//! resampling strategy on the same split.

use std::path::PathBuf;

use polars::prelude::*;
use serde::Serialize;

use super::clean::{analyze_missing_values, clean_dataset_tracked, CleaningStats};
use super::encode::{encode_categoricals_at_lines, EncodingTables};
use super::error::PipelineResult;
use super::evaluate::{evaluate, Evaluation, PositiveClass};
use super::explore::{explore_dataset, Exploration};
use super::loader::load_dataset;
use super::model::{fit_logistic, FitOptions, LogisticModel};
use super::resample::{resample, ResampleMethod, ResampleStats};
use super::scale::{standardize_columns, ColumnScaling};
use super::schema::{CONTINUOUS_COLUMNS, NOMINAL_COLUMNS, TARGET};
use super::split::{stratified_split, validate_train_ratio, TrainTestSplit};

/// Plain configuration for one experiment run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentConfig {
    pub input: PathBuf,
    pub seed: u64,
    pub train_ratio: f64,
    pub methods: Vec<ResampleMethod>,
    pub positive_class: PositiveClass,
    pub fit: FitOptions,
}

impl ExperimentConfig {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            seed: 42,
            train_ratio: 0.8,
            methods: vec![ResampleMethod::None, ResampleMethod::Over, ResampleMethod::Under],
            positive_class: PositiveClass::default(),
            fit: FitOptions::default(),
        }
    }
}

/// Dataset after cleaning, encoding and scaling, plus what each step found
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// Missing-cell ratios of the raw frame, before cleaning
    pub missing: Vec<(String, f64)>,
    pub cleaning: CleaningStats,
    /// Summaries computed on encoded but unscaled values
    pub exploration: Exploration,
    pub scaling: Vec<ColumnScaling>,
    pub frame: DataFrame,
}

/// One fitted and scored model
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub label: String,
    pub resample: ResampleStats,
    pub model: LogisticModel,
    pub evaluation: Evaluation,
}

/// Structured result of a whole experiment
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub missing: Vec<(String, f64)>,
    pub cleaning: CleaningStats,
    pub exploration: Exploration,
    pub scaling: Vec<ColumnScaling>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub runs: Vec<RunResult>,
}

impl ExperimentReport {
    pub fn new(prepared: PreparedData, split: &TrainTestSplit, runs: Vec<RunResult>) -> Self {
        Self {
            missing: prepared.missing,
            cleaning: prepared.cleaning,
            exploration: prepared.exploration,
            scaling: prepared.scaling,
            train_rows: split.train.height(),
            test_rows: split.test.height(),
            runs,
        }
    }

    /// Look up a run by its label ("baseline", "ROS", "RUS")
    pub fn run(&self, label: &str) -> Option<&RunResult> {
        self.runs.iter().find(|r| r.label == label)
    }
}

/// Clean, encode, explore and scale a freshly loaded frame.
pub fn prepare_dataset(raw: &DataFrame, tables: &EncodingTables) -> PipelineResult<PreparedData> {
    let missing = analyze_missing_values(raw)?;
    let (cleaned, cleaning, lines) = clean_dataset_tracked(raw)?;
    let encoded = encode_categoricals_at_lines(&cleaned, tables, &lines)?;
    let exploration = explore_dataset(&encoded, TARGET, &CONTINUOUS_COLUMNS, &NOMINAL_COLUMNS)?;
    let (frame, scaling) = standardize_columns(&encoded, &CONTINUOUS_COLUMNS)?;

    Ok(PreparedData {
        missing,
        cleaning,
        exploration,
        scaling,
        frame,
    })
}

/// Resample the training subset, fit, and score on the untouched test subset.
pub fn run_model(
    split: &TrainTestSplit,
    method: ResampleMethod,
    seed: u64,
    fit: &FitOptions,
    positive: PositiveClass,
) -> PipelineResult<RunResult> {
    let (train, resample_stats) = resample(&split.train, TARGET, method, seed)?;
    let model = fit_logistic(&train, TARGET, fit)?;
    let evaluation = evaluate(&model, &split.test, TARGET, positive)?;

    Ok(RunResult {
        label: method.label().to_string(),
        resample: resample_stats,
        model,
        evaluation,
    })
}

/// Run the whole pipeline without any terminal output
pub fn run_experiment(config: &ExperimentConfig) -> PipelineResult<ExperimentReport> {
    validate_train_ratio(config.train_ratio)?;

    let raw = load_dataset(&config.input)?;
    let prepared = prepare_dataset(&raw, &EncodingTables::standard())?;
    let split = stratified_split(&prepared.frame, TARGET, config.train_ratio, config.seed)?;

    let runs = config
        .methods
        .iter()
        .map(|&method| run_model(&split, method, config.seed, &config.fit, config.positive_class))
        .collect::<PipelineResult<Vec<_>>>()?;

    Ok(ExperimentReport::new(prepared, &split, runs))
}
