//! JSON export of a finished experiment

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{ExperimentConfig, ExperimentReport, PositiveClass};

use super::summary::SCALING_LEAKAGE_NOTE;

/// Metadata about the run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    /// relogit version
    pub relogit_version: String,
    /// Input file path
    pub input_file: String,
    /// Seed used for the split and every resampling draw
    pub seed: u64,
    /// Fraction of rows in the training subset
    pub train_ratio: f64,
    /// IRLS iteration cap
    pub max_iterations: usize,
    /// IRLS relative deviance tolerance
    pub tolerance: f64,
    /// Which class the derived rates treat as positive
    pub positive_class: PositiveClass,
    /// Human-readable statement of the rate convention
    pub rate_convention: String,
    pub scaling_note: String,
}

impl RunMetadata {
    pub fn from_config(config: &ExperimentConfig) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            relogit_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: config.input.display().to_string(),
            seed: config.seed,
            train_ratio: config.train_ratio,
            max_iterations: config.fit.max_iterations,
            tolerance: config.fit.tolerance,
            positive_class: config.positive_class,
            rate_convention: config.positive_class.describe().to_string(),
            scaling_note: SCALING_LEAKAGE_NOTE.to_string(),
        }
    }
}

/// Complete report export with metadata
#[derive(Serialize)]
pub struct ExperimentExport<'a> {
    pub metadata: RunMetadata,
    #[serde(flatten)]
    pub report: &'a ExperimentReport,
}

/// Write the experiment report as pretty-printed JSON
///
/// # Arguments
/// * `report` - Structured result of the experiment
/// * `config` - Configuration the experiment ran with, recorded as metadata
/// * `output_path` - Path to write the JSON file
pub fn export_experiment_report(
    report: &ExperimentReport,
    config: &ExperimentConfig,
    output_path: &Path,
) -> Result<()> {
    let export = ExperimentExport {
        metadata: RunMetadata::from_config(config),
        report,
    };

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize experiment report to JSON")?;

    std::fs::write(output_path, json).with_context(|| {
        format!(
            "Failed to write experiment report to {}",
            output_path.display()
        )
    })?;

    Ok(())
}
