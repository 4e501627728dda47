//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::{ExperimentConfig, FitOptions, PositiveClass, ResampleMethod};

/// relogit - Compare logistic regression under class resampling strategies
#[derive(Parser, Debug)]
#[command(name = "relogit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input CSV file with the nine diabetes dataset columns
    #[arg(short, long)]
    pub input: PathBuf,

    /// Random seed for the stratified split and the resampling draws
    #[arg(short, long, default_value = "42")]
    pub seed: u64,

    /// Fraction of rows assigned to the training subset (exclusive 0 to 1)
    #[arg(long, default_value = "0.8", value_parser = validate_split_ratio)]
    pub split_ratio: f64,

    /// Resampling strategies to run, comma-separated.
    /// Options: "none" (baseline), "over" (ROS), "under" (RUS)
    #[arg(short, long, value_delimiter = ',', default_values_t = vec![ResampleMethod::None, ResampleMethod::Over, ResampleMethod::Under])]
    pub resample: Vec<ResampleMethod>,

    /// Class treated as positive when deriving PPV, NPV, sensitivity and specificity.
    /// 0 reproduces the published study's labeling; 1 is the clinical convention.
    #[arg(long, default_value = "0", value_parser = validate_positive_label)]
    pub positive_label: i64,

    /// Maximum IRLS iterations per model fit
    #[arg(long, default_value = "25")]
    pub max_iter: usize,

    /// Relative deviance change at which IRLS stops
    #[arg(long, default_value = "1e-8")]
    pub tolerance: f64,

    /// JSON report path.
    /// Defaults to input directory with '_model_report.json' suffix (e.g., data.csv -> data_model_report.json).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip writing the JSON report
    #[arg(long, default_value = "false")]
    pub no_export: bool,
}

impl Cli {
    /// Get the JSON report path, deriving it from the input if not explicitly provided.
    /// Returns None when export is disabled.
    pub fn report_path(&self) -> Option<PathBuf> {
        if self.no_export {
            return None;
        }
        Some(self.output.clone().unwrap_or_else(|| {
            let parent = self
                .input
                .parent()
                .unwrap_or_else(|| std::path::Path::new("."));
            let stem = self
                .input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            parent.join(format!("{}_model_report.json", stem))
        }))
    }

    /// Convert parsed arguments into the pipeline configuration
    pub fn experiment_config(&self) -> ExperimentConfig {
        let mut methods = Vec::with_capacity(self.resample.len());
        for method in &self.resample {
            if !methods.contains(method) {
                methods.push(*method);
            }
        }

        ExperimentConfig {
            input: self.input.clone(),
            seed: self.seed,
            train_ratio: self.split_ratio,
            methods,
            positive_class: PositiveClass::from_label(self.positive_label).unwrap_or_default(),
            fit: FitOptions {
                max_iterations: self.max_iter,
                tolerance: self.tolerance,
            },
        }
    }
}

/// Validator for split_ratio parameter
fn validate_split_ratio(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "split_ratio must be between 0.0 and 1.0 (exclusive), got {}",
            value
        ))
    }
}

/// Validator for positive_label parameter
fn validate_positive_label(s: &str) -> Result<i64, String> {
    match s.trim() {
        "0" => Ok(0),
        "1" => Ok(1),
        _ => Err(format!("positive_label must be 0 or 1, got '{}'", s)),
    }
}
