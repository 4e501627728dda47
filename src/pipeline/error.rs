//! Error types for the modeling pipeline.
//!
//! Every variant names the stage it was raised in so a failed run tells the
//! user where it stopped. None of these are recovered locally; they propagate
//! to the binary and abort the run.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while loading, preparing, fitting or evaluating.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input file is missing or unreadable.
    #[error("[load] cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed input: inconsistent column count, bad header or a value
    /// that does not parse as the declared column type.
    #[error("[load] {message}")]
    Parse { message: String },

    /// A column the stage depends on is not present in the frame.
    #[error("[{stage}] column '{column}' not found")]
    MissingColumn { stage: &'static str, column: String },

    /// A column that must be complete still contains nulls.
    #[error("[{stage}] column '{column}' contains null values")]
    NullValues { stage: &'static str, column: String },

    /// The encoder met a raw categorical value with no code in its table.
    #[error("[encode] unknown category '{value}' in column '{column}' (line {line})")]
    UnknownCategory {
        column: String,
        value: String,
        /// 1-based line in the source file, header on line 1
        line: usize,
    },

    /// A column with zero variance cannot be standardized.
    #[error("[scale] column '{column}' has zero variance and cannot be standardized")]
    DegenerateColumn { column: String },

    /// IRLS did not reach the deviance tolerance in the iteration budget.
    #[error("[fit] logistic regression did not converge after {iterations} iterations (last relative deviance change {last_change:.3e})")]
    Convergence { iterations: usize, last_change: f64 },

    /// The design matrix is rank-deficient.
    #[error("[fit] singular design matrix: {detail}")]
    SingularDesign { detail: String },

    /// One of the target classes has no rows.
    #[error("[{stage}] target class {class} has no rows")]
    EmptyClass { stage: &'static str, class: i64 },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error raised by the dataframe engine.
    #[error("dataframe error: {0}")]
    Polars(#[from] PolarsError),
}

/// Result alias used throughout the pipeline.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
