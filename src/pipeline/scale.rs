//! Standardization of continuous columns
//!
//! Means and standard deviations are computed over whatever frame is passed
//! in. The pipeline passes the full cleaned dataset, before the train/test
//! split, which lets test-set statistics leak into the scaling; this keeps
//! results comparable with the published study and is flagged in the report footer.

use polars::prelude::*;
use serde::Serialize;

use super::error::{PipelineError, PipelineResult};

/// Parameters used to standardize one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnScaling {
    pub column: String,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std_dev: f64,
}

impl ColumnScaling {
    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        (value - self.mean) / self.std_dev
    }
}

/// Sample mean and sample standard deviation; None for fewer than two values
pub fn mean_and_sample_std(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some((mean, (sum_sq / (n - 1) as f64).sqrt()))
}

/// Read a numeric column as f64 values, rejecting nulls
pub fn column_values(df: &DataFrame, name: &str, stage: &'static str) -> PipelineResult<Vec<f64>> {
    let column = df.column(name).map_err(|_| PipelineError::MissingColumn {
        stage,
        column: name.to_string(),
    })?;
    let float_col = column.cast(&DataType::Float64)?;
    float_col
        .f64()?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| PipelineError::NullValues {
                stage,
                column: name.to_string(),
            })
        })
        .collect()
}

/// Replace each named column x by (x - mean) / std.
///
/// Fails with `DegenerateColumn` for a constant column (or one with fewer
/// than two rows).
pub fn standardize_columns(
    df: &DataFrame,
    columns: &[&str],
) -> PipelineResult<(DataFrame, Vec<ColumnScaling>)> {
    let mut out = df.clone();
    let mut scalings = Vec::with_capacity(columns.len());

    for &name in columns {
        let values = column_values(df, name, "scale")?;
        let (mean, std_dev) = match mean_and_sample_std(&values) {
            Some((mean, std_dev)) if std_dev > 0.0 && std_dev.is_finite() => (mean, std_dev),
            _ => {
                return Err(PipelineError::DegenerateColumn {
                    column: name.to_string(),
                })
            }
        };

        let scaling = ColumnScaling {
            column: name.to_string(),
            mean,
            std_dev,
        };
        let scaled: Vec<f64> = values.iter().map(|&v| scaling.apply(v)).collect();
        out.with_column(Column::new(name.into(), scaled))?;
        scalings.push(scaling);
    }

    Ok((out, scalings))
}
