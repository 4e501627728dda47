//! Binary target extraction
//!
//! Every stage that looks at the target (split, resample, fit, evaluate)
//! reads it through here so that non-binary or null labels are rejected in
//! one place.

use polars::prelude::*;

use super::error::{PipelineError, PipelineResult};

/// Read the target column as 0/1 labels.
///
/// The column may be stored as any integer or float type; every value must
/// be exactly 0 or 1 and non-null.
pub fn target_labels(df: &DataFrame, target: &str, stage: &'static str) -> PipelineResult<Vec<i64>> {
    let column = df
        .column(target)
        .map_err(|_| PipelineError::MissingColumn {
            stage,
            column: target.to_string(),
        })?;

    if !column.dtype().is_primitive_numeric() {
        return Err(PipelineError::InvalidConfig(format!(
            "[{}] target column '{}' must be numeric 0/1, found {}",
            stage,
            target,
            column.dtype()
        )));
    }

    let float_col = column.cast(&DataType::Float64)?;
    let mut labels = Vec::with_capacity(float_col.len());
    for (row, value) in float_col.f64()?.into_iter().enumerate() {
        match value {
            Some(v) if v == 0.0 => labels.push(0),
            Some(v) if v == 1.0 => labels.push(1),
            Some(v) => {
                return Err(PipelineError::InvalidConfig(format!(
                    "[{}] target column '{}' has non-binary value {} at row {}",
                    stage, target, v, row
                )))
            }
            None => {
                return Err(PipelineError::NullValues {
                    stage,
                    column: target.to_string(),
                })
            }
        }
    }

    Ok(labels)
}

/// Count labels as (class 0, class 1)
pub fn class_counts(labels: &[i64]) -> (usize, usize) {
    let positives = labels.iter().filter(|&&l| l == 1).count();
    (labels.len() - positives, positives)
}

/// Row indices of each class as (class 0, class 1), in row order
pub fn class_indices(labels: &[i64]) -> (Vec<usize>, Vec<usize>) {
    let mut negatives = Vec::new();
    let mut positives = Vec::new();
    for (idx, &label) in labels.iter().enumerate() {
        if label == 1 {
            positives.push(idx);
        } else {
            negatives.push(idx);
        }
    }
    (negatives, positives)
}

/// Gather rows by position. Indices may repeat.
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> PipelineResult<DataFrame> {
    let idx: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    Ok(df.take(&idx)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_target_labels() {
        let df = df! {
            "target" => [0i64, 1, 0, 1, 0, 1],
            "feature" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0],
        }
        .unwrap();

        let labels = target_labels(&df, "target", "test").unwrap();
        assert_eq!(labels, vec![0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn test_float_target_labels() {
        let df = df! {
            "target" => [0.0f64, 1.0, 1.0],
        }
        .unwrap();

        assert_eq!(target_labels(&df, "target", "test").unwrap(), vec![0, 1, 1]);
    }

    #[test]
    fn test_non_binary_target_rejected() {
        let df = df! {
            "target" => [0i32, 1, 2],
        }
        .unwrap();

        let err = target_labels(&df, "target", "split").unwrap_err();
        assert!(err.to_string().contains("non-binary"));
    }

    #[test]
    fn test_string_target_rejected() {
        let df = df! {
            "target" => ["yes", "no"],
        }
        .unwrap();

        assert!(target_labels(&df, "target", "fit").is_err());
    }

    #[test]
    fn test_null_target_rejected() {
        let df = df! {
            "target" => [Some(0i64), None, Some(1)],
        }
        .unwrap();

        let err = target_labels(&df, "target", "fit").unwrap_err();
        assert!(matches!(err, PipelineError::NullValues { .. }));
    }

    #[test]
    fn test_missing_target_column() {
        let df = df! {
            "feature" => [1.0f64],
        }
        .unwrap();

        let err = target_labels(&df, "target", "split").unwrap_err();
        assert!(err.to_string().contains("[split]"));
    }

    #[test]
    fn test_class_counts_and_indices() {
        let labels = vec![0, 1, 0, 0, 1];
        assert_eq!(class_counts(&labels), (3, 2));

        let (neg, pos) = class_indices(&labels);
        assert_eq!(neg, vec![0, 2, 3]);
        assert_eq!(pos, vec![1, 4]);
    }

    #[test]
    fn test_take_rows_with_repeats() {
        let df = df! {
            "x" => [10i64, 20, 30],
        }
        .unwrap();

        let taken = take_rows(&df, &[2, 0, 2]).unwrap();
        let values: Vec<Option<i64>> = taken.column("x").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(30), Some(10), Some(30)]);
    }
}
