//! Missing value analysis and record cleaning

use polars::prelude::*;
use serde::Serialize;

use super::error::{PipelineError, PipelineResult};
use super::schema::{SMOKING_HISTORY, SMOKING_SENTINEL};

/// Row counts before and after each cleaning filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleaningStats {
    pub rows_before: usize,
    /// Rows dropped for a null, NaN or blank field
    pub dropped_incomplete: usize,
    /// Complete rows dropped for the "No Info" smoking sentinel
    pub dropped_sentinel: usize,
    pub rows_after: usize,
}

/// Fraction of missing cells per column, sorted descending.
///
/// A cell is missing when it is null, a NaN float, or text that is empty
/// after trimming.
pub fn analyze_missing_values(df: &DataFrame) -> PipelineResult<Vec<(String, f64)>> {
    if df.height() == 0 {
        return Ok(Vec::new());
    }

    let mut missing_ratios: Vec<(String, f64)> = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let missing = presence_flags(column)?.into_iter().filter(|p| !p).count();
        missing_ratios.push((
            column.name().to_string(),
            missing as f64 / df.height() as f64,
        ));
    }

    missing_ratios.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    Ok(missing_ratios)
}

/// Trim text fields, then drop incomplete records and sentinel records.
///
/// The two filters have disjoint predicates so their order does not change
/// the result; incomplete rows are counted first. Running this on an
/// already-clean frame returns it unchanged.
pub fn clean_dataset(df: &DataFrame) -> PipelineResult<(DataFrame, CleaningStats)> {
    let (cleaned, stats, _) = clean_dataset_tracked(df)?;
    Ok((cleaned, stats))
}

/// `clean_dataset`, also returning the source file line of every kept
/// record. Row `i` of `df` is taken to sit on line `i + 2` (header on line 1),
/// which holds for frames straight from `load_dataset`.
pub fn clean_dataset_tracked(
    df: &DataFrame,
) -> PipelineResult<(DataFrame, CleaningStats, Vec<usize>)> {
    let rows_before = df.height();
    let df = normalize_text_columns(df)?;

    let mut keep = complete_row_mask(&df)?;
    let dropped_incomplete = keep.iter().filter(|k| !**k).count();

    let smoking = df
        .column(SMOKING_HISTORY)
        .map_err(|_| PipelineError::MissingColumn {
            stage: "clean",
            column: SMOKING_HISTORY.to_string(),
        })?
        .str()?;

    let mut dropped_sentinel = 0;
    for (flag, value) in keep.iter_mut().zip(smoking.into_iter()) {
        if *flag && value == Some(SMOKING_SENTINEL) {
            *flag = false;
            dropped_sentinel += 1;
        }
    }

    let lines: Vec<usize> = keep
        .iter()
        .enumerate()
        .filter(|(_, kept)| **kept)
        .map(|(row, _)| row + 2)
        .collect();

    let mask: BooleanChunked = keep.into_iter().collect();
    let cleaned = df.filter(&mask)?;
    let rows_after = cleaned.height();

    Ok((
        cleaned,
        CleaningStats {
            rows_before,
            dropped_incomplete,
            dropped_sentinel,
            rows_after,
        },
        lines,
    ))
}

/// Strip surrounding whitespace from every text column
fn normalize_text_columns(df: &DataFrame) -> PipelineResult<DataFrame> {
    let mut trimmed_columns = Vec::new();
    for column in df.get_columns() {
        if column.dtype() == &DataType::String {
            let trimmed: StringChunked = column.str()?.into_iter().map(|v| v.map(str::trim)).collect();
            trimmed_columns.push(trimmed.with_name(column.name().clone()));
        }
    }

    let mut out = df.clone();
    for column in trimmed_columns {
        out.with_column(column)?;
    }
    Ok(out)
}

/// One flag per row: true when every field is present
fn complete_row_mask(df: &DataFrame) -> PipelineResult<Vec<bool>> {
    let mut keep = vec![true; df.height()];
    for column in df.get_columns() {
        for (flag, present) in keep.iter_mut().zip(presence_flags(column)?) {
            *flag &= present;
        }
    }
    Ok(keep)
}

/// One flag per cell: false for null, NaN, or blank text.
///
/// Goes through the typed chunked arrays so frames with several chunks
/// are walked in full.
fn presence_flags(column: &Column) -> PipelineResult<Vec<bool>> {
    let flags = match column.dtype() {
        DataType::String => column
            .str()?
            .into_iter()
            .map(|v| v.is_some_and(|s| !s.trim().is_empty()))
            .collect(),
        DataType::Float64 => column
            .f64()?
            .into_iter()
            .map(|v| v.is_some_and(|x| !x.is_nan()))
            .collect(),
        DataType::Float32 => column
            .f32()?
            .into_iter()
            .map(|v| v.is_some_and(|x| !x.is_nan()))
            .collect(),
        _ => {
            let nulls = column.is_null();
            nulls.into_iter().map(|v| v != Some(true)).collect()
        }
    };
    Ok(flags)
}
