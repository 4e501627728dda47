//! Categorical encoding with fixed lookup tables
//!
//! The tables are plain values handed to the encoder so tests (and callers
//! with differently spelled data) can swap them out.

use polars::prelude::*;
use serde::Serialize;

use super::error::{PipelineError, PipelineResult};
use super::schema::{GENDER, GENDER_CODE, SMOKING_CODE, SMOKING_HISTORY};

/// Mapping from raw category text to integer code for one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTable {
    /// Raw text column read by the encoder
    pub column: String,
    /// Integer column written in its place
    pub code_column: String,
    entries: Vec<(String, i64)>,
}

impl CategoryTable {
    pub fn new(column: &str, code_column: &str, entries: &[(&str, i64)]) -> Self {
        Self {
            column: column.to_string(),
            code_column: code_column.to_string(),
            entries: entries
                .iter()
                .map(|(raw, code)| (raw.to_string(), *code))
                .collect(),
        }
    }

    /// Code for a raw value (exact match)
    pub fn code(&self, raw: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(value, _)| value == raw)
            .map(|(_, code)| *code)
    }
}

/// The set of tables applied by `encode_categoricals`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodingTables {
    pub tables: Vec<CategoryTable>,
}

impl EncodingTables {
    /// Gender: Male=0, Female=1, Other=2.
    /// Smoking: never=0, former/not current/ever=1, current=2.
    pub fn standard() -> Self {
        Self {
            tables: vec![
                CategoryTable::new(GENDER, GENDER_CODE, &[("Male", 0), ("Female", 1), ("Other", 2)]),
                CategoryTable::new(
                    SMOKING_HISTORY,
                    SMOKING_CODE,
                    &[
                        ("never", 0),
                        ("former", 1),
                        ("not current", 1),
                        ("ever", 1),
                        ("current", 2),
                    ],
                ),
            ],
        }
    }
}

impl Default for EncodingTables {
    fn default() -> Self {
        Self::standard()
    }
}

/// Replace each raw categorical column by its integer-coded column.
///
/// An unmapped value fails the whole run with `UnknownCategory`. A table
/// whose raw column is gone but whose code column exists has already been
/// applied and is skipped, so re-encoding an encoded frame is a no-op.
///
/// Errors report row `i` as file line `i + 2`; use
/// `encode_categoricals_at_lines` when rows were dropped upstream.
pub fn encode_categoricals(df: &DataFrame, tables: &EncodingTables) -> PipelineResult<DataFrame> {
    let lines: Vec<usize> = (0..df.height()).map(|row| row + 2).collect();
    encode_categoricals_at_lines(df, tables, &lines)
}

/// `encode_categoricals` with the source file line of each row, as returned
/// by `clean_dataset_tracked`.
pub fn encode_categoricals_at_lines(
    df: &DataFrame,
    tables: &EncodingTables,
    lines: &[usize],
) -> PipelineResult<DataFrame> {
    let mut out = df.clone();

    for table in &tables.tables {
        let names = out.get_column_names_str();
        let has_raw = names.contains(&table.column.as_str());
        let has_code = names.contains(&table.code_column.as_str());

        if !has_raw {
            if has_code {
                continue;
            }
            return Err(PipelineError::MissingColumn {
                stage: "encode",
                column: table.column.clone(),
            });
        }

        let codes = encode_column(&out, table, lines)?;
        out = out.drop(&table.column)?;
        out.with_column(Column::new(table.code_column.as_str().into(), codes))?;
    }

    Ok(out)
}

fn encode_column(df: &DataFrame, table: &CategoryTable, lines: &[usize]) -> PipelineResult<Vec<i64>> {
    let column = df.column(&table.column)?;
    let text = column.str().map_err(|_| {
        PipelineError::InvalidConfig(format!(
            "[encode] column '{}' must be text, found {}",
            table.column,
            column.dtype()
        ))
    })?;

    let mut codes = Vec::with_capacity(text.len());
    for (row, value) in text.into_iter().enumerate() {
        let value = value.ok_or_else(|| PipelineError::NullValues {
            stage: "encode",
            column: table.column.clone(),
        })?;
        let code = table
            .code(value)
            .ok_or_else(|| PipelineError::UnknownCategory {
                column: table.column.clone(),
                value: value.to_string(),
                line: lines.get(row).copied().unwrap_or(row + 2),
            })?;
        codes.push(code);
    }

    Ok(codes)
}
