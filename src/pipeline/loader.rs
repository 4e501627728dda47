//! Dataset loader for the diabetes CSV file
//!
//! Loading happens in two passes: a structural scan with the `csv` crate that
//! rejects ragged rows and a bad header, then a polars read where every column
//! arrives as text and is parsed into its declared type.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use super::error::{PipelineError, PipelineResult};
use super::schema::{raw_column_names, ColumnKind, RAW_SCHEMA};

/// Load the dataset with columns typed as declared in the schema.
///
/// Fails with `Io` when the file is missing or unreadable and with `Parse`
/// when the header does not name exactly the nine raw columns, a row has a
/// different field count than the header, or a value does not parse.
pub fn load_dataset(path: &Path) -> PipelineResult<DataFrame> {
    let headers = scan_structure(path)?;
    validate_header(&headers)?;

    // Infer nothing: every column is read as text and parsed below so that
    // a bad value is reported with its column and line.
    let raw = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()
        .and_then(|lf| lf.collect())
        .map_err(|e| PipelineError::Parse {
            message: format!("failed to read CSV file {}: {}", path.display(), e),
        })?;

    let mut columns = Vec::with_capacity(RAW_SCHEMA.len());
    for (name, kind) in RAW_SCHEMA {
        columns.push(parse_column(&raw, name, kind)?);
    }

    let mut df = DataFrame::new(columns)?;
    df.rechunk_mut();
    Ok(df)
}

/// Shape and estimated in-memory size (MB) of a loaded frame
pub fn dataset_stats(df: &DataFrame) -> (usize, usize, f64) {
    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
    (rows, cols, memory_mb)
}

fn open(path: &Path) -> PipelineResult<File> {
    File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Walk every record once, failing on the first row whose field count
/// differs from the header. Returns the trimmed header names.
fn scan_structure(path: &Path) -> PipelineResult<Vec<String>> {
    let file = open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut record = csv::ByteRecord::new();
    loop {
        match reader.read_byte_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => return Err(csv_error(path, e)),
        }
    }

    Ok(headers)
}

fn csv_error(path: &Path, err: csv::Error) -> PipelineError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => PipelineError::Io {
            path: path.to_path_buf(),
            source,
        },
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => {
            let line = pos
                .map(|p| p.line().to_string())
                .unwrap_or_else(|| "?".to_string());
            PipelineError::Parse {
                message: format!(
                    "inconsistent column count in {} at line {}: expected {} fields, found {}",
                    path.display(),
                    line,
                    expected_len,
                    len
                ),
            }
        }
        _ => PipelineError::Parse {
            message: format!("malformed CSV file {}: {}", path.display(), message),
        },
    }
}

fn validate_header(headers: &[String]) -> PipelineResult<()> {
    let expected = raw_column_names();

    let missing: Vec<&str> = expected
        .iter()
        .copied()
        .filter(|name| !headers.iter().any(|h| h == name))
        .collect();
    let unexpected: Vec<&str> = headers
        .iter()
        .map(|h| h.as_str())
        .filter(|h| !expected.contains(h))
        .collect();

    if missing.is_empty() && unexpected.is_empty() && headers.len() == expected.len() {
        return Ok(());
    }

    Err(PipelineError::Parse {
        message: format!(
            "header must name exactly the columns {:?}; missing {:?}, unexpected {:?}",
            expected, missing, unexpected
        ),
    })
}

/// Parse one text column into its declared type. Empty cells become null.
///
/// The raw column is matched on its trimmed header, since polars keeps the
/// header text as written.
fn parse_column(raw: &DataFrame, name: &str, kind: ColumnKind) -> PipelineResult<Column> {
    let text = raw
        .get_columns()
        .iter()
        .find(|c| c.name().as_str().trim() == name)
        .ok_or_else(|| PipelineError::MissingColumn {
            stage: "load",
            column: name.to_string(),
        })?
        .str()?;

    let column = match kind {
        ColumnKind::Text => text.clone().with_name(name.into()).into_column(),
        ColumnKind::Continuous => {
            let mut values: Vec<Option<f64>> = Vec::with_capacity(text.len());
            for (row, cell) in text.into_iter().enumerate() {
                values.push(match non_empty(cell) {
                    None => None,
                    Some(s) => Some(s.parse::<f64>().map_err(|_| bad_value(name, row, s))?),
                });
            }
            Column::new(name.into(), values)
        }
        ColumnKind::Binary => {
            let mut values: Vec<Option<i64>> = Vec::with_capacity(text.len());
            for (row, cell) in text.into_iter().enumerate() {
                values.push(match non_empty(cell) {
                    None => None,
                    Some(s) => match parse_integer(s).ok_or_else(|| bad_value(name, row, s))? {
                        flag @ (0 | 1) => Some(flag),
                        _ => return Err(not_binary(name, row, s)),
                    },
                });
            }
            Column::new(name.into(), values)
        }
    };

    Ok(column)
}

fn non_empty(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim).filter(|s| !s.is_empty())
}

/// Integers written as floats ("1.0") are accepted as long as they are whole.
fn parse_integer(s: &str) -> Option<i64> {
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}

fn bad_value(column: &str, row: usize, value: &str) -> PipelineError {
    PipelineError::Parse {
        message: format!(
            "column '{}' line {}: cannot parse '{}' as a number",
            column,
            row + 2,
            value
        ),
    }
}

fn not_binary(column: &str, row: usize, value: &str) -> PipelineError {
    PipelineError::Parse {
        message: format!(
            "column '{}' line {}: expected 0 or 1, found '{}'",
            column,
            row + 2,
            value
        ),
    }
}
