//! Tests for cleaning, encoding, exploration and standardization on a
//! loaded file

use polars::prelude::*;
use relogit::pipeline::schema::{CONTINUOUS_COLUMNS, TARGET};
use relogit::pipeline::{
    analyze_missing_values, clean_dataset, column_values, encode_categoricals, load_dataset,
    prepare_dataset, standardize_columns, EncodingTables, PipelineError,
};

#[path = "common/mod.rs"]
mod common;

use common::{small_raw_lines, write_csv, HEADER};

#[test]
fn test_clean_drops_incomplete_and_sentinel_rows() {
    let (_dir, path) = write_csv(&small_raw_lines());
    let raw = load_dataset(&path).unwrap();

    let (cleaned, stats) = clean_dataset(&raw).unwrap();

    assert_eq!(stats.rows_before, 10);
    assert_eq!(stats.dropped_incomplete, 2);
    assert_eq!(stats.dropped_sentinel, 1);
    assert_eq!(stats.rows_after, 7);
    assert_eq!(cleaned.height(), 7);

    let smoking = cleaned.column("smoking_history").unwrap().str().unwrap();
    assert!(smoking.into_iter().all(|v| v != Some("No Info")));

    // Whitespace around categories is stripped
    let gender = cleaned.column("gender").unwrap().str().unwrap();
    assert!(gender.into_iter().any(|v| v == Some("Male")));
    assert!(gender.into_iter().all(|v| v != Some(" Male ")));
}

#[test]
fn test_missing_ratios_before_cleaning() {
    let (_dir, path) = write_csv(&small_raw_lines());
    let raw = load_dataset(&path).unwrap();

    let ratios = analyze_missing_values(&raw).unwrap();
    let bmi = ratios.iter().find(|(c, _)| c == "bmi").unwrap().1;
    let age = ratios.iter().find(|(c, _)| c == "age").unwrap().1;

    assert!((bmi - 0.1).abs() < 1e-12);
    assert_eq!(age, 0.0);
    // Sorted descending
    assert!(ratios.windows(2).all(|w| w[0].1 >= w[1].1));
}

#[test]
fn test_unknown_smoking_category_fails_encoding() {
    let (_dir, path) = write_csv(&[
        HEADER,
        "Female,80.0,0,1,never,25.19,6.6,140,0",
        "Male,28.0,0,0,Unknown,27.32,5.7,158,1",
    ]);
    let raw = load_dataset(&path).unwrap();
    let (cleaned, _) = clean_dataset(&raw).unwrap();

    let err = encode_categoricals(&cleaned, &EncodingTables::standard()).unwrap_err();
    assert!(
        matches!(err, PipelineError::UnknownCategory { ref value, .. } if value == "Unknown"),
        "Expected UnknownCategory, got {err}"
    );
}

#[test]
fn test_unknown_category_names_the_file_line() {
    let (_dir, path) = write_csv(&[
        HEADER,
        "Female,80.0,0,1,No Info,25.19,6.6,140,0",
        "Male,28.0,0,0,No Info,27.32,5.7,158,1",
        "Male,54.0,0,0,Unknown,31.10,5.9,120,0",
    ]);
    let raw = load_dataset(&path).unwrap();

    let err = prepare_dataset(&raw, &EncodingTables::standard()).unwrap_err();
    assert!(
        matches!(err, PipelineError::UnknownCategory { line: 4, .. }),
        "Expected line 4, got {err}"
    );
    assert!(err.to_string().contains("line 4"));
}

#[test]
fn test_encoding_twice_is_a_no_op() {
    let (_dir, path) = write_csv(&small_raw_lines());
    let raw = load_dataset(&path).unwrap();
    let (cleaned, _) = clean_dataset(&raw).unwrap();
    let tables = EncodingTables::standard();

    let once = encode_categoricals(&cleaned, &tables).unwrap();
    let twice = encode_categoricals(&once, &tables).unwrap();

    assert!(once.equals(&twice));
}

#[test]
fn test_standardized_columns_have_zero_mean_unit_std() {
    let (_dir, path) = write_csv(&small_raw_lines());
    let raw = load_dataset(&path).unwrap();
    let (cleaned, _) = clean_dataset(&raw).unwrap();
    let encoded = encode_categoricals(&cleaned, &EncodingTables::standard()).unwrap();

    let (scaled, params) = standardize_columns(&encoded, &CONTINUOUS_COLUMNS).unwrap();
    assert_eq!(params.len(), 4);

    for name in CONTINUOUS_COLUMNS {
        let values = column_values(&scaled, name, "test").unwrap();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        assert!(mean.abs() < 1e-9, "{name} mean was {mean}");
        assert!((var.sqrt() - 1.0).abs() < 1e-9, "{name} std was {}", var.sqrt());
    }

    // Target and nominal columns untouched
    for name in [TARGET, "hypertension"] {
        let before = encoded.column(name).unwrap().as_materialized_series();
        let after = scaled.column(name).unwrap().as_materialized_series();
        assert!(after.equals(before), "{name} changed");
    }
}

#[test]
fn test_constant_column_cannot_be_standardized() {
    let df = df! {
        "age" => [50.0f64, 50.0, 50.0],
        "diabetes" => [0i64, 1, 0],
    }
    .unwrap();

    let err = standardize_columns(&df, &["age"]).unwrap_err();
    assert!(matches!(err, PipelineError::DegenerateColumn { ref column } if column == "age"));
}

#[test]
fn test_prepare_dataset_runs_every_step() {
    let (_dir, path) = write_csv(&small_raw_lines());
    let raw = load_dataset(&path).unwrap();

    let prepared = prepare_dataset(&raw, &EncodingTables::standard()).unwrap();

    assert_eq!(prepared.cleaning.rows_after, 7);
    assert_eq!(prepared.frame.height(), 7);
    assert_eq!(prepared.scaling.len(), 4);
    assert_eq!(prepared.exploration.balance.negatives, 6);
    assert_eq!(prepared.exploration.balance.positives, 1);
    assert_eq!(prepared.exploration.chi_square.len(), 4);

    let names = prepared.frame.get_column_names_str();
    assert!(names.contains(&"gender_code"));
    assert!(names.contains(&"smoking_code"));
    assert!(!names.contains(&"gender"));
}
