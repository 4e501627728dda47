//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Header of the raw dataset, in file order
pub const HEADER: &str = "gender,age,hypertension,heart_disease,smoking_history,bmi,HbA1c_level,blood_glucose_level,diabetes";

/// Write a CSV file with the given lines (header included) into a fresh
/// temporary directory
pub fn write_csv(lines: &[&str]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("diabetes.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }

    (temp_dir, csv_path)
}

/// Ten raw records: two incomplete, one "No Info", seven usable
pub fn small_raw_lines() -> Vec<&'static str> {
    vec![
        HEADER,
        "Female,80.0,0,1,never,25.19,6.6,140,0",
        "Male,28.0,0,0,current,27.32,5.7,158,0",
        "Female,36.0,0,0,No Info,23.45,5.0,155,0",
        "Male,76.0,1,1,current,20.14,4.8,155,0",
        "Female,20.0,0,0,never,,6.6,85,0",
        "Female,44.0,0,0,former,19.31,6.5,200,1",
        " Male ,42.0,0,0,never,33.64,4.8,145,0",
        "Other,32.0,0,0,not current,27.32,5.0,100,0",
        "Female,53.0,1,0,ever,27.32,6.1,,1",
        "Female,54.0,0,0,former,54.7,6.0,100,0",
    ]
}

/// Build a synthetic diabetes dataset where the outcome follows a noisy
/// logistic relationship with the clinical measurements.
///
/// About a fifth of the rows carry the "No Info" smoking sentinel and every
/// column keeps several distinct values in each class, so all three
/// resampling strategies yield a full-rank design.
pub fn synthetic_lines(rows: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut lines = Vec::with_capacity(rows + 1);
    lines.push(HEADER.to_string());

    for _ in 0..rows {
        let gender = match rng.gen_range(0..100) {
            0..=44 => "Male",
            45..=95 => "Female",
            _ => "Other",
        };
        let smoking = match rng.gen_range(0..100) {
            0..=34 => "never",
            35..=54 => "No Info",
            55..=69 => "former",
            70..=84 => "current",
            85..=92 => "not current",
            _ => "ever",
        };
        let age: f64 = rng.gen_range(20.0..80.0);
        let bmi: f64 = rng.gen_range(18.0..40.0);
        let hba1c: f64 = rng.gen_range(4.0..9.0);
        let glucose: i64 = rng.gen_range(80..250);
        let hypertension = i64::from(rng.gen_bool(0.25));
        let heart_disease = i64::from(rng.gen_bool(0.2));

        let logit = -3.0
            + 0.04 * (age - 50.0)
            + 0.08 * (bmi - 28.0)
            + 1.1 * (hba1c - 6.5)
            + 0.015 * (glucose as f64 - 165.0)
            + 0.5 * hypertension as f64
            + 0.5 * heart_disease as f64;
        let p = 1.0 / (1.0 + (-logit).exp());
        let diabetes = i64::from(rng.gen_bool(p));

        lines.push(format!(
            "{},{:.1},{},{},{},{:.2},{:.1},{},{}",
            gender, age, hypertension, heart_disease, smoking, bmi, hba1c, glucose, diabetes
        ));
    }

    lines
}

/// Synthetic dataset written to a temporary CSV file
pub fn create_synthetic_csv(rows: usize, seed: u64) -> (TempDir, PathBuf) {
    let lines = synthetic_lines(rows, seed);
    let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
    write_csv(&refs)
}

/// Encoded frame of ten records, eight negative and two positive, with
/// features that keep the fit away from separation
pub fn create_toy_frame() -> DataFrame {
    df! {
        "gender_code" => [0i64, 1, 1, 0, 1, 0, 1, 0, 1, 0],
        "age" => [-1.2f64, -0.4, 0.3, 1.1, -0.8, 0.6, 1.5, -0.2, 0.9, -1.7],
        "hypertension" => [0i64, 0, 1, 0, 0, 1, 0, 0, 1, 0],
        "heart_disease" => [0i64, 0, 0, 1, 0, 0, 0, 1, 0, 0],
        "smoking_code" => [0i64, 1, 2, 0, 1, 2, 0, 1, 0, 2],
        "bmi" => [0.1f64, -0.5, 1.2, -1.0, 0.4, 0.8, -0.3, -1.4, 1.6, 0.2],
        "HbA1c_level" => [-0.9f64, -0.2, 1.4, 0.3, -1.1, 0.5, -0.6, 0.2, 1.0, -1.3],
        "blood_glucose_level" => [-0.3f64, 0.7, 1.1, -1.2, 0.0, -0.5, 0.9, -0.8, 1.3, -1.0],
        "diabetes" => [0i64, 0, 1, 0, 0, 0, 1, 0, 0, 0],
    }
    .unwrap()
}

/// Labels of a frame's target column as i64
pub fn labels(df: &DataFrame, target: &str) -> Vec<i64> {
    df.column(target)
        .unwrap()
        .as_materialized_series()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}
