//! Benchmark IRLS fitting and resampling on synthetic prepared data
//!
//! Run with: cargo bench --bench fit_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polars::prelude::*;
use rand::prelude::*;
use rand::SeedableRng;

use relogit::pipeline::{fit_logistic, resample, FitOptions, ResampleMethod};

/// Standardized-looking features with a noisy logistic outcome, ~15% positive
fn generate_prepared_dataframe(n_rows: usize, seed: u64) -> DataFrame {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let continuous: Vec<Vec<f64>> = (0..4)
        .map(|_| (0..n_rows).map(|_| rng.gen::<f64>() * 3.4 - 1.7).collect())
        .collect();
    let gender: Vec<i64> = (0..n_rows).map(|_| rng.gen_range(0..3)).collect();
    let smoking: Vec<i64> = (0..n_rows).map(|_| rng.gen_range(0..3)).collect();
    let hypertension: Vec<i64> = (0..n_rows).map(|_| i64::from(rng.gen_bool(0.25))).collect();
    let heart_disease: Vec<i64> = (0..n_rows).map(|_| i64::from(rng.gen_bool(0.2))).collect();

    let diabetes: Vec<i64> = (0..n_rows)
        .map(|i| {
            let logit = -2.2
                + 0.4 * continuous[0][i]
                + 0.3 * continuous[1][i]
                + 1.3 * continuous[2][i]
                + 0.9 * continuous[3][i]
                + 0.5 * hypertension[i] as f64;
            i64::from(rng.gen::<f64>() < 1.0 / (1.0 + (-logit).exp()))
        })
        .collect();

    df! {
        "age" => &continuous[0],
        "hypertension" => hypertension,
        "heart_disease" => heart_disease,
        "bmi" => &continuous[1],
        "HbA1c_level" => &continuous[2],
        "blood_glucose_level" => &continuous[3],
        "diabetes" => diabetes,
        "gender_code" => gender,
        "smoking_code" => smoking,
    }
    .expect("Failed to create DataFrame")
}

/// Benchmark IRLS for varying training set sizes
fn benchmark_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("irls_fit");
    let options = FitOptions::default();

    for n_rows in [1_000, 10_000, 50_000] {
        let df = generate_prepared_dataframe(n_rows, 42);
        group.throughput(Throughput::Elements(n_rows as u64));

        group.bench_with_input(BenchmarkId::new("fit_logistic", n_rows), &df, |b, df| {
            b.iter(|| {
                let _ = fit_logistic(black_box(df), black_box("diabetes"), black_box(&options));
            });
        });
    }

    group.finish();
}

/// Benchmark the two resampling strategies on the same frame
fn benchmark_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample");
    let df = generate_prepared_dataframe(50_000, 7);

    for method in [ResampleMethod::Over, ResampleMethod::Under] {
        group.bench_with_input(BenchmarkId::new("resample", method), &df, |b, df| {
            b.iter(|| {
                let _ = resample(black_box(df), black_box("diabetes"), method, black_box(42));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_fit, benchmark_resample);
criterion_main!(benches);
