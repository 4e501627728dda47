//! relogit: logistic regression under class resampling
//!
//! Loads the diabetes dataset, cleans, encodes and standardizes it, makes one
//! stratified split, then fits and scores a logistic regression for each
//! requested resampling strategy.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use relogit::cli::Cli;
use relogit::pipeline::{
    dataset_stats, load_dataset, prepare_dataset, run_model, stratified_split,
    validate_train_ratio, EncodingTables, ExperimentReport,
};
use relogit::pipeline::schema::TARGET;
use relogit::report::{
    display_cleaning, display_comparison, display_exploration, display_run, display_scaling,
    export_experiment_report,
};
use relogit::utils::{
    create_spinner, finish_with_failure, finish_with_success, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_step_time, print_success,
    print_warning,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.experiment_config();
    let report_path = cli.report_path();

    validate_train_ratio(config.train_ratio)?;

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&config, report_path.as_deref());

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading CSV...");
    let raw = match load_dataset(&config.input) {
        Ok(df) => df,
        Err(e) => {
            finish_with_failure(&spinner, "Failed to load dataset");
            return Err(e).with_context(|| format!("Could not load {}", config.input.display()));
        }
    };
    finish_with_success(&spinner, "Dataset loaded");

    let (rows, cols, memory_mb) = dataset_stats(&raw);
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);
    print_step_time(step_start.elapsed());

    // Step 2: Clean, encode, explore, standardize
    print_step_header(2, "Prepare Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Cleaning, encoding and standardizing...");
    let prepared = match prepare_dataset(&raw, &EncodingTables::standard()) {
        Ok(p) => p,
        Err(e) => {
            finish_with_failure(&spinner, "Preparation failed");
            return Err(e.into());
        }
    };
    finish_with_success(&spinner, "Dataset prepared");
    drop(raw);

    display_cleaning(&prepared.missing, &prepared.cleaning);
    display_exploration(&prepared.exploration);
    display_scaling(&prepared.scaling);
    print_step_time(step_start.elapsed());

    // Step 3: Stratified split
    print_step_header(3, "Stratified Split");
    let step_start = Instant::now();
    let split = stratified_split(&prepared.frame, TARGET, config.train_ratio, config.seed)?;
    print_success("Split complete");
    print_count("training rows", split.train.height(), None);
    print_count("test rows", split.test.height(), Some("(shared by every model)"));
    print_step_time(step_start.elapsed());

    // Step 4..: one model per resampling strategy
    let mut runs = Vec::with_capacity(config.methods.len());
    for (offset, method) in config.methods.iter().enumerate() {
        print_step_header(4 + offset as u8, &format!("Model: {}", method.label()));
        let step_start = Instant::now();
        let spinner = create_spinner(&format!("Resampling ({}) and fitting...", method));
        let run = match run_model(&split, *method, config.seed, &config.fit, config.positive_class) {
            Ok(run) => run,
            Err(e) => {
                finish_with_failure(&spinner, &format!("{} model failed", method.label()));
                return Err(e.into());
            }
        };
        finish_with_success(
            &spinner,
            &format!(
                "{} model converged in {} iterations",
                run.label, run.model.diagnostics.iterations
            ),
        );

        if run.model.diagnostics.extreme_fitted > 0 {
            print_warning(&format!(
                "{} fitted probabilities numerically 0 or 1 occurred",
                run.model.diagnostics.extreme_fitted
            ));
        }

        display_run(&run);
        print_step_time(step_start.elapsed());
        runs.push(run);
    }

    display_comparison(&runs, config.positive_class);

    let report = ExperimentReport::new(prepared, &split, runs);

    match report_path {
        Some(path) => {
            export_experiment_report(&report, &config, &path)?;
            println!();
            print_info(&format!("Report saved to {}", style(path.display()).cyan()));
        }
        None => {
            println!();
            print_info("JSON export skipped (--no-export)");
        }
    }

    print_completion();

    Ok(())
}
