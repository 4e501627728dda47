//! Terminal tables for the preparation steps, each fitted model, and the
//! side-by-side comparison of resampling strategies

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{
    CleaningStats, ColumnScaling, ConfusionMatrix, DerivedRates, Exploration, LogisticModel,
    PositiveClass, RunResult,
};

/// Printed under every comparison: scaling parameters are estimated on the
/// full cleaned frame before the split
pub const SCALING_LEAKAGE_NOTE: &str =
    "continuous columns were standardized on the full cleaned dataset before splitting; test statistics leak into training";

/// Render a rate that may have a zero denominator
pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(value) => format!("{:.4}", value),
        None => "undefined".to_string(),
    }
}

/// Render a p-value the way regression summaries usually do
pub fn format_p_value(p: f64) -> String {
    if p < 2e-16 {
        "<2e-16".to_string()
    } else if p < 1e-4 {
        format!("{:.2e}", p)
    } else {
        format!("{:.4}", p)
    }
}

fn significance_stars(p: f64) -> &'static str {
    if p < 0.001 {
        "***"
    } else if p < 0.01 {
        "**"
    } else if p < 0.05 {
        "*"
    } else if p < 0.1 {
        "."
    } else {
        ""
    }
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

fn print_section(icon: &str, title: &str) {
    println!();
    println!(
        "    {} {}",
        style(icon).cyan(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

/// Rows before and after cleaning, plus the raw missing-value ratios
pub fn cleaning_table(missing: &[(String, f64)], stats: &CleaningStats) -> Table {
    let mut table = new_table(&["Metric", "Value"]);

    table.add_row(vec![Cell::new("📁 Rows loaded"), Cell::new(stats.rows_before)]);
    table.add_row(vec![
        Cell::new("🗑️  Dropped (incomplete)"),
        Cell::new(stats.dropped_incomplete).fg(if stats.dropped_incomplete == 0 {
            Color::White
        } else {
            Color::Red
        }),
    ]);
    table.add_row(vec![
        Cell::new("🗑️  Dropped (\"No Info\")"),
        Cell::new(stats.dropped_sentinel).fg(if stats.dropped_sentinel == 0 {
            Color::White
        } else {
            Color::Red
        }),
    ]);
    table.add_row(vec![
        Cell::new("✅ Rows kept"),
        Cell::new(stats.rows_after)
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]);

    for (column, ratio) in missing.iter().filter(|(_, ratio)| *ratio > 0.0) {
        table.add_row(vec![
            Cell::new(format!("   missing in {}", column)),
            Cell::new(format!("{:.2}%", ratio * 100.0)).fg(Color::Yellow),
        ]);
    }

    table
}

/// Per-column statistics split by class
pub fn column_summary_table(exploration: &Exploration) -> Table {
    let mut table = new_table(&["Column", "Mean", "Std", "Min", "Max", "Mean (0)", "Mean (1)"]);
    let opt = |v: Option<f64>| v.map(|x| format!("{:.3}", x)).unwrap_or_else(|| "-".to_string());

    for summary in &exploration.columns {
        table.add_row(vec![
            Cell::new(&summary.column),
            Cell::new(format!("{:.3}", summary.mean)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.3}", summary.std_dev)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.3}", summary.min)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.3}", summary.max)).set_alignment(CellAlignment::Right),
            Cell::new(opt(summary.mean_class_0)).set_alignment(CellAlignment::Right),
            Cell::new(opt(summary.mean_class_1)).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// Chi-square independence tests of nominal columns against the target
pub fn chi_square_table(exploration: &Exploration) -> Table {
    let mut table = new_table(&["Column", "Levels", "X²", "df", "p-value"]);

    for test in &exploration.chi_square {
        let statistic = if test.yates_corrected {
            format!("{:.3} (Yates)", test.statistic)
        } else {
            format!("{:.3}", test.statistic)
        };
        table.add_row(vec![
            Cell::new(&test.column),
            Cell::new(test.observed.len()),
            Cell::new(statistic).set_alignment(CellAlignment::Right),
            Cell::new(test.degrees_of_freedom),
            Cell::new(
                test.p_value
                    .map(format_p_value)
                    .unwrap_or_else(|| "undefined".to_string()),
            )
            .set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// Estimates, standard errors and significance for one model
pub fn coefficient_table(model: &LogisticModel) -> Table {
    let mut table = new_table(&["Term", "Estimate", "Std. Error", "z", "Pr(>|z|)", "", "Odds ratio"]);

    for coef in model.terms() {
        let stars = significance_stars(coef.p_value);
        table.add_row(vec![
            Cell::new(&coef.name),
            Cell::new(format!("{:.5}", coef.estimate)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.5}", coef.std_error)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.3}", coef.z_value)).set_alignment(CellAlignment::Right),
            Cell::new(format_p_value(coef.p_value)).set_alignment(CellAlignment::Right),
            Cell::new(stars).fg(Color::Yellow),
            Cell::new(format!("{:.4}", coef.odds_ratio())).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// 2x2 matrix with actual classes as rows and predictions as columns
pub fn confusion_table(matrix: &ConfusionMatrix) -> Table {
    let mut table = new_table(&["Actual \\ Predicted", "0", "1"]);
    table.add_row(vec![
        Cell::new("0").add_attribute(Attribute::Bold),
        Cell::new(matrix.true_negative).fg(Color::Green),
        Cell::new(matrix.false_positive).fg(Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("1").add_attribute(Attribute::Bold),
        Cell::new(matrix.false_negative).fg(Color::Red),
        Cell::new(matrix.true_positive).fg(Color::Green),
    ]);
    table
}

fn rate_cells(rates: &DerivedRates) -> Vec<Cell> {
    [rates.ppv, rates.npv, rates.sensitivity, rates.specificity]
        .into_iter()
        .map(|r| {
            let cell = Cell::new(format_rate(r)).set_alignment(CellAlignment::Right);
            if r.is_none() {
                cell.fg(Color::Yellow)
            } else {
                cell
            }
        })
        .collect()
}

/// One row per run so the strategies can be read side by side
pub fn comparison_table(runs: &[RunResult]) -> Table {
    let mut table = new_table(&[
        "Model",
        "Train rows",
        "Accuracy",
        "PPV",
        "NPV",
        "Sensitivity",
        "Specificity",
        "AIC",
    ]);

    for run in runs {
        let mut row = vec![
            Cell::new(&run.label).add_attribute(Attribute::Bold),
            Cell::new(run.resample.rows_after()),
            Cell::new(format_rate(run.evaluation.accuracy)).set_alignment(CellAlignment::Right),
        ];
        row.extend(rate_cells(&run.evaluation.rates));
        row.push(
            Cell::new(format!("{:.1}", run.model.diagnostics.aic)).set_alignment(CellAlignment::Right),
        );
        table.add_row(row);
    }

    table
}

/// Show the cleaning outcome
pub fn display_cleaning(missing: &[(String, f64)], stats: &CleaningStats) {
    print_section("🧹", "CLEANING SUMMARY");
    print_indented(&cleaning_table(missing, stats));
}

/// Show class balance, continuous summaries and chi-square tests
pub fn display_exploration(exploration: &Exploration) {
    let balance = &exploration.balance;
    print_section("🔎", "EXPLORATORY SUMMARY");
    println!(
        "      class 0: {}   class 1: {}   positive rate: {}   imbalance: {}",
        style(balance.negatives).yellow().bold(),
        style(balance.positives).yellow().bold(),
        style(format!("{:.2}%", balance.positive_rate * 100.0)).yellow(),
        style(format!("{:.2}:1", balance.imbalance_ratio)).yellow()
    );
    println!();
    print_indented(&column_summary_table(exploration));
    println!();
    print_indented(&chi_square_table(exploration));
}

/// Show the mean and standard deviation used for each standardized column
pub fn display_scaling(scaling: &[ColumnScaling]) {
    let mut table = new_table(&["Column", "Mean", "Std (n-1)"]);
    for s in scaling {
        table.add_row(vec![
            Cell::new(&s.column),
            Cell::new(format!("{:.4}", s.mean)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.4}", s.std_dev)).set_alignment(CellAlignment::Right),
        ]);
    }
    print_section("📏", "STANDARDIZATION");
    print_indented(&table);
}

/// Show one fitted model with its evaluation
pub fn display_run(run: &RunResult) {
    let diag = &run.model.diagnostics;
    print_section("📈", &format!("MODEL: {}", run.label.to_uppercase()));
    println!(
        "      train class counts {:?} -> {:?}",
        run.resample.counts_before, run.resample.counts_after
    );
    println!(
        "      {} iterations   null deviance {:.2}   residual deviance {:.2}   AIC {:.2}",
        diag.iterations, diag.null_deviance, diag.residual_deviance, diag.aic
    );
    println!();
    print_indented(&coefficient_table(&run.model));
    println!(
        "      {}",
        style("Signif. codes: 0 '***' 0.001 '**' 0.01 '*' 0.05 '.' 0.1 ' ' 1").dim()
    );
    println!();
    print_indented(&confusion_table(&run.evaluation.confusion_matrix));
}

/// Show all runs side by side, followed by the rate convention and the
/// scaling caveat
pub fn display_comparison(runs: &[RunResult], positive: PositiveClass) {
    print_section("📋", "MODEL COMPARISON");
    print_indented(&comparison_table(runs));
    println!();
    println!("      {} {}", style("Note:").cyan(), style(positive.describe()).dim());
    println!(
        "      {} {}",
        style("Note:").cyan(),
        style(SCALING_LEAKAGE_NOTE).dim()
    );
}
