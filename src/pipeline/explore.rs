//! Exploratory summaries of the cleaned, encoded dataset
//!
//! Class balance, per-column descriptive statistics split by class, and
//! Pearson chi-square tests of independence between each nominal column and
//! the target.

use std::collections::BTreeMap;

use polars::prelude::*;
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use super::error::PipelineResult;
use super::scale::{column_values, mean_and_sample_std};
use super::target::{class_counts, target_labels};

/// Target class counts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassBalance {
    pub negatives: usize,
    pub positives: usize,
    pub positive_rate: f64,
    /// Majority count over minority count
    pub imbalance_ratio: f64,
}

/// Descriptive statistics of one continuous column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub mean_class_0: Option<f64>,
    pub mean_class_1: Option<f64>,
}

/// Chi-square test of independence between a nominal column and the target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquareTest {
    pub column: String,
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    /// None when the table has fewer than two levels on either axis
    pub p_value: Option<f64>,
    /// Yates continuity correction, applied to 2x2 tables
    pub yates_corrected: bool,
    /// Observed counts per level as [class 0, class 1]
    pub observed: BTreeMap<i64, [usize; 2]>,
}

/// Everything the exploratory step reports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exploration {
    pub balance: ClassBalance,
    pub columns: Vec<ColumnSummary>,
    pub chi_square: Vec<ChiSquareTest>,
}

pub fn class_balance(df: &DataFrame, target: &str) -> PipelineResult<ClassBalance> {
    let labels = target_labels(df, target, "explore")?;
    let (negatives, positives) = class_counts(&labels);
    let total = negatives + positives;

    let positive_rate = if total == 0 {
        0.0
    } else {
        positives as f64 / total as f64
    };
    let minority = negatives.min(positives);
    let imbalance_ratio = if minority == 0 {
        f64::INFINITY
    } else {
        negatives.max(positives) as f64 / minority as f64
    };

    Ok(ClassBalance {
        negatives,
        positives,
        positive_rate,
        imbalance_ratio,
    })
}

pub fn describe_columns(
    df: &DataFrame,
    columns: &[&str],
    target: &str,
) -> PipelineResult<Vec<ColumnSummary>> {
    let labels = target_labels(df, target, "explore")?;
    let mut summaries = Vec::with_capacity(columns.len());

    for &name in columns {
        let values = column_values(df, name, "explore")?;
        let (mean, std_dev) = mean_and_sample_std(&values)
            .unwrap_or_else(|| (values.first().copied().unwrap_or(f64::NAN), 0.0));
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let class_mean = |class: i64| {
            let (sum, count) = values
                .iter()
                .zip(&labels)
                .filter(|(_, &l)| l == class)
                .fold((0.0, 0usize), |(s, c), (&v, _)| (s + v, c + 1));
            (count > 0).then(|| sum / count as f64)
        };

        summaries.push(ColumnSummary {
            column: name.to_string(),
            mean,
            std_dev,
            min,
            max,
            mean_class_0: class_mean(0),
            mean_class_1: class_mean(1),
        });
    }

    Ok(summaries)
}

/// Pearson chi-square test of a nominal integer column against the target.
///
/// 2x2 tables get the Yates continuity correction, matching the usual
/// statistical package default.
pub fn chi_square_independence(
    df: &DataFrame,
    column: &str,
    target: &str,
) -> PipelineResult<ChiSquareTest> {
    let labels = target_labels(df, target, "explore")?;
    let values = column_values(df, column, "explore")?;

    let mut observed: BTreeMap<i64, [usize; 2]> = BTreeMap::new();
    for (&value, &label) in values.iter().zip(&labels) {
        observed.entry(value.round() as i64).or_insert([0, 0])[label as usize] += 1;
    }

    let class_totals = observed
        .values()
        .fold([0usize; 2], |acc, row| [acc[0] + row[0], acc[1] + row[1]]);
    let total = (class_totals[0] + class_totals[1]) as f64;
    let populated_classes = class_totals.iter().filter(|&&t| t > 0).count();

    let rows = observed.len();
    if rows < 2 || populated_classes < 2 {
        return Ok(ChiSquareTest {
            column: column.to_string(),
            statistic: 0.0,
            degrees_of_freedom: 0,
            p_value: None,
            yates_corrected: false,
            observed,
        });
    }

    let yates = rows == 2;
    let mut statistic = 0.0;
    for row in observed.values() {
        let row_total = (row[0] + row[1]) as f64;
        for (class, &count) in row.iter().enumerate() {
            let expected = row_total * class_totals[class] as f64 / total;
            let mut deviation = (count as f64 - expected).abs();
            if yates {
                deviation -= deviation.min(0.5);
            }
            statistic += deviation * deviation / expected;
        }
    }

    let degrees_of_freedom = rows - 1;
    let p_value = ChiSquared::new(degrees_of_freedom as f64)
        .ok()
        .map(|dist| dist.sf(statistic));

    Ok(ChiSquareTest {
        column: column.to_string(),
        statistic,
        degrees_of_freedom,
        p_value,
        yates_corrected: yates,
        observed,
    })
}

/// Run every exploratory summary
pub fn explore_dataset(
    df: &DataFrame,
    target: &str,
    continuous: &[&str],
    nominal: &[&str],
) -> PipelineResult<Exploration> {
    Ok(Exploration {
        balance: class_balance(df, target)?,
        columns: describe_columns(df, continuous, target)?,
        chi_square: nominal
            .iter()
            .map(|name| chi_square_independence(df, name, target))
            .collect::<PipelineResult<Vec<_>>>()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_balance() {
        let df = df! {
            "diabetes" => [0i64, 0, 0, 0, 0, 0, 0, 0, 1, 1],
        }
        .unwrap();

        let balance = class_balance(&df, "diabetes").unwrap();
        assert_eq!(balance.negatives, 8);
        assert_eq!(balance.positives, 2);
        assert!((balance.positive_rate - 0.2).abs() < 1e-12);
        assert!((balance.imbalance_ratio - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_describe_columns_by_class() {
        let df = df! {
            "age" => [10.0f64, 20.0, 30.0, 40.0],
            "diabetes" => [0i64, 0, 1, 1],
        }
        .unwrap();

        let summary = &describe_columns(&df, &["age"], "diabetes").unwrap()[0];
        assert_eq!(summary.mean, 25.0);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 40.0);
        assert_eq!(summary.mean_class_0, Some(15.0));
        assert_eq!(summary.mean_class_1, Some(35.0));
    }

    #[test]
    fn test_chi_square_three_levels() {
        // Level 0: 30/10, level 1: 20/20, level 2: 10/30. Uncorrected Pearson.
        let mut level = Vec::new();
        let mut target = Vec::new();
        for (code, negatives, positives) in [(0i64, 30, 10), (1, 20, 20), (2, 10, 30)] {
            for _ in 0..negatives {
                level.push(code);
                target.push(0i64);
            }
            for _ in 0..positives {
                level.push(code);
                target.push(1i64);
            }
        }
        let df = df! {
            "smoking_code" => level,
            "diabetes" => target,
        }
        .unwrap();

        let test = chi_square_independence(&df, "smoking_code", "diabetes").unwrap();
        // Expected 20 everywhere: (100 + 100 + 0 + 0 + 100 + 100) / 20
        assert!((test.statistic - 20.0).abs() < 1e-9);
        assert_eq!(test.degrees_of_freedom, 2);
        assert!(!test.yates_corrected);
        // chi2(2) survival at 20 is exp(-10)
        assert!((test.p_value.unwrap() - (-10.0f64).exp()).abs() < 1e-9);
        assert_eq!(test.observed[&2], [10, 30]);
    }

    #[test]
    fn test_chi_square_two_by_two_uses_yates() {
        let df = df! {
            "hypertension" => [0i64, 0, 0, 0, 1, 1, 1, 1],
            "diabetes" => [0i64, 0, 0, 1, 0, 1, 1, 1],
        }
        .unwrap();

        let test = chi_square_independence(&df, "hypertension", "diabetes").unwrap();
        // Expected 2 in every cell, |O - E| = 1, corrected to 0.5: 4 * 0.25 / 2
        assert!(test.yates_corrected);
        assert!((test.statistic - 0.5).abs() < 1e-12);
        assert_eq!(test.degrees_of_freedom, 1);
    }

    #[test]
    fn test_chi_square_single_level() {
        let df = df! {
            "heart_disease" => [0i64, 0, 0],
            "diabetes" => [0i64, 1, 0],
        }
        .unwrap();

        let test = chi_square_independence(&df, "heart_disease", "diabetes").unwrap();
        assert_eq!(test.p_value, None);
        assert_eq!(test.degrees_of_freedom, 0);
    }
}
