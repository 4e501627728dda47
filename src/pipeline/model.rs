//! Binomial logistic regression fitted by iteratively reweighted least squares
//!
//! Each IRLS step solves the weighted normal equations
//! `(X^T W X) beta = X^T W z` with a Cholesky factorization. The same
//! factorization doubles as the rank check: a pivot that collapses relative
//! to its diagonal entry means the column is (numerically) a linear
//! combination of the columns before it.

use faer::linalg::solvers::{Cholesky, SolverCore, SpSolver};
use faer::{Col, Mat, MatRef, Side};
use polars::prelude::*;
use serde::Serialize;
use statrs::function::erf::erfc;

use super::error::{PipelineError, PipelineResult};
use super::scale::column_values;
use super::target::{class_counts, target_labels};

/// Name used for the intercept term in coefficient tables
pub const INTERCEPT: &str = "(Intercept)";

/// Probabilities are clamped to [EPS, 1 - EPS] inside the working weights
/// and the deviance
const PROB_EPS: f64 = 1e-10;

/// Relative pivot size below which the design is treated as rank-deficient
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Fitted probabilities closer than this to 0 or 1 are counted as extreme
const EXTREME_PROB: f64 = 10.0 * f64::EPSILON;

/// Stopping rule for IRLS
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitOptions {
    pub max_iterations: usize,
    /// Relative deviance change `|dev - dev_old| / (|dev| + 0.1)` at which
    /// the fit is considered converged
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            tolerance: 1e-8,
        }
    }
}

/// One row of the coefficient table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub z_value: f64,
    /// Two-sided p-value from the normal approximation (Wald test)
    pub p_value: f64,
}

impl Coefficient {
    pub fn odds_ratio(&self) -> f64 {
        self.estimate.exp()
    }
}

/// Goodness-of-fit numbers reported alongside the coefficients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitDiagnostics {
    pub observations: usize,
    pub iterations: usize,
    pub null_deviance: f64,
    pub residual_deviance: f64,
    pub aic: f64,
    /// Training rows whose fitted probability is numerically 0 or 1
    pub extreme_fitted: usize,
}

/// A fitted model. Immutable once returned by `fit_logistic`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogisticModel {
    pub target: String,
    pub intercept: Coefficient,
    pub coefficients: Vec<Coefficient>,
    pub diagnostics: FitDiagnostics,
}

impl LogisticModel {
    pub fn feature_names(&self) -> Vec<&str> {
        self.coefficients.iter().map(|c| c.name.as_str()).collect()
    }

    /// Intercept followed by the feature coefficients
    pub fn terms(&self) -> impl Iterator<Item = &Coefficient> {
        std::iter::once(&self.intercept).chain(self.coefficients.iter())
    }

    pub fn linear_predictor(&self, features: &[f64]) -> f64 {
        self.intercept.estimate
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c.estimate * x)
                .sum::<f64>()
    }

    /// P(target = 1) for one feature vector, in `feature_names` order
    pub fn probability(&self, features: &[f64]) -> f64 {
        sigmoid(self.linear_predictor(features))
    }

    /// P(target = 1) for every row of a frame holding the model's features
    pub fn predict_proba(&self, df: &DataFrame) -> PipelineResult<Vec<f64>> {
        let names = self.feature_names();
        let columns = names
            .iter()
            .map(|name| column_values(df, name, "evaluate"))
            .collect::<PipelineResult<Vec<_>>>()?;

        let mut row = vec![0.0; columns.len()];
        let probabilities = (0..df.height())
            .map(|i| {
                for (slot, column) in row.iter_mut().zip(&columns) {
                    *slot = column[i];
                }
                self.probability(&row)
            })
            .collect();

        Ok(probabilities)
    }
}

/// Numerically stable logistic function
#[inline]
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Every column except the target, in frame order
pub fn feature_columns(df: &DataFrame, target: &str) -> Vec<String> {
    df.get_column_names()
        .iter()
        .filter(|name| name.as_str() != target)
        .map(|name| name.to_string())
        .collect()
}

/// Fit P(target = 1 | x) = sigmoid(b0 + sum b_i x_i) using all non-target
/// columns as features.
pub fn fit_logistic(
    train: &DataFrame,
    target: &str,
    options: &FitOptions,
) -> PipelineResult<LogisticModel> {
    if options.max_iterations == 0 || !(options.tolerance > 0.0) {
        return Err(PipelineError::InvalidConfig(format!(
            "[fit] max iterations must be positive and tolerance > 0 (got {} and {})",
            options.max_iterations, options.tolerance
        )));
    }

    let y: Vec<f64> = target_labels(train, target, "fit")?
        .into_iter()
        .map(|l| l as f64)
        .collect();
    let labels: Vec<i64> = y.iter().map(|&v| v as i64).collect();
    let (negatives, positives) = class_counts(&labels);
    for (class, count) in [(0, negatives), (1, positives)] {
        if count == 0 {
            return Err(PipelineError::EmptyClass { stage: "fit", class });
        }
    }

    let features = feature_columns(train, target);
    let mut names = Vec::with_capacity(features.len() + 1);
    names.push(INTERCEPT.to_string());
    names.extend(features.iter().cloned());

    let x = design_matrix(train, &features)?;
    check_rank(&x, &names)?;

    let n = y.len();
    let k = names.len();

    // Start from the glm default: mu = (y + 0.5) / 2
    let mut mu: Vec<f64> = y.iter().map(|&yi| (yi + 0.5) / 2.0).collect();
    let mut eta: Vec<f64> = mu.iter().map(|&m| (m / (1.0 - m)).ln()).collect();
    let mut beta = vec![0.0; k];
    let mut deviance_old = binomial_deviance(&y, &mu);
    let mut deviance = deviance_old;
    let mut last_change = f64::INFINITY;
    let mut iterations = 0;
    let mut converged = false;

    for iter in 1..=options.max_iterations {
        iterations = iter;

        let mut weights = Vec::with_capacity(n);
        let mut working = Vec::with_capacity(n);
        for i in 0..n {
            let m = mu[i].clamp(PROB_EPS, 1.0 - PROB_EPS);
            let w = m * (1.0 - m);
            weights.push(w);
            working.push(eta[i] + (y[i] - m) / w);
        }

        let (xtwx, xtwz) = weighted_normal_equations(&x, &weights, &working);
        let chol = factorize(xtwx.as_ref()).map_err(|col| singular_column(&names, col))?;
        beta = solve(&chol, &xtwz);

        if beta.iter().any(|b| !b.is_finite()) {
            break;
        }

        eta = linear_predictors(&x, &beta);
        mu = eta.iter().map(|&e| sigmoid(e)).collect();
        deviance = binomial_deviance(&y, &mu);

        last_change = (deviance - deviance_old).abs() / (deviance.abs() + 0.1);
        if last_change < options.tolerance {
            converged = true;
            break;
        }
        deviance_old = deviance;
    }

    if !converged {
        return Err(PipelineError::Convergence {
            iterations,
            last_change,
        });
    }

    // Covariance of the estimates is (X^T W X)^-1 at the final fit
    let weights: Vec<f64> = mu
        .iter()
        .map(|&m| {
            let m = m.clamp(PROB_EPS, 1.0 - PROB_EPS);
            m * (1.0 - m)
        })
        .collect();
    let (xtwx, _) = weighted_normal_equations(&x, &weights, &eta);
    let chol = factorize(xtwx.as_ref()).map_err(|col| singular_column(&names, col))?;
    let covariance = chol.inverse();
    let variances: Vec<f64> = (0..k).map(|j| covariance.read(j, j)).collect();

    let mut terms: Vec<Coefficient> = names
        .iter()
        .zip(beta.iter().zip(variances.iter()))
        .map(|(name, (&estimate, &variance))| {
            let std_error = variance.sqrt();
            let z_value = estimate / std_error;
            Coefficient {
                name: name.clone(),
                estimate,
                std_error,
                z_value,
                p_value: erfc(z_value.abs() / std::f64::consts::SQRT_2),
            }
        })
        .collect();

    let ybar = positives as f64 / n as f64;
    let null_mu = vec![ybar; n];
    let extreme_fitted = mu
        .iter()
        .filter(|&&m| m < EXTREME_PROB || m > 1.0 - EXTREME_PROB)
        .count();

    let intercept = terms.remove(0);
    Ok(LogisticModel {
        target: target.to_string(),
        intercept,
        coefficients: terms,
        diagnostics: FitDiagnostics {
            observations: n,
            iterations,
            null_deviance: binomial_deviance(&y, &null_mu),
            residual_deviance: deviance,
            aic: deviance + 2.0 * k as f64,
            extreme_fitted,
        },
    })
}

/// n x (p + 1) matrix with a leading column of ones
fn design_matrix(df: &DataFrame, features: &[String]) -> PipelineResult<Mat<f64>> {
    let columns = features
        .iter()
        .map(|name| column_values(df, name, "fit"))
        .collect::<PipelineResult<Vec<_>>>()?;

    let n = df.height();
    let mut x = Mat::<f64>::zeros(n, features.len() + 1);
    for row in 0..n {
        x[(row, 0)] = 1.0;
    }
    for (col_idx, values) in columns.iter().enumerate() {
        for (row, &value) in values.iter().enumerate() {
            x[(row, col_idx + 1)] = value;
        }
    }

    Ok(x)
}

/// Reject constant features by name, then any column that is a linear
/// combination of the ones before it.
fn check_rank(x: &Mat<f64>, names: &[String]) -> PipelineResult<()> {
    let n = x.nrows();
    for j in 1..x.ncols() {
        let first = x[(0, j)];
        if (1..n).all(|i| x[(i, j)] == first) {
            return Err(PipelineError::SingularDesign {
                detail: format!("column '{}' is constant", names[j]),
            });
        }
    }

    let gram = x.transpose() * x;
    factorize(gram.as_ref()).map_err(|col| singular_column(names, col))?;
    Ok(())
}

fn singular_column(names: &[String], col: usize) -> PipelineError {
    let detail = if col == 0 {
        "intercept column is degenerate".to_string()
    } else {
        format!(
            "column '{}' is a linear combination of the preceding columns",
            names[col]
        )
    };
    PipelineError::SingularDesign { detail }
}

/// X^T W X and X^T W z for diagonal weights w
fn weighted_normal_equations(x: &Mat<f64>, w: &[f64], z: &[f64]) -> (Mat<f64>, Vec<f64>) {
    let (n, k) = (x.nrows(), x.ncols());
    let xw = Mat::<f64>::from_fn(n, k, |i, j| x[(i, j)] * w[i]);
    let xtwx = x.transpose() * &xw;
    let xtwz: Vec<f64> = (0..k)
        .map(|j| (0..n).map(|i| xw[(i, j)] * z[i]).sum())
        .collect();
    (xtwx, xtwz)
}

fn linear_predictors(x: &Mat<f64>, beta: &[f64]) -> Vec<f64> {
    (0..x.nrows())
        .map(|i| (0..x.ncols()).map(|j| x[(i, j)] * beta[j]).sum())
        .collect()
}

/// -2 * log-likelihood of 0/1 outcomes under probabilities mu
fn binomial_deviance(y: &[f64], mu: &[f64]) -> f64 {
    -2.0 * y
        .iter()
        .zip(mu)
        .map(|(&yi, &m)| {
            let m = m.clamp(PROB_EPS, 1.0 - PROB_EPS);
            yi * m.ln() + (1.0 - yi) * (1.0 - m).ln()
        })
        .sum::<f64>()
}

/// Cholesky factorization of a symmetric positive definite matrix.
///
/// faer only rejects non-positive pivots, so the factor is also checked for
/// pivots that collapsed relative to their diagonal entry. On failure
/// returns the index of the first column that is (numerically) a linear
/// combination of the columns before it.
fn factorize(a: MatRef<'_, f64>) -> Result<Cholesky<f64>, usize> {
    match a.cholesky(Side::Lower) {
        Ok(chol) => match collapsed_pivot(a, &chol.compute_l()) {
            Some(col) => Err(col),
            None => Ok(chol),
        },
        Err(_) => Err(first_singular_column(a)),
    }
}

fn collapsed_pivot(a: MatRef<'_, f64>, l: &Mat<f64>) -> Option<usize> {
    (0..a.nrows()).find(|&j| {
        let pivot = l.read(j, j) * l.read(j, j);
        !pivot.is_finite() || pivot <= PIVOT_TOLERANCE * a.read(j, j).abs().max(f64::MIN_POSITIVE)
    })
}

/// Smallest leading block that fails to factor; its last column is the culprit
fn first_singular_column(a: MatRef<'_, f64>) -> usize {
    let k = a.nrows();
    (1..=k)
        .find(|&d| {
            let block = a.submatrix(0, 0, d, d);
            match block.cholesky(Side::Lower) {
                Ok(chol) => collapsed_pivot(block, &chol.compute_l()).is_some(),
                Err(_) => true,
            }
        })
        .map_or(k.saturating_sub(1), |d| d - 1)
}

fn solve(chol: &Cholesky<f64>, rhs: &[f64]) -> Vec<f64> {
    let rhs = Col::<f64>::from_fn(rhs.len(), |i| rhs[i]);
    let x = chol.solve(&rhs);
    (0..x.nrows()).map(|i| x.read(i)).collect()
}
