//! Threshold classification, confusion matrix and derived rates
//!
//! Raw counts are always relative to diabetes = 1 (TP = actual 1 predicted
//! 1). Derived rates are computed relative to a configurable reference
//! ("positive") class. The default, class 0, reproduces the labeling used by
//! the published diabetes study, where PPV = TN / (TN + FN) and
//! NPV = TP / (TP + FP). Class 1 gives the usual clinical convention.

use polars::prelude::*;
use serde::Serialize;

use super::error::{PipelineError, PipelineResult};
use super::model::LogisticModel;
use super::target::target_labels;

/// Fixed decision threshold: predict 1 iff probability > 0.5
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Which class the derived rates treat as "positive"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositiveClass {
    /// Class 0 (no diabetes); matches the published study's PPV/NPV labels
    #[default]
    NonDiabetic,
    /// Class 1 (diabetes); standard clinical convention
    Diabetic,
}

impl PositiveClass {
    pub fn label(&self) -> i64 {
        match self {
            PositiveClass::NonDiabetic => 0,
            PositiveClass::Diabetic => 1,
        }
    }

    pub fn from_label(label: i64) -> Option<Self> {
        match label {
            0 => Some(PositiveClass::NonDiabetic),
            1 => Some(PositiveClass::Diabetic),
            _ => None,
        }
    }

    /// One-line statement of the convention, printed under every report
    pub fn describe(&self) -> &'static str {
        match self {
            PositiveClass::NonDiabetic => {
                "rates treat class 0 (no diabetes) as positive, as labeled in the published study: PPV = TN/(TN+FN), NPV = TP/(TP+FP)"
            }
            PositiveClass::Diabetic => {
                "rates treat class 1 (diabetes) as positive (clinical convention): PPV = TP/(TP+FP), NPV = TN/(TN+FN)"
            }
        }
    }
}

/// Counts of (actual, predicted) pairs, relative to label 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

/// Rates derived from a confusion matrix. `None` marks a zero denominator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedRates {
    pub ppv: Option<f64>,
    pub npv: Option<f64>,
    pub sensitivity: Option<f64>,
    pub specificity: Option<f64>,
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

impl ConfusionMatrix {
    pub fn from_labels(actual: &[i64], predicted: &[i64]) -> Self {
        let mut matrix = ConfusionMatrix::default();
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a, p) {
                (1, 1) => matrix.true_positive += 1,
                (0, 0) => matrix.true_negative += 1,
                (0, _) => matrix.false_positive += 1,
                _ => matrix.false_negative += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    pub fn accuracy(&self) -> Option<f64> {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    /// Same counts viewed with `positive` as the positive class
    fn relative_to(&self, positive: PositiveClass) -> Self {
        match positive {
            PositiveClass::Diabetic => *self,
            PositiveClass::NonDiabetic => ConfusionMatrix {
                true_negative: self.true_positive,
                false_positive: self.false_negative,
                false_negative: self.false_positive,
                true_positive: self.true_negative,
            },
        }
    }

    pub fn rates(&self, positive: PositiveClass) -> DerivedRates {
        let m = self.relative_to(positive);
        DerivedRates {
            ppv: ratio(m.true_positive, m.true_positive + m.false_positive),
            npv: ratio(m.true_negative, m.true_negative + m.false_negative),
            sensitivity: ratio(m.true_positive, m.true_positive + m.false_negative),
            specificity: ratio(m.true_negative, m.true_negative + m.false_positive),
        }
    }
}

/// Outcome of scoring a model on the test subset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub positive_class: PositiveClass,
    pub threshold: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub accuracy: Option<f64>,
    pub rates: DerivedRates,
}

/// Predict 1 iff the probability is strictly above the threshold
pub fn classify(probabilities: &[f64], threshold: f64) -> Vec<i64> {
    probabilities
        .iter()
        .map(|&p| if p > threshold { 1 } else { 0 })
        .collect()
}

/// Score a fitted model on a test frame.
pub fn evaluate(
    model: &LogisticModel,
    test: &DataFrame,
    target: &str,
    positive: PositiveClass,
) -> PipelineResult<Evaluation> {
    let actual = target_labels(test, target, "evaluate")?;
    let probabilities = model.predict_proba(test)?;
    if probabilities.len() != actual.len() {
        return Err(PipelineError::InvalidConfig(format!(
            "[evaluate] {} predictions for {} test rows",
            probabilities.len(),
            actual.len()
        )));
    }

    let predicted = classify(&probabilities, DECISION_THRESHOLD);
    let confusion_matrix = ConfusionMatrix::from_labels(&actual, &predicted);

    Ok(Evaluation {
        positive_class: positive,
        threshold: DECISION_THRESHOLD,
        confusion_matrix,
        accuracy: confusion_matrix.accuracy(),
        rates: confusion_matrix.rates(positive),
    })
}
