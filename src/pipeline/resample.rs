//! Random over- and undersampling of the training subset
//!
//! Only the training frame is ever passed in here; the test frame stays
//! representative of the real class distribution.

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::error::{PipelineError, PipelineResult};
use super::target::{class_counts, class_indices, take_rows, target_labels};

/// Class-balancing strategy applied to the training subset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleMethod {
    /// Train on the data as-is (baseline)
    #[default]
    None,
    /// Random oversampling (ROS): duplicate minority rows until balanced
    Over,
    /// Random undersampling (RUS): discard majority rows until balanced
    Under,
}

impl ResampleMethod {
    /// Short label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            ResampleMethod::None => "baseline",
            ResampleMethod::Over => "ROS",
            ResampleMethod::Under => "RUS",
        }
    }
}

impl std::fmt::Display for ResampleMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResampleMethod::None => write!(f, "none"),
            ResampleMethod::Over => write!(f, "over"),
            ResampleMethod::Under => write!(f, "under"),
        }
    }
}

impl std::str::FromStr for ResampleMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "baseline" => Ok(ResampleMethod::None),
            "over" | "ros" => Ok(ResampleMethod::Over),
            "under" | "rus" => Ok(ResampleMethod::Under),
            _ => Err(format!(
                "Unknown resample method: '{}'. Use 'none', 'over' or 'under'.",
                s
            )),
        }
    }
}

/// Class counts of the training subset before and after resampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResampleStats {
    pub method: ResampleMethod,
    /// (class 0, class 1) before
    pub counts_before: (usize, usize),
    /// (class 0, class 1) after
    pub counts_after: (usize, usize),
}

impl ResampleStats {
    pub fn rows_before(&self) -> usize {
        self.counts_before.0 + self.counts_before.1
    }

    pub fn rows_after(&self) -> usize {
        self.counts_after.0 + self.counts_after.1
    }
}

/// Row indices of the resampled training set.
///
/// Over: every original row followed by `n_max - n_min` minority rows drawn
/// uniformly with replacement. Under: all minority rows plus `n_min` majority
/// rows drawn without replacement, in original row order. Balanced input is
/// returned as-is for every method.
pub fn resample_indices(
    labels: &[i64],
    method: ResampleMethod,
    seed: u64,
) -> PipelineResult<Vec<usize>> {
    let (negatives, positives) = class_indices(labels);
    let all: Vec<usize> = (0..labels.len()).collect();

    if method == ResampleMethod::None {
        return Ok(all);
    }

    for (class, rows) in [(0, &negatives), (1, &positives)] {
        if rows.is_empty() {
            return Err(PipelineError::EmptyClass {
                stage: "resample",
                class,
            });
        }
    }

    if negatives.len() == positives.len() {
        return Ok(all);
    }

    let (minority, majority) = if negatives.len() < positives.len() {
        (negatives, positives)
    } else {
        (positives, negatives)
    };

    let mut rng = StdRng::seed_from_u64(seed);

    let indices = match method {
        ResampleMethod::None => all,
        ResampleMethod::Over => {
            let extra = majority.len() - minority.len();
            let mut indices = all;
            indices.reserve(extra);
            for _ in 0..extra {
                indices.push(minority[rng.gen_range(0..minority.len())]);
            }
            indices
        }
        ResampleMethod::Under => {
            let mut indices: Vec<usize> =
                rand::seq::index::sample(&mut rng, majority.len(), minority.len())
                    .into_iter()
                    .map(|i| majority[i])
                    .collect();
            indices.extend_from_slice(&minority);
            indices.sort_unstable();
            indices
        }
    };

    Ok(indices)
}

/// Rebalance a training frame so both target classes have equal counts.
pub fn resample(
    train: &DataFrame,
    target: &str,
    method: ResampleMethod,
    seed: u64,
) -> PipelineResult<(DataFrame, ResampleStats)> {
    let labels = target_labels(train, target, "resample")?;
    let indices = resample_indices(&labels, method, seed)?;

    let resampled_labels: Vec<i64> = indices.iter().map(|&i| labels[i]).collect();
    let stats = ResampleStats {
        method,
        counts_before: class_counts(&labels),
        counts_after: class_counts(&resampled_labels),
    };

    let unchanged =
        indices.len() == labels.len() && indices.iter().enumerate().all(|(pos, &i)| pos == i);
    let frame = if unchanged {
        train.clone()
    } else {
        take_rows(train, &indices)?
    };

    Ok((frame, stats))
}
