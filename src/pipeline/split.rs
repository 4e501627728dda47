//! Stratified train/test split

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::error::{PipelineError, PipelineResult};
use super::target::{class_indices, take_rows, target_labels};

/// Disjoint train and test subsets of a frozen dataset
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: DataFrame,
    pub test: DataFrame,
}

/// Validate a train ratio; it must lie strictly between 0 and 1
pub fn validate_train_ratio(train_ratio: f64) -> PipelineResult<()> {
    if train_ratio > 0.0 && train_ratio < 1.0 {
        Ok(())
    } else {
        Err(PipelineError::InvalidConfig(format!(
            "[split] train ratio must be between 0 and 1 (exclusive), got {}",
            train_ratio
        )))
    }
}

/// Row indices assigned to (train, test), each sorted ascending.
///
/// Each class is shuffled with the same seeded generator (class 0 first) and
/// `round(train_ratio * class_size)` of its rows go to train, so class
/// proportions carry over to both subsets.
pub fn stratified_indices(
    labels: &[i64],
    train_ratio: f64,
    seed: u64,
) -> PipelineResult<(Vec<usize>, Vec<usize>)> {
    validate_train_ratio(train_ratio)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let (negatives, positives) = class_indices(labels);

    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::with_capacity(labels.len());

    for mut group in [negatives, positives] {
        group.shuffle(&mut rng);
        let n_train = ((group.len() as f64) * train_ratio).round() as usize;
        let (group_train, group_test) = group.split_at(n_train.min(group.len()));
        train.extend_from_slice(group_train);
        test.extend_from_slice(group_test);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok((train, test))
}

/// Split a dataset into train and test, stratified by the target column.
///
/// Deterministic for a given seed and input row order. Rows keep their
/// original relative order inside each subset.
pub fn stratified_split(
    df: &DataFrame,
    target: &str,
    train_ratio: f64,
    seed: u64,
) -> PipelineResult<TrainTestSplit> {
    let labels = target_labels(df, target, "split")?;
    let (train_idx, test_idx) = stratified_indices(&labels, train_ratio, seed)?;

    Ok(TrainTestSplit {
        train: take_rows(df, &train_idx)?,
        test: take_rows(df, &test_idx)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::target::class_counts;

    fn labels_8_2() -> Vec<i64> {
        vec![0, 0, 1, 0, 0, 0, 1, 0, 0, 0]
    }

    #[test]
    fn test_split_sizes_are_stratified() {
        let labels: Vec<i64> = (0..100).map(|i| if i % 5 == 0 { 1 } else { 0 }).collect();
        let (train, test) = stratified_indices(&labels, 0.8, 7).unwrap();

        assert_eq!(train.len(), 80);
        assert_eq!(test.len(), 20);

        let train_labels: Vec<i64> = train.iter().map(|&i| labels[i]).collect();
        let test_labels: Vec<i64> = test.iter().map(|&i| labels[i]).collect();
        assert_eq!(class_counts(&train_labels), (64, 16));
        assert_eq!(class_counts(&test_labels), (16, 4));
    }

    #[test]
    fn test_split_is_a_partition() {
        let labels = labels_8_2();
        let (train, test) = stratified_indices(&labels, 0.8, 1).unwrap();

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..labels.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let labels: Vec<i64> = (0..50).map(|i| (i % 3 == 0) as i64).collect();
        let a = stratified_indices(&labels, 0.8, 42).unwrap();
        let b = stratified_indices(&labels, 0.8, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_changes_split() {
        let labels: Vec<i64> = (0..200).map(|i| (i % 4 == 0) as i64).collect();
        let a = stratified_indices(&labels, 0.8, 1).unwrap();
        let b = stratified_indices(&labels, 0.8, 2).unwrap();
        assert_ne!(a.1, b.1);
    }

    #[test]
    fn test_invalid_ratio() {
        let labels = labels_8_2();
        assert!(stratified_indices(&labels, 0.0, 1).is_err());
        assert!(stratified_indices(&labels, 1.0, 1).is_err());
        assert!(stratified_indices(&labels, -0.5, 1).is_err());
    }

    #[test]
    fn test_stratified_split_frames() {
        let df = df! {
            "x" => (0..10).map(|i| i as f64).collect::<Vec<_>>(),
            "diabetes" => labels_8_2(),
        }
        .unwrap();

        let split = stratified_split(&df, "diabetes", 0.8, 3).unwrap();
        assert_eq!(split.train.height(), 8);
        assert_eq!(split.test.height(), 2);

        let train_labels = target_labels(&split.train, "diabetes", "test").unwrap();
        assert_eq!(class_counts(&train_labels), (6, 2));
    }
}
