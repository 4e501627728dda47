//! relogit: Logistic Regression under Class Resampling
//!
//! A library for cleaning and encoding the diabetes health dataset and
//! comparing logistic regression fitted with no resampling, random
//! oversampling and random undersampling.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
