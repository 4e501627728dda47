//! Column names and declared types of the diabetes dataset

use polars::prelude::DataType;

pub const GENDER: &str = "gender";
pub const AGE: &str = "age";
pub const HYPERTENSION: &str = "hypertension";
pub const HEART_DISEASE: &str = "heart_disease";
pub const SMOKING_HISTORY: &str = "smoking_history";
pub const BMI: &str = "bmi";
pub const HBA1C_LEVEL: &str = "HbA1c_level";
pub const BLOOD_GLUCOSE_LEVEL: &str = "blood_glucose_level";
pub const DIABETES: &str = "diabetes";

/// Integer-coded columns produced by the encoder
pub const GENDER_CODE: &str = "gender_code";
pub const SMOKING_CODE: &str = "smoking_code";

/// Binary target column
pub const TARGET: &str = DIABETES;

/// Sentinel smoking value dropped by the cleaner (exact, case-sensitive)
pub const SMOKING_SENTINEL: &str = "No Info";

/// Continuous columns standardized by the scaler
pub const CONTINUOUS_COLUMNS: [&str; 4] = [AGE, BMI, HBA1C_LEVEL, BLOOD_GLUCOSE_LEVEL];

/// Nominal columns tested against the target in exploratory analysis
pub const NOMINAL_COLUMNS: [&str; 4] = [GENDER_CODE, HYPERTENSION, HEART_DISEASE, SMOKING_CODE];

/// The nine raw columns and the type each is loaded as
pub const RAW_SCHEMA: [(&str, ColumnKind); 9] = [
    (GENDER, ColumnKind::Text),
    (AGE, ColumnKind::Continuous),
    (HYPERTENSION, ColumnKind::Binary),
    (HEART_DISEASE, ColumnKind::Binary),
    (SMOKING_HISTORY, ColumnKind::Text),
    (BMI, ColumnKind::Continuous),
    (HBA1C_LEVEL, ColumnKind::Continuous),
    (BLOOD_GLUCOSE_LEVEL, ColumnKind::Continuous),
    (DIABETES, ColumnKind::Binary),
];

/// Declared kind of a raw column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Continuous,
    Binary,
}

impl ColumnKind {
    /// Polars dtype the column is materialized as after loading
    pub fn dtype(&self) -> DataType {
        match self {
            ColumnKind::Text => DataType::String,
            ColumnKind::Continuous => DataType::Float64,
            ColumnKind::Binary => DataType::Int64,
        }
    }
}

/// Names of the raw columns in declaration order
pub fn raw_column_names() -> Vec<&'static str> {
    RAW_SCHEMA.iter().map(|(name, _)| *name).collect()
}
