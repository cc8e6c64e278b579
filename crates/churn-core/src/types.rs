//! # Core Types
//!
//! The record, vector, and error types shared by every churn-core module.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// COLUMN CONTRACT
// =============================================================================

/// Numeric columns in the exact order the scaler was fit on.
///
/// The geography one-hot block always follows these columns.
pub const NUMERIC_COLUMNS: [&str; 9] = [
    "CreditScore",
    "Gender",
    "Age",
    "Tenure",
    "Balance",
    "NumOfProducts",
    "HasCrCard",
    "IsActiveMember",
    "EstimatedSalary",
];

/// Field name used when reporting gender lookup failures.
pub const GENDER_FIELD: &str = "Gender";

/// Field name (and one-hot prefix) of the geography column.
pub const GEOGRAPHY_FIELD: &str = "Geography";

/// Default decision threshold. A record churns when `probability > threshold`.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

// =============================================================================
// CUSTOMER RECORD
// =============================================================================

/// One raw customer record, as submitted through the form.
///
/// Categorical fields stay as strings until assembly looks them up in
/// the fitted encoders. The record carries no range guarantees; the
/// input layer is responsible for widget limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub credit_score: u16,
    pub gender: String,
    pub age: u8,
    pub tenure: u8,
    pub balance: f64,
    pub num_of_products: u8,
    pub has_credit_card: bool,
    pub is_active_member: bool,
    pub estimated_salary: f64,
    pub geography: String,
}

impl CustomerRecord {
    /// Numeric values in `NUMERIC_COLUMNS` order, with the gender code supplied
    /// by the caller.
    pub(crate) fn numeric_values(&self, gender_code: usize) -> [f64; 9] {
        [
            f64::from(self.credit_score),
            gender_code as f64,
            f64::from(self.age),
            f64::from(self.tenure),
            self.balance,
            f64::from(self.num_of_products),
            if self.has_credit_card { 1.0 } else { 0.0 },
            if self.is_active_member { 1.0 } else { 0.0 },
            self.estimated_salary,
        ]
    }
}

// =============================================================================
// FEATURE VECTOR
// =============================================================================

/// An assembled model input: column names paired with values, in pinned order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Build a vector from parallel column/value lists.
    ///
    /// Fails with `DimensionMismatch` if the lists differ in length.
    pub fn new(columns: Vec<String>, values: Vec<f64>) -> Result<Self, ChurnError> {
        if columns.len() != values.len() {
            return Err(ChurnError::DimensionMismatch {
                stage: "feature vector",
                expected: columns.len(),
                actual: values.len(),
            });
        }
        Ok(Self { columns, values })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }

    /// Value of a named column, if present.
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i).copied())
    }

    /// The one-hot geography block (everything after the numeric columns).
    pub fn geography_block(&self) -> &[f64] {
        self.values.get(NUMERIC_COLUMNS.len()..).unwrap_or(&[])
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Errors raised by the scoring engine.
///
/// Every failure is terminal for the interaction; nothing is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChurnError {
    /// A required artifact is missing, corrupt, or internally inconsistent.
    #[error("failed to load {artifact}: {reason}")]
    AssetLoad { artifact: String, reason: String },

    /// A categorical value was not seen when the encoder was fit.
    #[error("unknown {field} category {value:?}")]
    UnknownCategory { field: String, value: String },

    /// A vector width disagrees with what a fitted artifact expects.
    #[error("dimension mismatch at {stage}: expected {expected}, got {actual}")]
    DimensionMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The scaler was fit on a different column order than assembly produces.
    #[error("column order mismatch at position {position}: scaler expects {expected:?}, assembly produces {actual:?}")]
    ColumnOrder {
        position: usize,
        expected: String,
        actual: String,
    },

    /// A numeric input or output was not finite.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ChurnError {
    pub(crate) fn asset(artifact: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AssetLoad {
            artifact: artifact.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the submitted record rather than the artifacts.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::UnknownCategory { .. } | Self::InvalidInput(_))
    }
}

// =============================================================================
// TESTS
// =============================================================================
