//! # Feature Assembly
//!
//! Turns a raw [`CustomerRecord`] into the fixed-width, fixed-order vector
//! the scaler and model were trained on:
//!
//! ```text
//! CreditScore, Gender, Age, Tenure, Balance, NumOfProducts,
//! HasCrCard, IsActiveMember, EstimatedSalary, Geography_<c0>, Geography_<c1>, ...
//! ```
//!
//! The order is pinned by [`NUMERIC_COLUMNS`] plus the one-hot encoder's
//! fit order. It is never derived from map or frame ordering.

use crate::encoding::{LabelEncoder, OneHotEncoder};
use crate::types::{CustomerRecord, FeatureVector, NUMERIC_COLUMNS};
use crate::ChurnError;

/// Stateless assembler over borrowed, fitted encoders.
#[derive(Debug, Clone, Copy)]
pub struct FeatureAssembler<'a> {
    gender: &'a LabelEncoder,
    geography: &'a OneHotEncoder,
}

impl<'a> FeatureAssembler<'a> {
    pub fn new(gender: &'a LabelEncoder, geography: &'a OneHotEncoder) -> Self {
        Self { gender, geography }
    }

    /// Pinned column order of the assembled vector.
    pub fn columns(&self) -> Vec<String> {
        NUMERIC_COLUMNS
            .iter()
            .map(|c| (*c).to_string())
            .chain(self.geography.feature_names_out())
            .collect()
    }

    pub fn width(&self) -> usize {
        NUMERIC_COLUMNS.len() + self.geography.categories().len()
    }

    /// Assemble one record.
    ///
    /// Fails with `UnknownCategory` for unseen gender/geography values and
    /// `InvalidInput` for non-finite numeric fields.
    pub fn assemble(&self, record: &CustomerRecord) -> Result<FeatureVector, ChurnError> {
        let gender_code = self.gender.transform(&record.gender)?;
        let geo_block = self.geography.transform(&record.geography)?;

        let numeric = record.numeric_values(gender_code);
        if let Some(i) = numeric.iter().position(|v| !v.is_finite()) {
            return Err(ChurnError::InvalidInput(format!(
                "{} is not a finite number",
                NUMERIC_COLUMNS[i]
            )));
        }

        let mut values = Vec::with_capacity(self.width());
        values.extend_from_slice(&numeric);
        values.extend(geo_block);

        FeatureVector::new(self.columns(), values)
    }
}

// =============================================================================
// TESTS
// =============================================================================
