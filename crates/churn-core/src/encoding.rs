//! # Categorical Encoders
//!
//! Frozen lookup tables produced at training time.
//!
//! - [`LabelEncoder`] maps a class string to its index in the fitted class list.
//! - [`OneHotEncoder`] maps a category string to a one-hot row over the fitted
//!   category list.
//!
//! Neither encoder ever defaults an unseen value: lookups outside the fitted
//! vocabulary fail with [`ChurnError::UnknownCategory`].

use crate::ChurnError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Reject empty or duplicated vocabularies.
fn validate_vocabulary(artifact: &str, values: &[String]) -> Result<(), ChurnError> {
    if values.is_empty() {
        return Err(ChurnError::asset(artifact, "empty vocabulary"));
    }
    let mut seen = BTreeSet::new();
    for value in values {
        if !seen.insert(value.as_str()) {
            return Err(ChurnError::asset(
                artifact,
                format!("duplicate entry {value:?}"),
            ));
        }
    }
    Ok(())
}

// =============================================================================
// LABEL ENCODER
// =============================================================================

/// Label encoder: class string -> integer code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Build and validate an encoder from its fitted class list.
    pub fn new(classes: Vec<String>) -> Result<Self, ChurnError> {
        let encoder = Self { classes };
        encoder.validate()?;
        Ok(encoder)
    }

    pub fn validate(&self) -> Result<(), ChurnError> {
        validate_vocabulary("label encoder", &self.classes)
    }

    /// Known classes, in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Encode a class. The code is its index in [`classes`](Self::classes).
    pub fn transform(&self, value: &str) -> Result<usize, ChurnError> {
        self.classes
            .iter()
            .position(|c| c == value)
            .ok_or_else(|| ChurnError::UnknownCategory {
                field: crate::types::GENDER_FIELD.to_string(),
                value: value.to_string(),
            })
    }

    pub fn inverse_transform(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }
}

// =============================================================================
// ONE-HOT ENCODER
// =============================================================================

/// Single-column one-hot encoder.
///
/// Output order is the fitted category order, which is also the order of
/// the geography block in the assembled feature vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    feature: String,
    categories: Vec<String>,
}

impl OneHotEncoder {
    pub fn new(feature: impl Into<String>, categories: Vec<String>) -> Result<Self, ChurnError> {
        let encoder = Self {
            feature: feature.into(),
            categories,
        };
        encoder.validate()?;
        Ok(encoder)
    }

    pub fn validate(&self) -> Result<(), ChurnError> {
        if self.feature.is_empty() {
            return Err(ChurnError::asset("one-hot encoder", "empty feature name"));
        }
        validate_vocabulary("one-hot encoder", &self.categories)
    }

    /// Name of the encoded input column (e.g. `Geography`).
    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Output column names, `<feature>_<category>` in fit order.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{}_{}", self.feature, c))
            .collect()
    }

    /// One-hot row for `value`: exactly one `1.0`, zeros elsewhere.
    pub fn transform(&self, value: &str) -> Result<Vec<f64>, ChurnError> {
        let hot = self
            .categories
            .iter()
            .position(|c| c == value)
            .ok_or_else(|| ChurnError::UnknownCategory {
                field: self.feature.clone(),
                value: value.to_string(),
            })?;

        Ok((0..self.categories.len())
            .map(|i| if i == hot { 1.0 } else { 0.0 })
            .collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================
