//! # Heuristic Impact Explanation
//!
//! **This is an occlusion heuristic, not a Shapley-value computation.**
//!
//! For each raw input (the nine numeric fields plus the geography group) the
//! scaled columns belonging to that input are replaced by the scaler's
//! training centre and the model is re-run. The impact of the input is
//!
//! ```text
//! impact = p(record) - p(record with input occluded)
//! ```
//!
//! Positive impacts push the score towards churn. Interactions between inputs
//! are ignored and impacts do not sum to anything meaningful; the numbers are
//! a ranking aid for the result view and nothing more.

use crate::pipeline::Predictor;
use crate::types::{CustomerRecord, GEOGRAPHY_FIELD, NUMERIC_COLUMNS};
use crate::ChurnError;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Impact of one raw input on the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImpact {
    pub feature: String,
    pub impact: f64,
}

/// Heuristic explanation of a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub probability: f64,
    pub method: String,
    /// Sorted by descending absolute impact; ties keep pinned column order.
    pub impacts: Vec<FeatureImpact>,
}

impl Explanation {
    pub const METHOD: &'static str = "occlusion-heuristic";

    /// Largest positive contributor, if any input pushes towards churn.
    pub fn top_driver(&self) -> Option<&FeatureImpact> {
        self.impacts.iter().find(|i| i.impact > 0.0)
    }
}

/// Column ranges of each raw input inside the assembled vector.
fn input_groups(width: usize) -> Vec<(String, Range<usize>)> {
    let numeric = NUMERIC_COLUMNS.len();
    NUMERIC_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, name)| ((*name).to_string(), i..i + 1))
        .chain(std::iter::once((GEOGRAPHY_FIELD.to_string(), numeric..width)))
        .collect()
}

/// Explain one record with the occlusion heuristic.
pub fn explain(predictor: &Predictor, record: &CustomerRecord) -> Result<Explanation, ChurnError> {
    let (_, scaled) = predictor.prepare(record)?;
    let probability = predictor.probability_of_scaled(&scaled)?;
    let centre = predictor.assets().scaler.centre();

    let mut impacts = Vec::with_capacity(NUMERIC_COLUMNS.len() + 1);
    for (feature, range) in input_groups(scaled.len()) {
        let mut occluded = scaled.clone();
        occluded[range.clone()].copy_from_slice(&centre[range]);
        let without = predictor.probability_of_scaled(&occluded)?;
        impacts.push(FeatureImpact {
            feature,
            impact: probability - without,
        });
    }

    // Stable sort keeps pinned order for equal magnitudes.
    impacts.sort_by(|a, b| b.impact.abs().total_cmp(&a.impact.abs()));

    Ok(Explanation {
        probability,
        method: Explanation::METHOD.to_string(),
        impacts,
    })
}

// =============================================================================
// TESTS
// =============================================================================
