//! # Report Module
//!
//! The result card shown after a prediction: probability, label, risk band,
//! and (when requested) the heuristic impacts.
//!
//! The same structure is rendered as boxed plain text for the CLI and
//! serialized as JSON for the HTTP API.

use crate::explain::{Explanation, FeatureImpact};
use crate::pipeline::{Prediction, RiskBand};
use serde::{Deserialize, Serialize};

pub const HIGH_RISK_HEADLINE: &str = "High Churn Risk!";
pub const LOW_RISK_HEADLINE: &str = "Low Churn Risk";
pub const HIGH_RISK_MESSAGE: &str = "This customer is likely to leave the bank.";
pub const LOW_RISK_MESSAGE: &str = "This customer is stable and loyal.";

/// Rendered outcome of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub probability: f64,
    /// Probability as a percentage with one decimal, e.g. `"37.7%"`.
    pub percent: String,
    pub churn: bool,
    pub risk: RiskBand,
    pub threshold: f64,
    pub headline: String,
    pub message: String,
    /// Heuristic impacts; empty unless an explanation was attached.
    pub impacts: Vec<FeatureImpact>,
    pub explanation_method: Option<String>,
}

impl PredictionReport {
    /// Build the card for a prediction.
    #[must_use]
    pub fn new(prediction: &Prediction) -> Self {
        let (headline, message) = if prediction.churn {
            (HIGH_RISK_HEADLINE, HIGH_RISK_MESSAGE)
        } else {
            (LOW_RISK_HEADLINE, LOW_RISK_MESSAGE)
        };
        Self {
            probability: prediction.probability,
            percent: format!("{:.1}%", prediction.probability * 100.0),
            churn: prediction.churn,
            risk: prediction.risk,
            threshold: prediction.threshold,
            headline: headline.to_string(),
            message: message.to_string(),
            impacts: Vec::new(),
            explanation_method: None,
        }
    }

    /// Attach heuristic impacts.
    #[must_use]
    pub fn with_explanation(mut self, explanation: Explanation) -> Self {
        self.impacts = explanation.impacts;
        self.explanation_method = Some(explanation.method);
        self
    }

    /// Format as plain text with the standard template.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str("┌─────────────────────────────────────┐\n");
        output.push_str(&format!("│ {}\n", self.headline));
        output.push_str(&format!("│ Churn probability: {}\n", self.percent));
        output.push_str(&format!(
            "│ Risk band: {} (threshold {:.2})\n",
            self.risk.as_str(),
            self.threshold
        ));
        output.push_str(&format!("│ {}\n", self.message));

        if let Some(method) = &self.explanation_method {
            output.push_str("├─────────────────────────────────────┤\n");
            output.push_str(&format!("│ IMPACTS ({method}, not SHAP)\n"));
            if self.impacts.is_empty() {
                output.push_str("│ - (none)\n");
            }
            for impact in &self.impacts {
                output.push_str(&format!(
                    "│ - {:<16} {:+.4}\n",
                    impact.feature, impact.impact
                ));
            }
        }

        output.push_str("└─────────────────────────────────────┘\n");

        output
    }
}

// =============================================================================
// TESTS
// =============================================================================
