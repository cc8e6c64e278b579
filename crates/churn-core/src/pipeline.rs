//! # Prediction Pipeline
//!
//! Assemble -> scale -> forward pass -> threshold.
//!
//! [`ChurnAssets`] bundles the four fitted artifacts and checks that they
//! agree with each other. [`Predictor`] wraps validated assets; it is
//! immutable after construction and safe to share read-only for the
//! lifetime of the process.

use crate::encoding::{LabelEncoder, OneHotEncoder};
use crate::features::FeatureAssembler;
use crate::network::Network;
use crate::scaler::FeatureScaler;
use crate::types::{CustomerRecord, FeatureVector, DEFAULT_THRESHOLD};
use crate::ChurnError;
use serde::{Deserialize, Serialize};

// =============================================================================
// ASSETS
// =============================================================================

/// The four artifacts produced by the external training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnAssets {
    pub model: Network,
    pub gender_encoder: LabelEncoder,
    pub geography_encoder: OneHotEncoder,
    pub scaler: FeatureScaler,
}

impl ChurnAssets {
    pub fn assembler(&self) -> FeatureAssembler<'_> {
        FeatureAssembler::new(&self.gender_encoder, &self.geography_encoder)
    }

    /// Validate every artifact and the contract between them.
    ///
    /// The scaler must be as wide as the assembled vector, the model must
    /// consume what the scaler produces, and if the scaler recorded its
    /// fit-time column names they must match the pinned assembly order.
    pub fn validate(&self) -> Result<(), ChurnError> {
        self.model.validate()?;
        self.gender_encoder.validate()?;
        self.geography_encoder.validate()?;
        self.scaler.validate()?;

        let assembler = self.assembler();
        if self.scaler.width() != assembler.width() {
            return Err(ChurnError::DimensionMismatch {
                stage: "scaler",
                expected: self.scaler.width(),
                actual: assembler.width(),
            });
        }
        if self.model.input_width() != self.scaler.width() {
            return Err(ChurnError::DimensionMismatch {
                stage: "model",
                expected: self.model.input_width(),
                actual: self.scaler.width(),
            });
        }
        if let Some(fitted) = self.scaler.feature_names() {
            for (position, (expected, actual)) in
                fitted.iter().zip(assembler.columns()).enumerate()
            {
                if *expected != actual {
                    return Err(ChurnError::ColumnOrder {
                        position,
                        expected: expected.clone(),
                        actual,
                    });
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// PREDICTION
// =============================================================================

/// Risk band, matching the gauge steps of the result view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    /// probability < 0.30
    Low,
    /// 0.30 <= probability < 0.70
    Moderate,
    /// probability >= 0.70
    High,
}

impl RiskBand {
    pub fn from_probability(p: f64) -> Self {
        if p < 0.30 {
            Self::Low
        } else if p < 0.70 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

/// Outcome of a single inference call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub probability: f64,
    pub churn: bool,
    pub risk: RiskBand,
    pub threshold: f64,
    /// Assembled (unscaled) model input.
    pub features: FeatureVector,
    /// Scaled model input.
    pub scaled: Vec<f64>,
}

// =============================================================================
// PREDICTOR
// =============================================================================

/// Validated, read-only scoring pipeline.
#[derive(Debug, Clone)]
pub struct Predictor {
    assets: ChurnAssets,
    threshold: f64,
}

impl Predictor {
    /// Validate the assets once and wrap them.
    pub fn new(assets: ChurnAssets) -> Result<Self, ChurnError> {
        assets.validate()?;
        Ok(Self {
            assets,
            threshold: DEFAULT_THRESHOLD,
        })
    }

    /// Override the decision threshold. Values outside `(0, 1)` are rejected.
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, ChurnError> {
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(ChurnError::InvalidInput(format!(
                "threshold {threshold} must lie strictly between 0 and 1"
            )));
        }
        self.threshold = threshold;
        Ok(self)
    }

    pub fn assets(&self) -> &ChurnAssets {
        &self.assets
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Assemble and scale a record without running the model.
    pub fn prepare(&self, record: &CustomerRecord) -> Result<(FeatureVector, Vec<f64>), ChurnError> {
        let features = self.assets.assembler().assemble(record)?;
        let scaled = self.assets.scaler.transform(features.values())?;
        Ok((features, scaled))
    }

    /// Run the model on an already scaled vector.
    pub fn probability_of_scaled(&self, scaled: &[f64]) -> Result<f64, ChurnError> {
        self.assets.model.predict(scaled)
    }

    /// Full pipeline for one record.
    pub fn predict(&self, record: &CustomerRecord) -> Result<Prediction, ChurnError> {
        let (features, scaled) = self.prepare(record)?;
        let probability = self.probability_of_scaled(&scaled)?;
        Ok(Prediction {
            probability,
            churn: probability > self.threshold,
            risk: RiskBand::from_probability(probability),
            threshold: self.threshold,
            features,
            scaled,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
