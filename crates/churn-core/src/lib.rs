//! # churn-core
//!
//! The deterministic scoring engine for churn - THE LOGIC.
//!
//! Given the four artifacts of an external training run (a feed-forward
//! classifier, a gender label encoder, a geography one-hot encoder, and a
//! feature scaler), this crate turns one raw customer record into a churn
//! probability:
//!
//! ```text
//! CustomerRecord --assemble--> FeatureVector --scale--> Vec<f64> --model--> p in [0, 1]
//! ```
//!
//! ## Architectural Constraints
//!
//! - No async, no network, no file I/O (the app layer loads artifacts)
//! - Artifacts are validated once and never mutated afterwards
//! - Column order is pinned in code and checked against the scaler
//! - Lookups outside a fitted vocabulary fail; nothing is defaulted

// =============================================================================
// MODULES
// =============================================================================

pub mod encoding;
pub mod explain;
pub mod features;
pub mod formats;
pub mod network;
pub mod pipeline;
pub mod report;
pub mod scaler;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{
    ChurnError, CustomerRecord, FeatureVector, DEFAULT_THRESHOLD, GENDER_FIELD, GEOGRAPHY_FIELD,
    NUMERIC_COLUMNS,
};

// =============================================================================
// RE-EXPORTS: Artifacts and Pipeline
// =============================================================================

pub use encoding::{LabelEncoder, OneHotEncoder};
pub use explain::{explain, Explanation, FeatureImpact};
pub use features::FeatureAssembler;
pub use network::{Activation, DenseLayer, Network};
pub use pipeline::{ChurnAssets, Prediction, Predictor, RiskBand};
pub use report::PredictionReport;
pub use scaler::{FeatureScaler, ScalingMethod};

// =============================================================================
// RE-EXPORTS: Formats
// =============================================================================

pub use formats::{assets_from_bytes, assets_to_bytes, BundleHeader, BUNDLE_MAGIC, BUNDLE_VERSION};
