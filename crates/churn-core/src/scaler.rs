//! # Feature Scaler
//!
//! A frozen, already-fitted per-column affine transform. No fitting happens
//! at inference time.
//!
//! Both supported methods reduce to `y = x * coef + intercept`:
//!
//! | Method   | coef                         | intercept                        |
//! |----------|------------------------------|----------------------------------|
//! | Standard | `1 / scale`                  | `-mean / scale`                  |
//! | MinMax   | `(hi - lo) / (max - min)`    | `lo - min * coef`                |
//!
//! Zero scales (constant training columns) are treated as 1.

use crate::ChurnError;
use serde::{Deserialize, Serialize};

/// Fitted scaling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMethod {
    /// Mean/variance standardisation.
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// Min/max rescaling into `range`.
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        range: (f64, f64),
    },
}

impl ScalingMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard { .. } => "standard",
            Self::MinMax { .. } => "min_max",
        }
    }
}

/// A fitted scaler plus the column order it was fit on (when recorded).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    method: ScalingMethod,
    feature_names: Option<Vec<String>>,
}

fn nonzero(x: f64) -> f64 {
    if x == 0.0 { 1.0 } else { x }
}

impl FeatureScaler {
    pub fn new(
        method: ScalingMethod,
        feature_names: Option<Vec<String>>,
    ) -> Result<Self, ChurnError> {
        let scaler = Self {
            method,
            feature_names,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn validate(&self) -> Result<(), ChurnError> {
        let (a, b) = match &self.method {
            ScalingMethod::Standard { mean, scale } => (mean, scale),
            ScalingMethod::MinMax {
                data_min, data_max, ..
            } => (data_min, data_max),
        };
        if a.is_empty() {
            return Err(ChurnError::asset("scaler", "no columns"));
        }
        if a.len() != b.len() {
            return Err(ChurnError::asset(
                "scaler",
                format!("parameter widths differ ({} vs {})", a.len(), b.len()),
            ));
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(ChurnError::asset("scaler", "non-finite parameter"));
        }
        if let ScalingMethod::MinMax { range, .. } = &self.method
            && !(range.0.is_finite() && range.1.is_finite() && range.0 < range.1)
        {
            return Err(ChurnError::asset("scaler", "invalid feature range"));
        }
        if let Some(names) = &self.feature_names
            && names.len() != a.len()
        {
            return Err(ChurnError::asset(
                "scaler",
                format!(
                    "{} feature names for {} columns",
                    names.len(),
                    a.len()
                ),
            ));
        }
        Ok(())
    }

    pub fn method(&self) -> &ScalingMethod {
        &self.method
    }

    /// Column order recorded at fit time, if the artifact carries one.
    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// Number of columns the scaler was fit on.
    pub fn width(&self) -> usize {
        match &self.method {
            ScalingMethod::Standard { mean, .. } => mean.len(),
            ScalingMethod::MinMax { data_min, .. } => data_min.len(),
        }
    }

    /// Per-column `(coef, intercept)` of the affine map.
    pub fn coefficients(&self) -> Vec<(f64, f64)> {
        match &self.method {
            ScalingMethod::Standard { mean, scale } => mean
                .iter()
                .zip(scale)
                .map(|(m, s)| {
                    let s = nonzero(*s);
                    (1.0 / s, -m / s)
                })
                .collect(),
            ScalingMethod::MinMax {
                data_min,
                data_max,
                range: (lo, hi),
            } => data_min
                .iter()
                .zip(data_max)
                .map(|(min, max)| {
                    let coef = (hi - lo) / nonzero(max - min);
                    (coef, lo - min * coef)
                })
                .collect(),
        }
    }

    /// Apply the frozen transform.
    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ChurnError> {
        if values.len() != self.width() {
            return Err(ChurnError::DimensionMismatch {
                stage: "scaler",
                expected: self.width(),
                actual: values.len(),
            });
        }
        Ok(values
            .iter()
            .zip(self.coefficients())
            .map(|(x, (coef, intercept))| x * coef + intercept)
            .collect())
    }

    /// The stored offset: the image of an all-zero input.
    pub fn offset(&self) -> Vec<f64> {
        self.coefficients().into_iter().map(|(_, b)| b).collect()
    }

    /// Scaled image of the training centre (mean, or range midpoint).
    pub fn centre(&self) -> Vec<f64> {
        match &self.method {
            ScalingMethod::Standard { mean, .. } => vec![0.0; mean.len()],
            ScalingMethod::MinMax {
                data_min,
                range: (lo, hi),
                ..
            } => vec![lo + (hi - lo) / 2.0; data_min.len()],
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> FeatureScaler {
        FeatureScaler::new(
            ScalingMethod::Standard {
                mean: vec![10.0, 0.0, 5.0],
                scale: vec![2.0, 1.0, 0.0],
            },
            None,
        )
        .expect("valid scaler")
    }

    #[test]
    fn standard_transform() {
        let out = standard().transform(&[12.0, 3.0, 7.0]).expect("width 3");
        // Zero scale on the last column behaves as 1.
        assert_eq!(out, vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn min_max_transform() {
        let scaler = FeatureScaler::new(
            ScalingMethod::MinMax {
                data_min: vec![0.0, 100.0],
                data_max: vec![10.0, 300.0],
                range: (0.0, 1.0),
            },
            None,
        )
        .expect("valid scaler");
        let out = scaler.transform(&[5.0, 150.0]).expect("width 2");
        assert!((out[0] - 0.5).abs() < 1e-12);
        assert!((out[1] - 0.25).abs() < 1e-12);
        assert_eq!(scaler.centre(), vec![0.5, 0.5]);
    }

    #[test]
    fn zeros_reproduce_offset() {
        let scaler = standard();
        let zeros = vec![0.0; scaler.width()];
        assert_eq!(scaler.transform(&zeros).expect("width 3"), scaler.offset());
    }

    #[test]
    fn transform_is_stable() {
        let scaler = standard();
        let input = [11.0, -4.0, 9.5];
        let first = scaler.transform(&input).expect("width 3");
        let second = scaler.transform(&input).expect("width 3");
        assert_eq!(first, second);
    }

    #[test]
    fn wrong_width_is_dimension_mismatch() {
        let err = standard().transform(&[1.0, 2.0]);
        assert_eq!(
            err,
            Err(ChurnError::DimensionMismatch {
                stage: "scaler",
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn rejects_inconsistent_parameters() {
        let ragged = FeatureScaler::new(
            ScalingMethod::Standard {
                mean: vec![1.0, 2.0],
                scale: vec![1.0],
            },
            None,
        );
        assert!(ragged.is_err());

        let nan = FeatureScaler::new(
            ScalingMethod::Standard {
                mean: vec![f64::NAN],
                scale: vec![1.0],
            },
            None,
        );
        assert!(nan.is_err());

        let names = FeatureScaler::new(
            ScalingMethod::Standard {
                mean: vec![1.0],
                scale: vec![1.0],
            },
            Some(vec!["a".into(), "b".into()]),
        );
        assert!(names.is_err());

        let inverted = FeatureScaler::new(
            ScalingMethod::MinMax {
                data_min: vec![0.0],
                data_max: vec![1.0],
                range: (1.0, 0.0),
            },
            None,
        );
        assert!(inverted.is_err());
    }
}
