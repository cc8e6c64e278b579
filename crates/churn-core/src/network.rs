//! # Feed-Forward Network
//!
//! A frozen dense network mapping a scaled feature vector to a churn
//! probability. One record, one forward pass; no batching, no training.
//!
//! Weights are stored row-major as `units x inputs`, so each row holds the
//! incoming weights of one unit.

use crate::ChurnError;
use serde::{Deserialize, Serialize};

/// Per-layer activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    Sigmoid,
    Tanh,
    Linear,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Relu => x.max(0.0),
            Self::Sigmoid => sigmoid(x),
            Self::Tanh => x.tanh(),
            Self::Linear => x,
        }
    }
}

/// Logistic function, split by sign so `exp` never overflows.
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// One fully connected layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    pub fn new(weights: Vec<Vec<f64>>, bias: Vec<f64>, activation: Activation) -> Self {
        Self {
            weights,
            bias,
            activation,
        }
    }

    pub fn units(&self) -> usize {
        self.bias.len()
    }

    pub fn inputs(&self) -> usize {
        self.weights.first().map(Vec::len).unwrap_or(0)
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| {
                let z: f64 = row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + b;
                self.activation.apply(z)
            })
            .collect()
    }
}

/// The frozen classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    layers: Vec<DenseLayer>,
}

impl Network {
    /// Build and validate a network.
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, ChurnError> {
        let network = Self { layers };
        network.validate()?;
        Ok(network)
    }

    /// Check layer shapes chain together and end in a single sigmoid unit.
    pub fn validate(&self) -> Result<(), ChurnError> {
        let Some(last) = self.layers.last() else {
            return Err(ChurnError::asset("model", "no layers"));
        };

        let mut previous_units: Option<usize> = None;
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.units() == 0 || layer.weights.len() != layer.units() {
                return Err(ChurnError::asset(
                    "model",
                    format!(
                        "layer {i}: {} weight rows for {} biases",
                        layer.weights.len(),
                        layer.units()
                    ),
                ));
            }
            let inputs = layer.inputs();
            if inputs == 0 || layer.weights.iter().any(|row| row.len() != inputs) {
                return Err(ChurnError::asset(
                    "model",
                    format!("layer {i}: ragged weight rows"),
                ));
            }
            if let Some(prev) = previous_units
                && prev != inputs
            {
                return Err(ChurnError::asset(
                    "model",
                    format!("layer {i}: expects {inputs} inputs, previous layer has {prev} units"),
                ));
            }
            let finite = layer.bias.iter().all(|b| b.is_finite())
                && layer.weights.iter().flatten().all(|w| w.is_finite());
            if !finite {
                return Err(ChurnError::asset(
                    "model",
                    format!("layer {i}: non-finite parameter"),
                ));
            }
            previous_units = Some(layer.units());
        }

        if last.units() != 1 || last.activation != Activation::Sigmoid {
            return Err(ChurnError::asset(
                "model",
                "output layer must be a single sigmoid unit",
            ));
        }
        Ok(())
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    /// Width of the vector the network consumes.
    pub fn input_width(&self) -> usize {
        self.layers.first().map(DenseLayer::inputs).unwrap_or(0)
    }

    /// Single forward pass. Returns a probability in `[0, 1]`.
    pub fn predict(&self, input: &[f64]) -> Result<f64, ChurnError> {
        if input.len() != self.input_width() {
            return Err(ChurnError::DimensionMismatch {
                stage: "model",
                expected: self.input_width(),
                actual: input.len(),
            });
        }
        // ReLU would silently swallow a NaN, so reject it up front.
        if input.iter().any(|x| !x.is_finite()) {
            return Err(ChurnError::InvalidInput(
                "model input contains a non-finite value".into(),
            ));
        }

        let mut activations = input.to_vec();
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }

        match activations.first() {
            Some(p) if p.is_finite() => Ok(*p),
            _ => Err(ChurnError::InvalidInput(
                "model output is not a finite probability".into(),
            )),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
