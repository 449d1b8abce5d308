//! Neural network interface
//!
//! Gantree: L5_Network → NeuralNetwork
//!
//! Batched forward and backward passes over samples. Gradients are taken
//! with respect to weights only.

use qnn_core::{QnnError, QnnResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// `[sample][output][weight]`
pub type WeightGradient = Vec<Vec<Vec<f64>>>;

// ============================================================================
// Output Types
// ============================================================================

/// Kind of values a network produces
/// Gantree: OutputKind // 출력 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputKind {
    /// Real expectation values
    Expectation,

    /// Probability vector over interpreted outcomes
    Probabilities,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Expectation => write!(f, "expectation"),
            OutputKind::Probabilities => write!(f, "probabilities"),
        }
    }
}

/// Batched network output
/// Gantree: NetworkOutput // 배치 출력
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NetworkOutput {
    /// One row of length `output_shape` per sample
    Dense(Vec<Vec<f64>>),

    /// Nonzero entries per sample
    Sparse {
        /// Row length of the dense form
        shape: usize,
        /// Nonzero entries, keyed by output index
        rows: Vec<BTreeMap<usize, f64>>,
    },
}

impl NetworkOutput {
    /// Number of samples
    pub fn len(&self) -> usize {
        match self {
            NetworkOutput::Dense(rows) => rows.len(),
            NetworkOutput::Sparse { rows, .. } => rows.len(),
        }
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if sparse
    pub fn is_sparse(&self) -> bool {
        matches!(self, NetworkOutput::Sparse { .. })
    }

    /// Dense rows
    /// Gantree: to_dense(&self) -> Vec<Vec<f64>> // 밀집 변환
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        (0..self.len()).filter_map(|i| self.row(i)).collect()
    }

    /// Dense row of one sample
    pub fn row(&self, sample: usize) -> Option<Vec<f64>> {
        match self {
            NetworkOutput::Dense(rows) => rows.get(sample).cloned(),
            NetworkOutput::Sparse { shape, rows } => rows.get(sample).map(|entries| {
                let mut row = vec![0.0; *shape];
                for (&i, &v) in entries {
                    if let Some(slot) = row.get_mut(i) {
                        *slot = v;
                    }
                }
                row
            }),
        }
    }
}

/// Forward output with optional weight gradient
/// Gantree: EvaluationResult // 평가 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Forward output
    pub output: NetworkOutput,

    /// Gradient with respect to weights, when requested
    pub weight_gradient: Option<WeightGradient>,
}

// ============================================================================
// Neural Network Trait
// ============================================================================

/// Quantum neural network
/// Gantree: NeuralNetwork // 신경망 trait
pub trait NeuralNetwork {
    /// Length of one input sample
    fn num_inputs(&self) -> usize;

    /// Length of the weight vector
    fn num_weights(&self) -> usize;

    /// Outputs per sample
    fn output_shape(&self) -> usize;

    /// Kind of outputs
    fn output_kind(&self) -> OutputKind;

    /// Whether `forward` returns sparse output
    fn is_sparse(&self) -> bool {
        false
    }

    /// Check a batch and a weight vector
    /// Gantree: validate_shapes(inputs,weights) -> Result<()> // 형상 검사
    fn validate_shapes(&self, inputs: &[Vec<f64>], weights: &[f64]) -> QnnResult<()> {
        if weights.len() != self.num_weights() {
            return Err(QnnError::WeightShapeMismatch {
                expected: self.num_weights(),
                actual: weights.len(),
            });
        }
        if let Some(bad) = inputs.iter().find(|x| x.len() != self.num_inputs()) {
            return Err(QnnError::InputShapeMismatch {
                expected: self.num_inputs(),
                actual: bad.len(),
            });
        }
        Ok(())
    }

    /// Outputs for a batch of samples
    /// Gantree: forward(inputs,weights) -> Result<NetworkOutput> // 순전파
    fn forward(&self, inputs: &[Vec<f64>], weights: &[f64]) -> QnnResult<NetworkOutput>;

    /// Weight gradients for a batch of samples
    /// Gantree: backward(inputs,weights) -> Result<WeightGradient> // 역전파
    fn backward(&self, inputs: &[Vec<f64>], weights: &[f64]) -> QnnResult<WeightGradient>;

    /// Forward pass plus gradient on request
    fn evaluate(
        &self,
        inputs: &[Vec<f64>],
        weights: &[f64],
        with_gradient: bool,
    ) -> QnnResult<EvaluationResult> {
        self.validate_shapes(inputs, weights)?;
        let output = self.forward(inputs, weights)?;
        let weight_gradient = if with_gradient {
            Some(self.backward(inputs, weights)?)
        } else {
            None
        };
        Ok(EvaluationResult {
            output,
            weight_gradient,
        })
    }
}

impl<N: NeuralNetwork + ?Sized> NeuralNetwork for Box<N> {
    fn num_inputs(&self) -> usize {
        (**self).num_inputs()
    }

    fn num_weights(&self) -> usize {
        (**self).num_weights()
    }

    fn output_shape(&self) -> usize {
        (**self).output_shape()
    }

    fn output_kind(&self) -> OutputKind {
        (**self).output_kind()
    }

    fn is_sparse(&self) -> bool {
        (**self).is_sparse()
    }

    fn forward(&self, inputs: &[Vec<f64>], weights: &[f64]) -> QnnResult<NetworkOutput> {
        (**self).forward(inputs, weights)
    }

    fn backward(&self, inputs: &[Vec<f64>], weights: &[f64]) -> QnnResult<WeightGradient> {
        (**self).backward(inputs, weights)
    }
}

// ============================================================================
// Tests
// ============================================================================
