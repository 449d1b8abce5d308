//! Training objective
//!
//! Gantree: L6_Classifier → TrainingObjective
//!
//! Objective of a weight vector over a fixed dataset: per-sample loss of
//! the network output, reduced to one scalar. The gradient chains the loss
//! derivative through the network's weight gradient.

use crate::loss::{LossKind, Reduction};
use qnn_core::{QnnError, QnnResult};
use qnn_network::{NeuralNetwork, OutputKind};
use qnn_optim::ObjectiveFunction;
use std::cell::Cell;

/// How one output row is compared with its label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// Row against `[y]`
    Scalar,
    /// Row against the one-hot vector of class `y`
    OneHot,
    /// `Σ_c p_c · loss(c, y)`
    Expected,
}

/// Loss of a network over a dataset, as a function of the weights
/// Gantree: TrainingObjective // 학습 목적 함수
pub struct TrainingObjective<'a, N: ?Sized> {
    network: &'a N,
    inputs: &'a [Vec<f64>],
    labels: &'a [f64],
    loss: LossKind,
    reduction: Reduction,
    target: Target,
    evaluations: Cell<usize>,
}

impl<'a, N: NeuralNetwork + ?Sized> TrainingObjective<'a, N> {
    /// Bind a network to a dataset
    /// Gantree: new(network,x,y,loss,reduction) -> Result<Self> // 목적 함수 생성
    pub fn new(
        network: &'a N,
        inputs: &'a [Vec<f64>],
        labels: &'a [f64],
        loss: LossKind,
        reduction: Reduction,
    ) -> QnnResult<Self> {
        if inputs.is_empty() {
            return Err(QnnError::EmptyDataset);
        }
        if inputs.len() != labels.len() {
            return Err(QnnError::LabelCountMismatch {
                samples: inputs.len(),
                labels: labels.len(),
            });
        }

        let target = match (network.output_kind(), loss) {
            (OutputKind::Expectation, LossKind::CrossEntropy) => {
                return Err(QnnError::InvalidConfig(
                    "cross-entropy needs a probability-output network".into(),
                ))
            }
            (OutputKind::Expectation, _) if network.output_shape() == 1 => Target::Scalar,
            (OutputKind::Expectation, _) => Target::OneHot,
            (OutputKind::Probabilities, LossKind::CrossEntropy) => Target::OneHot,
            (OutputKind::Probabilities, _) => Target::Expected,
        };

        if target != Target::Scalar {
            let classes = network.output_shape();
            if let Some(bad) = labels
                .iter()
                .find(|y| !(y.fract() == 0.0 && **y >= 0.0 && (**y as usize) < classes))
            {
                return Err(QnnError::InvalidConfig(format!(
                    "label {} is not a class index below {}",
                    bad, classes
                )));
            }
        }

        Ok(Self {
            network,
            inputs,
            labels,
            loss,
            reduction,
            target,
            evaluations: Cell::new(0),
        })
    }

    /// Objective evaluations so far
    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }

    fn one_hot(&self, label: f64) -> Vec<f64> {
        let mut t = vec![0.0; self.network.output_shape()];
        t[label as usize] = 1.0;
        t
    }

    /// Loss of one output row
    fn sample_loss(&self, row: &[f64], label: f64) -> QnnResult<f64> {
        match self.target {
            Target::Scalar => self.loss.evaluate(row, &[label]),
            Target::OneHot => self.loss.evaluate(row, &self.one_hot(label)),
            Target::Expected => {
                let mut total = 0.0;
                for (c, p) in row.iter().enumerate() {
                    total += p * self.loss.evaluate(&[c as f64], &[label])?;
                }
                Ok(total)
            }
        }
    }

    /// Derivative of one sample's loss with respect to its output row
    fn sample_loss_gradient(&self, row: &[f64], label: f64) -> QnnResult<Vec<f64>> {
        match self.target {
            Target::Scalar => self.loss.gradient(row, &[label]),
            Target::OneHot => self.loss.gradient(row, &self.one_hot(label)),
            Target::Expected => (0..row.len())
                .map(|c| self.loss.evaluate(&[c as f64], &[label]))
                .collect(),
        }
    }
}

impl<N: NeuralNetwork + ?Sized> ObjectiveFunction for TrainingObjective<'_, N> {
    fn value(&self, weights: &[f64]) -> QnnResult<f64> {
        let rows = self.network.forward(self.inputs, weights)?.to_dense();
        let losses = rows
            .iter()
            .zip(self.labels)
            .map(|(row, y)| self.sample_loss(row, *y))
            .collect::<QnnResult<Vec<f64>>>()?;
        let value = self.reduction.reduce(&losses);

        let n = self.evaluations.get() + 1;
        self.evaluations.set(n);
        log::debug!("objective evaluation {}: {:.6}", n, value);
        Ok(value)
    }

    fn gradient(&self, weights: &[f64]) -> QnnResult<Vec<f64>> {
        let rows = self.network.forward(self.inputs, weights)?.to_dense();
        let weight_grads = self.network.backward(self.inputs, weights)?;
        let scale = self.reduction.scale(self.inputs.len());

        let mut grad = vec![0.0; weights.len()];
        for ((row, y), sample_grad) in rows.iter().zip(self.labels).zip(&weight_grads) {
            let d_loss = self.sample_loss_gradient(row, *y)?;
            for (d, output_grad) in d_loss.iter().zip(sample_grad) {
                for (g, dw) in grad.iter_mut().zip(output_grad) {
                    *g += scale * d * dw;
                }
            }
        }
        Ok(grad)
    }
}

// ============================================================================
// Tests
// ============================================================================
