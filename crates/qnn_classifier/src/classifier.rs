//! Neural network classifier
//!
//! Gantree: L6_Classifier → NeuralNetworkClassifier
//!
//! Two states: unfitted (no weights) and fitted (weights from the last
//! successful `fit`). A failed `fit` leaves the previous state untouched.

use crate::config::ClassifierConfig;
use crate::loss::LossKind;
use crate::objective::TrainingObjective;
use crate::scoring::{accuracy, DecisionRule};
use qnn_core::{QnnError, QnnResult};
use qnn_network::{NeuralNetwork, OutputKind};
use qnn_optim::{ObjectiveFunction, Optimizer, OptimizerResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Training Snapshot
// ============================================================================

/// Persisted training state
/// Gantree: TrainingSnapshot // 학습 상태 스냅샷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSnapshot {
    /// Learned weights
    pub weights: Vec<f64>,

    /// Result of the fit that produced the weights
    pub fit_result: Option<OptimizerResult>,

    /// Configuration in effect
    pub config: ClassifierConfig,
}

impl TrainingSnapshot {
    /// Serialize to JSON
    pub fn to_json(&self) -> QnnResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> QnnResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Classifier training a quantum neural network with a classical optimizer
/// Gantree: NeuralNetworkClassifier<N,O> // 신경망 분류기
pub struct NeuralNetworkClassifier<N, O> {
    network: N,
    optimizer: O,
    config: ClassifierConfig,
    rule: DecisionRule,
    weights: Option<Vec<f64>>,
    fit_result: Option<OptimizerResult>,
}

impl<N: NeuralNetwork, O: Optimizer> NeuralNetworkClassifier<N, O> {
    /// Create an unfitted classifier
    /// Gantree: new(network,optimizer,config) -> Result<Self> // 생성자
    pub fn new(network: N, optimizer: O, config: ClassifierConfig) -> QnnResult<Self> {
        config.validate()?;
        optimizer.validate()?;

        if config.loss == LossKind::CrossEntropy && network.output_kind() == OutputKind::Expectation {
            return Err(QnnError::InvalidConfig(
                "cross-entropy loss needs a probability-output network".into(),
            ));
        }
        // a fixed start must fit the network
        if let crate::config::InitialPoint::Fixed(values) = &config.initial_point {
            if values.len() != network.num_weights() {
                return Err(QnnError::WeightShapeMismatch {
                    expected: network.num_weights(),
                    actual: values.len(),
                });
            }
        }

        let rule = match network.output_kind() {
            OutputKind::Expectation => DecisionRule::for_output_shape(network.output_shape()),
            OutputKind::Probabilities => DecisionRule::ArgMax,
        };

        Ok(Self {
            network,
            optimizer,
            config,
            rule,
            weights: None,
            fit_result: None,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Network
    pub fn network(&self) -> &N {
        &self.network
    }

    /// Optimizer
    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }

    /// Configuration
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Decision rule
    pub fn decision_rule(&self) -> DecisionRule {
        self.rule
    }

    /// Learned weights
    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    /// Result of the last successful fit
    pub fn fit_result(&self) -> Option<&OptimizerResult> {
        self.fit_result.as_ref()
    }

    /// Check if fitted
    pub fn is_fitted(&self) -> bool {
        self.weights.is_some()
    }

    fn fitted_weights(&self) -> QnnResult<&[f64]> {
        self.weights.as_deref().ok_or(QnnError::NotFitted)
    }

    // ========================================================================
    // Training
    // ========================================================================

    /// Train on `x` with labels `y`
    /// Gantree: fit(x,y) -> Result<&mut Self> // 학습
    ///
    /// With warm start and existing weights the optimizer starts from them,
    /// otherwise from the configured initial point.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> QnnResult<&mut Self> {
        let objective =
            TrainingObjective::new(&self.network, x, y, self.config.loss, self.config.reduction)?;

        let (x0, warm) = match (&self.weights, self.config.warm_start) {
            (Some(w), true) => (w.clone(), true),
            _ => (self.config.initial_weights(self.network.num_weights())?, false),
        };
        log::info!(
            "fit: {} samples, {} weights, {} start, optimizer {}",
            x.len(),
            x0.len(),
            if warm { "warm" } else { "cold" },
            self.optimizer.name()
        );

        let result = self.optimizer.minimize(&objective, &x0)?;
        if result.x.len() != x0.len() {
            return Err(QnnError::OptimizerError(format!(
                "optimizer returned {} weights, expected {}",
                result.x.len(),
                x0.len()
            )));
        }
        log::info!(
            "fit done: objective={:.6}, iterations={}, evaluations={}, converged={}",
            result.fun,
            result.iterations,
            objective.evaluations(),
            result.converged
        );

        self.weights = Some(result.x.clone());
        self.fit_result = Some(result);
        Ok(self)
    }

    // ========================================================================
    // Inference
    // ========================================================================

    /// Class decisions for `x`
    /// Gantree: predict(x) -> Result<Vec<f64>> // 예측
    pub fn predict(&self, x: &[Vec<f64>]) -> QnnResult<Vec<f64>> {
        let weights = self.fitted_weights()?;
        let rows = self.network.forward(x, weights)?.to_dense();
        Ok(self.rule.decide_all(&rows))
    }

    /// Accuracy on `x` against `y`
    /// Gantree: score(x,y) -> Result<f64> // 정확도 평가
    pub fn score(&self, x: &[Vec<f64>], y: &[f64]) -> QnnResult<f64> {
        self.fitted_weights()?;
        if x.len() != y.len() {
            return Err(QnnError::LabelCountMismatch {
                samples: x.len(),
                labels: y.len(),
            });
        }
        let predictions = self.predict(x)?;
        accuracy(&predictions, y)
    }

    /// Training objective at the current weights
    pub fn loss(&self, x: &[Vec<f64>], y: &[f64]) -> QnnResult<f64> {
        let weights = self.fitted_weights()?;
        TrainingObjective::new(&self.network, x, y, self.config.loss, self.config.reduction)?
            .value(weights)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Capture the fitted state
    pub fn snapshot(&self) -> QnnResult<TrainingSnapshot> {
        Ok(TrainingSnapshot {
            weights: self.fitted_weights()?.to_vec(),
            fit_result: self.fit_result.clone(),
            config: self.config.clone(),
        })
    }

    /// Load a fitted state; the next warm `fit` continues from it
    pub fn restore(&mut self, snapshot: TrainingSnapshot) -> QnnResult<()> {
        if snapshot.weights.len() != self.network.num_weights() {
            return Err(QnnError::WeightShapeMismatch {
                expected: self.network.num_weights(),
                actual: snapshot.weights.len(),
            });
        }
        if snapshot.weights.iter().any(|w| !w.is_finite()) {
            return Err(QnnError::InvalidConfig(
                "snapshot weights contain non-finite values".into(),
            ));
        }
        self.weights = Some(snapshot.weights);
        self.fit_result = snapshot.fit_result;
        Ok(())
    }

    /// Drop learned weights
    pub fn reset(&mut self) {
        self.weights = None;
        self.fit_result = None;
    }
}

impl<N: NeuralNetwork, O: Optimizer> fmt::Display for NeuralNetworkClassifier<N, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NeuralNetworkClassifier(weights={}, optimizer={}, loss={}, fitted={})",
            self.network.num_weights(),
            self.optimizer.name(),
            self.config.loss,
            self.is_fitted()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
