//! # QNN Classifier
//!
//! Supervised training of quantum neural networks.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qnn_classifier // L6: Classifier (완료)
//!     LossKind // L1, L2, 교차 엔트로피 (완료)
//!         evaluate() / gradient()
//!         Reduction - mean, sum
//!     DecisionRule // 부호 / argmax (완료)
//!         accuracy()
//!     TrainingObjective // 데이터셋 위 손실 함수 (완료)
//!     ClassifierConfig // 학습 설정 (완료)
//!         warm_start, initial_point, seed
//!     NeuralNetworkClassifier // 학습 루프 (완료)
//!         fit() → predict() → score()
//!         snapshot() / restore()
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qnn_classifier::prelude::*;
//! use qnn_network::TwoLayerQnn;
//! use qnn_optim::NelderMead;
//!
//! let qnn = TwoLayerQnn::new(2).build().unwrap();
//! let x = vec![vec![0.1, 0.2], vec![0.2, 0.1], vec![2.0, 2.2], vec![2.1, 1.9]];
//! let y = vec![1.0, 1.0, -1.0, -1.0];
//!
//! let mut clf =
//!     NeuralNetworkClassifier::new(qnn, NelderMead::new(20), ClassifierConfig::default()).unwrap();
//! clf.fit(&x, &y).unwrap();
//!
//! let score = clf.score(&x, &y).unwrap();
//! assert!((0.0..=1.0).contains(&score));
//! ```
//!
//! ## Warm Start
//!
//! ```rust
//! use qnn_classifier::prelude::*;
//!
//! let config = ClassifierConfig::with_loss_name("l2")
//!     .unwrap()
//!     .with_warm_start(true)
//!     .with_seed(7);
//! assert!(config.warm_start);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Loss functions (Gantree: L6_Classifier → Loss)
pub mod loss;

/// Decision rules and accuracy (Gantree: L6_Classifier → Scoring)
pub mod scoring;

/// Dataset objective (Gantree: L6_Classifier → TrainingObjective)
pub mod objective;

/// Training configuration (Gantree: L6_Classifier → ClassifierConfig)
pub mod config;

/// Training loop (Gantree: L6_Classifier → NeuralNetworkClassifier)
pub mod classifier;

// ============================================================================
// Re-exports
// ============================================================================

pub use classifier::{NeuralNetworkClassifier, TrainingSnapshot};
pub use config::{ClassifierConfig, InitialPoint};
pub use loss::{LossKind, Reduction};
pub use objective::TrainingObjective;
pub use scoring::{accuracy, DecisionRule};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qnn_classifier::prelude::*;
    //! ```

    pub use crate::classifier::{NeuralNetworkClassifier, TrainingSnapshot};
    pub use crate::config::{ClassifierConfig, InitialPoint};
    pub use crate::loss::{LossKind, Reduction};
    pub use crate::objective::TrainingObjective;
    pub use crate::scoring::{accuracy, DecisionRule};
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use qnn_backend::{Backend, ExecutionResult, SimulatorBackend, StatevectorBackend};
    use qnn_core::prelude::*;
    use qnn_network::{ExpectationQnn, Interpretation, NeuralNetwork, SamplerQnn, TwoLayerQnn};
    use qnn_optim::{Lbfgs, NelderMead, Optimizer};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// <Z> = cos(x0 + x1 + w) on one qubit
    fn summing_qnn() -> ExpectationQnn {
        let x0 = Parameter::new("x0");
        let x1 = Parameter::new("x1");
        let w = Parameter::new("w");
        TwoLayerQnn::new(1)
            .with_feature_map(CircuitBuilder::new(1).ry(0, &x0).ry(0, &x1).build())
            .with_ansatz(CircuitBuilder::new(1).ry(0, &w).build())
            .build()
            .unwrap()
    }

    fn separable_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x = vec![
            vec![0.0, 0.1],
            vec![0.2, 0.1],
            vec![0.1, 0.3],
            vec![0.05, 0.2],
            vec![1.2, 1.0],
            vec![1.3, 1.1],
            vec![1.0, 1.5],
            vec![1.1, 1.2],
        ];
        let y = vec![-1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    /// P(1) = sin²((x + w) / 2), classes by parity
    fn parity_sampler() -> SamplerQnn {
        let x = Parameter::new("x");
        let w = Parameter::new("w");
        TwoLayerQnn::new(1)
            .with_feature_map(CircuitBuilder::new(1).ry(0, &x).build())
            .with_ansatz(CircuitBuilder::new(1).ry(0, &w).build())
            .build_sampler(Some(Interpretation::parity()), Some(2))
            .unwrap()
    }

    /// <Z0> = cos(x0 + x1 + w) on a two-qubit register, sampled with 100 shots
    fn shot_qnn() -> ExpectationQnn {
        let x0 = Parameter::new("x0");
        let x1 = Parameter::new("x1");
        let w = Parameter::new("w");
        TwoLayerQnn::new(2)
            .with_feature_map(CircuitBuilder::new(2).ry(0, &x0).ry(0, &x1).build())
            .with_ansatz(CircuitBuilder::new(2).ry(0, &w).build())
            .with_observable(Observable::single_z(2, 0).unwrap())
            .with_backend(SimulatorBackend::new(2).with_shots(100).with_seed(123))
            .build()
            .unwrap()
    }

    fn fit_score_refit<N, O>(clf: &mut NeuralNetworkClassifier<N, O>, x: &[Vec<f64>], y: &[f64])
    where
        N: NeuralNetwork,
        O: Optimizer,
    {
        clf.fit(x, y).unwrap();
        assert_eq!(clf.score(x, y).unwrap(), 1.0);
        let first = clf.fit_result().unwrap().fun;

        clf.fit(x, y).unwrap();
        assert_eq!(clf.score(x, y).unwrap(), 1.0);
        assert!(clf.fit_result().unwrap().fun <= first + 1e-12);
    }

    /// Statevector backend that fails while switched on
    struct FlakyBackend {
        inner: StatevectorBackend,
        failing: Arc<AtomicBool>,
    }

    impl FlakyBackend {
        fn check(&self) -> QnnResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(QnnError::BackendError("device offline".into()));
            }
            Ok(())
        }
    }

    impl Backend for FlakyBackend {
        fn name(&self) -> &str {
            "flaky"
        }

        fn num_qubits(&self) -> usize {
            self.inner.num_qubits()
        }

        fn is_exact(&self) -> bool {
            true
        }

        fn shots(&self) -> Option<u64> {
            None
        }

        fn expectation(&self, circuit: &Circuit, observable: &Observable) -> QnnResult<f64> {
            self.check()?;
            self.inner.expectation(circuit, observable)
        }

        fn sample(&self, circuit: &Circuit) -> QnnResult<ExecutionResult> {
            self.check()?;
            self.inner.sample(circuit)
        }
    }

    #[test]
    fn test_end_to_end_accuracy() {
        let (x, y) = separable_data();
        let mut clf = NeuralNetworkClassifier::new(
            summing_qnn(),
            NelderMead::new(200),
            ClassifierConfig::default(),
        )
        .unwrap();

        clf.fit(&x, &y).unwrap();
        assert!(clf.score(&x, &y).unwrap() > 0.6);

        let predictions = clf.predict(&x).unwrap();
        assert!(predictions.iter().all(|p| *p == 1.0 || *p == -1.0));
    }

    #[test]
    fn test_gradient_based_training() {
        let (x, y) = separable_data();
        let mut clf =
            NeuralNetworkClassifier::new(summing_qnn(), Lbfgs::new(100), ClassifierConfig::default())
                .unwrap();

        clf.fit(&x, &y).unwrap();
        let result = clf.fit_result().unwrap();
        assert!(result.gradient_evaluations > 0);
        assert!(clf.score(&x, &y).unwrap() > 0.6);
    }

    #[test]
    fn test_warm_start_continues() {
        let (x, y) = separable_data();
        let config = ClassifierConfig::default().with_warm_start(true);
        let mut clf = NeuralNetworkClassifier::new(summing_qnn(), NelderMead::new(15), config).unwrap();

        clf.fit(&x, &y).unwrap();
        let first = clf.fit_result().unwrap().fun;
        clf.fit(&x, &y).unwrap();
        let second = clf.fit_result().unwrap().fun;

        assert!(second <= first);
    }

    #[test]
    fn test_cold_start_repeats() {
        let (x, y) = separable_data();
        let mut clf = NeuralNetworkClassifier::new(
            summing_qnn(),
            NelderMead::new(15),
            ClassifierConfig::default(),
        )
        .unwrap();

        clf.fit(&x, &y).unwrap();
        let first = clf.weights().unwrap().to_vec();
        clf.fit(&x, &y).unwrap();

        assert_eq!(clf.weights().unwrap(), first.as_slice());
    }

    #[test]
    fn test_two_qubit_defaults() {
        let x = vec![
            vec![0.1, 0.4],
            vec![0.8, 0.2],
            vec![1.5, 1.1],
            vec![2.0, 0.3],
            vec![0.6, 2.4],
        ];
        let y = vec![1.0, -1.0, 1.0, -1.0, 1.0];

        let fit_score = || {
            let qnn = TwoLayerQnn::new(2).build().unwrap();
            assert_eq!(qnn.num_inputs(), 2);
            let mut clf =
                NeuralNetworkClassifier::new(qnn, NelderMead::new(10), ClassifierConfig::default())
                    .unwrap();
            clf.fit(&x, &y).unwrap();
            clf.score(&x, &y).unwrap()
        };

        let a = fit_score();
        assert!((0.0..=1.0).contains(&a));
        assert_eq!(a, fit_score());
    }

    #[test]
    fn test_sampler_cross_entropy() {
        let x = Parameter::new("x");
        let w = Parameter::new("w");
        let qnn = TwoLayerQnn::new(1)
            .with_feature_map(CircuitBuilder::new(1).ry(0, &x).build())
            .with_ansatz(CircuitBuilder::new(1).ry(0, &w).build())
            .build_sampler(Some(Interpretation::parity()), Some(2))
            .unwrap();
        let inputs = vec![vec![0.1], vec![0.3], vec![2.8], vec![3.0]];
        let labels = vec![0.0, 0.0, 1.0, 1.0];

        let mut clf = NeuralNetworkClassifier::new(
            qnn,
            NelderMead::new(100),
            ClassifierConfig::new(LossKind::CrossEntropy),
        )
        .unwrap();
        assert_eq!(clf.decision_rule(), DecisionRule::ArgMax);

        clf.fit(&inputs, &labels).unwrap();
        assert_eq!(clf.predict(&inputs).unwrap(), labels);
        assert_eq!(clf.score(&inputs, &labels).unwrap(), 1.0);
    }

    #[test]
    fn test_shot_backend_training() {
        let x = vec![
            vec![0.0, 0.1],
            vec![0.2, 0.1],
            vec![0.1, 0.3],
            vec![0.05, 0.2],
            vec![1.2, 1.2],
            vec![1.3, 1.1],
            vec![1.0, 1.5],
            vec![1.1, 1.3],
        ];
        let y = vec![1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, -1.0];
        let config = ClassifierConfig::default().with_warm_start(true);

        let qnn = shot_qnn();
        assert!(!qnn.backend().is_exact());
        let mut clf = NeuralNetworkClassifier::new(qnn, Lbfgs::new(5), config.clone()).unwrap();
        fit_score_refit(&mut clf, &x, &y);

        let mut clf = NeuralNetworkClassifier::new(shot_qnn(), NelderMead::new(40), config).unwrap();
        fit_score_refit(&mut clf, &x, &y);
    }

    #[test]
    fn test_sampler_distance_losses() {
        let inputs = vec![vec![0.1], vec![0.3], vec![2.8], vec![3.0]];
        let labels = vec![0.0, 0.0, 1.0, 1.0];

        for loss in [LossKind::Absolute, LossKind::Squared] {
            let config = ClassifierConfig::new(loss).with_warm_start(true);
            let mut clf =
                NeuralNetworkClassifier::new(parity_sampler(), NelderMead::new(100), config).unwrap();
            assert_eq!(clf.decision_rule(), DecisionRule::ArgMax);
            fit_score_refit(&mut clf, &inputs, &labels);
            assert_eq!(clf.predict(&inputs).unwrap(), labels);
        }

        let mut clf = NeuralNetworkClassifier::new(
            parity_sampler(),
            Lbfgs::new(20),
            ClassifierConfig::new(LossKind::Squared).with_warm_start(true),
        )
        .unwrap();
        fit_score_refit(&mut clf, &inputs, &labels);
    }

    #[test]
    fn test_backend_failure_keeps_state() {
        let failing = Arc::new(AtomicBool::new(false));
        let backend = FlakyBackend {
            inner: StatevectorBackend::new(1),
            failing: Arc::clone(&failing),
        };
        let x0 = Parameter::new("x0");
        let x1 = Parameter::new("x1");
        let w = Parameter::new("w");
        let qnn = TwoLayerQnn::new(1)
            .with_feature_map(CircuitBuilder::new(1).ry(0, &x0).ry(0, &x1).build())
            .with_ansatz(CircuitBuilder::new(1).ry(0, &w).build())
            .with_backend(backend)
            .build()
            .unwrap();
        let (x, y) = separable_data();
        let mut clf = NeuralNetworkClassifier::new(
            qnn,
            NelderMead::new(20),
            ClassifierConfig::default().with_warm_start(true),
        )
        .unwrap();

        clf.fit(&x, &y).unwrap();
        let weights = clf.weights().unwrap().to_vec();
        let result = clf.fit_result().cloned();

        failing.store(true, Ordering::SeqCst);
        let err = clf.fit(&x, &y).err().unwrap();
        assert!(err.is_recoverable());
        assert_eq!(clf.weights().unwrap(), weights.as_slice());
        assert_eq!(clf.fit_result().cloned(), result);

        failing.store(false, Ordering::SeqCst);
        assert!(clf.predict(&x).is_ok());
    }

    #[test]
    fn test_unfitted_errors() {
        let clf = NeuralNetworkClassifier::new(
            summing_qnn(),
            NelderMead::default(),
            ClassifierConfig::default(),
        )
        .unwrap();
        let (x, y) = separable_data();

        assert_eq!(clf.predict(&x).unwrap_err(), QnnError::NotFitted);
        assert_eq!(clf.score(&x, &y).unwrap_err(), QnnError::NotFitted);
        assert_eq!(clf.loss(&x, &y).unwrap_err(), QnnError::NotFitted);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "loss": "absolute",
            "reduction": "sum",
            "warm_start": true,
            "initial_point": "zeros",
            "seed": null
        }"#;
        let config = ClassifierConfig::from_json(json).unwrap();
        assert_eq!(config.loss, LossKind::Absolute);
        assert_eq!(config.initial_point, InitialPoint::Zeros);

        let (x, y) = separable_data();
        let mut clf = NeuralNetworkClassifier::new(summing_qnn(), NelderMead::new(5), config).unwrap();
        clf.fit(&x, &y).unwrap();
        assert!(clf.loss(&x, &y).unwrap() <= clf.fit_result().unwrap().fun + 1e-12);
    }
}
