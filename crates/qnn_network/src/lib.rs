//! # QNN Network
//!
//! Quantum neural network estimators built from a feature circuit, a
//! trainable circuit and a measurement.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qnn_network // L5: Network (완료)
//!     CompositeOperator // 회로 + 측정, 입력/가중치 분할 (완료)
//!         compose() - feature map → ansatz
//!         bind() - 위치 바인딩
//!     NeuralNetwork // forward/backward trait (완료)
//!     GradientMethod // 파라미터 시프트 / 유한 차분 (완료)
//!     ExpectationQnn // 기대값 모드 (완료)
//!         ExpectationConverter - Auto, Sampling, Exact
//!     SamplerQnn // 샘플링 + 해석 모드 (완료)
//!         Interpretation - 결과 → 클래스
//!     TwoLayerQnn // 기본값 빌더 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qnn_network::prelude::*;
//!
//! let qnn = TwoLayerQnn::new(2).build().unwrap();
//! let weights = vec![0.1; qnn.num_weights()];
//!
//! let out = qnn.forward(&[vec![0.3, 0.7]], &weights).unwrap();
//! let grad = qnn.backward(&[vec![0.3, 0.7]], &weights).unwrap();
//! assert_eq!(out.len(), 1);
//! assert_eq!(grad[0][0].len(), weights.len());
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Composite operator (Gantree: L5_Network → CompositeOperator)
pub mod operator;

/// Network trait and outputs (Gantree: L5_Network → NeuralNetwork)
pub mod neural_network;

/// Gradient protocols (Gantree: L5_Network → GradientMethod)
pub mod gradient;

/// Expectation-value network (Gantree: L5_Network → ExpectationQnn)
pub mod expectation_qnn;

/// Sampling network (Gantree: L5_Network → SamplerQnn)
pub mod sampler_qnn;

/// Two-layer builder (Gantree: L5_Network → TwoLayerQnn)
pub mod two_layer;

// ============================================================================
// Re-exports
// ============================================================================

pub use expectation_qnn::{ExpectationConverter, ExpectationQnn};
pub use gradient::{DerivativeRule, GradientMethod};
pub use neural_network::{EvaluationResult, NetworkOutput, NeuralNetwork, OutputKind, WeightGradient};
pub use operator::{CompositeOperator, Measurement};
pub use sampler_qnn::{Interpretation, SamplerQnn};
pub use two_layer::TwoLayerQnn;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qnn_network::prelude::*;
    //! ```

    pub use crate::expectation_qnn::{ExpectationConverter, ExpectationQnn};
    pub use crate::gradient::{DerivativeRule, GradientMethod};
    pub use crate::neural_network::{
        EvaluationResult, NetworkOutput, NeuralNetwork, OutputKind, WeightGradient,
    };
    pub use crate::operator::{CompositeOperator, Measurement};
    pub use crate::sampler_qnn::{Interpretation, SamplerQnn};
    pub use crate::two_layer::TwoLayerQnn;
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use approx::assert_abs_diff_eq;
    use qnn_backend::{CountingBackend, StatevectorBackend};
    use qnn_core::prelude::*;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn small_qnn() -> ExpectationQnn {
        TwoLayerQnn::new(2)
            .with_ansatz(RealAmplitudes::new(2).with_reps(1).build())
            .build()
            .unwrap()
    }

    #[test]
    fn test_gradient_matches_numeric_derivative() {
        let qnn = small_qnn();
        let x = vec![vec![0.4, -0.8], vec![1.1, 0.2]];
        let w = vec![0.3, -0.5, 1.2, 0.7];
        let grad = qnn.backward(&x, &w).unwrap();

        let eps = 1e-6;
        for k in 0..w.len() {
            let mut plus = w.clone();
            plus[k] += eps;
            let mut minus = w.clone();
            minus[k] -= eps;
            let fp = qnn.forward(&x, &plus).unwrap().to_dense();
            let fm = qnn.forward(&x, &minus).unwrap().to_dense();
            for s in 0..x.len() {
                let numeric = (fp[s][0] - fm[s][0]) / (2.0 * eps);
                assert_abs_diff_eq!(grad[s][0][k], numeric, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_finite_difference_agrees_with_shift() {
        let shift = small_qnn();
        let fd = small_qnn()
            .with_gradient_method(GradientMethod::finite_difference())
            .unwrap();
        let x = vec![vec![0.9, 0.1]];
        let w = vec![0.2, 0.4, 0.6, 0.8];

        let a = shift.backward(&x, &w).unwrap();
        let b = fd.backward(&x, &w).unwrap();
        for k in 0..w.len() {
            assert_abs_diff_eq!(a[0][0][k], b[0][0][k], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_shape_errors_dispatch_no_jobs() {
        let backend = Arc::new(CountingBackend::new(StatevectorBackend::new(2)));
        let counter = backend.counter();
        let qnn = TwoLayerQnn::new(2).with_shared_backend(backend).build().unwrap();
        let w = vec![0.0; qnn.num_weights()];

        let err = qnn.forward(&[vec![0.1, 0.2], vec![0.3]], &w).unwrap_err();
        assert!(err.is_shape_error());
        let err = qnn.backward(&[vec![0.1, 0.2]], &w[1..]).unwrap_err();
        assert!(err.is_shape_error());
        let err = qnn.evaluate(&[vec![0.1, 0.2, 0.3]], &w, true).unwrap_err();
        assert!(err.is_shape_error());
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        qnn.forward(&[vec![0.1, 0.2]], &w).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backward_job_count() {
        // 2 shifted circuits per weight per sample
        let backend = Arc::new(CountingBackend::new(StatevectorBackend::new(2)));
        let counter = backend.counter();
        let qnn = TwoLayerQnn::new(2)
            .with_ansatz(RealAmplitudes::new(2).with_reps(1).build())
            .with_shared_backend(backend)
            .build()
            .unwrap();

        qnn.backward(&[vec![0.1, 0.2], vec![0.3, 0.4]], &[0.0; 4]).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2 * 2 * 4);
    }

    #[test]
    fn test_default_output_bounded() {
        let qnn = TwoLayerQnn::new(3).build().unwrap();
        let inputs: Vec<Vec<f64>> = (0..6)
            .map(|i| vec![0.5 * i as f64, -0.3 * i as f64, 1.0])
            .collect();

        for seed in 0..4 {
            let w: Vec<f64> = (0..qnn.num_weights())
                .map(|k| ((k * 7 + seed * 13) % 11) as f64 * 0.6)
                .collect();
            for row in qnn.forward(&inputs, &w).unwrap().to_dense() {
                assert!(row[0] >= -1.0 - 1e-12 && row[0] <= 1.0 + 1e-12);
            }
        }
    }

    #[test]
    fn test_forward_deterministic_on_exact_backend() {
        let qnn = small_qnn();
        let x = vec![vec![0.3, 0.6]];
        let w = vec![0.5; 4];
        assert_eq!(qnn.forward(&x, &w).unwrap(), qnn.forward(&x, &w).unwrap());
    }

    #[test]
    fn test_evaluate_result() {
        let qnn = small_qnn();
        let r = qnn.evaluate(&[vec![0.2, 0.2]], &[0.1; 4], true).unwrap();
        assert_eq!(r.output.len(), 1);
        let g = r.weight_gradient.unwrap();
        assert_eq!((g.len(), g[0].len(), g[0][0].len()), (1, 1, 4));
    }

    #[test]
    fn test_sampler_probabilities_sum_to_one() {
        let qnn = TwoLayerQnn::new(2).build_sampler(None, None).unwrap();
        let w = vec![0.4; qnn.num_weights()];
        let out = qnn.forward(&[vec![0.1, 0.9], vec![1.5, -0.2]], &w).unwrap();
        for row in out.to_dense() {
            assert_eq!(row.len(), 4);
            assert_abs_diff_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
    }
}
