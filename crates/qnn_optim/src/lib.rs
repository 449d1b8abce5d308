//! # QNN Optim
//!
//! Classical optimizers that drive variational training.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qnn_optim // L4: Optim (완료)
//!     ObjectiveFunction // 목적 함수 + 기본 수치 기울기 (완료)
//!     OptimizerResult // 최적화 결과 (완료)
//!     Optimizer // 최적화기 trait (완료)
//!     NelderMead // 기울기 없는 심플렉스 (완료)
//!     GradientDescent // 모멘텀 + 감쇠 스텝 (완료)
//!         step_size() - lr × decay^k
//!     Lbfgs // 준뉴턴 + Armijo (완료)
//!     Convergence // 윈도우 수렴 판단 (완료)
//!         window, threshold_abs, threshold_cum
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qnn_optim::prelude::*;
//!
//! let f = FnObjective::new(|x: &[f64]| (x[0] - 1.0).powi(2) + (x[1] + 2.0).powi(2));
//!
//! let result = NelderMead::new(500).minimize(&f, &[0.0, 0.0]).unwrap();
//! assert!(result.fun < 1e-6);
//!
//! let result = Lbfgs::default().minimize(&f, &[0.0, 0.0]).unwrap();
//! assert!(result.converged);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Objective functions and results (Gantree: L4_Optim → Objective)
pub mod objective;

/// Window-based convergence (Gantree: L4_Optim → Convergence)
pub mod convergence;

/// Optimizer trait (Gantree: L4_Optim → Optimizer)
pub mod optimizer;

/// Nelder-Mead simplex (Gantree: L4_Optim → NelderMead)
pub mod nelder_mead;

/// Gradient descent (Gantree: L4_Optim → GradientDescent)
pub mod gradient_descent;

/// L-BFGS (Gantree: L4_Optim → Lbfgs)
pub mod lbfgs;

// ============================================================================
// Re-exports
// ============================================================================

pub use convergence::Convergence;
pub use gradient_descent::GradientDescent;
pub use lbfgs::Lbfgs;
pub use nelder_mead::NelderMead;
pub use objective::{FnObjective, ObjectiveFunction, OptimizerResult};
pub use optimizer::Optimizer;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qnn_optim::prelude::*;
    //! ```

    pub use crate::convergence::Convergence;
    pub use crate::gradient_descent::GradientDescent;
    pub use crate::lbfgs::Lbfgs;
    pub use crate::nelder_mead::NelderMead;
    pub use crate::objective::{FnObjective, ObjectiveFunction, OptimizerResult};
    pub use crate::optimizer::Optimizer;
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use qnn_core::{QnnError, QnnResult};
    use std::cell::Cell;

    /// Cosine landscape with analytic gradient, like a one-qubit expectation
    struct CosineLandscape;

    impl ObjectiveFunction for CosineLandscape {
        fn value(&self, x: &[f64]) -> QnnResult<f64> {
            Ok(x.iter().map(|t| t.cos()).sum())
        }

        fn gradient(&self, x: &[f64]) -> QnnResult<Vec<f64>> {
            Ok(x.iter().map(|t| -t.sin()).collect())
        }
    }

    #[test]
    fn test_all_optimizers_through_trait_objects() {
        let optimizers: Vec<Box<dyn Optimizer>> = vec![
            Box::new(NelderMead::new(400)),
            Box::new(GradientDescent::new(400).with_learning_rate(0.5)),
            Box::new(Lbfgs::new(100)),
        ];

        for opt in &optimizers {
            let result = opt.minimize(&CosineLandscape, &[2.5, 2.0]).unwrap();
            assert!(result.fun < -1.999, "{}: fun = {}", opt.name(), result.fun);
        }
        assert!(!optimizers[0].requires_gradient());
        assert!(optimizers[2].requires_gradient());
    }

    #[test]
    fn test_error_aborts_immediately() {
        struct FailAfter {
            calls: Cell<usize>,
        }
        impl ObjectiveFunction for FailAfter {
            fn value(&self, x: &[f64]) -> QnnResult<f64> {
                let n = self.calls.get() + 1;
                self.calls.set(n);
                if n > 3 {
                    return Err(QnnError::BackendError("job rejected".into()));
                }
                Ok(x[0] * x[0])
            }
        }

        let f = FailAfter { calls: Cell::new(0) };
        let err = NelderMead::new(100).minimize(&f, &[1.0]).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(f.calls.get(), 4);
    }

    #[test]
    fn test_result_serializes() {
        let f = FnObjective::new(|x: &[f64]| x[0] * x[0]);
        let result = Lbfgs::default().minimize(&f, &[0.5]).unwrap();

        let json = serde_json::to_string(&result).unwrap();
        let back: OptimizerResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
