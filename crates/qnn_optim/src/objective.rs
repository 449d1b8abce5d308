//! Objective functions and optimizer results
//!
//! Gantree: L4_Optim → Objective
//!
//! The optimizer only sees a scalar function of a weight vector and,
//! optionally, its gradient. Errors raised by the function abort the
//! optimization unchanged.

use qnn_core::constants::gradient::{central_difference, FINITE_DIFF_EPSILON};
use qnn_core::{QnnError, QnnResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Objective Function
// ============================================================================

/// Scalar function to minimize
/// Gantree: ObjectiveFunction // 목적 함수 trait
pub trait ObjectiveFunction {
    /// Function value at `x`
    fn value(&self, x: &[f64]) -> QnnResult<f64>;

    /// Gradient at `x` (default: central finite differences)
    fn gradient(&self, x: &[f64]) -> QnnResult<Vec<f64>> {
        let mut point = x.to_vec();
        let mut grad = Vec::with_capacity(x.len());
        for i in 0..x.len() {
            point[i] = x[i] + FINITE_DIFF_EPSILON;
            let plus = self.value(&point)?;
            point[i] = x[i] - FINITE_DIFF_EPSILON;
            let minus = self.value(&point)?;
            point[i] = x[i];
            grad.push(central_difference(plus, minus, FINITE_DIFF_EPSILON));
        }
        Ok(grad)
    }
}

/// Closure-backed objective
pub struct FnObjective<F> {
    f: F,
}

impl<F> FnObjective<F>
where
    F: Fn(&[f64]) -> f64,
{
    /// Wrap a closure
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> ObjectiveFunction for FnObjective<F>
where
    F: Fn(&[f64]) -> f64,
{
    fn value(&self, x: &[f64]) -> QnnResult<f64> {
        Ok((self.f)(x))
    }
}

// ============================================================================
// Evaluation Helpers
// ============================================================================

/// Evaluate and reject non-finite values
pub(crate) fn checked_value(
    objective: &dyn ObjectiveFunction,
    x: &[f64],
    evaluations: &mut usize,
) -> QnnResult<f64> {
    *evaluations += 1;
    let value = objective.value(x)?;
    if !value.is_finite() {
        return Err(QnnError::OptimizerError(format!(
            "objective returned {} at evaluation {}",
            value, evaluations
        )));
    }
    Ok(value)
}

/// Gradient with length and finiteness checks
pub(crate) fn checked_gradient(
    objective: &dyn ObjectiveFunction,
    x: &[f64],
    gradient_evaluations: &mut usize,
) -> QnnResult<Vec<f64>> {
    *gradient_evaluations += 1;
    let grad = objective.gradient(x)?;
    if grad.len() != x.len() {
        return Err(QnnError::OptimizerError(format!(
            "gradient has {} entries for {} variables",
            grad.len(),
            x.len()
        )));
    }
    if grad.iter().any(|g| !g.is_finite()) {
        return Err(QnnError::OptimizerError(
            "gradient contains non-finite entries".into(),
        ));
    }
    Ok(grad)
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub(crate) fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

// ============================================================================
// Optimizer Result
// ============================================================================

/// Outcome of one minimization
/// Gantree: OptimizerResult // 최적화 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerResult {
    /// Best point found
    pub x: Vec<f64>,

    /// Objective at `x`
    pub fun: f64,

    /// Iterations performed
    pub iterations: usize,

    /// Objective evaluations
    pub evaluations: usize,

    /// Gradient evaluations
    pub gradient_evaluations: usize,

    /// Whether the stopping criterion was met before the iteration limit
    pub converged: bool,

    /// Best objective after each iteration
    pub history: Vec<f64>,
}

impl fmt::Display for OptimizerResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OptimizerResult(fun={:.6}, iterations={}, evaluations={}, converged={})",
            self.fun, self.iterations, self.evaluations, self.converged
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_gradient() {
        let f = FnObjective::new(|x: &[f64]| x[0] * x[0] + 3.0 * x[1]);
        let g = f.gradient(&[2.0, -1.0]).unwrap();
        assert_abs_diff_eq!(g[0], 4.0, epsilon = 1e-6);
        assert_abs_diff_eq!(g[1], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_non_finite_rejected() {
        let f = FnObjective::new(|_: &[f64]| f64::NAN);
        let mut evals = 0;
        let err = checked_value(&f, &[0.0], &mut evals).unwrap_err();
        assert!(matches!(err, QnnError::OptimizerError(_)));
        assert_eq!(evals, 1);
    }

    #[test]
    fn test_vector_helpers() {
        assert_eq!(dot(&[1.0, 2.0], &[3.0, 4.0]), 11.0);
        assert_eq!(norm(&[3.0, 4.0]), 5.0);
    }
}
