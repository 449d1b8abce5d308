//! Gradient descent with momentum and step decay
//!
//! Gantree: L4_Optim → GradientDescent
//!
//! Step k uses `learning_rate · decay^k`. Stops on a small gradient norm or
//! when the improvement window reports convergence.

use crate::convergence::Convergence;
use crate::objective::{checked_gradient, checked_value, norm, ObjectiveFunction, OptimizerResult};
use crate::optimizer::Optimizer;
use qnn_core::{QnnError, QnnResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gradient descent optimizer
/// Gantree: GradientDescent // 경사 하강
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientDescent {
    /// Iteration limit
    pub max_iterations: usize,

    /// Initial step size
    pub learning_rate: f64,

    /// Per-iteration step multiplier
    pub decay: f64,

    /// Momentum coefficient in `[0, 1)`
    pub momentum: f64,

    /// Gradient norm tolerance
    pub gtol: f64,

    /// Early stop on stalled improvement
    pub convergence: Option<Convergence>,
}

impl GradientDescent {
    /// Create with an iteration limit
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..Default::default()
        }
    }

    /// Set iteration limit
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set learning rate
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set decay
    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    /// Set momentum
    pub fn with_momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    /// Set gradient tolerance
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.gtol = gtol;
        self
    }

    /// Set or clear the convergence window
    pub fn with_convergence(mut self, convergence: Option<Convergence>) -> Self {
        self.convergence = convergence;
        self
    }

    /// Step size of iteration `k`
    /// Gantree: step_size(k) -> f64 // k번째 스텝
    pub fn step_size(&self, k: usize) -> f64 {
        self.learning_rate * self.decay.powi(k as i32)
    }
}

impl Default for GradientDescent {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            learning_rate: 0.1,
            decay: 1.0,
            momentum: 0.0,
            gtol: 1e-6,
            convergence: Some(Convergence::default()),
        }
    }
}

impl fmt::Display for GradientDescent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GradientDescent(max_iterations={}, lr={}, decay={}, momentum={})",
            self.max_iterations, self.learning_rate, self.decay, self.momentum
        )
    }
}

impl Optimizer for GradientDescent {
    fn name(&self) -> &str {
        "GradientDescent"
    }

    fn requires_gradient(&self) -> bool {
        true
    }

    fn validate(&self) -> QnnResult<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(QnnError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.decay > 0.0 && self.decay <= 1.0) {
            return Err(QnnError::InvalidConfig(format!(
                "decay must be in (0, 1], got {}",
                self.decay
            )));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(QnnError::InvalidConfig(format!(
                "momentum must be in [0, 1), got {}",
                self.momentum
            )));
        }
        Ok(())
    }

    fn minimize(
        &self,
        objective: &dyn ObjectiveFunction,
        x0: &[f64],
    ) -> QnnResult<OptimizerResult> {
        self.validate()?;
        let mut evaluations = 0;
        let mut gradient_evaluations = 0;
        let mut history = Vec::new();
        let mut convergence = self.convergence.clone();

        let mut x = x0.to_vec();
        let mut fx = checked_value(objective, &x, &mut evaluations)?;
        let mut best_x = x.clone();
        let mut best_f = fx;
        let mut velocity = vec![0.0; x.len()];

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            let grad = checked_gradient(objective, &x, &mut gradient_evaluations)?;
            if norm(&grad) < self.gtol {
                converged = true;
                break;
            }

            let step = self.step_size(iterations);
            for ((xi, vi), gi) in x.iter_mut().zip(velocity.iter_mut()).zip(&grad) {
                *vi = self.momentum * *vi - step * gi;
                *xi += *vi;
            }
            iterations += 1;

            let f_new = checked_value(objective, &x, &mut evaluations)?;
            let improvement = fx - f_new;
            fx = f_new;
            if fx < best_f {
                best_f = fx;
                best_x.clone_from(&x);
            }
            history.push(best_f);
            log::debug!(
                "{} iteration {}: f={:.6} step={:.4}",
                self.name(),
                iterations,
                fx,
                step
            );

            if let Some(conv) = convergence.as_mut() {
                conv.push(improvement);
                if conv.check() {
                    converged = true;
                    break;
                }
            }
        }

        Ok(OptimizerResult {
            x: best_x,
            fun: best_f,
            iterations,
            evaluations,
            gradient_evaluations,
            converged,
            history,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
