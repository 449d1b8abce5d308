//! Limited-memory BFGS
//!
//! Gantree: L4_Optim → Lbfgs
//!
//! Two-loop recursion over the last `memory` curvature pairs with an
//! Armijo backtracking line search. A non-descent direction resets the
//! memory to steepest descent.

use crate::objective::{
    checked_gradient, checked_value, dot, norm, ObjectiveFunction, OptimizerResult,
};
use crate::optimizer::Optimizer;
use qnn_core::{QnnError, QnnResult};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

const ARMIJO_C1: f64 = 1e-4;
const BACKTRACK: f64 = 0.5;
const MAX_LINE_SEARCH: usize = 30;
const CURVATURE_EPS: f64 = 1e-12;

/// L-BFGS optimizer
/// Gantree: Lbfgs // 준뉴턴
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lbfgs {
    /// Iteration limit
    pub max_iterations: usize,

    /// Stored curvature pairs
    pub memory: usize,

    /// Gradient norm tolerance
    pub gtol: f64,

    /// Objective change tolerance (relative)
    pub ftol: f64,
}

impl Lbfgs {
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

    /// Set memory size
    pub fn with_memory(mut self, memory: usize) -> Self {
        self.memory = memory;
        self
    }

    /// Set gradient tolerance
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.gtol = gtol;
        self
    }

    /// Set objective tolerance
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.ftol = ftol;
        self
    }

    /// H·g through the two-loop recursion
    fn apply_inverse_hessian(pairs: &VecDeque<(Vec<f64>, Vec<f64>)>, grad: &[f64]) -> Vec<f64> {
        let mut q = grad.to_vec();
        let mut alphas = Vec::with_capacity(pairs.len());

        for (s, y) in pairs.iter().rev() {
            let rho = 1.0 / dot(y, s);
            let alpha = rho * dot(s, &q);
            for (qi, yi) in q.iter_mut().zip(y) {
                *qi -= alpha * yi;
            }
            alphas.push((alpha, rho));
        }

        if let Some((s, y)) = pairs.back() {
            let gamma = dot(s, y) / dot(y, y);
            for qi in q.iter_mut() {
                *qi *= gamma;
            }
        }

        for ((s, y), (alpha, rho)) in pairs.iter().zip(alphas.into_iter().rev()) {
            let beta = rho * dot(y, &q);
            for (qi, si) in q.iter_mut().zip(s) {
                *qi += (alpha - beta) * si;
            }
        }
        q
    }
}

impl Default for Lbfgs {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            memory: 10,
            gtol: 1e-6,
            ftol: 1e-12,
        }
    }
}

impl fmt::Display for Lbfgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lbfgs(max_iterations={}, memory={}, gtol={:e})",
            self.max_iterations, self.memory, self.gtol
        )
    }
}

impl Optimizer for Lbfgs {
    fn name(&self) -> &str {
        "L-BFGS"
    }

    fn requires_gradient(&self) -> bool {
        true
    }

    fn validate(&self) -> QnnResult<()> {
        if self.memory == 0 {
            return Err(QnnError::InvalidConfig("memory must be at least 1".into()));
        }
        if self.gtol < 0.0 || self.ftol < 0.0 {
            return Err(QnnError::InvalidConfig("tolerances must be >= 0".into()));
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
        let mut pairs: VecDeque<(Vec<f64>, Vec<f64>)> = VecDeque::with_capacity(self.memory);

        let mut x = x0.to_vec();
        let mut fx = checked_value(objective, &x, &mut evaluations)?;
        let mut grad = checked_gradient(objective, &x, &mut gradient_evaluations)?;

        let mut iterations = 0;
        let mut converged = norm(&grad) < self.gtol;

        while !converged && iterations < self.max_iterations {
            let mut direction: Vec<f64> = Self::apply_inverse_hessian(&pairs, &grad)
                .into_iter()
                .map(|d| -d)
                .collect();
            let mut slope = dot(&grad, &direction);
            if !(slope < 0.0) {
                pairs.clear();
                direction = grad.iter().map(|g| -g).collect();
                slope = -dot(&grad, &grad);
            }

            // Armijo backtracking
            let mut step = 1.0;
            let mut accepted = None;
            for _ in 0..MAX_LINE_SEARCH {
                let candidate: Vec<f64> =
                    x.iter().zip(&direction).map(|(xi, di)| xi + step * di).collect();
                let f_candidate = checked_value(objective, &candidate, &mut evaluations)?;
                if f_candidate <= fx + ARMIJO_C1 * step * slope {
                    accepted = Some((candidate, f_candidate));
                    break;
                }
                step *= BACKTRACK;
            }

            let Some((x_new, f_new)) = accepted else {
                log::debug!("{} line search failed at iteration {}", self.name(), iterations);
                break;
            };
            iterations += 1;

            let g_new = checked_gradient(objective, &x_new, &mut gradient_evaluations)?;
            let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = g_new.iter().zip(&grad).map(|(a, b)| a - b).collect();
            if dot(&s, &y) > CURVATURE_EPS {
                if pairs.len() == self.memory {
                    pairs.pop_front();
                }
                pairs.push_back((s, y));
            }

            let f_change = (fx - f_new).abs();
            x = x_new;
            fx = f_new;
            grad = g_new;
            history.push(fx);
            log::debug!("{} iteration {}: f={:.6} step={:.4}", self.name(), iterations, fx, step);

            if norm(&grad) < self.gtol || f_change <= self.ftol * fx.abs().max(1.0) {
                converged = true;
            }
        }

        Ok(OptimizerResult {
            x,
            fun: fx,
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
