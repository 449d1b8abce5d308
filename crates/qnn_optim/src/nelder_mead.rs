//! Nelder-Mead simplex search
//!
//! Gantree: L4_Optim → NelderMead
//!
//! Gradient-free. Standard coefficients: reflection 1, expansion 2,
//! contraction 1/2, shrink 1/2.

use crate::objective::{checked_value, ObjectiveFunction, OptimizerResult};
use crate::optimizer::Optimizer;
use qnn_core::{QnnError, QnnResult};
use serde::{Deserialize, Serialize};
use std::fmt;

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Nelder-Mead optimizer
/// Gantree: NelderMead // 심플렉스 탐색
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NelderMead {
    /// Iteration limit
    pub max_iterations: usize,

    /// Edge length of the initial simplex
    pub initial_step: f64,

    /// Simplex size tolerance
    pub xatol: f64,

    /// Objective spread tolerance
    pub fatol: f64,
}

impl NelderMead {
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

    /// Set initial simplex step
    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    /// Set point tolerance
    pub fn with_xatol(mut self, xatol: f64) -> Self {
        self.xatol = xatol;
        self
    }

    /// Set objective tolerance
    pub fn with_fatol(mut self, fatol: f64) -> Self {
        self.fatol = fatol;
        self
    }
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            initial_step: 0.25,
            xatol: 1e-6,
            fatol: 1e-8,
        }
    }
}

impl fmt::Display for NelderMead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NelderMead(max_iterations={}, step={}, xatol={:e}, fatol={:e})",
            self.max_iterations, self.initial_step, self.xatol, self.fatol
        )
    }
}

/// Vertex of the simplex
struct Vertex {
    x: Vec<f64>,
    f: f64,
}

fn affine(a: &[f64], b: &[f64], t: f64) -> Vec<f64> {
    // a + t (b - a)
    a.iter().zip(b).map(|(ai, bi)| ai + t * (bi - ai)).collect()
}

impl Optimizer for NelderMead {
    fn name(&self) -> &str {
        "NelderMead"
    }

    fn requires_gradient(&self) -> bool {
        false
    }

    fn validate(&self) -> QnnResult<()> {
        if !(self.initial_step.is_finite() && self.initial_step > 0.0) {
            return Err(QnnError::InvalidConfig(format!(
                "initial_step must be positive, got {}",
                self.initial_step
            )));
        }
        if self.xatol < 0.0 || self.fatol < 0.0 {
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
        let n = x0.len();
        let mut evaluations = 0;
        let mut history = Vec::new();

        let f0 = checked_value(objective, x0, &mut evaluations)?;
        let mut simplex = vec![Vertex {
            x: x0.to_vec(),
            f: f0,
        }];
        for i in 0..n {
            let mut x = x0.to_vec();
            x[i] += self.initial_step;
            let f = checked_value(objective, &x, &mut evaluations)?;
            simplex.push(Vertex { x, f });
        }

        let mut iterations = 0;
        let mut converged = n == 0;

        while !converged && iterations < self.max_iterations {
            simplex.sort_by(|a, b| a.f.total_cmp(&b.f));

            let best = &simplex[0];
            let f_spread = simplex
                .iter()
                .map(|v| (v.f - best.f).abs())
                .fold(0.0, f64::max);
            let x_spread = simplex
                .iter()
                .flat_map(|v| v.x.iter().zip(&best.x).map(|(a, b)| (a - b).abs()))
                .fold(0.0, f64::max);
            if f_spread <= self.fatol && x_spread <= self.xatol {
                converged = true;
                break;
            }

            iterations += 1;

            let mut centroid = vec![0.0; n];
            for v in &simplex[..n] {
                for (c, xi) in centroid.iter_mut().zip(&v.x) {
                    *c += xi / n as f64;
                }
            }

            let worst_f = simplex[n].f;
            let second_worst_f = simplex[n - 1].f;

            let xr = affine(&centroid, &simplex[n].x, -REFLECTION);
            let fr = checked_value(objective, &xr, &mut evaluations)?;

            if fr < simplex[0].f {
                let xe = affine(&centroid, &xr, EXPANSION);
                let fe = checked_value(objective, &xe, &mut evaluations)?;
                simplex[n] = if fe < fr {
                    Vertex { x: xe, f: fe }
                } else {
                    Vertex { x: xr, f: fr }
                };
            } else if fr < second_worst_f {
                simplex[n] = Vertex { x: xr, f: fr };
            } else {
                let (xc, fc) = if fr < worst_f {
                    let xc = affine(&centroid, &xr, CONTRACTION);
                    let fc = checked_value(objective, &xc, &mut evaluations)?;
                    (xc, fc)
                } else {
                    let xc = affine(&centroid, &simplex[n].x, CONTRACTION);
                    let fc = checked_value(objective, &xc, &mut evaluations)?;
                    (xc, fc)
                };

                if fc < fr.min(worst_f) {
                    simplex[n] = Vertex { x: xc, f: fc };
                } else {
                    let anchor = simplex[0].x.clone();
                    for v in simplex.iter_mut().skip(1) {
                        v.x = affine(&anchor, &v.x, SHRINK);
                        v.f = checked_value(objective, &v.x, &mut evaluations)?;
                    }
                }
            }

            let best_f = simplex.iter().map(|v| v.f).fold(f64::INFINITY, f64::min);
            history.push(best_f);
            log::debug!("{} iteration {}: best={:.6}", self.name(), iterations, best_f);
        }

        simplex.sort_by(|a, b| a.f.total_cmp(&b.f));
        let best = simplex.swap_remove(0);

        Ok(OptimizerResult {
            x: best.x,
            fun: best.f,
            iterations,
            evaluations,
            gradient_evaluations: 0,
            converged,
            history,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::FnObjective;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_quadratic() {
        let f = FnObjective::new(|x: &[f64]| (x[0] - 1.0).powi(2) + 2.0 * (x[1] + 0.5).powi(2));
        let result = NelderMead::new(500).minimize(&f, &[0.0, 0.0]).unwrap();

        assert!(result.converged);
        assert_abs_diff_eq!(result.x[0], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(result.x[1], -0.5, epsilon = 1e-3);
        assert_eq!(result.gradient_evaluations, 0);
    }

    #[test]
    fn test_rosenbrock() {
        let f = FnObjective::new(|x: &[f64]| {
            (1.0 - x[0]).powi(2) + 10.0 * (x[1] - x[0] * x[0]).powi(2)
        });
        let result = NelderMead::new(2000)
            .with_initial_step(0.5)
            .minimize(&f, &[-1.0, 1.0])
            .unwrap();
        assert!(result.fun < 1e-4, "fun = {}", result.fun);
    }

    #[test]
    fn test_iteration_limit() {
        let f = FnObjective::new(|x: &[f64]| x.iter().map(|v| v * v).sum());
        let result = NelderMead::new(5).minimize(&f, &[3.0, 3.0, 3.0]).unwrap();

        assert_eq!(result.iterations, 5);
        assert!(!result.converged);
        assert_eq!(result.history.len(), 5);
        assert!(result.fun <= 27.0);
    }

    #[test]
    fn test_history_monotone() {
        let f = FnObjective::new(|x: &[f64]| (x[0] - 2.0).powi(2));
        let result = NelderMead::new(50).minimize(&f, &[0.0]).unwrap();
        for pair in result.history.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }

    #[test]
    fn test_error_propagates() {
        struct Failing;
        impl ObjectiveFunction for Failing {
            fn value(&self, _x: &[f64]) -> QnnResult<f64> {
                Err(QnnError::BackendError("device offline".into()))
            }
        }
        let err = NelderMead::default().minimize(&Failing, &[0.0]).unwrap_err();
        assert_eq!(err, QnnError::BackendError("device offline".into()));
    }

    #[test]
    fn test_invalid_step() {
        let f = FnObjective::new(|x: &[f64]| x[0]);
        assert!(NelderMead::default()
            .with_initial_step(0.0)
            .minimize(&f, &[0.0])
            .is_err());
    }
}
