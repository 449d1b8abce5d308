//! Weight-gradient protocols
//!
//! Gantree: L5_Network → GradientMethod
//!
//! Every weight gets two shifted evaluations. A weight that enters exactly
//! one gate as a bare angle uses the shift rule; any other weight uses a
//! central finite difference.

use crate::operator::CompositeOperator;
use qnn_core::constants::gradient::{
    central_difference, shift_rule, FINITE_DIFF_EPSILON, PARAMETER_SHIFT,
};
use qnn_core::{QnnError, QnnResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// How weight gradients are estimated
/// Gantree: GradientMethod // 기울기 방식
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GradientMethod {
    /// Parameter shift with the given shift, finite differences where it does not apply
    ParameterShift {
        /// Shift in radians, in `(0, π)`
        shift: f64,
    },

    /// Central finite differences for every weight
    FiniteDifference {
        /// Step size
        epsilon: f64,
    },
}

impl Default for GradientMethod {
    fn default() -> Self {
        GradientMethod::parameter_shift()
    }
}

impl GradientMethod {
    /// Parameter shift with `π/2`
    pub fn parameter_shift() -> Self {
        GradientMethod::ParameterShift {
            shift: PARAMETER_SHIFT,
        }
    }

    /// Finite differences with the default step
    pub fn finite_difference() -> Self {
        GradientMethod::FiniteDifference {
            epsilon: FINITE_DIFF_EPSILON,
        }
    }

    /// Check the step
    pub fn validate(&self) -> QnnResult<()> {
        match *self {
            GradientMethod::ParameterShift { shift } => {
                if !(shift > 0.0 && shift < PI) {
                    return Err(QnnError::InvalidConfig(format!(
                        "parameter shift must be in (0, π), got {}",
                        shift
                    )));
                }
            }
            GradientMethod::FiniteDifference { epsilon } => {
                if !(epsilon.is_finite() && epsilon > 0.0) {
                    return Err(QnnError::InvalidConfig(format!(
                        "finite-difference step must be positive, got {}",
                        epsilon
                    )));
                }
            }
        }
        Ok(())
    }

    /// Derivative rule for every weight of `operator`
    /// Gantree: rules(operator) -> Vec<DerivativeRule> // 가중치별 규칙
    pub fn rules(&self, operator: &CompositeOperator) -> Vec<DerivativeRule> {
        match *self {
            GradientMethod::FiniteDifference { epsilon } => {
                vec![DerivativeRule::Central(epsilon); operator.num_weights()]
            }
            GradientMethod::ParameterShift { shift } => {
                let circuit = operator.circuit();
                let mut fallback = Vec::new();
                let rules = operator
                    .weight_params()
                    .iter()
                    .map(|p| {
                        if circuit.is_shift_compatible(p) {
                            DerivativeRule::Shift(shift)
                        } else {
                            fallback.push(p.name().to_string());
                            DerivativeRule::Central(FINITE_DIFF_EPSILON)
                        }
                    })
                    .collect();
                if !fallback.is_empty() {
                    log::warn!(
                        "parameter shift does not apply to weights [{}]; using finite differences",
                        fallback.join(", ")
                    );
                }
                rules
            }
        }
    }
}

impl fmt::Display for GradientMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradientMethod::ParameterShift { shift } => write!(f, "parameter_shift({:.4})", shift),
            GradientMethod::FiniteDifference { epsilon } => {
                write!(f, "finite_difference({:e})", epsilon)
            }
        }
    }
}

// ============================================================================
// Derivative Rule
// ============================================================================

/// Two-point derivative rule for one weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DerivativeRule {
    /// `(f(θ+s) - f(θ-s)) / (2 sin s)`
    Shift(f64),

    /// `(f(θ+ε) - f(θ-ε)) / 2ε`
    Central(f64),
}

impl DerivativeRule {
    /// Offset applied to the weight
    pub fn offset(&self) -> f64 {
        match *self {
            DerivativeRule::Shift(s) => s,
            DerivativeRule::Central(e) => e,
        }
    }

    /// Combine the two shifted values
    pub fn combine(&self, plus: f64, minus: f64) -> f64 {
        match *self {
            DerivativeRule::Shift(s) => shift_rule(plus, minus, s),
            DerivativeRule::Central(e) => central_difference(plus, minus, e),
        }
    }

    /// Whether this is the exact shift rule
    pub fn is_shift(&self) -> bool {
        matches!(self, DerivativeRule::Shift(_))
    }
}

// ============================================================================
// Shifted Evaluations
// ============================================================================

/// Weight vectors needed for one gradient: `+` then `-` for each weight
pub(crate) fn shifted_points(weights: &[f64], rules: &[DerivativeRule]) -> Vec<Vec<f64>> {
    let mut points = Vec::with_capacity(2 * rules.len());
    for (k, rule) in rules.iter().enumerate() {
        let mut plus = weights.to_vec();
        plus[k] += rule.offset();
        let mut minus = weights.to_vec();
        minus[k] -= rule.offset();
        points.push(plus);
        points.push(minus);
    }
    points
}

/// Fold evaluations of [`shifted_points`] into `[output][weight]`
pub(crate) fn combine_shifted(
    rules: &[DerivativeRule],
    outputs: &[Vec<f64>],
    output_dim: usize,
) -> Vec<Vec<f64>> {
    let mut grad = vec![vec![0.0; rules.len()]; output_dim];
    for (k, rule) in rules.iter().enumerate() {
        let plus = &outputs[2 * k];
        let minus = &outputs[2 * k + 1];
        for (row, (p, m)) in grad.iter_mut().zip(plus.iter().zip(minus)) {
            row[k] = rule.combine(*p, *m);
        }
    }
    grad
}

// ============================================================================
// Tests
// ============================================================================
