//! Loss functions
//!
//! Gantree: L6_Classifier → Loss
//!
//! Pure functions of a predicted vector and a target vector. An undefined
//! value (log of zero, overflow) becomes the finite penalty constant.

use qnn_core::constants::training::{clamp_loss, LOSS_PENALTY, PROBABILITY_FLOOR};
use qnn_core::{QnnError, QnnResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Loss kind
/// Gantree: LossKind // 손실 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossKind {
    /// `Σ |p - t|`
    Absolute,

    /// `Σ (p - t)²`
    #[default]
    Squared,

    /// `-Σ t log p`
    CrossEntropy,
}

impl LossKind {
    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            LossKind::Absolute => "absolute",
            LossKind::Squared => "squared",
            LossKind::CrossEntropy => "cross_entropy",
        }
    }

    /// Whether predictions must be probabilities
    pub fn requires_probabilities(&self) -> bool {
        matches!(self, LossKind::CrossEntropy)
    }

    fn check_lengths(predicted: &[f64], target: &[f64]) -> QnnResult<()> {
        if predicted.len() != target.len() {
            return Err(QnnError::InvalidOutputShape(format!(
                "prediction has {} entries, target has {}",
                predicted.len(),
                target.len()
            )));
        }
        Ok(())
    }

    /// Loss of one sample
    /// Gantree: evaluate(predicted,target) -> Result<f64> // 손실 계산
    pub fn evaluate(&self, predicted: &[f64], target: &[f64]) -> QnnResult<f64> {
        Self::check_lengths(predicted, target)?;
        let value: f64 = match self {
            LossKind::Absolute => predicted.iter().zip(target).map(|(p, t)| (p - t).abs()).sum(),
            LossKind::Squared => predicted.iter().zip(target).map(|(p, t)| (p - t).powi(2)).sum(),
            LossKind::CrossEntropy => predicted
                .iter()
                .zip(target)
                .filter(|(_, t)| **t != 0.0)
                .map(|(p, t)| -t * p.max(PROBABILITY_FLOOR).ln())
                .sum(),
        };
        Ok(clamp_loss(value))
    }

    /// Derivative of the loss with respect to each prediction
    /// Gantree: gradient(predicted,target) -> Result<Vec<f64>> // 손실 기울기
    pub fn gradient(&self, predicted: &[f64], target: &[f64]) -> QnnResult<Vec<f64>> {
        Self::check_lengths(predicted, target)?;
        let grad = predicted.iter().zip(target).map(|(p, t)| match self {
            LossKind::Absolute => {
                let d = p - t;
                if d > 0.0 {
                    1.0
                } else if d < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            LossKind::Squared => 2.0 * (p - t),
            LossKind::CrossEntropy => {
                if *t == 0.0 {
                    0.0
                } else {
                    -t / p.max(PROBABILITY_FLOOR)
                }
            }
        });
        Ok(grad.map(clamp_gradient).collect())
    }
}

fn clamp_gradient(g: f64) -> f64 {
    if g.is_nan() {
        0.0
    } else {
        g.clamp(-LOSS_PENALTY, LOSS_PENALTY)
    }
}

impl FromStr for LossKind {
    type Err = QnnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "l1" | "absolute" | "absolute_error" => Ok(LossKind::Absolute),
            "l2" | "squared" | "squared_error" => Ok(LossKind::Squared),
            "cross_entropy" | "crossentropy" | "ce" => Ok(LossKind::CrossEntropy),
            _ => Err(QnnError::InvalidLossKind(s.to_string())),
        }
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Reduction
// ============================================================================

/// How per-sample losses become one objective
/// Gantree: Reduction // 축약 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// Average over samples
    #[default]
    Mean,

    /// Sum over samples
    Sum,
}

impl Reduction {
    /// Weight applied to each sample's term
    pub fn scale(&self, num_samples: usize) -> f64 {
        match self {
            Reduction::Mean if num_samples > 0 => 1.0 / num_samples as f64,
            _ => 1.0,
        }
    }

    /// Reduce per-sample values
    pub fn reduce(&self, values: &[f64]) -> f64 {
        values.iter().sum::<f64>() * self.scale(values.len())
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reduction::Mean => write!(f, "mean"),
            Reduction::Sum => write!(f, "sum"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
