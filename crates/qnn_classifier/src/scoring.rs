//! Decision rules and accuracy
//!
//! Gantree: L6_Classifier → Scoring
//!
//! One-dimensional expectation output is thresholded at zero into ±1
//! labels. Vector output picks the arg-max class.

use qnn_core::{QnnError, QnnResult};
use serde::{Deserialize, Serialize};

/// How an output row becomes a class label
/// Gantree: DecisionRule // 결정 규칙
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionRule {
    /// `+1` for `v >= 0`, `-1` otherwise
    Sign,

    /// Index of the largest entry (first on ties)
    ArgMax,
}

impl DecisionRule {
    /// Rule matching an output width
    pub fn for_output_shape(output_shape: usize) -> Self {
        if output_shape == 1 {
            DecisionRule::Sign
        } else {
            DecisionRule::ArgMax
        }
    }

    /// Decide one row
    /// Gantree: decide(row) -> f64 // 클래스 결정
    pub fn decide(&self, row: &[f64]) -> f64 {
        match self {
            DecisionRule::Sign => sign(row.first().copied().unwrap_or(0.0)),
            DecisionRule::ArgMax => argmax(row) as f64,
        }
    }

    /// Decide every row
    pub fn decide_all(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|r| self.decide(r)).collect()
    }
}

/// `+1` for non-negative values, `-1` otherwise
#[inline]
pub fn sign(value: f64) -> f64 {
    if value >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Index of the largest entry, first one on ties
pub fn argmax(row: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in row.iter().enumerate() {
        if *v > row[best] {
            best = i;
        }
    }
    best
}

/// Fraction of predictions equal to their label
/// Gantree: accuracy(predictions,labels) -> Result<f64> // 정확도
pub fn accuracy(predictions: &[f64], labels: &[f64]) -> QnnResult<f64> {
    if predictions.len() != labels.len() {
        return Err(QnnError::LabelCountMismatch {
            samples: predictions.len(),
            labels: labels.len(),
        });
    }
    if predictions.is_empty() {
        return Err(QnnError::EmptyDataset);
    }
    let correct = predictions
        .iter()
        .zip(labels)
        .filter(|(p, l)| p == l)
        .count();
    Ok(correct as f64 / labels.len() as f64)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_rule() {
        let rule = DecisionRule::for_output_shape(1);
        assert_eq!(rule, DecisionRule::Sign);
        assert_eq!(rule.decide_all(&[vec![0.3], vec![-0.2], vec![0.0]]), vec![1.0, -1.0, 1.0]);
    }

    #[test]
    fn test_argmax_rule() {
        let rule = DecisionRule::for_output_shape(3);
        assert_eq!(rule.decide(&[0.1, 0.7, 0.2]), 1.0);
        assert_eq!(rule.decide(&[0.5, 0.5, 0.0]), 0.0);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[1.0, -1.0, 1.0, 1.0], &[1.0, 1.0, 1.0, -1.0]).unwrap(), 0.5);
        assert!(matches!(
            accuracy(&[1.0], &[1.0, 1.0]),
            Err(QnnError::LabelCountMismatch { samples: 1, labels: 2 })
        ));
        assert_eq!(accuracy(&[], &[]).unwrap_err(), QnnError::EmptyDataset);
    }
}
