//! Window-based convergence check
//!
//! Gantree: L4_Optim → Convergence
//!
//! Converged once the window is full, every improvement in it is below
//! `threshold_abs` and their sum is below `threshold_cum`.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default window size
pub const DEFAULT_WINDOW: usize = 3;

/// Default per-step improvement threshold
pub const DEFAULT_THRESHOLD: f64 = 1e-6;

/// Convergence checker
/// Gantree: Convergence // 수렴 판단
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Convergence {
    /// Window size for checking recent improvements
    /// Gantree: window: usize // 윈도우 크기
    pub window: usize,

    /// Absolute threshold for one improvement
    /// Gantree: threshold_abs: f64 // 절대 임계
    pub threshold_abs: f64,

    /// Threshold for the summed improvement over the window
    /// Gantree: threshold_cum: f64 // 누적 임계
    pub threshold_cum: f64,

    /// Recent improvements
    history: VecDeque<f64>,
}

impl Convergence {
    /// Create with a window and per-step threshold
    /// Gantree: new(window,threshold) -> Self // 생성자
    pub fn new(window: usize, threshold: f64) -> Self {
        let window = window.max(1);
        Self {
            window,
            threshold_abs: threshold,
            threshold_cum: threshold * 1.5,
            history: VecDeque::with_capacity(window),
        }
    }

    /// Set cumulative threshold
    pub fn with_cumulative(mut self, threshold_cum: f64) -> Self {
        self.threshold_cum = threshold_cum;
        self
    }

    /// Add an improvement (previous minus current objective)
    /// Gantree: push(&mut,improvement) // 이력 추가
    pub fn push(&mut self, improvement: f64) {
        self.history.push_back(improvement);
        while self.history.len() > self.window {
            self.history.pop_front();
        }
    }

    /// Check if converged
    /// Gantree: check(&self) -> bool // 수렴 체크
    pub fn check(&self) -> bool {
        self.window_condition() && self.cumulative_condition()
    }

    /// All recent improvements below threshold
    pub fn window_condition(&self) -> bool {
        if self.history.len() < self.window {
            return false;
        }
        self.history.iter().all(|&imp| imp.abs() < self.threshold_abs)
    }

    /// Summed improvement over the window below threshold
    pub fn cumulative_condition(&self) -> bool {
        self.cumulative().abs() < self.threshold_cum
    }

    /// Summed improvement over the window
    pub fn cumulative(&self) -> f64 {
        self.history.iter().sum()
    }

    /// Reset state
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Get history length
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Default for Convergence {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_THRESHOLD)
    }
}

// ============================================================================
// Tests
// ============================================================================
