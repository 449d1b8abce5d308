//! Optimizer trait
//!
//! Gantree: L4_Optim → Optimizer

use crate::objective::{ObjectiveFunction, OptimizerResult};
use qnn_core::QnnResult;

/// Classical optimizer
/// Gantree: Optimizer // 최적화기 trait
pub trait Optimizer {
    /// Optimizer name
    fn name(&self) -> &str;

    /// Whether `minimize` calls the objective's gradient
    fn requires_gradient(&self) -> bool;

    /// Check settings
    fn validate(&self) -> QnnResult<()> {
        Ok(())
    }

    /// Minimize from `x0`
    /// Gantree: minimize(objective,x0) -> Result<OptimizerResult> // 최소화
    fn minimize(
        &self,
        objective: &dyn ObjectiveFunction,
        x0: &[f64],
    ) -> QnnResult<OptimizerResult>;
}

impl<O: Optimizer + ?Sized> Optimizer for Box<O> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn requires_gradient(&self) -> bool {
        (**self).requires_gradient()
    }

    fn validate(&self) -> QnnResult<()> {
        (**self).validate()
    }

    fn minimize(
        &self,
        objective: &dyn ObjectiveFunction,
        x0: &[f64],
    ) -> QnnResult<OptimizerResult> {
        (**self).minimize(objective, x0)
    }
}
