//! Classifier configuration
//!
//! Gantree: L6_Classifier → ClassifierConfig
//!
//! Everything about training that is plain data. The network and the
//! optimizer are objects and are passed to the classifier directly.

use crate::loss::{LossKind, Reduction};
use qnn_core::constants::training::DEFAULT_SEED;
use qnn_core::{QnnError, QnnResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Starting weights of a cold start
/// Gantree: InitialPoint // 초기 가중치
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialPoint {
    /// Uniform in `[0, 1)` from the configured seed
    #[default]
    Random,

    /// All zeros
    Zeros,

    /// Given values
    Fixed(Vec<f64>),
}

/// Training configuration
/// Gantree: ClassifierConfig // 분류기 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Loss kind
    pub loss: LossKind,

    /// Per-sample reduction
    pub reduction: Reduction,

    /// Continue from the previous weights on the next `fit`
    pub warm_start: bool,

    /// Cold-start weights
    pub initial_point: InitialPoint,

    /// Seed for random initial weights (`None`: entropy)
    pub seed: Option<u64>,
}

impl ClassifierConfig {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create with a loss kind
    pub fn new(loss: LossKind) -> Self {
        Self {
            loss,
            ..Default::default()
        }
    }

    /// Create with a loss given by name (`l1`, `l2`, `cross_entropy`)
    pub fn with_loss_name(name: &str) -> QnnResult<Self> {
        Ok(Self::new(name.parse()?))
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set loss kind
    pub fn with_loss(mut self, loss: LossKind) -> Self {
        self.loss = loss;
        self
    }

    /// Set reduction
    pub fn with_reduction(mut self, reduction: Reduction) -> Self {
        self.reduction = reduction;
        self
    }

    /// Enable or disable warm start
    pub fn with_warm_start(mut self, warm_start: bool) -> Self {
        self.warm_start = warm_start;
        self
    }

    /// Set cold-start weights
    pub fn with_initial_point(mut self, initial_point: InitialPoint) -> Self {
        self.initial_point = initial_point;
        self
    }

    /// Set seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Draw from entropy instead of a seed
    pub fn without_seed(mut self) -> Self {
        self.seed = None;
        self
    }

    // ========================================================================
    // Initial Weights
    // ========================================================================

    /// Cold-start weight vector of length `num_weights`
    /// Gantree: initial_weights(n) -> Result<Vec<f64>> // 초기 가중치 생성
    pub fn initial_weights(&self, num_weights: usize) -> QnnResult<Vec<f64>> {
        match &self.initial_point {
            InitialPoint::Random => {
                let mut rng = match self.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                Ok((0..num_weights).map(|_| rng.gen::<f64>()).collect())
            }
            InitialPoint::Zeros => Ok(vec![0.0; num_weights]),
            InitialPoint::Fixed(values) => {
                if values.len() != num_weights {
                    return Err(QnnError::WeightShapeMismatch {
                        expected: num_weights,
                        actual: values.len(),
                    });
                }
                Ok(values.clone())
            }
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    pub fn validate(&self) -> QnnResult<()> {
        if let InitialPoint::Fixed(values) = &self.initial_point {
            if values.iter().any(|v| !v.is_finite()) {
                return Err(QnnError::InvalidConfig(
                    "initial point contains non-finite values".into(),
                ));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Serialize to JSON
    pub fn to_json(&self) -> QnnResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON and validate
    pub fn from_json(json: &str) -> QnnResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            loss: LossKind::Squared,
            reduction: Reduction::Mean,
            warm_start: false,
            initial_point: InitialPoint::Random,
            seed: Some(DEFAULT_SEED),
        }
    }
}

impl fmt::Display for ClassifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClassifierConfig(loss={}, reduction={}, warm_start={}, seed={:?})",
            self.loss, self.reduction, self.warm_start, self.seed
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
