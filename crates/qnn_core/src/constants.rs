//! Constants for QNN
//!
//! Gantree: L0_Foundation → Constants
//!
//! Gradient, loss, template and backend defaults.

// ============================================================================
// Gradient Constants
// Gantree: gradient // 기울기 상수
// ============================================================================

pub mod gradient {
    //! Gradient protocol defaults

    /// Parameter-shift offset for rotation and phase gates (π/2)
    /// Gantree: PARAMETER_SHIFT: f64 = π/2
    pub const PARAMETER_SHIFT: f64 = std::f64::consts::FRAC_PI_2;

    /// Step for central finite differences
    pub const FINITE_DIFF_EPSILON: f64 = 1e-4;

    /// Gradient estimate from two shifted evaluations
    ///
    /// For the parameter-shift rule with shift `s` this is
    /// `(f(θ+s) - f(θ-s)) / (2 sin s)`, which is exact for gates generated
    /// by an operator with eigenvalues ±1/2.
    #[inline]
    pub fn shift_rule(plus: f64, minus: f64, shift: f64) -> f64 {
        (plus - minus) / (2.0 * shift.sin())
    }

    /// Central finite-difference estimate `(f(θ+ε) - f(θ-ε)) / 2ε`
    #[inline]
    pub fn central_difference(plus: f64, minus: f64, epsilon: f64) -> f64 {
        (plus - minus) / (2.0 * epsilon)
    }
}

// ============================================================================
// Training Constants
// Gantree: training // 학습 상수
// ============================================================================

pub mod training {
    //! Loss and training defaults

    /// Finite penalty used in place of an undefined loss value
    /// Gantree: LOSS_PENALTY: f64 = 1e10
    pub const LOSS_PENALTY: f64 = 1e10;

    /// Probability floor before taking a logarithm
    pub const PROBABILITY_FLOOR: f64 = 1e-12;

    /// Default seed for weight initialization
    pub const DEFAULT_SEED: u64 = 42;

    /// Clamp a loss value to a finite number
    #[inline]
    pub fn clamp_loss(value: f64) -> f64 {
        if value.is_finite() {
            value.min(LOSS_PENALTY)
        } else {
            LOSS_PENALTY
        }
    }
}

// ============================================================================
// Template Constants
// Gantree: library // 회로 템플릿 상수
// ============================================================================

pub mod library {
    //! Circuit template defaults

    /// Default repetitions of the second-order feature map
    pub const ZZ_FEATURE_MAP_REPS: usize = 2;

    /// Default repetitions of the first-order feature map
    pub const Z_FEATURE_MAP_REPS: usize = 2;

    /// Default repetitions of the hardware-efficient ansatz
    pub const ANSATZ_REPS: usize = 3;

    /// Default input parameter prefix
    pub const INPUT_PREFIX: &str = "x";

    /// Default weight parameter prefix
    pub const WEIGHT_PREFIX: &str = "θ";
}

// ============================================================================
// Backend Constants
// Gantree: backend // 백엔드 상수
// ============================================================================

pub mod backend {
    //! Execution defaults

    /// Default shots for sampling backends
    pub const DEFAULT_SHOTS: u64 = 1024;

    /// Maximum shots per job
    pub const MAX_SHOTS: u64 = 100_000;

    /// Largest register the statevector simulator accepts
    pub const MAX_STATEVECTOR_QUBITS: usize = 24;
}

// ============================================================================
// Tests
// ============================================================================
