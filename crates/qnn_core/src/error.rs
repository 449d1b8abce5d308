//! Error types for QNN
//!
//! Gantree: L0_Foundation → Errors
//!
//! One error enum shared by every crate in the workspace. Variants are
//! grouped by how the caller is expected to react: configuration and shape
//! errors are fatal and must be fixed by the caller, state errors mean an
//! operation was called out of order, backend errors are returned unchanged
//! and never retried internally.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for QNN
/// Gantree: QnnError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QnnError {
    // ========================================================================
    // Configuration Errors (construction time)
    // ========================================================================
    /// Qubit count of a component does not match the network register
    /// Gantree: QubitCountMismatch{{component,expected,actual}} // 큐비트 불일치
    #[error("Qubit count mismatch for {component}: expected {expected}, got {actual}")]
    QubitCountMismatch {
        component: String,
        expected: usize,
        actual: usize,
    },

    /// Unrecognized loss kind
    #[error("Invalid loss kind '{0}': expected l1, l2 or cross_entropy")]
    InvalidLossKind(String),

    /// Output shape does not fit the interpretation function
    #[error("Invalid output shape: {0}")]
    InvalidOutputShape(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input and weight parameters do not partition the circuit parameters
    #[error("Invalid parameter partition: {0}")]
    ParameterPartition(String),

    // ========================================================================
    // Shape Errors (call time)
    // ========================================================================
    /// Input vector length does not match the input parameters
    /// Gantree: InputShapeMismatch{{expected,actual}} // 입력 길이
    #[error("Input shape mismatch: expected {expected} values, got {actual}")]
    InputShapeMismatch { expected: usize, actual: usize },

    /// Weight vector length does not match the weight parameters
    /// Gantree: WeightShapeMismatch{{expected,actual}} // 가중치 길이
    #[error("Weight shape mismatch: expected {expected} values, got {actual}")]
    WeightShapeMismatch { expected: usize, actual: usize },

    /// Label count does not match the sample count
    #[error("Label count mismatch: {samples} samples but {labels} labels")]
    LabelCountMismatch { samples: usize, labels: usize },

    /// Empty dataset
    #[error("Dataset is empty")]
    EmptyDataset,

    // ========================================================================
    // State Errors
    // ========================================================================
    /// Prediction requested before a successful fit
    /// Gantree: NotFitted // 학습 전 호출
    #[error("Model is not fitted: call fit() before predict() or score()")]
    NotFitted,

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// Backend execution error
    /// Gantree: BackendError(String) // 백엔드
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Backend returned no shots
    #[error("Backend returned empty counts")]
    EmptyCounts,

    /// Circuit submitted with free parameters
    #[error("Circuit has unbound parameter '{0}'")]
    UnboundParameter(String),

    // ========================================================================
    // Circuit Errors
    // ========================================================================
    /// Gate on non-existent qubit
    #[error("Gate references qubit {qubit} but circuit has only {num_qubits} qubits")]
    GateQubitMismatch { qubit: usize, num_qubits: usize },

    /// Invalid gate parameter
    #[error("Invalid gate parameter: {0}")]
    InvalidGateParameter(String),

    /// Invalid Pauli label
    #[error("Invalid Pauli label '{0}': must contain only I, X, Y and Z")]
    InvalidPauli(String),

    // ========================================================================
    // Optimizer Errors
    // ========================================================================
    /// Optimizer failure
    #[error("Optimizer error: {0}")]
    OptimizerError(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),
}

/// Result type alias for QNN operations
/// Gantree: QnnResult<T> // type alias
pub type QnnResult<T> = Result<T, QnnError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for QnnError {
    fn from(err: serde_json::Error) -> Self {
        QnnError::JsonError(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl QnnError {
    /// Check if error is recoverable by the caller (retry, new backend)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            QnnError::BackendError(_) | QnnError::EmptyCounts
        )
    }

    /// Check if error is a construction-time configuration error
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            QnnError::QubitCountMismatch { .. }
                | QnnError::InvalidLossKind(_)
                | QnnError::InvalidOutputShape(_)
                | QnnError::InvalidConfig(_)
                | QnnError::ParameterPartition(_)
        )
    }

    /// Check if error is a call-time shape error
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            QnnError::InputShapeMismatch { .. }
                | QnnError::WeightShapeMismatch { .. }
                | QnnError::LabelCountMismatch { .. }
                | QnnError::EmptyDataset
        )
    }

    /// Check if error is an invalid-state error
    pub fn is_state_error(&self) -> bool {
        matches!(self, QnnError::NotFitted)
    }
}

// ============================================================================
// Tests
// ============================================================================
