//! Core types for QNN
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Type aliases and bitstring helpers used throughout the workspace.

use crate::error::{QnnError, QnnResult};
use std::collections::HashMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// Qubit identifier (0-indexed)
/// Gantree: QubitId // pub type QubitId = usize
pub type QubitId = usize;

/// Rotation angle in radians
/// Gantree: Angle // pub type Angle = f64
pub type Angle = f64;

/// Measurement counts: bitstring -> count
///
/// Bitstrings are written with the highest qubit first, so `"01"` means
/// qubit 0 measured as 1.
/// Gantree: Counts // pub type Counts = HashMap<String, u64>
pub type Counts = HashMap<String, u64>;

/// Parameter vector (input values or weights)
/// Gantree: ParamVec // pub type ParamVec = Vec<f64>
pub type ParamVec = Vec<f64>;

// ============================================================================
// Bitstring Helpers
// ============================================================================

/// Format a basis-state index as a bitstring of `num_qubits` characters
pub fn index_to_bitstring(index: usize, num_qubits: usize) -> String {
    format!("{:0width$b}", index, width = num_qubits)
}

/// Parse a bitstring (highest qubit first) into a basis-state index
pub fn bitstring_to_index(bitstring: &str) -> QnnResult<usize> {
    if bitstring.is_empty() || !bitstring.chars().all(|c| c == '0' || c == '1') {
        return Err(QnnError::BackendError(format!(
            "Malformed bitstring '{}'",
            bitstring
        )));
    }
    usize::from_str_radix(bitstring, 2)
        .map_err(|e| QnnError::BackendError(format!("Bitstring '{}': {}", bitstring, e)))
}

/// Parity of a basis-state index (0 for even popcount, 1 for odd)
#[inline]
pub fn parity(index: usize) -> usize {
    (index.count_ones() % 2) as usize
}

// ============================================================================
// Tests
// ============================================================================
