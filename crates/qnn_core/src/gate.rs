//! Quantum gate definitions for QNN
//!
//! Gantree: L1_Circuit → Gate
//!
//! Gate set used by the circuit templates and the simulators. Rotation
//! angles are [`ParamExpr`] so a gate can stay symbolic until binding.

use crate::observable::Pauli;
use crate::parameter::{Binding, ParamExpr};
use crate::types::QubitId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantum gate enumeration
/// Gantree: Gate // 게이트 enum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    // ========================================================================
    // Single-Qubit Gates (Non-Parameterized)
    // ========================================================================
    /// Hadamard gate
    H(QubitId),

    /// Pauli-X gate (NOT)
    X(QubitId),

    /// Pauli-Y gate
    Y(QubitId),

    /// Pauli-Z gate
    Z(QubitId),

    /// S gate (sqrt(Z))
    S(QubitId),

    /// S-dagger gate (inverse of S)
    Sdg(QubitId),

    /// T gate (fourth root of Z)
    T(QubitId),

    /// T-dagger gate (inverse of T)
    Tdg(QubitId),

    // ========================================================================
    // Single-Qubit Parameterized Gates
    // ========================================================================
    /// Rotation around X-axis
    /// Gantree: Rx(QubitId, ParamExpr) // X 회전
    Rx(QubitId, ParamExpr),

    /// Rotation around Y-axis
    /// Gantree: Ry(QubitId, ParamExpr) // Y 회전
    Ry(QubitId, ParamExpr),

    /// Rotation around Z-axis
    /// Gantree: Rz(QubitId, ParamExpr) // Z 회전
    Rz(QubitId, ParamExpr),

    /// Phase gate P(λ) = diag(1, e^{iλ})
    P(QubitId, ParamExpr),

    // ========================================================================
    // Two-Qubit Gates
    // ========================================================================
    /// Controlled-NOT (CX)
    Cnot(QubitId, QubitId),

    /// Controlled-Z
    Cz(QubitId, QubitId),

    /// SWAP gate
    Swap(QubitId, QubitId),
}

impl Gate {
    // ========================================================================
    // Gate Properties
    // ========================================================================

    /// Get qubits involved in this gate
    /// Gantree: qubits(&self) -> Vec<QubitId> // 관련 큐비트
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            Gate::H(q)
            | Gate::X(q)
            | Gate::Y(q)
            | Gate::Z(q)
            | Gate::S(q)
            | Gate::Sdg(q)
            | Gate::T(q)
            | Gate::Tdg(q)
            | Gate::Rx(q, _)
            | Gate::Ry(q, _)
            | Gate::Rz(q, _)
            | Gate::P(q, _) => vec![*q],

            Gate::Cnot(c, t) | Gate::Cz(c, t) | Gate::Swap(c, t) => vec![*c, *t],
        }
    }

    /// Check if gate is single-qubit
    pub fn is_single_qubit(&self) -> bool {
        !self.is_two_qubit()
    }

    /// Check if gate is two-qubit
    pub fn is_two_qubit(&self) -> bool {
        matches!(self, Gate::Cnot(_, _) | Gate::Cz(_, _) | Gate::Swap(_, _))
    }

    /// Get the rotation angle, if any
    pub fn angle(&self) -> Option<&ParamExpr> {
        match self {
            Gate::Rx(_, a) | Gate::Ry(_, a) | Gate::Rz(_, a) | Gate::P(_, a) => Some(a),
            _ => None,
        }
    }

    /// Check if gate carries an angle
    /// Gantree: is_parameterized(&self) -> bool // 파라미터 여부
    pub fn is_parameterized(&self) -> bool {
        self.angle().is_some()
    }

    /// Check if the angle still contains free parameters
    pub fn is_symbolic(&self) -> bool {
        self.angle().map_or(false, ParamExpr::is_symbolic)
    }

    /// Bind parameter values into the angle
    /// Gantree: bind(&self,binding) -> Gate // 파라미터 바인딩
    pub fn bind(&self, binding: &Binding) -> Gate {
        match self {
            Gate::Rx(q, a) => Gate::Rx(*q, a.bind(binding).simplify()),
            Gate::Ry(q, a) => Gate::Ry(*q, a.bind(binding).simplify()),
            Gate::Rz(q, a) => Gate::Rz(*q, a.bind(binding).simplify()),
            Gate::P(q, a) => Gate::P(*q, a.bind(binding).simplify()),
            other => other.clone(),
        }
    }

    /// Get gate name
    pub fn name(&self) -> &'static str {
        match self {
            Gate::H(_) => "h",
            Gate::X(_) => "x",
            Gate::Y(_) => "y",
            Gate::Z(_) => "z",
            Gate::S(_) => "s",
            Gate::Sdg(_) => "sdg",
            Gate::T(_) => "t",
            Gate::Tdg(_) => "tdg",
            Gate::Rx(_, _) => "rx",
            Gate::Ry(_, _) => "ry",
            Gate::Rz(_, _) => "rz",
            Gate::P(_, _) => "p",
            Gate::Cnot(_, _) => "cx",
            Gate::Cz(_, _) => "cz",
            Gate::Swap(_, _) => "swap",
        }
    }

    /// Convert to OpenQASM 2.0 string (symbolic angles are printed by name)
    /// Gantree: to_qasm(&self) -> String // QASM 변환
    pub fn to_qasm(&self) -> String {
        match self {
            Gate::Rx(q, a) | Gate::Ry(q, a) | Gate::Rz(q, a) | Gate::P(q, a) => {
                format!("{}({}) q[{}];", self.name(), a, q)
            }
            Gate::Cnot(a, b) | Gate::Cz(a, b) | Gate::Swap(a, b) => {
                format!("{} q[{}],q[{}];", self.name(), a, b)
            }
            _ => {
                let q = self.qubits()[0];
                format!("{} q[{}];", self.name(), q)
            }
        }
    }

    // ========================================================================
    // Basis Transformation Helpers
    // ========================================================================

    /// Gates rotating the measurement basis of `qubit` onto Z
    /// X basis: H
    /// Y basis: Sdg, H
    /// Z and I: (none)
    pub fn basis_transform(qubit: QubitId, pauli: Pauli) -> Vec<Gate> {
        match pauli {
            Pauli::X => vec![Gate::H(qubit)],
            Pauli::Y => vec![Gate::Sdg(qubit), Gate::H(qubit)],
            Pauli::Z | Pauli::I => vec![],
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_qasm())
    }
}

// ============================================================================
// Entangler Type
// ============================================================================

/// Entangler gate type for template circuits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EntanglerType {
    /// CNOT (CX) gates
    #[default]
    Cx,
    /// CZ gates
    Cz,
}

impl EntanglerType {
    /// Create gate for given qubit pair
    pub fn gate(&self, control: QubitId, target: QubitId) -> Gate {
        match self {
            EntanglerType::Cx => Gate::Cnot(control, target),
            EntanglerType::Cz => Gate::Cz(control, target),
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cx" | "cnot" => Some(EntanglerType::Cx),
            "cz" => Some(EntanglerType::Cz),
            _ => None,
        }
    }
}

impl fmt::Display for EntanglerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntanglerType::Cx => write!(f, "cx"),
            EntanglerType::Cz => write!(f, "cz"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::Parameter;

    #[test]
    fn test_gate_qubits() {
        assert_eq!(Gate::H(0).qubits(), vec![0]);
        assert_eq!(Gate::Cnot(0, 1).qubits(), vec![0, 1]);
    }

    #[test]
    fn test_gate_classification() {
        assert!(Gate::H(0).is_single_qubit());
        assert!(Gate::Cnot(0, 1).is_two_qubit());
        assert!(Gate::Rx(0, 1.0.into()).is_parameterized());
        assert!(!Gate::Rx(0, 1.0.into()).is_symbolic());
        assert!(!Gate::H(0).is_parameterized());
    }

    #[test]
    fn test_bind_symbolic_angle() {
        let theta = Parameter::new("theta");
        let gate = Gate::Ry(1, ParamExpr::from(&theta));
        assert!(gate.is_symbolic());

        let mut binding = Binding::new();
        binding.insert(theta, 0.25);
        assert_eq!(gate.bind(&binding), Gate::Ry(1, ParamExpr::Constant(0.25)));
    }

    #[test]
    fn test_gate_to_qasm() {
        assert_eq!(Gate::H(0).to_qasm(), "h q[0];");
        assert_eq!(Gate::Cnot(0, 1).to_qasm(), "cx q[0],q[1];");
        assert_eq!(Gate::Rx(0, 0.5.into()).to_qasm(), "rx(0.5) q[0];");

        let theta = Parameter::new("θ[0]");
        assert_eq!(Gate::Ry(2, (&theta).into()).to_qasm(), "ry(θ[0]) q[2];");
    }

    #[test]
    fn test_basis_transform() {
        assert_eq!(Gate::basis_transform(0, Pauli::X), vec![Gate::H(0)]);
        assert_eq!(
            Gate::basis_transform(0, Pauli::Y),
            vec![Gate::Sdg(0), Gate::H(0)]
        );
        assert!(Gate::basis_transform(0, Pauli::Z).is_empty());
    }

    #[test]
    fn test_entangler_type() {
        assert_eq!(EntanglerType::Cx.gate(0, 1), Gate::Cnot(0, 1));
        assert_eq!(EntanglerType::Cz.gate(0, 1), Gate::Cz(0, 1));
        assert_eq!(EntanglerType::parse("CNOT"), Some(EntanglerType::Cx));
        assert_eq!(EntanglerType::parse("iswap"), None);
    }
}
