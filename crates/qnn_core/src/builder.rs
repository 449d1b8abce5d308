//! Circuit builder for QNN
//!
//! Gantree: L1_Circuit → CircuitBuilder
//!
//! Fluent builder for circuits. Angles accept anything convertible into a
//! [`ParamExpr`], so the same calls build bound and symbolic circuits.
//! Gates on out-of-range qubits are dropped; use [`Circuit::add_gate`]
//! directly when the error matters.

use crate::circuit::Circuit;
use crate::gate::{EntanglerType, Gate};
use crate::library::Entanglement;
use crate::parameter::ParamExpr;
use crate::types::QubitId;

/// Fluent circuit builder (consuming self pattern)
/// Gantree: CircuitBuilder // 빌더 패턴
pub struct CircuitBuilder {
    /// Internal circuit being built
    circuit: Circuit,
}

impl CircuitBuilder {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Create a new circuit builder
    /// Gantree: new(n) -> Self // 생성자
    pub fn new(num_qubits: usize) -> Self {
        Self {
            circuit: Circuit::new(num_qubits),
        }
    }

    /// Create with circuit name
    pub fn with_name(num_qubits: usize, name: impl Into<String>) -> Self {
        Self {
            circuit: Circuit::with_name(num_qubits, name),
        }
    }

    fn push(mut self, gate: Gate) -> Self {
        let _ = self.circuit.add_gate(gate);
        self
    }

    // ========================================================================
    // Single-Qubit Gates (Non-Parameterized)
    // ========================================================================

    /// Add Hadamard gate
    pub fn h(self, qubit: QubitId) -> Self {
        self.push(Gate::H(qubit))
    }

    /// Add Pauli-X gate
    pub fn x(self, qubit: QubitId) -> Self {
        self.push(Gate::X(qubit))
    }

    /// Add Pauli-Y gate
    pub fn y(self, qubit: QubitId) -> Self {
        self.push(Gate::Y(qubit))
    }

    /// Add Pauli-Z gate
    pub fn z(self, qubit: QubitId) -> Self {
        self.push(Gate::Z(qubit))
    }

    /// Add S gate
    pub fn s(self, qubit: QubitId) -> Self {
        self.push(Gate::S(qubit))
    }

    /// Add S-dagger gate
    pub fn sdg(self, qubit: QubitId) -> Self {
        self.push(Gate::Sdg(qubit))
    }

    /// Add T gate
    pub fn t(self, qubit: QubitId) -> Self {
        self.push(Gate::T(qubit))
    }

    /// Add T-dagger gate
    pub fn tdg(self, qubit: QubitId) -> Self {
        self.push(Gate::Tdg(qubit))
    }

    // ========================================================================
    // Single-Qubit Parameterized Gates
    // ========================================================================

    /// Add Rx rotation
    /// Gantree: rx(self, q, angle) -> Self // Rx 추가
    pub fn rx(self, qubit: QubitId, angle: impl Into<ParamExpr>) -> Self {
        self.push(Gate::Rx(qubit, angle.into()))
    }

    /// Add Ry rotation
    /// Gantree: ry(self, q, angle) -> Self // Ry 추가
    pub fn ry(self, qubit: QubitId, angle: impl Into<ParamExpr>) -> Self {
        self.push(Gate::Ry(qubit, angle.into()))
    }

    /// Add Rz rotation
    /// Gantree: rz(self, q, angle) -> Self // Rz 추가
    pub fn rz(self, qubit: QubitId, angle: impl Into<ParamExpr>) -> Self {
        self.push(Gate::Rz(qubit, angle.into()))
    }

    /// Add phase gate
    pub fn p(self, qubit: QubitId, angle: impl Into<ParamExpr>) -> Self {
        self.push(Gate::P(qubit, angle.into()))
    }

    // ========================================================================
    // Two-Qubit Gates
    // ========================================================================

    /// Add CNOT gate
    /// Gantree: cnot(self, c, t) -> Self // CNOT 추가
    pub fn cnot(self, control: QubitId, target: QubitId) -> Self {
        self.push(Gate::Cnot(control, target))
    }

    /// Alias for cnot
    pub fn cx(self, control: QubitId, target: QubitId) -> Self {
        self.cnot(control, target)
    }

    /// Add CZ gate
    pub fn cz(self, control: QubitId, target: QubitId) -> Self {
        self.push(Gate::Cz(control, target))
    }

    /// Add SWAP gate
    pub fn swap(self, qubit1: QubitId, qubit2: QubitId) -> Self {
        self.push(Gate::Swap(qubit1, qubit2))
    }

    // ========================================================================
    // Layer Operations
    // ========================================================================

    /// Add Hadamard layer on all qubits
    pub fn h_layer(mut self) -> Self {
        for i in 0..self.circuit.num_qubits() {
            let _ = self.circuit.add_gate(Gate::H(i));
        }
        self
    }

    /// Add Ry rotation layer, one angle per qubit from qubit 0
    /// Gantree: ry_layer(self, angles) -> Self // Ry 레이어
    pub fn ry_layer<A>(mut self, angles: &[A]) -> Self
    where
        for<'a> &'a A: Into<ParamExpr>,
    {
        let n = self.circuit.num_qubits().min(angles.len());
        for (i, angle) in angles.iter().take(n).enumerate() {
            let _ = self.circuit.add_gate(Gate::Ry(i, angle.into()));
        }
        self
    }

    /// Add Rz rotation layer, one angle per qubit from qubit 0
    pub fn rz_layer<A>(mut self, angles: &[A]) -> Self
    where
        for<'a> &'a A: Into<ParamExpr>,
    {
        let n = self.circuit.num_qubits().min(angles.len());
        for (i, angle) in angles.iter().take(n).enumerate() {
            let _ = self.circuit.add_gate(Gate::Rz(i, angle.into()));
        }
        self
    }

    /// Add entangling gates for the given pair pattern
    /// Gantree: entangle(self, typ, pattern) -> Self // 엔탱글링 레이어
    pub fn entangle(mut self, entangler: EntanglerType, pattern: Entanglement) -> Self {
        for (c, t) in pattern.pairs(self.circuit.num_qubits()) {
            let _ = self.circuit.add_gate(entangler.gate(c, t));
        }
        self
    }

    /// Add CX chain (linear connectivity)
    pub fn cx_chain(self) -> Self {
        self.entangle(EntanglerType::Cx, Entanglement::Linear)
    }

    /// Append all gates of another circuit
    pub fn compose(mut self, other: &Circuit) -> Self {
        let _ = self.circuit.add_gates(other.gates().iter().cloned());
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build and return the circuit
    /// Gantree: build(self) -> Circuit // 빌드
    pub fn build(self) -> Circuit {
        self.circuit
    }

    /// Get reference to current circuit state
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Get number of qubits
    pub fn num_qubits(&self) -> usize {
        self.circuit.num_qubits()
    }
}

// ============================================================================
// Tests
// ============================================================================
