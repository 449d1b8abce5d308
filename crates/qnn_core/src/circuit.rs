//! Quantum circuit structure for QNN
//!
//! Gantree: L1_Circuit → Circuit
//!
//! A circuit is a gate list on a fixed register plus the ordered list of
//! its free parameters. Parameter order is first appearance, which for the
//! circuit templates equals declaration order. Binding is positional
//! against that order.

use crate::error::{QnnError, QnnResult};
use crate::gate::Gate;
use crate::parameter::{Binding, Parameter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantum circuit
/// Gantree: Circuit // 회로 구조체
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Number of qubits
    num_qubits: usize,

    /// Gate sequence
    gates: Vec<Gate>,

    /// Free parameters in first-appearance order
    parameters: Vec<Parameter>,

    /// Optional circuit name
    name: Option<String>,
}

impl Circuit {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a new empty circuit
    /// Gantree: new(n) -> Self // 생성자
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
            parameters: Vec::new(),
            name: None,
        }
    }

    /// Create a circuit with a name
    pub fn with_name(num_qubits: usize, name: impl Into<String>) -> Self {
        let mut circuit = Self::new(num_qubits);
        circuit.name = Some(name.into());
        circuit
    }

    /// Create from a vector of gates
    pub fn from_gates(num_qubits: usize, gates: Vec<Gate>) -> QnnResult<Self> {
        let mut circuit = Self::new(num_qubits);
        circuit.add_gates(gates)?;
        Ok(circuit)
    }

    // ========================================================================
    // Basic Operations
    // ========================================================================

    /// Add a gate to the circuit
    /// Gantree: add_gate(&mut, Gate) -> Result // 게이트 추가
    pub fn add_gate(&mut self, gate: Gate) -> QnnResult<()> {
        for &qubit in &gate.qubits() {
            if qubit >= self.num_qubits {
                return Err(QnnError::GateQubitMismatch {
                    qubit,
                    num_qubits: self.num_qubits,
                });
            }
        }
        if let Some(angle) = gate.angle() {
            for p in angle.parameters() {
                if !self.parameters.contains(&p) {
                    self.parameters.push(p);
                }
            }
        }
        self.gates.push(gate);
        Ok(())
    }

    /// Add multiple gates
    pub fn add_gates(&mut self, gates: impl IntoIterator<Item = Gate>) -> QnnResult<()> {
        for gate in gates {
            self.add_gate(gate)?;
        }
        Ok(())
    }

    /// Append another circuit on the same register
    /// Gantree: append(&mut,&Circuit) -> Result // 회로 연결
    ///
    /// Gates of `other` run after the gates already present. The registers
    /// must have exactly the same width.
    pub fn append(&mut self, other: &Circuit) -> QnnResult<()> {
        if other.num_qubits != self.num_qubits {
            return Err(QnnError::QubitCountMismatch {
                component: other.name().unwrap_or("appended circuit").to_string(),
                expected: self.num_qubits,
                actual: other.num_qubits,
            });
        }
        self.add_gates(other.gates.iter().cloned())
    }

    /// Get number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get gates
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Get circuit name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set circuit name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Check if circuit is empty
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Free parameters in declaration order
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Number of free parameters
    pub fn num_parameters(&self) -> usize {
        self.parameters.len()
    }

    /// Check that no free parameters remain
    pub fn is_bound(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Bind values positionally to the given parameters
    /// Gantree: bind_parameters(&self,params,values) -> Result<Circuit> // 위치 바인딩
    ///
    /// Parameters not listed stay free, so this also performs partial
    /// binding. Every listed parameter must belong to the circuit.
    pub fn bind_parameters(&self, parameters: &[Parameter], values: &[f64]) -> QnnResult<Circuit> {
        if parameters.len() != values.len() {
            return Err(QnnError::InvalidGateParameter(format!(
                "{} parameters but {} values",
                parameters.len(),
                values.len()
            )));
        }
        let mut binding = Binding::with_capacity(parameters.len());
        for (p, &v) in parameters.iter().zip(values) {
            if !self.parameters.contains(p) {
                return Err(QnnError::InvalidGateParameter(format!(
                    "parameter '{}' is not in the circuit",
                    p
                )));
            }
            if !v.is_finite() {
                return Err(QnnError::InvalidGateParameter(format!(
                    "value {} for '{}' is not finite",
                    v, p
                )));
            }
            binding.insert(p.clone(), v);
        }
        Ok(self.assign(&binding))
    }

    /// Bind all free parameters positionally, in declaration order
    pub fn bind_values(&self, values: &[f64]) -> QnnResult<Circuit> {
        let parameters = self.parameters.clone();
        self.bind_parameters(&parameters, values)
    }

    /// Substitute a binding into every gate
    pub fn assign(&self, binding: &Binding) -> Circuit {
        let gates: Vec<Gate> = self.gates.iter().map(|g| g.bind(binding)).collect();
        let parameters = self
            .parameters
            .iter()
            .filter(|p| !binding.contains_key(*p))
            .cloned()
            .collect();
        Circuit {
            num_qubits: self.num_qubits,
            gates,
            parameters,
            name: self.name.clone(),
        }
    }

    /// Number of gates whose angle depends on `parameter`
    pub fn parameter_occurrences(&self, parameter: &Parameter) -> usize {
        self.gates
            .iter()
            .filter_map(Gate::angle)
            .filter(|a| a.parameters().contains(parameter))
            .count()
    }

    /// Check that `parameter` enters exactly one gate as a bare angle
    ///
    /// Those are the parameters for which the two-term shift rule gives the
    /// exact derivative.
    pub fn is_shift_compatible(&self, parameter: &Parameter) -> bool {
        let mut occurrences = self
            .gates
            .iter()
            .filter_map(Gate::angle)
            .filter(|a| a.parameters().contains(parameter));
        match (occurrences.next(), occurrences.next()) {
            (Some(angle), None) => angle.as_symbol() == Some(parameter),
            _ => false,
        }
    }

    // ========================================================================
    // Circuit Analysis
    // ========================================================================

    /// Calculate circuit depth (longest path)
    /// Gantree: depth(&self) -> usize // 깊이 계산
    pub fn depth(&self) -> usize {
        let mut qubit_depths = vec![0usize; self.num_qubits];

        for gate in &self.gates {
            let qubits = gate.qubits();
            let max_depth = qubits
                .iter()
                .filter_map(|&q| qubit_depths.get(q))
                .max()
                .copied()
                .unwrap_or(0);
            for &q in &qubits {
                qubit_depths[q] = max_depth + 1;
            }
        }

        qubit_depths.into_iter().max().unwrap_or(0)
    }

    /// Get total gate count
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Count single-qubit gates
    pub fn count_1q(&self) -> usize {
        self.gates.iter().filter(|g| g.is_single_qubit()).count()
    }

    /// Count two-qubit gates
    pub fn count_2q(&self) -> usize {
        self.gates.iter().filter(|g| g.is_two_qubit()).count()
    }

    /// Count parameterized gates
    pub fn count_parameterized(&self) -> usize {
        self.gates.iter().filter(|g| g.is_parameterized()).count()
    }

    // ========================================================================
    // QASM Conversion
    // ========================================================================

    /// Convert to OpenQASM 2.0 string
    /// Gantree: to_qasm(&self) -> String // QASM2 출력
    pub fn to_qasm(&self) -> String {
        let mut lines = vec![
            "OPENQASM 2.0;".to_string(),
            "include \"qelib1.inc\";".to_string(),
            String::new(),
            format!("qreg q[{}];", self.num_qubits),
            String::new(),
        ];
        lines.extend(self.gates.iter().map(Gate::to_qasm));
        lines.join("\n")
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Circuit({}{} qubits, {} gates, {} parameters, depth {})",
            self.name.as_deref().map(|n| format!("{}: ", n)).unwrap_or_default(),
            self.num_qubits,
            self.gates.len(),
            self.parameters.len(),
            self.depth()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
