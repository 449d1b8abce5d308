//! Dense statevector simulation
//!
//! Gantree: L3_Backend → Statevector
//!
//! Amplitudes are indexed by basis state with qubit `q` at bit `q`.

use num_complex::Complex64;
use qnn_core::constants::backend::MAX_STATEVECTOR_QUBITS;
use qnn_core::{Binding, Circuit, Gate, Observable, QnnError, QnnResult};
use std::f64::consts::FRAC_1_SQRT_2;

/// Dense quantum state
/// Gantree: Statevector // 상태 벡터
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    num_qubits: usize,
    amplitudes: Vec<Complex64>,
}

impl Statevector {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// |0...0⟩ on `num_qubits` qubits
    pub fn zero(num_qubits: usize) -> QnnResult<Self> {
        if num_qubits > MAX_STATEVECTOR_QUBITS {
            return Err(QnnError::InvalidConfig(format!(
                "statevector limited to {} qubits, got {}",
                MAX_STATEVECTOR_QUBITS, num_qubits
            )));
        }
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    /// Run a fully bound circuit from |0...0⟩
    /// Gantree: from_circuit(circuit) -> Result<Statevector> // 회로 시뮬레이션
    pub fn from_circuit(circuit: &Circuit) -> QnnResult<Self> {
        if let Some(p) = circuit.parameters().first() {
            return Err(QnnError::UnboundParameter(p.name().to_string()));
        }
        let mut state = Self::zero(circuit.num_qubits())?;
        for gate in circuit.gates() {
            state.apply_gate(gate)?;
        }
        Ok(state)
    }

    /// Number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Amplitudes by basis index
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Born-rule probabilities by basis index
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Squared norm (1 for a valid state)
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    /// ⟨ψ|O|ψ⟩
    pub fn expectation(&self, observable: &Observable) -> QnnResult<f64> {
        if observable.num_qubits() != self.num_qubits {
            return Err(QnnError::QubitCountMismatch {
                component: "observable".into(),
                expected: self.num_qubits,
                actual: observable.num_qubits(),
            });
        }
        observable.expectation(&self.amplitudes)
    }

    // ========================================================================
    // Gate Application
    // ========================================================================

    /// Apply one gate; the angle must be bound
    /// Gantree: apply_gate(&mut,gate) -> Result // 게이트 적용
    pub fn apply_gate(&mut self, gate: &Gate) -> QnnResult<()> {
        for &q in &gate.qubits() {
            if q >= self.num_qubits {
                return Err(QnnError::GateQubitMismatch {
                    qubit: q,
                    num_qubits: self.num_qubits,
                });
            }
        }
        let angle = match gate.angle() {
            Some(expr) => expr.evaluate(&Binding::new())?,
            None => 0.0,
        };

        match gate {
            Gate::H(q) => self.apply_single_qubit_gate(*q, |a, b| {
                ((a + b) * FRAC_1_SQRT_2, (a - b) * FRAC_1_SQRT_2)
            }),
            Gate::X(q) => self.apply_single_qubit_gate(*q, |a, b| (b, a)),
            Gate::Y(q) => self.apply_single_qubit_gate(*q, |a, b| {
                (b * Complex64::new(0.0, -1.0), a * Complex64::new(0.0, 1.0))
            }),
            Gate::Z(q) => self.apply_phase(*q, Complex64::new(-1.0, 0.0)),
            Gate::S(q) => self.apply_phase(*q, Complex64::new(0.0, 1.0)),
            Gate::Sdg(q) => self.apply_phase(*q, Complex64::new(0.0, -1.0)),
            Gate::T(q) => self.apply_phase(*q, Complex64::from_polar(1.0, std::f64::consts::FRAC_PI_4)),
            Gate::Tdg(q) => {
                self.apply_phase(*q, Complex64::from_polar(1.0, -std::f64::consts::FRAC_PI_4))
            }
            Gate::Rx(q, _) => {
                let c = (angle / 2.0).cos();
                let s = Complex64::new(0.0, -(angle / 2.0).sin());
                self.apply_single_qubit_gate(*q, |a, b| (a * c + b * s, a * s + b * c));
            }
            Gate::Ry(q, _) => {
                let c = (angle / 2.0).cos();
                let s = (angle / 2.0).sin();
                self.apply_single_qubit_gate(*q, |a, b| (a * c - b * s, a * s + b * c));
            }
            Gate::Rz(q, _) => {
                let neg = Complex64::from_polar(1.0, -angle / 2.0);
                let pos = Complex64::from_polar(1.0, angle / 2.0);
                self.apply_single_qubit_gate(*q, |a, b| (a * neg, b * pos));
            }
            Gate::P(q, _) => self.apply_phase(*q, Complex64::from_polar(1.0, angle)),
            Gate::Cnot(c, t) => self.apply_cnot(*c, *t),
            Gate::Cz(a, b) => self.apply_cz(*a, *b),
            Gate::Swap(a, b) => self.apply_swap(*a, *b),
        }
        Ok(())
    }

    fn apply_single_qubit_gate<F>(&mut self, q: usize, f: F)
    where
        F: Fn(Complex64, Complex64) -> (Complex64, Complex64),
    {
        let mask = 1 << q;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let (new_i, new_j) = f(self.amplitudes[i], self.amplitudes[j]);
                self.amplitudes[i] = new_i;
                self.amplitudes[j] = new_j;
            }
        }
    }

    fn apply_phase(&mut self, q: usize, phase: Complex64) {
        self.apply_single_qubit_gate(q, |a, b| (a, b * phase));
    }

    fn apply_cnot(&mut self, control: usize, target: usize) {
        let control_mask = 1 << control;
        let target_mask = 1 << target;

        for i in 0..self.amplitudes.len() {
            if (i & control_mask) != 0 && (i & target_mask) == 0 {
                self.amplitudes.swap(i, i | target_mask);
            }
        }
    }

    fn apply_cz(&mut self, q1: usize, q2: usize) {
        let mask = (1 << q1) | (1 << q2);

        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == mask {
                *amp = -*amp;
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;

        for i in 0..self.amplitudes.len() {
            let bit1 = (i & mask1) != 0;
            let bit2 = (i & mask2) != 0;
            if bit1 != bit2 {
                let j = i ^ mask1 ^ mask2;
                if i < j {
                    self.amplitudes.swap(i, j);
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
