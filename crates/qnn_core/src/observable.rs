//! Pauli observables for expectation values
//!
//! Gantree: L1_Circuit → Observable
//!
//! An [`Observable`] is a real-weighted sum of Pauli strings. Labels are
//! written with the highest qubit first, so `"ZI"` acts with Z on qubit 1.

use crate::error::{QnnError, QnnResult};
use crate::types::QubitId;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Pauli
// ============================================================================

/// Single-qubit Pauli operator
/// Gantree: Pauli // I | X | Y | Z
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity
    I,
    /// Bit flip
    X,
    /// Bit and phase flip
    Y,
    /// Phase flip
    Z,
}

impl Pauli {
    /// Parse from a character (case-insensitive)
    pub fn from_char(c: char) -> QnnResult<Self> {
        match c.to_ascii_uppercase() {
            'I' => Ok(Pauli::I),
            'X' => Ok(Pauli::X),
            'Y' => Ok(Pauli::Y),
            'Z' => Ok(Pauli::Z),
            other => Err(QnnError::InvalidPauli(format!(
                "unknown Pauli character '{}'",
                other
            ))),
        }
    }

    /// Character representation
    pub fn to_char(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }

    /// Check if diagonal in the computational basis (I or Z)
    pub fn is_diagonal(self) -> bool {
        matches!(self, Pauli::I | Pauli::Z)
    }

    /// Check if the operator flips the basis bit (X or Y)
    pub fn flips(self) -> bool {
        matches!(self, Pauli::X | Pauli::Y)
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

// ============================================================================
// Pauli String
// ============================================================================

/// Weighted tensor product of Paulis
/// Gantree: PauliString // 파울리 문자열
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliString {
    /// Pauli per qubit, indexed by qubit
    paulis: Vec<Pauli>,

    /// Real coefficient
    coeff: f64,
}

impl PauliString {
    /// Parse a label, highest qubit first
    /// Gantree: parse(label) -> Result<PauliString> // 라벨 파싱
    pub fn parse(label: &str) -> QnnResult<Self> {
        if label.is_empty() {
            return Err(QnnError::InvalidPauli("empty Pauli label".into()));
        }
        let mut paulis = label
            .chars()
            .map(Pauli::from_char)
            .collect::<QnnResult<Vec<_>>>()?;
        paulis.reverse();
        Ok(Self { paulis, coeff: 1.0 })
    }

    /// Create from Paulis indexed by qubit
    pub fn from_paulis(paulis: Vec<Pauli>) -> Self {
        Self { paulis, coeff: 1.0 }
    }

    /// Set coefficient
    pub fn with_coeff(mut self, coeff: f64) -> Self {
        self.coeff = coeff;
        self
    }

    /// Number of qubits
    pub fn num_qubits(&self) -> usize {
        self.paulis.len()
    }

    /// Coefficient
    pub fn coeff(&self) -> f64 {
        self.coeff
    }

    /// Pauli acting on a qubit
    pub fn get(&self, qubit: QubitId) -> Option<Pauli> {
        self.paulis.get(qubit).copied()
    }

    /// Paulis indexed by qubit
    pub fn paulis(&self) -> &[Pauli] {
        &self.paulis
    }

    /// Check if every factor is I or Z
    pub fn is_diagonal(&self) -> bool {
        self.paulis.iter().all(|p| p.is_diagonal())
    }

    /// Label with the highest qubit first
    pub fn label(&self) -> String {
        self.paulis.iter().rev().map(|p| p.to_char()).collect()
    }

    /// Eigenvalue (±1, without coefficient) of the Z-basis image of this term
    ///
    /// After rotating every non-identity factor into the Z basis the term
    /// acts on a basis state as the parity of the bits it touches.
    pub fn measured_sign(&self, index: usize) -> f64 {
        let mask = self.support_mask();
        if (index & mask).count_ones() % 2 == 0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Bit mask of qubits with a non-identity factor
    pub fn support_mask(&self) -> usize {
        self.paulis
            .iter()
            .enumerate()
            .filter(|(_, p)| **p != Pauli::I)
            .fold(0, |mask, (q, _)| mask | (1 << q))
    }

    /// ⟨ψ|P|ψ⟩ including the coefficient
    /// Gantree: expectation(&self,amps) -> f64 // 기대값
    pub fn expectation(&self, amplitudes: &[Complex64]) -> f64 {
        if self.is_diagonal() {
            let sum: f64 = amplitudes
                .iter()
                .enumerate()
                .map(|(i, a)| a.norm_sqr() * self.measured_sign(i))
                .sum();
            return self.coeff * sum;
        }

        let flip_mask = self
            .paulis
            .iter()
            .enumerate()
            .filter(|(_, p)| p.flips())
            .fold(0usize, |mask, (q, _)| mask | (1 << q));

        let mut total = Complex64::new(0.0, 0.0);
        for (i, amp) in amplitudes.iter().enumerate() {
            let j = i ^ flip_mask;
            let mut phase = Complex64::new(1.0, 0.0);
            for (q, p) in self.paulis.iter().enumerate() {
                let bit = (i >> q) & 1;
                match p {
                    Pauli::I | Pauli::X => {}
                    Pauli::Z => {
                        if bit == 1 {
                            phase = -phase;
                        }
                    }
                    // Y|0> = i|1>, Y|1> = -i|0>
                    Pauli::Y => {
                        phase *= if bit == 0 {
                            Complex64::new(0.0, 1.0)
                        } else {
                            Complex64::new(0.0, -1.0)
                        };
                    }
                }
            }
            if let Some(target) = amplitudes.get(j) {
                total += target.conj() * phase * amp;
            }
        }
        self.coeff * total.re
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} * {}", self.coeff, self.label())
    }
}

// ============================================================================
// Observable
// ============================================================================

/// Sum of weighted Pauli strings on a fixed register
/// Gantree: Observable // 관측량
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observable {
    num_qubits: usize,
    terms: Vec<PauliString>,
}

impl Observable {
    /// Build from `(label, coeff)` pairs
    /// Gantree: from_list(&[(label,coeff)]) -> Result<Observable> // 생성
    pub fn from_list(terms: &[(&str, f64)]) -> QnnResult<Self> {
        let parsed = terms
            .iter()
            .map(|(label, coeff)| PauliString::parse(label).map(|p| p.with_coeff(*coeff)))
            .collect::<QnnResult<Vec<_>>>()?;
        Self::from_terms(parsed)
    }

    /// Build from parsed terms; all terms must share one width
    pub fn from_terms(terms: Vec<PauliString>) -> QnnResult<Self> {
        let num_qubits = terms
            .first()
            .map(PauliString::num_qubits)
            .ok_or_else(|| QnnError::InvalidPauli("observable has no terms".into()))?;
        if let Some(bad) = terms.iter().find(|t| t.num_qubits() != num_qubits) {
            return Err(QnnError::InvalidPauli(format!(
                "term '{}' acts on {} qubits, expected {}",
                bad.label(),
                bad.num_qubits(),
                num_qubits
            )));
        }
        Ok(Self { num_qubits, terms })
    }

    /// Z on every qubit (global parity)
    /// Gantree: all_z(n) -> Observable // 기본 관측량
    pub fn all_z(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            terms: vec![PauliString::from_paulis(vec![Pauli::Z; num_qubits])],
        }
    }

    /// Z on one qubit, identity elsewhere
    pub fn single_z(num_qubits: usize, qubit: QubitId) -> QnnResult<Self> {
        if qubit >= num_qubits {
            return Err(QnnError::GateQubitMismatch { qubit, num_qubits });
        }
        let mut paulis = vec![Pauli::I; num_qubits];
        paulis[qubit] = Pauli::Z;
        Ok(Self {
            num_qubits,
            terms: vec![PauliString::from_paulis(paulis)],
        })
    }

    /// Number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Terms of the sum
    pub fn terms(&self) -> &[PauliString] {
        &self.terms
    }

    /// Check if every term is diagonal
    pub fn is_diagonal(&self) -> bool {
        self.terms.iter().all(PauliString::is_diagonal)
    }

    /// Eigenvalue on a basis state; only meaningful for diagonal observables
    pub fn diagonal_eigenvalue(&self, index: usize) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coeff() * t.measured_sign(index))
            .sum()
    }

    /// Sum of absolute coefficients, an upper bound of |⟨O⟩|
    pub fn norm_bound(&self) -> f64 {
        self.terms.iter().map(|t| t.coeff().abs()).sum()
    }

    /// ⟨ψ|O|ψ⟩ for a statevector of matching width
    pub fn expectation(&self, amplitudes: &[Complex64]) -> QnnResult<f64> {
        let dim = 1usize << self.num_qubits;
        if amplitudes.len() != dim {
            return Err(QnnError::QubitCountMismatch {
                component: "statevector".into(),
                expected: dim,
                actual: amplitudes.len(),
            });
        }
        Ok(self.terms.iter().map(|t| t.expectation(amplitudes)).sum())
    }
}

impl fmt::Display for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.terms.iter().map(|t| t.to_string()).collect();
        write!(f, "{}", parts.join(" + "))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn basis(num_qubits: usize, index: usize) -> Vec<Complex64> {
        let mut v = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        v[index] = Complex64::new(1.0, 0.0);
        v
    }

    #[test]
    fn test_label_order() {
        let p = PauliString::parse("XZ").unwrap();
        assert_eq!(p.get(0), Some(Pauli::Z));
        assert_eq!(p.get(1), Some(Pauli::X));
        assert_eq!(p.label(), "XZ");
    }

    #[test]
    fn test_invalid_label() {
        assert!(matches!(
            PauliString::parse("ZQ"),
            Err(QnnError::InvalidPauli(_))
        ));
        assert!(Observable::from_list(&[("ZZ", 1.0), ("Z", 1.0)]).is_err());
        assert!(Observable::from_list(&[]).is_err());
    }

    #[test]
    fn test_all_z_eigenvalues() {
        let obs = Observable::all_z(2);
        assert_eq!(obs.diagonal_eigenvalue(0b00), 1.0);
        assert_eq!(obs.diagonal_eigenvalue(0b01), -1.0);
        assert_eq!(obs.diagonal_eigenvalue(0b11), 1.0);
    }

    #[test]
    fn test_single_z_on_basis_state() {
        // qubit 0 is |1>, qubit 1 is |0>
        let state = basis(2, 0b01);
        let z0 = Observable::single_z(2, 0).unwrap();
        let z1 = Observable::single_z(2, 1).unwrap();
        assert_abs_diff_eq!(z0.expectation(&state).unwrap(), -1.0);
        assert_abs_diff_eq!(z1.expectation(&state).unwrap(), 1.0);
    }

    #[test]
    fn test_x_on_plus_state() {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let plus = vec![Complex64::new(h, 0.0), Complex64::new(h, 0.0)];
        let x = Observable::from_list(&[("X", 1.0)]).unwrap();
        assert_abs_diff_eq!(x.expectation(&plus).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_y_on_plus_i_state() {
        // (|0> + i|1>)/√2 is the +1 eigenstate of Y
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let state = vec![Complex64::new(h, 0.0), Complex64::new(0.0, h)];
        let y = Observable::from_list(&[("Y", 0.5)]).unwrap();
        assert_abs_diff_eq!(y.expectation(&state).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_expectation_width_mismatch() {
        let obs = Observable::all_z(3);
        assert!(obs.expectation(&basis(2, 0)).is_err());
    }
}
