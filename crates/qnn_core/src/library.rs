//! Parametrized circuit templates
//!
//! Gantree: L2_Library → Templates
//!
//! Feature maps encode an input vector into a state, ansatz templates carry
//! the trainable weights. Every template builds a fresh symbolic
//! [`Circuit`] whose free parameters appear in declaration order.

use crate::builder::CircuitBuilder;
use crate::circuit::Circuit;
use crate::constants::library::{
    ANSATZ_REPS, INPUT_PREFIX, WEIGHT_PREFIX, ZZ_FEATURE_MAP_REPS, Z_FEATURE_MAP_REPS,
};
use crate::gate::{EntanglerType, Gate};
use crate::parameter::{ParamExpr, Parameter};
use crate::types::QubitId;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Entanglement Pattern
// ============================================================================

/// Qubit pair pattern for entangling layers
/// Gantree: Entanglement // Linear | Full | Circular
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Entanglement {
    /// (i, i+1)
    Linear,
    /// Every pair i < j
    #[default]
    Full,
    /// Linear plus (n-1, 0)
    Circular,
}

impl Entanglement {
    /// Ordered (control, target) pairs on `num_qubits` qubits
    pub fn pairs(&self, num_qubits: usize) -> Vec<(QubitId, QubitId)> {
        let linear = (0..num_qubits.saturating_sub(1)).map(|i| (i, i + 1));
        match self {
            Entanglement::Linear => linear.collect(),
            Entanglement::Full => (0..num_qubits)
                .flat_map(|i| ((i + 1)..num_qubits).map(move |j| (i, j)))
                .collect(),
            Entanglement::Circular => {
                let mut pairs: Vec<_> = linear.collect();
                if num_qubits > 2 {
                    pairs.push((num_qubits - 1, 0));
                }
                pairs
            }
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Some(Entanglement::Linear),
            "full" => Some(Entanglement::Full),
            "circular" => Some(Entanglement::Circular),
            _ => None,
        }
    }
}

impl fmt::Display for Entanglement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entanglement::Linear => write!(f, "linear"),
            Entanglement::Full => write!(f, "full"),
            Entanglement::Circular => write!(f, "circular"),
        }
    }
}

// ============================================================================
// Template Trait
// ============================================================================

/// A recipe for a parametrized circuit
/// Gantree: CircuitTemplate // 회로 템플릿 trait
pub trait CircuitTemplate {
    /// Register width
    fn num_qubits(&self) -> usize;

    /// Number of free parameters the built circuit will expose
    fn num_parameters(&self) -> usize;

    /// Build a fresh symbolic circuit
    fn build(&self) -> Circuit;
}

// ============================================================================
// ZZ Feature Map
// ============================================================================

/// Second-order Pauli-Z evolution feature map
/// Gantree: ZzFeatureMap // 2차 특징 맵
///
/// Each repetition applies `H` on every qubit, `P(2·x_i)` on every qubit and
/// for each entangled pair `(i, j)` the block `CX(i,j) · P(2·(π−x_i)(π−x_j)) on j · CX(i,j)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZzFeatureMap {
    num_qubits: usize,
    reps: usize,
    entanglement: Entanglement,
    prefix: String,
}

impl ZzFeatureMap {
    /// Create with default repetitions and full entanglement
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            reps: ZZ_FEATURE_MAP_REPS,
            entanglement: Entanglement::Full,
            prefix: INPUT_PREFIX.to_string(),
        }
    }

    /// Set repetitions
    pub fn with_reps(mut self, reps: usize) -> Self {
        self.reps = reps;
        self
    }

    /// Set entanglement pattern
    pub fn with_entanglement(mut self, entanglement: Entanglement) -> Self {
        self.entanglement = entanglement;
        self
    }

    /// Set parameter name prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl CircuitTemplate for ZzFeatureMap {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn num_parameters(&self) -> usize {
        self.num_qubits
    }

    fn build(&self) -> Circuit {
        let x = Parameter::vector(&self.prefix, self.num_qubits);
        let mut builder = CircuitBuilder::with_name(self.num_qubits, "ZZFeatureMap");
        for _ in 0..self.reps {
            builder = builder.h_layer();
            for (i, xi) in x.iter().enumerate() {
                builder = builder.p(i, ParamExpr::from(2.0) * ParamExpr::from(xi));
            }
            for (i, j) in self.entanglement.pairs(self.num_qubits) {
                let phi = ParamExpr::from(2.0)
                    * (ParamExpr::pi() - ParamExpr::from(&x[i]))
                    * (ParamExpr::pi() - ParamExpr::from(&x[j]));
                builder = builder.cx(i, j).p(j, phi).cx(i, j);
            }
        }
        builder.build()
    }
}

// ============================================================================
// Z Feature Map
// ============================================================================

/// First-order Pauli-Z evolution feature map
/// Gantree: ZFeatureMap // 1차 특징 맵
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZFeatureMap {
    num_qubits: usize,
    reps: usize,
    prefix: String,
}

impl ZFeatureMap {
    /// Create with default repetitions
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            reps: Z_FEATURE_MAP_REPS,
            prefix: INPUT_PREFIX.to_string(),
        }
    }

    /// Set repetitions
    pub fn with_reps(mut self, reps: usize) -> Self {
        self.reps = reps;
        self
    }

    /// Set parameter name prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl CircuitTemplate for ZFeatureMap {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn num_parameters(&self) -> usize {
        self.num_qubits
    }

    fn build(&self) -> Circuit {
        let x = Parameter::vector(&self.prefix, self.num_qubits);
        let mut builder = CircuitBuilder::with_name(self.num_qubits, "ZFeatureMap");
        for _ in 0..self.reps {
            builder = builder.h_layer();
            for (i, xi) in x.iter().enumerate() {
                builder = builder.p(i, ParamExpr::from(2.0) * ParamExpr::from(xi));
            }
        }
        builder.build()
    }
}

// ============================================================================
// Real Amplitudes
// ============================================================================

/// Hardware-efficient ansatz with `RY` rotations and entangling layers
/// Gantree: RealAmplitudes // RY 안자츠
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealAmplitudes {
    num_qubits: usize,
    reps: usize,
    entanglement: Entanglement,
    entangler: EntanglerType,
    prefix: String,
}

impl RealAmplitudes {
    /// Create with default repetitions and full CX entanglement
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            reps: ANSATZ_REPS,
            entanglement: Entanglement::Full,
            entangler: EntanglerType::Cx,
            prefix: WEIGHT_PREFIX.to_string(),
        }
    }

    /// Set repetitions
    pub fn with_reps(mut self, reps: usize) -> Self {
        self.reps = reps;
        self
    }

    /// Set entanglement pattern
    pub fn with_entanglement(mut self, entanglement: Entanglement) -> Self {
        self.entanglement = entanglement;
        self
    }

    /// Set entangling gate
    pub fn with_entangler(mut self, entangler: EntanglerType) -> Self {
        self.entangler = entangler;
        self
    }

    /// Set parameter name prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl CircuitTemplate for RealAmplitudes {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn num_parameters(&self) -> usize {
        self.num_qubits * (self.reps + 1)
    }

    fn build(&self) -> Circuit {
        let n = self.num_qubits;
        let theta = Parameter::vector(&self.prefix, self.num_parameters());
        let mut builder = CircuitBuilder::with_name(n, "RealAmplitudes");
        for layer in theta.chunks(n.max(1)) {
            if !builder.circuit().is_empty() {
                builder = builder.entangle(self.entangler, self.entanglement);
            }
            builder = builder.ry_layer(layer);
        }
        builder.build()
    }
}

// ============================================================================
// Efficient SU(2)
// ============================================================================

/// Hardware-efficient ansatz with `RY`+`RZ` rotations and entangling layers
/// Gantree: EfficientSu2 // SU(2) 안자츠
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficientSu2 {
    num_qubits: usize,
    reps: usize,
    entanglement: Entanglement,
    prefix: String,
}

impl EfficientSu2 {
    /// Create with default repetitions and linear entanglement
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            reps: ANSATZ_REPS,
            entanglement: Entanglement::Linear,
            prefix: WEIGHT_PREFIX.to_string(),
        }
    }

    /// Set repetitions
    pub fn with_reps(mut self, reps: usize) -> Self {
        self.reps = reps;
        self
    }

    /// Set entanglement pattern
    pub fn with_entanglement(mut self, entanglement: Entanglement) -> Self {
        self.entanglement = entanglement;
        self
    }

    /// Set parameter name prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl CircuitTemplate for EfficientSu2 {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn num_parameters(&self) -> usize {
        2 * self.num_qubits * (self.reps + 1)
    }

    fn build(&self) -> Circuit {
        let n = self.num_qubits;
        let theta = Parameter::vector(&self.prefix, self.num_parameters());
        let mut builder = CircuitBuilder::with_name(n, "EfficientSU2");
        for (layer, block) in theta.chunks((2 * n).max(1)).enumerate() {
            if layer > 0 {
                builder = builder.entangle(EntanglerType::Cx, self.entanglement);
            }
            let (ry, rz) = block.split_at(n.min(block.len()));
            builder = builder.ry_layer(ry).rz_layer(rz);
        }
        builder.build()
    }
}

/// Gates of a bound single-layer `RY` circuit, for quick state preparation
pub fn ry_product(angles: &[f64]) -> Vec<Gate> {
    angles
        .iter()
        .enumerate()
        .map(|(q, &a)| Gate::Ry(q, a.into()))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entanglement_pairs() {
        assert_eq!(Entanglement::Linear.pairs(3), vec![(0, 1), (1, 2)]);
        assert_eq!(Entanglement::Full.pairs(3), vec![(0, 1), (0, 2), (1, 2)]);
        assert_eq!(
            Entanglement::Circular.pairs(3),
            vec![(0, 1), (1, 2), (2, 0)]
        );
        assert_eq!(Entanglement::Circular.pairs(2), vec![(0, 1)]);
        assert!(Entanglement::Full.pairs(1).is_empty());
    }

    #[test]
    fn test_zz_feature_map_parameters() {
        let fm = ZzFeatureMap::new(3);
        let circuit = fm.build();
        assert_eq!(circuit.num_parameters(), 3);
        assert_eq!(circuit.parameters()[0].name(), "x[0]");
        assert_eq!(circuit.parameters()[2].name(), "x[2]");
        // per rep: 3 H, 3 P, 3 pairs × (CX, P, CX)
        assert_eq!(circuit.gate_count(), 2 * (3 + 3 + 9));
    }

    #[test]
    fn test_zz_inputs_not_shift_compatible() {
        let circuit = ZzFeatureMap::new(2).build();
        let x0 = circuit.parameters()[0].clone();
        assert!(!circuit.is_shift_compatible(&x0));
    }

    #[test]
    fn test_z_feature_map() {
        let circuit = ZFeatureMap::new(2).with_reps(1).build();
        assert_eq!(circuit.num_parameters(), 2);
        assert_eq!(circuit.count_2q(), 0);
    }

    #[test]
    fn test_real_amplitudes_parameters() {
        let ansatz = RealAmplitudes::new(2).with_reps(1);
        let circuit = ansatz.build();
        assert_eq!(circuit.num_parameters(), 4);
        assert_eq!(ansatz.num_parameters(), 4);
        assert_eq!(circuit.count_2q(), 1);
        assert!(circuit
            .parameters()
            .iter()
            .all(|p| circuit.is_shift_compatible(p)));
    }

    #[test]
    fn test_real_amplitudes_default_reps() {
        let circuit = RealAmplitudes::new(3).build();
        assert_eq!(circuit.num_parameters(), 3 * (ANSATZ_REPS + 1));
        assert_eq!(circuit.parameters()[0].name(), "θ[0]");
    }

    #[test]
    fn test_efficient_su2_parameters() {
        let circuit = EfficientSu2::new(2).with_reps(2).build();
        assert_eq!(circuit.num_parameters(), 12);
        assert_eq!(circuit.count_2q(), 2);
    }

    #[test]
    fn test_templates_are_fresh() {
        let a = RealAmplitudes::new(2).build();
        let b = RealAmplitudes::new(2).build();
        assert_ne!(a.parameters()[0], b.parameters()[0]);
    }

    #[test]
    fn test_ry_product() {
        let gates = ry_product(&[0.1, 0.2]);
        assert_eq!(gates.len(), 2);
        assert_eq!(gates[1].qubits(), vec![1]);
    }
}
