//! Backend execution types and traits
//!
//! Gantree: L3_Backend → BackendTrait
//!
//! A backend offers two capabilities: evaluate the expectation of an
//! observable on a bound circuit, and sample the circuit's output
//! distribution. Exact backends fill in the full distribution, shot-based
//! backends return counts.

use qnn_core::constants::backend::MAX_SHOTS;
use qnn_core::types::{bitstring_to_index, index_to_bitstring};
use qnn_core::{Circuit, Counts, Gate, Observable, QnnError, QnnResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Execution Result
// ============================================================================

/// Result of sampling a circuit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measurement counts (bitstring -> count)
    pub counts: Counts,

    /// Number of shots executed (0 for exact results)
    pub shots: u64,

    /// Exact probabilities by basis index, when the backend computes them
    pub exact: Option<Vec<f64>>,

    /// Execution metadata
    pub metadata: ExecutionMetadata,
}

/// Execution metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Backend name
    pub backend: String,

    /// Number of measured qubits
    pub num_qubits: usize,

    /// Whether simulation was used
    pub simulated: bool,

    /// Seed used (if any)
    pub seed: Option<u64>,

    /// Additional info
    pub extra: HashMap<String, String>,
}

impl ExecutionResult {
    /// Create a shot-based result
    pub fn new(counts: Counts, shots: u64, num_qubits: usize, backend: &str) -> Self {
        Self {
            counts,
            shots,
            exact: None,
            metadata: ExecutionMetadata {
                backend: backend.to_string(),
                num_qubits,
                simulated: true,
                ..Default::default()
            },
        }
    }

    /// Create an exact result from basis-state probabilities
    pub fn from_probabilities(probabilities: Vec<f64>, num_qubits: usize, backend: &str) -> Self {
        Self {
            counts: Counts::new(),
            shots: 0,
            exact: Some(probabilities),
            metadata: ExecutionMetadata {
                backend: backend.to_string(),
                num_qubits,
                simulated: true,
                ..Default::default()
            },
        }
    }

    /// Check whether the result carries exact probabilities
    pub fn is_exact(&self) -> bool {
        self.exact.is_some()
    }

    /// Get total count (should equal shots)
    pub fn total_counts(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Nonzero `(basis index, probability)` pairs sorted by index
    /// Gantree: distribution(&self) -> Result<Vec<(usize,f64)>> // 확률 분포
    ///
    /// Shot-based results with no counts at all are malformed.
    pub fn distribution(&self) -> QnnResult<Vec<(usize, f64)>> {
        if let Some(probs) = &self.exact {
            return Ok(probs
                .iter()
                .enumerate()
                .filter(|(_, &p)| p > 0.0)
                .map(|(i, &p)| (i, p))
                .collect());
        }

        let total = self.total_counts();
        if total == 0 {
            return Err(QnnError::EmptyCounts);
        }
        let mut dist = self
            .counts
            .iter()
            .filter(|(_, &c)| c > 0)
            .map(|(bs, &c)| Ok((bitstring_to_index(bs)?, c as f64 / total as f64)))
            .collect::<QnnResult<Vec<_>>>()?;
        dist.sort_by_key(|(i, _)| *i);
        Ok(dist)
    }

    /// Get probability of a specific bitstring
    pub fn probability(&self, bitstring: &str) -> f64 {
        if let Some(probs) = &self.exact {
            return bitstring_to_index(bitstring)
                .ok()
                .and_then(|i| probs.get(i).copied())
                .unwrap_or(0.0);
        }
        let total = self.total_counts();
        if total == 0 {
            return 0.0;
        }
        self.counts.get(bitstring).copied().unwrap_or(0) as f64 / total as f64
    }

    /// Get most likely bitstring
    pub fn most_frequent(&self) -> Option<String> {
        self.distribution()
            .ok()?
            .into_iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| index_to_bitstring(i, self.metadata.num_qubits))
    }

    /// Calculate parity expectation value
    /// E = P_even - P_odd = Σ_b (-1)^popcount(b) * P(b)
    pub fn parity_expectation(&self) -> f64 {
        self.distribution()
            .map(|dist| {
                dist.iter()
                    .map(|(i, p)| if i.count_ones() % 2 == 0 { *p } else { -*p })
                    .sum()
            })
            .unwrap_or(0.0)
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExecutionResult(shots={}, exact={}, unique={}, parity={:.4})",
            self.shots,
            self.is_exact(),
            self.counts.len(),
            self.parity_expectation()
        )
    }
}

// ============================================================================
// Backend Trait
// ============================================================================

/// Quantum backend trait
/// Gantree: BackendTrait // 백엔드 인터페이스
pub trait Backend: Send + Sync {
    /// Get backend name
    fn name(&self) -> &str;

    /// Get number of qubits
    fn num_qubits(&self) -> usize;

    /// Whether results are exact (no shot noise)
    fn is_exact(&self) -> bool;

    /// Shots per job for sampling backends
    fn shots(&self) -> Option<u64>;

    /// Expectation of an observable on a bound circuit
    /// Gantree: expectation(circuit, observable) -> Result<f64>
    fn expectation(&self, circuit: &Circuit, observable: &Observable) -> QnnResult<f64>;

    /// Expectations for a batch of circuits
    fn expectation_batch(
        &self,
        circuits: &[Circuit],
        observable: &Observable,
    ) -> QnnResult<Vec<f64>> {
        circuits
            .iter()
            .map(|c| self.expectation(c, observable))
            .collect()
    }

    /// Sample the output distribution of a bound circuit
    /// Gantree: sample(circuit) -> Result<ExecutionResult>
    fn sample(&self, circuit: &Circuit) -> QnnResult<ExecutionResult>;

    /// Sample a batch of circuits
    fn sample_batch(&self, circuits: &[Circuit]) -> QnnResult<Vec<ExecutionResult>> {
        circuits.iter().map(|c| self.sample(c)).collect()
    }

    /// Get maximum shots per execution
    fn max_shots(&self) -> u64 {
        MAX_SHOTS
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn num_qubits(&self) -> usize {
        (**self).num_qubits()
    }

    fn is_exact(&self) -> bool {
        (**self).is_exact()
    }

    fn shots(&self) -> Option<u64> {
        (**self).shots()
    }

    fn expectation(&self, circuit: &Circuit, observable: &Observable) -> QnnResult<f64> {
        (**self).expectation(circuit, observable)
    }

    fn expectation_batch(
        &self,
        circuits: &[Circuit],
        observable: &Observable,
    ) -> QnnResult<Vec<f64>> {
        (**self).expectation_batch(circuits, observable)
    }

    fn sample(&self, circuit: &Circuit) -> QnnResult<ExecutionResult> {
        (**self).sample(circuit)
    }

    fn sample_batch(&self, circuits: &[Circuit]) -> QnnResult<Vec<ExecutionResult>> {
        (**self).sample_batch(circuits)
    }

    fn max_shots(&self) -> u64 {
        (**self).max_shots()
    }
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn num_qubits(&self) -> usize {
        (**self).num_qubits()
    }

    fn is_exact(&self) -> bool {
        (**self).is_exact()
    }

    fn shots(&self) -> Option<u64> {
        (**self).shots()
    }

    fn expectation(&self, circuit: &Circuit, observable: &Observable) -> QnnResult<f64> {
        (**self).expectation(circuit, observable)
    }

    fn expectation_batch(
        &self,
        circuits: &[Circuit],
        observable: &Observable,
    ) -> QnnResult<Vec<f64>> {
        (**self).expectation_batch(circuits, observable)
    }

    fn sample(&self, circuit: &Circuit) -> QnnResult<ExecutionResult> {
        (**self).sample(circuit)
    }

    fn sample_batch(&self, circuits: &[Circuit]) -> QnnResult<Vec<ExecutionResult>> {
        (**self).sample_batch(circuits)
    }

    fn max_shots(&self) -> u64 {
        (**self).max_shots()
    }
}

// ============================================================================
// Validation Helpers
// ============================================================================

/// Check that a circuit fits the backend and is fully bound
pub fn check_circuit<B: Backend + ?Sized>(backend: &B, circuit: &Circuit) -> QnnResult<()> {
    if circuit.num_qubits() > backend.num_qubits() {
        return Err(QnnError::QubitCountMismatch {
            component: format!("circuit on backend '{}'", backend.name()),
            expected: backend.num_qubits(),
            actual: circuit.num_qubits(),
        });
    }
    if let Some(p) = circuit.parameters().first() {
        return Err(QnnError::UnboundParameter(p.name().to_string()));
    }
    Ok(())
}

/// Check that an observable acts on the circuit's register
pub fn check_observable(circuit: &Circuit, observable: &Observable) -> QnnResult<()> {
    if observable.num_qubits() != circuit.num_qubits() {
        return Err(QnnError::QubitCountMismatch {
            component: "observable".into(),
            expected: circuit.num_qubits(),
            actual: observable.num_qubits(),
        });
    }
    Ok(())
}

// ============================================================================
// Sampled Expectation
// ============================================================================

/// Estimate ⟨O⟩ from the backend's sampled distributions
/// Gantree: sampled_expectation(backend,circuit,obs) -> Result<f64> // 샘플링 기대값
///
/// A diagonal observable needs one job. Otherwise every term is rotated
/// into the Z basis and sampled separately; the term's value is the mean
/// parity of the bits it acts on.
pub fn sampled_expectation<B: Backend + ?Sized>(
    backend: &B,
    circuit: &Circuit,
    observable: &Observable,
) -> QnnResult<f64> {
    check_observable(circuit, observable)?;

    if observable.is_diagonal() {
        let dist = backend.sample(circuit)?.distribution()?;
        return Ok(dist
            .iter()
            .map(|(i, p)| p * observable.diagonal_eigenvalue(*i))
            .sum());
    }

    let mut total = 0.0;
    for term in observable.terms() {
        let mut rotated = circuit.clone();
        for (q, pauli) in term.paulis().iter().enumerate() {
            rotated.add_gates(Gate::basis_transform(q, *pauli))?;
        }
        let dist = backend.sample(&rotated)?.distribution()?;
        let value: f64 = dist.iter().map(|(i, p)| p * term.measured_sign(*i)).sum();
        total += term.coeff() * value;
    }
    Ok(total)
}

// ============================================================================
// Tests
// ============================================================================
