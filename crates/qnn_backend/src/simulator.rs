//! Simulator backends
//!
//! Gantree: L3_Backend → Simulators
//!
//! [`StatevectorBackend`] returns exact expectations and distributions.
//! [`SimulatorBackend`] samples a finite number of shots with optional
//! readout error; with a seed, every call restarts the same random stream,
//! so identical requests give identical counts.

use crate::execution::{
    check_circuit, check_observable, sampled_expectation, Backend, ExecutionResult,
};
use crate::statevector::Statevector;
use qnn_core::constants::backend::{DEFAULT_SHOTS, MAX_SHOTS};
use qnn_core::types::index_to_bitstring;
use qnn_core::{Circuit, Counts, Observable, QnnError, QnnResult};
use rand::prelude::*;
use rand::rngs::StdRng;

// ============================================================================
// Exact Statevector Backend
// ============================================================================

/// Exact (noiseless, shot-free) backend
/// Gantree: StatevectorBackend // 정확 시뮬레이터
#[derive(Debug, Clone)]
pub struct StatevectorBackend {
    name: String,
    num_qubits: usize,
}

impl StatevectorBackend {
    /// Create for a register of `num_qubits`
    pub fn new(num_qubits: usize) -> Self {
        Self {
            name: "statevector_simulator".to_string(),
            num_qubits,
        }
    }

    /// Set backend name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Simulate a bound circuit
    pub fn statevector(&self, circuit: &Circuit) -> QnnResult<Statevector> {
        check_circuit(self, circuit)?;
        Statevector::from_circuit(circuit)
    }
}

impl Backend for StatevectorBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn is_exact(&self) -> bool {
        true
    }

    fn shots(&self) -> Option<u64> {
        None
    }

    fn expectation(&self, circuit: &Circuit, observable: &Observable) -> QnnResult<f64> {
        check_observable(circuit, observable)?;
        self.statevector(circuit)?.expectation(observable)
    }

    fn sample(&self, circuit: &Circuit) -> QnnResult<ExecutionResult> {
        let state = self.statevector(circuit)?;
        Ok(ExecutionResult::from_probabilities(
            state.probabilities(),
            circuit.num_qubits(),
            &self.name,
        ))
    }
}

// ============================================================================
// Shot-Based Simulator Backend
// ============================================================================

/// Shot-based simulator with readout noise
/// Gantree: SimulatorBackend // 샷 시뮬레이터
#[derive(Debug, Clone)]
pub struct SimulatorBackend {
    /// Backend name
    name: String,

    /// Number of qubits
    num_qubits: usize,

    /// Shots per job
    shots: u64,

    /// Probability of flipping each measured bit
    readout_error: f64,

    /// Random seed
    seed: Option<u64>,
}

impl SimulatorBackend {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a noiseless simulator with default shots
    pub fn new(num_qubits: usize) -> Self {
        Self {
            name: "qasm_simulator".to_string(),
            num_qubits,
            shots: DEFAULT_SHOTS,
            readout_error: 0.0,
            seed: None,
        }
    }

    /// Set shots per job (clamped to `1..=MAX_SHOTS`)
    pub fn with_shots(mut self, shots: u64) -> Self {
        self.shots = shots.clamp(1, MAX_SHOTS);
        self
    }

    /// Set seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set readout error probability
    pub fn with_readout_error(mut self, p: f64) -> QnnResult<Self> {
        if !(0.0..=1.0).contains(&p) {
            return Err(QnnError::InvalidConfig(format!(
                "readout error {} outside [0, 1]",
                p
            )));
        }
        self.readout_error = p;
        Ok(self)
    }

    /// Set backend name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Seed in use, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Draw counts from the exact distribution
    fn simulate(&self, probs: &[f64], n: usize, rng: &mut StdRng) -> Counts {
        let mut counts = Counts::new();

        for _ in 0..self.shots {
            let r: f64 = rng.gen();
            let mut cumsum = 0.0;
            let mut outcome = probs.len() - 1;
            for (i, &p) in probs.iter().enumerate() {
                cumsum += p;
                if r < cumsum {
                    outcome = i;
                    break;
                }
            }

            if self.readout_error > 0.0 {
                for bit in 0..n {
                    if rng.gen::<f64>() < self.readout_error {
                        outcome ^= 1 << bit;
                    }
                }
            }

            *counts.entry(index_to_bitstring(outcome, n)).or_insert(0) += 1;
        }

        counts
    }
}

impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn is_exact(&self) -> bool {
        false
    }

    fn shots(&self) -> Option<u64> {
        Some(self.shots)
    }

    fn expectation(&self, circuit: &Circuit, observable: &Observable) -> QnnResult<f64> {
        sampled_expectation(self, circuit, observable)
    }

    fn sample(&self, circuit: &Circuit) -> QnnResult<ExecutionResult> {
        check_circuit(self, circuit)?;
        let state = Statevector::from_circuit(circuit)?;
        let mut rng = self.rng();
        let counts = self.simulate(&state.probabilities(), circuit.num_qubits(), &mut rng);

        let mut result = ExecutionResult::new(counts, self.shots, circuit.num_qubits(), &self.name);
        result.metadata.seed = self.seed;
        Ok(result)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qnn_core::{CircuitBuilder, Parameter};
    use std::f64::consts::PI;

    #[test]
    fn test_statevector_backend_exact() {
        let backend = StatevectorBackend::new(2);
        let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).build();

        let result = backend.sample(&circuit).unwrap();
        assert!(result.is_exact());
        assert_abs_diff_eq!(result.probability("00"), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(result.probability("11"), 0.5, epsilon = 1e-12);

        let e = backend.expectation(&circuit, &Observable::all_z(2)).unwrap();
        assert_abs_diff_eq!(e, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_simulator_bell_state() {
        let backend = SimulatorBackend::new(2).with_shots(1000).with_seed(42);
        let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).build();

        let result = backend.sample(&circuit).unwrap();
        let p00 = result.probability("00");
        let p11 = result.probability("11");

        assert!(p00 > 0.4 && p00 < 0.6, "P(00) = {}", p00);
        assert!(p11 > 0.4 && p11 < 0.6, "P(11) = {}", p11);
        assert_eq!(result.total_counts(), 1000);
    }

    #[test]
    fn test_ghz_parity() {
        let backend = SimulatorBackend::new(4).with_shots(1000).with_seed(42);
        let circuit = CircuitBuilder::new(4).h(0).cx_chain().build();

        let result = backend.sample(&circuit).unwrap();
        assert!(result.parity_expectation() > 0.99);
    }

    #[test]
    fn test_readout_error_spreads_counts() {
        let backend = SimulatorBackend::new(2)
            .with_shots(2000)
            .with_seed(7)
            .with_readout_error(0.1)
            .unwrap();
        let circuit = CircuitBuilder::new(2).build();

        let result = backend.sample(&circuit).unwrap();
        let p00 = result.probability("00");
        assert!(p00 > 0.7 && p00 < 0.9, "P(00) = {}", p00);
        assert!(SimulatorBackend::new(2).with_readout_error(1.5).is_err());
    }

    #[test]
    fn test_sampled_expectation_close_to_exact() {
        let circuit = CircuitBuilder::new(2).ry(0, 0.8).ry(1, -0.4).cx(0, 1).build();
        let obs = Observable::from_list(&[("ZZ", 1.0), ("XI", 0.5)]).unwrap();

        let exact = StatevectorBackend::new(2).expectation(&circuit, &obs).unwrap();
        let sampled = SimulatorBackend::new(2)
            .with_shots(20_000)
            .with_seed(3)
            .expectation(&circuit, &obs)
            .unwrap();
        assert!((exact - sampled).abs() < 0.05, "{} vs {}", exact, sampled);
    }

    #[test]
    fn test_h_rz_h_flips() {
        let backend = SimulatorBackend::new(1).with_shots(500).with_seed(42);
        let circuit = CircuitBuilder::new(1).h(0).rz(0, PI).h(0).build();

        let result = backend.sample(&circuit).unwrap();
        assert_eq!(result.probability("1"), 1.0);
    }

    #[test]
    fn test_qubit_limit() {
        let backend = SimulatorBackend::new(3);
        let circuit = CircuitBuilder::new(5).build();
        assert!(matches!(
            backend.sample(&circuit),
            Err(QnnError::QubitCountMismatch { .. })
        ));
    }

    #[test]
    fn test_unbound_rejected() {
        let circuit = CircuitBuilder::new(1).rx(0, &Parameter::new("a")).build();
        assert!(matches!(
            StatevectorBackend::new(1).sample(&circuit),
            Err(QnnError::UnboundParameter(_))
        ));
    }

    #[test]
    fn test_seed_reproducibility() {
        let backend = SimulatorBackend::new(3).with_shots(100).with_seed(42);
        let circuit = CircuitBuilder::new(3).h_layer().cx_chain().build();

        let first = backend.sample(&circuit).unwrap();
        let second = backend.sample(&circuit).unwrap();
        assert_eq!(first.counts, second.counts);
    }

    #[test]
    fn test_observable_width_checked() {
        let circuit = CircuitBuilder::new(2).h(0).build();
        let obs = Observable::all_z(3);
        assert!(StatevectorBackend::new(3).expectation(&circuit, &obs).is_err());
        assert!(SimulatorBackend::new(3).expectation(&circuit, &obs).is_err());
    }
}
