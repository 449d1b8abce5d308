//! Job-counting backend wrapper
//!
//! Gantree: L3_Backend → CountingBackend
//!
//! Forwards every call to an inner backend and counts the circuits it
//! dispatches. Used to check that invalid requests never reach a device.

use crate::execution::{Backend, ExecutionResult};
use qnn_core::{Circuit, Observable, QnnResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Backend wrapper counting dispatched circuits
/// Gantree: CountingBackend<B> // 작업 카운터
#[derive(Debug)]
pub struct CountingBackend<B> {
    inner: B,
    jobs: Arc<AtomicUsize>,
}

impl<B: Backend> CountingBackend<B> {
    /// Wrap a backend
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            jobs: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Circuits dispatched so far
    pub fn jobs(&self) -> usize {
        self.jobs.load(Ordering::SeqCst)
    }

    /// Shared handle to the counter, readable after the wrapper is moved
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.jobs)
    }

    /// Reset the counter
    pub fn reset(&self) {
        self.jobs.store(0, Ordering::SeqCst);
    }

    /// Inner backend
    pub fn inner(&self) -> &B {
        &self.inner
    }

    fn record(&self, n: usize) {
        self.jobs.fetch_add(n, Ordering::SeqCst);
    }
}

impl<B: Backend> Backend for CountingBackend<B> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn num_qubits(&self) -> usize {
        self.inner.num_qubits()
    }

    fn is_exact(&self) -> bool {
        self.inner.is_exact()
    }

    fn shots(&self) -> Option<u64> {
        self.inner.shots()
    }

    fn expectation(&self, circuit: &Circuit, observable: &Observable) -> QnnResult<f64> {
        self.record(1);
        self.inner.expectation(circuit, observable)
    }

    fn expectation_batch(
        &self,
        circuits: &[Circuit],
        observable: &Observable,
    ) -> QnnResult<Vec<f64>> {
        self.record(circuits.len());
        self.inner.expectation_batch(circuits, observable)
    }

    fn sample(&self, circuit: &Circuit) -> QnnResult<ExecutionResult> {
        self.record(1);
        self.inner.sample(circuit)
    }

    fn sample_batch(&self, circuits: &[Circuit]) -> QnnResult<Vec<ExecutionResult>> {
        self.record(circuits.len());
        self.inner.sample_batch(circuits)
    }

    fn max_shots(&self) -> u64 {
        self.inner.max_shots()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::StatevectorBackend;
    use qnn_core::CircuitBuilder;

    #[test]
    fn test_counts_single_and_batch() {
        let backend = CountingBackend::new(StatevectorBackend::new(2));
        let circuit = CircuitBuilder::new(2).h(0).build();
        let obs = Observable::all_z(2);

        backend.expectation(&circuit, &obs).unwrap();
        backend
            .expectation_batch(&[circuit.clone(), circuit.clone()], &obs)
            .unwrap();
        backend.sample(&circuit).unwrap();
        assert_eq!(backend.jobs(), 4);

        backend.reset();
        assert_eq!(backend.jobs(), 0);
    }

    #[test]
    fn test_counter_survives_boxing() {
        let backend = CountingBackend::new(StatevectorBackend::new(1));
        let counter = backend.counter();
        let boxed: Box<dyn Backend> = Box::new(backend);

        let circuit = CircuitBuilder::new(1).x(0).build();
        boxed.sample(&circuit).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
