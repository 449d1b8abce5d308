//! Two-layer network builder
//!
//! Gantree: L5_Network → TwoLayerQnn
//!
//! Feature map, then ansatz, then observable on one register. Anything not
//! given falls back to `ZzFeatureMap`, `RealAmplitudes`, `Z^{⊗n}` and the
//! exact statevector backend.

use crate::expectation_qnn::{ExpectationConverter, ExpectationQnn};
use crate::gradient::GradientMethod;
use crate::operator::{CompositeOperator, Measurement};
use crate::sampler_qnn::{Interpretation, SamplerQnn};
use qnn_backend::{Backend, StatevectorBackend};
use qnn_core::{Circuit, CircuitTemplate, Observable, QnnResult, RealAmplitudes, ZzFeatureMap};
use std::sync::Arc;

/// Builder for two-layer quantum neural networks
/// Gantree: TwoLayerQnn // 2층 신경망 빌더
#[derive(Clone)]
pub struct TwoLayerQnn {
    num_qubits: usize,
    feature_map: Option<Circuit>,
    ansatz: Option<Circuit>,
    observables: Option<Vec<Observable>>,
    converter: ExpectationConverter,
    backend: Option<Arc<dyn Backend>>,
    gradient_method: GradientMethod,
}

impl TwoLayerQnn {
    /// Start with defaults on `num_qubits`
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            feature_map: None,
            ansatz: None,
            observables: None,
            converter: ExpectationConverter::default(),
            backend: None,
            gradient_method: GradientMethod::default(),
        }
    }

    /// Set the feature circuit
    pub fn with_feature_map(mut self, feature_map: Circuit) -> Self {
        self.feature_map = Some(feature_map);
        self
    }

    /// Set the trainable circuit
    pub fn with_ansatz(mut self, ansatz: Circuit) -> Self {
        self.ansatz = Some(ansatz);
        self
    }

    /// Set a single observable
    pub fn with_observable(mut self, observable: Observable) -> Self {
        self.observables = Some(vec![observable]);
        self
    }

    /// Set several observables (one output each)
    pub fn with_observables(mut self, observables: Vec<Observable>) -> Self {
        self.observables = Some(observables);
        self
    }

    /// Set the expectation converter
    pub fn with_expectation_converter(mut self, converter: ExpectationConverter) -> Self {
        self.converter = converter;
        self
    }

    /// Set the backend
    pub fn with_backend<B: Backend + 'static>(mut self, backend: B) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    /// Set a shared backend
    pub fn with_shared_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the gradient method
    pub fn with_gradient_method(mut self, method: GradientMethod) -> Self {
        self.gradient_method = method;
        self
    }

    /// Number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn parts(&self) -> (Circuit, Circuit, Arc<dyn Backend>) {
        let feature_map = self
            .feature_map
            .clone()
            .unwrap_or_else(|| ZzFeatureMap::new(self.num_qubits).build());
        let ansatz = self
            .ansatz
            .clone()
            .unwrap_or_else(|| RealAmplitudes::new(self.num_qubits).build());
        let backend = self
            .backend
            .clone()
            .unwrap_or_else(|| Arc::new(StatevectorBackend::new(self.num_qubits)));
        (feature_map, ansatz, backend)
    }

    /// Build the expectation-value network
    /// Gantree: build() -> Result<ExpectationQnn> // 신경망 생성
    pub fn build(&self) -> QnnResult<ExpectationQnn> {
        let (feature_map, ansatz, backend) = self.parts();
        let observables = self
            .observables
            .clone()
            .unwrap_or_else(|| vec![Observable::all_z(self.num_qubits)]);

        let operator = CompositeOperator::compose(
            self.num_qubits,
            &feature_map,
            &ansatz,
            Measurement::Observables(observables),
        )?;
        log::debug!("built {}", operator);

        ExpectationQnn::new(operator, backend)?
            .with_converter(self.converter)?
            .with_gradient_method(self.gradient_method)
    }

    /// Build a sampling network on the same circuits
    /// Gantree: build_sampler(interpretation,output_shape) -> Result<SamplerQnn> // 샘플러 생성
    pub fn build_sampler(
        &self,
        interpretation: Option<Interpretation>,
        output_shape: Option<usize>,
    ) -> QnnResult<SamplerQnn> {
        let (feature_map, ansatz, backend) = self.parts();
        let operator =
            CompositeOperator::compose(self.num_qubits, &feature_map, &ansatz, Measurement::Sampling)?;
        log::debug!("built {}", operator);

        SamplerQnn::new(operator, backend, interpretation, output_shape)?
            .with_gradient_method(self.gradient_method)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neural_network::{NeuralNetwork, OutputKind};
    use qnn_backend::SimulatorBackend;
    use qnn_core::prelude::*;

    #[test]
    fn test_defaults() {
        let qnn = TwoLayerQnn::new(2).build().unwrap();

        assert_eq!(qnn.num_inputs(), 2);
        assert_eq!(qnn.num_weights(), 8);
        assert_eq!(qnn.output_shape(), 1);
        assert_eq!(qnn.output_kind(), OutputKind::Expectation);
        assert!(qnn.backend().is_exact());
        assert_eq!(qnn.operator().observables().unwrap()[0], Observable::all_z(2));
    }

    #[test]
    fn test_parameter_counts_follow_circuits() {
        for (n, reps) in [(1, 1), (2, 2), (3, 1)] {
            let fm = ZFeatureMap::new(n).build();
            let ansatz = RealAmplitudes::new(n).with_reps(reps).build();
            let qnn = TwoLayerQnn::new(n)
                .with_feature_map(fm.clone())
                .with_ansatz(ansatz.clone())
                .build()
                .unwrap();
            assert_eq!(qnn.num_inputs(), fm.num_parameters());
            assert_eq!(qnn.num_weights(), ansatz.num_parameters());
        }
    }

    #[test]
    fn test_observable_qubit_mismatch() {
        let err = TwoLayerQnn::new(3)
            .with_observable(Observable::all_z(2))
            .build()
            .unwrap_err();
        assert!(matches!(err, QnnError::QubitCountMismatch { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn test_exact_converter_on_sampler_backend() {
        let err = TwoLayerQnn::new(2)
            .with_backend(SimulatorBackend::new(2))
            .with_expectation_converter(ExpectationConverter::Exact)
            .build()
            .unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_build_sampler() {
        let qnn = TwoLayerQnn::new(2)
            .with_ansatz(RealAmplitudes::new(2).with_reps(1).build())
            .build_sampler(Some(Interpretation::parity()), Some(2))
            .unwrap();
        assert_eq!(qnn.output_shape(), 2);
        assert_eq!(qnn.num_weights(), 4);
        assert_eq!(qnn.output_kind(), OutputKind::Probabilities);
    }

    #[test]
    fn test_invalid_gradient_method() {
        let err = TwoLayerQnn::new(1)
            .with_gradient_method(GradientMethod::FiniteDifference { epsilon: 0.0 })
            .build()
            .unwrap_err();
        assert!(err.is_configuration_error());
    }
}
