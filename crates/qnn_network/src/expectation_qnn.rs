//! Expectation-value network
//!
//! Gantree: L5_Network → ExpectationQnn
//!
//! Output `i` of a sample is `⟨ψ(x, w)| O_i |ψ(x, w)⟩`.

use crate::gradient::{combine_shifted, shifted_points, DerivativeRule, GradientMethod};
use crate::neural_network::{NetworkOutput, NeuralNetwork, OutputKind, WeightGradient};
use crate::operator::CompositeOperator;
use qnn_backend::{sampled_expectation, Backend};
use qnn_core::{Circuit, QnnError, QnnResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How expectation values are obtained from the backend
/// Gantree: ExpectationConverter // 기대값 변환
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExpectationConverter {
    /// Backend's own expectation
    #[default]
    Auto,

    /// Basis-rotated sampling
    Sampling,

    /// Exact expectation; the backend must be exact
    Exact,
}

impl ExpectationConverter {
    /// Parse from a name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(ExpectationConverter::Auto),
            "sampling" | "pauli" => Some(ExpectationConverter::Sampling),
            "exact" | "statevector" => Some(ExpectationConverter::Exact),
            _ => None,
        }
    }
}

impl fmt::Display for ExpectationConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectationConverter::Auto => write!(f, "auto"),
            ExpectationConverter::Sampling => write!(f, "sampling"),
            ExpectationConverter::Exact => write!(f, "exact"),
        }
    }
}

/// Expectation-value quantum neural network
/// Gantree: ExpectationQnn // 기대값 신경망
#[derive(Clone)]
pub struct ExpectationQnn {
    operator: CompositeOperator,
    backend: Arc<dyn Backend>,
    converter: ExpectationConverter,
    gradient_method: GradientMethod,
    rules: Vec<DerivativeRule>,
}

impl ExpectationQnn {
    /// Create on a backend
    /// Gantree: new(operator,backend) -> Result<Self> // 생성자
    pub fn new(operator: CompositeOperator, backend: Arc<dyn Backend>) -> QnnResult<Self> {
        if operator.observables().is_none() {
            return Err(QnnError::InvalidConfig(
                "expectation network needs observables, not sampling".into(),
            ));
        }
        if operator.num_qubits() > backend.num_qubits() {
            return Err(QnnError::QubitCountMismatch {
                component: format!("backend '{}'", backend.name()),
                expected: operator.num_qubits(),
                actual: backend.num_qubits(),
            });
        }

        let gradient_method = GradientMethod::default();
        let rules = gradient_method.rules(&operator);
        Ok(Self {
            operator,
            backend,
            converter: ExpectationConverter::default(),
            gradient_method,
            rules,
        })
    }

    /// Set the expectation converter
    pub fn with_converter(mut self, converter: ExpectationConverter) -> QnnResult<Self> {
        if converter == ExpectationConverter::Exact && !self.backend.is_exact() {
            return Err(QnnError::InvalidConfig(format!(
                "exact expectation requested but backend '{}' samples",
                self.backend.name()
            )));
        }
        self.converter = converter;
        Ok(self)
    }

    /// Set the gradient method
    pub fn with_gradient_method(mut self, method: GradientMethod) -> QnnResult<Self> {
        method.validate()?;
        self.rules = method.rules(&self.operator);
        self.gradient_method = method;
        Ok(self)
    }

    /// Composite operator
    pub fn operator(&self) -> &CompositeOperator {
        &self.operator
    }

    /// Backend
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Expectation converter
    pub fn converter(&self) -> ExpectationConverter {
        self.converter
    }

    /// Gradient method
    pub fn gradient_method(&self) -> GradientMethod {
        self.gradient_method
    }

    /// Per-weight derivative rules
    pub fn derivative_rules(&self) -> &[DerivativeRule] {
        &self.rules
    }

    /// `[circuit][observable]` expectations
    fn expectations(&self, circuits: &[Circuit]) -> QnnResult<Vec<Vec<f64>>> {
        let observables = self.operator.observables().unwrap_or(&[]);
        let mut out = vec![Vec::with_capacity(observables.len()); circuits.len()];

        for observable in observables {
            let values = match self.converter {
                ExpectationConverter::Auto | ExpectationConverter::Exact => {
                    self.backend.expectation_batch(circuits, observable)?
                }
                ExpectationConverter::Sampling => circuits
                    .iter()
                    .map(|c| sampled_expectation(self.backend.as_ref(), c, observable))
                    .collect::<QnnResult<Vec<f64>>>()?,
            };
            if values.len() != circuits.len() {
                return Err(QnnError::BackendError(format!(
                    "{} expectations for {} circuits",
                    values.len(),
                    circuits.len()
                )));
            }
            for (row, v) in out.iter_mut().zip(values) {
                row.push(v);
            }
        }
        Ok(out)
    }
}

impl NeuralNetwork for ExpectationQnn {
    fn num_inputs(&self) -> usize {
        self.operator.num_inputs()
    }

    fn num_weights(&self) -> usize {
        self.operator.num_weights()
    }

    fn output_shape(&self) -> usize {
        self.operator.observables().map_or(0, <[_]>::len)
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Expectation
    }

    fn forward(&self, inputs: &[Vec<f64>], weights: &[f64]) -> QnnResult<NetworkOutput> {
        self.validate_shapes(inputs, weights)?;
        let circuits = inputs
            .iter()
            .map(|x| self.operator.bind(x, weights))
            .collect::<QnnResult<Vec<_>>>()?;

        let rows = self.expectations(&circuits)?;
        log::debug!("forward: {} samples on '{}'", inputs.len(), self.backend.name());
        Ok(NetworkOutput::Dense(rows))
    }

    fn backward(&self, inputs: &[Vec<f64>], weights: &[f64]) -> QnnResult<WeightGradient> {
        self.validate_shapes(inputs, weights)?;
        let points = shifted_points(weights, &self.rules);

        // all samples in one batch
        let mut circuits = Vec::with_capacity(inputs.len() * points.len());
        for x in inputs {
            for w in &points {
                circuits.push(self.operator.bind(x, w)?);
            }
        }
        let values = self.expectations(&circuits)?;

        let per_sample = points.len();
        let output_dim = self.output_shape();
        let grads = (0..inputs.len())
            .map(|s| {
                let outputs = &values[s * per_sample..(s + 1) * per_sample];
                combine_shifted(&self.rules, outputs, output_dim)
            })
            .collect();
        log::debug!(
            "backward: {} samples, {} shifted circuits",
            inputs.len(),
            circuits.len()
        );
        Ok(grads)
    }
}

impl fmt::Debug for ExpectationQnn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpectationQnn")
            .field("operator", &self.operator)
            .field("backend", &self.backend.name())
            .field("converter", &self.converter)
            .field("gradient_method", &self.gradient_method)
            .finish()
    }
}

impl fmt::Display for ExpectationQnn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExpectationQnn(inputs={}, weights={}, outputs={}, backend={}, converter={})",
            self.num_inputs(),
            self.num_weights(),
            self.output_shape(),
            self.backend.name(),
            self.converter
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::Measurement;
    use approx::assert_abs_diff_eq;
    use qnn_backend::{SimulatorBackend, StatevectorBackend};
    use qnn_core::prelude::*;

    /// RY(x) RY(w) on one qubit: <Z> = cos(x + w)
    fn single_qubit(backend: Arc<dyn Backend>) -> ExpectationQnn {
        let x = Parameter::new("x");
        let w = Parameter::new("w");
        let circuit = CircuitBuilder::new(1).ry(0, &x).ry(0, &w).build();
        let op = CompositeOperator::new(
            circuit,
            Measurement::observable(Observable::all_z(1)),
            vec![x],
            vec![w],
        )
        .unwrap();
        ExpectationQnn::new(op, backend).unwrap()
    }

    #[test]
    fn test_forward_cosine() {
        let qnn = single_qubit(Arc::new(StatevectorBackend::new(1)));
        let out = qnn.forward(&[vec![0.3], vec![1.0]], &[0.4]).unwrap().to_dense();

        assert_abs_diff_eq!(out[0][0], 0.7_f64.cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(out[1][0], 1.4_f64.cos(), epsilon = 1e-12);
    }

    #[test]
    fn test_backward_sine() {
        let qnn = single_qubit(Arc::new(StatevectorBackend::new(1)));
        let grad = qnn.backward(&[vec![0.3], vec![1.0]], &[0.4]).unwrap();

        assert_eq!(grad.len(), 2);
        assert_abs_diff_eq!(grad[0][0][0], -(0.7_f64).sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(grad[1][0][0], -(1.4_f64).sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_multiple_observables() {
        let x = Parameter::new("x");
        let w = Parameter::new("w");
        let circuit = CircuitBuilder::new(2).ry(0, &x).ry(1, &w).build();
        let op = CompositeOperator::new(
            circuit,
            Measurement::Observables(vec![
                Observable::single_z(2, 0).unwrap(),
                Observable::single_z(2, 1).unwrap(),
            ]),
            vec![x],
            vec![w],
        )
        .unwrap();
        let qnn = ExpectationQnn::new(op, Arc::new(StatevectorBackend::new(2))).unwrap();

        assert_eq!(qnn.output_shape(), 2);
        let out = qnn.forward(&[vec![0.5]], &[1.2]).unwrap().to_dense();
        assert_abs_diff_eq!(out[0][0], 0.5_f64.cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(out[0][1], 1.2_f64.cos(), epsilon = 1e-12);

        // output 0 does not depend on the weight
        let grad = qnn.backward(&[vec![0.5]], &[1.2]).unwrap();
        assert_abs_diff_eq!(grad[0][0][0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grad[0][1][0], -(1.2_f64).sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_exact_converter_requires_exact_backend() {
        let qnn = single_qubit(Arc::new(SimulatorBackend::new(1)));
        let err = qnn.with_converter(ExpectationConverter::Exact).unwrap_err();
        assert!(matches!(err, QnnError::InvalidConfig(_)));

        let qnn = single_qubit(Arc::new(StatevectorBackend::new(1)));
        assert!(qnn.with_converter(ExpectationConverter::Exact).is_ok());
    }

    #[test]
    fn test_sampling_converter() {
        let backend = Arc::new(SimulatorBackend::new(1).with_shots(20_000).with_seed(3));
        let qnn = single_qubit(backend)
            .with_converter(ExpectationConverter::Sampling)
            .unwrap();
        let out = qnn.forward(&[vec![0.2]], &[0.3]).unwrap().to_dense();
        assert_abs_diff_eq!(out[0][0], 0.5_f64.cos(), epsilon = 0.03);
    }

    #[test]
    fn test_backend_too_small() {
        let fm = ZzFeatureMap::new(2).build();
        let ansatz = RealAmplitudes::new(2).build();
        let op = CompositeOperator::compose(
            2,
            &fm,
            &ansatz,
            Measurement::observable(Observable::all_z(2)),
        )
        .unwrap();
        let err = ExpectationQnn::new(op, Arc::new(StatevectorBackend::new(1))).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_sampling_operator_rejected() {
        let op = CompositeOperator::new(Circuit::new(1), Measurement::Sampling, vec![], vec![])
            .unwrap();
        assert!(ExpectationQnn::new(op, Arc::new(StatevectorBackend::new(1))).is_err());
    }

    #[test]
    fn test_converter_parse() {
        assert_eq!(ExpectationConverter::parse("Exact"), Some(ExpectationConverter::Exact));
        assert_eq!(ExpectationConverter::parse("pauli"), Some(ExpectationConverter::Sampling));
        assert_eq!(ExpectationConverter::parse("fast"), None);
    }
}
