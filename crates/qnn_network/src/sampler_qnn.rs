//! Sampling network with outcome interpretation
//!
//! Gantree: L5_Network → SamplerQnn
//!
//! Basis outcomes of the composite circuit are mapped through an
//! interpretation function into `output_shape` classes. Output is the
//! probability of each class.

use crate::gradient::{combine_shifted, shifted_points, DerivativeRule, GradientMethod};
use crate::neural_network::{NetworkOutput, NeuralNetwork, OutputKind, WeightGradient};
use crate::operator::{CompositeOperator, Measurement};
use qnn_backend::{Backend, ExecutionResult};
use qnn_core::types::parity;
use qnn_core::{QnnError, QnnResult};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Interpretation
// ============================================================================

/// Map from basis outcome (integer) to output class
/// Gantree: Interpretation // 결과 해석 함수
#[derive(Clone)]
pub struct Interpretation {
    f: Arc<dyn Fn(usize) -> usize + Send + Sync>,
}

impl Interpretation {
    /// Wrap a function
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(usize) -> usize + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// Two classes by bit parity
    pub fn parity() -> Self {
        Self::new(parity)
    }

    /// Apply to one outcome
    #[inline]
    pub fn apply(&self, outcome: usize) -> usize {
        (self.f)(outcome)
    }
}

impl fmt::Debug for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interpretation(<fn>)")
    }
}

// ============================================================================
// Sampler QNN
// ============================================================================

/// Probability-output quantum neural network
/// Gantree: SamplerQnn // 샘플링 신경망
#[derive(Clone)]
pub struct SamplerQnn {
    operator: CompositeOperator,
    backend: Arc<dyn Backend>,
    interpretation: Option<Interpretation>,
    output_shape: usize,
    sparse: bool,
    gradient_method: GradientMethod,
    rules: Vec<DerivativeRule>,
}

impl SamplerQnn {
    /// Create on a backend
    /// Gantree: new(operator,backend,interpretation,output_shape) -> Result<Self> // 생성자
    ///
    /// Without an interpretation the outcomes themselves are the classes
    /// and the shape is `2^num_qubits`. A custom interpretation needs an
    /// explicit shape.
    pub fn new(
        operator: CompositeOperator,
        backend: Arc<dyn Backend>,
        interpretation: Option<Interpretation>,
        output_shape: Option<usize>,
    ) -> QnnResult<Self> {
        if *operator.measurement() != Measurement::Sampling {
            return Err(QnnError::InvalidConfig(
                "sampler network needs a sampling operator".into(),
            ));
        }
        if operator.num_qubits() > backend.num_qubits() {
            return Err(QnnError::QubitCountMismatch {
                component: format!("backend '{}'", backend.name()),
                expected: operator.num_qubits(),
                actual: backend.num_qubits(),
            });
        }

        let full = u32::try_from(operator.num_qubits())
            .ok()
            .and_then(|n| 1usize.checked_shl(n))
            .ok_or_else(|| {
                QnnError::InvalidOutputShape(format!(
                    "{} qubits exceed the addressable outcome space",
                    operator.num_qubits()
                ))
            })?;
        let output_shape = match (&interpretation, output_shape) {
            (None, None) => full,
            (None, Some(shape)) if shape == full => full,
            (None, Some(shape)) => {
                return Err(QnnError::InvalidOutputShape(format!(
                    "identity interpretation has shape {}, got {}",
                    full, shape
                )))
            }
            (Some(_), None) => {
                return Err(QnnError::InvalidOutputShape(
                    "a custom interpretation needs an explicit output shape".into(),
                ))
            }
            (Some(_), Some(0)) => {
                return Err(QnnError::InvalidOutputShape(
                    "output shape must be positive".into(),
                ))
            }
            (Some(_), Some(shape)) => shape,
        };

        let gradient_method = GradientMethod::default();
        let rules = gradient_method.rules(&operator);
        Ok(Self {
            operator,
            backend,
            interpretation,
            output_shape,
            sparse: false,
            gradient_method,
            rules,
        })
    }

    /// Return sparse output
    pub fn with_sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
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

    /// Gradient method
    pub fn gradient_method(&self) -> GradientMethod {
        self.gradient_method
    }

    /// Class probabilities of one execution
    fn interpret(&self, result: &ExecutionResult) -> QnnResult<BTreeMap<usize, f64>> {
        let mut probs = BTreeMap::new();
        for (outcome, p) in result.distribution()? {
            let class = match &self.interpretation {
                Some(interp) => interp.apply(outcome),
                None => outcome,
            };
            if class >= self.output_shape {
                return Err(QnnError::InvalidOutputShape(format!(
                    "outcome {} interpreted as class {} but output shape is {}",
                    outcome, class, self.output_shape
                )));
            }
            *probs.entry(class).or_insert(0.0) += p;
        }
        Ok(probs)
    }

    fn dense(&self, probs: &BTreeMap<usize, f64>) -> Vec<f64> {
        let mut row = vec![0.0; self.output_shape];
        for (&class, &p) in probs {
            row[class] = p;
        }
        row
    }

    fn run(&self, inputs: &[Vec<f64>], weight_points: &[Vec<f64>]) -> QnnResult<Vec<BTreeMap<usize, f64>>> {
        let mut circuits = Vec::with_capacity(inputs.len() * weight_points.len());
        for x in inputs {
            for w in weight_points {
                circuits.push(self.operator.bind(x, w)?);
            }
        }
        let results = self.backend.sample_batch(&circuits)?;
        if results.len() != circuits.len() {
            return Err(QnnError::BackendError(format!(
                "{} results for {} circuits",
                results.len(),
                circuits.len()
            )));
        }
        results.iter().map(|r| self.interpret(r)).collect()
    }
}

impl NeuralNetwork for SamplerQnn {
    fn num_inputs(&self) -> usize {
        self.operator.num_inputs()
    }

    fn num_weights(&self) -> usize {
        self.operator.num_weights()
    }

    fn output_shape(&self) -> usize {
        self.output_shape
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Probabilities
    }

    fn is_sparse(&self) -> bool {
        self.sparse
    }

    fn forward(&self, inputs: &[Vec<f64>], weights: &[f64]) -> QnnResult<NetworkOutput> {
        self.validate_shapes(inputs, weights)?;
        let rows = self.run(inputs, &[weights.to_vec()])?;
        log::debug!("sampler forward: {} samples on '{}'", inputs.len(), self.backend.name());

        if self.sparse {
            Ok(NetworkOutput::Sparse {
                shape: self.output_shape,
                rows,
            })
        } else {
            Ok(NetworkOutput::Dense(rows.iter().map(|r| self.dense(r)).collect()))
        }
    }

    fn backward(&self, inputs: &[Vec<f64>], weights: &[f64]) -> QnnResult<WeightGradient> {
        self.validate_shapes(inputs, weights)?;
        let points = shifted_points(weights, &self.rules);
        let rows = self.run(inputs, &points)?;

        let per_sample = points.len();
        let grads = (0..inputs.len())
            .map(|s| {
                let outputs: Vec<Vec<f64>> = rows[s * per_sample..(s + 1) * per_sample]
                    .iter()
                    .map(|r| self.dense(r))
                    .collect();
                combine_shifted(&self.rules, &outputs, self.output_shape)
            })
            .collect();
        Ok(grads)
    }
}

impl fmt::Debug for SamplerQnn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamplerQnn")
            .field("operator", &self.operator)
            .field("backend", &self.backend.name())
            .field("interpretation", &self.interpretation)
            .field("output_shape", &self.output_shape)
            .field("sparse", &self.sparse)
            .finish()
    }
}

impl fmt::Display for SamplerQnn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SamplerQnn(inputs={}, weights={}, output_shape={}, backend={})",
            self.num_inputs(),
            self.num_weights(),
            self.output_shape,
            self.backend.name()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qnn_backend::{SimulatorBackend, StatevectorBackend};
    use qnn_core::prelude::*;

    /// RY(x) on qubit 0, RY(w) on qubit 1
    fn operator() -> CompositeOperator {
        let x = Parameter::new("x");
        let w = Parameter::new("w");
        let circuit = CircuitBuilder::new(2).ry(0, &x).ry(1, &w).build();
        CompositeOperator::new(circuit, Measurement::Sampling, vec![x], vec![w]).unwrap()
    }

    fn exact() -> Arc<dyn Backend> {
        Arc::new(StatevectorBackend::new(2))
    }

    #[test]
    fn test_identity_interpretation() {
        let qnn = SamplerQnn::new(operator(), exact(), None, None).unwrap();
        assert_eq!(qnn.output_shape(), 4);

        let (x, w) = (0.6_f64, 1.1_f64);
        let out = qnn.forward(&[vec![x]], &[w]).unwrap().to_dense();
        let p0 = |t: f64| (t / 2.0).cos().powi(2);
        // index = q1 q0
        assert_abs_diff_eq!(out[0][0], p0(x) * p0(w), epsilon = 1e-12);
        assert_abs_diff_eq!(out[0][1], (1.0 - p0(x)) * p0(w), epsilon = 1e-12);
        assert_abs_diff_eq!(out[0].iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parity_interpretation() {
        let qnn =
            SamplerQnn::new(operator(), exact(), Some(Interpretation::parity()), Some(2)).unwrap();
        let out = qnn.forward(&[vec![0.0]], &[std::f64::consts::PI]).unwrap().to_dense();
        // |10>: odd parity
        assert_abs_diff_eq!(out[0][1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_output_shape_rules() {
        let custom = Some(Interpretation::new(|i| i % 3));
        assert!(matches!(
            SamplerQnn::new(operator(), exact(), custom.clone(), None),
            Err(QnnError::InvalidOutputShape(_))
        ));
        assert!(matches!(
            SamplerQnn::new(operator(), exact(), None, Some(3)),
            Err(QnnError::InvalidOutputShape(_))
        ));

        // class 2 for outcome 2 does not fit a 2-class shape
        let qnn = SamplerQnn::new(operator(), exact(), custom, Some(2)).unwrap();
        let err = qnn.forward(&[vec![0.0]], &[std::f64::consts::PI]).unwrap_err();
        assert!(matches!(err, QnnError::InvalidOutputShape(_)));
    }

    #[test]
    fn test_sparse_output() {
        let qnn = SamplerQnn::new(operator(), exact(), None, None)
            .unwrap()
            .with_sparse(true);
        assert!(qnn.is_sparse());

        let out = qnn.forward(&[vec![0.0]], &[0.0]).unwrap();
        match &out {
            NetworkOutput::Sparse { shape, rows } => {
                assert_eq!(*shape, 4);
                assert_eq!(rows[0].len(), 1);
                assert_abs_diff_eq!(rows[0][&0], 1.0, epsilon = 1e-12);
            }
            NetworkOutput::Dense(_) => panic!("expected sparse output"),
        }
    }

    #[test]
    fn test_backward_probability_gradient() {
        let qnn =
            SamplerQnn::new(operator(), exact(), Some(Interpretation::parity()), Some(2)).unwrap();
        let (x, w) = (0.0_f64, 0.9_f64);
        let grad = qnn.backward(&[vec![x]], &[w]).unwrap();

        // x = 0: P(odd) = sin²(w/2), derivative sin(w)/2
        assert_abs_diff_eq!(grad[0][1][0], w.sin() / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grad[0][0][0] + grad[0][1][0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_shot_backend() {
        let backend = Arc::new(SimulatorBackend::new(2).with_shots(10_000).with_seed(11));
        let qnn = SamplerQnn::new(operator(), backend, None, None).unwrap();
        let out = qnn.forward(&[vec![std::f64::consts::FRAC_PI_2]], &[0.0]).unwrap().to_dense();
        assert_abs_diff_eq!(out[0][0], 0.5, epsilon = 0.03);
        assert_abs_diff_eq!(out[0][1], 0.5, epsilon = 0.03);
    }

    #[test]
    fn test_outcome_space_overflow() {
        let x = Parameter::new("x");
        let w = Parameter::new("w");
        let circuit = CircuitBuilder::new(64).ry(0, &x).ry(1, &w).build();
        let op = CompositeOperator::new(circuit, Measurement::Sampling, vec![x], vec![w]).unwrap();
        let err = SamplerQnn::new(op, Arc::new(StatevectorBackend::new(64)), None, None).unwrap_err();
        assert!(matches!(err, QnnError::InvalidOutputShape(_)));
    }

    #[test]
    fn test_expectation_operator_rejected() {
        let x = Parameter::new("x");
        let circuit = CircuitBuilder::new(1).ry(0, &x).build();
        let op = CompositeOperator::new(
            circuit,
            Measurement::observable(Observable::all_z(1)),
            vec![x],
            vec![],
        )
        .unwrap();
        assert!(SamplerQnn::new(op, Arc::new(StatevectorBackend::new(1)), None, None).is_err());
    }
}
