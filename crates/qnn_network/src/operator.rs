//! Composite operator: feature circuit + trainable circuit + measurement
//!
//! Gantree: L5_Network → CompositeOperator
//!
//! The operator is built once and never changes. Its input and weight
//! parameter orders are fixed at construction and every later bind is
//! positional against them.

use qnn_core::{Circuit, Observable, Parameter, QnnError, QnnResult};
use std::collections::HashSet;
use std::fmt;

// ============================================================================
// Measurement
// ============================================================================

/// What is read out of the composite circuit
/// Gantree: Measurement // 측정 방식
#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    /// Expectation of each observable (one output per observable)
    Observables(Vec<Observable>),

    /// Computational-basis sampling
    Sampling,
}

impl Measurement {
    /// Single observable
    pub fn observable(observable: Observable) -> Self {
        Measurement::Observables(vec![observable])
    }

    /// Check qubit counts against the register
    fn validate(&self, num_qubits: usize) -> QnnResult<()> {
        if let Measurement::Observables(observables) = self {
            if observables.is_empty() {
                return Err(QnnError::InvalidOutputShape(
                    "at least one observable is required".into(),
                ));
            }
            for (i, obs) in observables.iter().enumerate() {
                if obs.num_qubits() != num_qubits {
                    return Err(QnnError::QubitCountMismatch {
                        component: format!("observable {}", i),
                        expected: num_qubits,
                        actual: obs.num_qubits(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measurement::Observables(obs) if obs.len() == 1 => write!(f, "{}", obs[0]),
            Measurement::Observables(obs) => write!(f, "{} observables", obs.len()),
            Measurement::Sampling => write!(f, "sampling"),
        }
    }
}

// ============================================================================
// Composite Operator
// ============================================================================

/// Immutable pairing of a parametrized circuit with its measurement
/// Gantree: CompositeOperator // 합성 연산자
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeOperator {
    circuit: Circuit,
    measurement: Measurement,
    input_params: Vec<Parameter>,
    weight_params: Vec<Parameter>,
}

impl CompositeOperator {
    /// Create from a circuit and an explicit parameter partition
    /// Gantree: new(circuit,measurement,inputs,weights) -> Result<Self> // 분할 검증
    ///
    /// The inputs and weights must be disjoint and together cover exactly
    /// the circuit's free parameters.
    pub fn new(
        circuit: Circuit,
        measurement: Measurement,
        input_params: Vec<Parameter>,
        weight_params: Vec<Parameter>,
    ) -> QnnResult<Self> {
        measurement.validate(circuit.num_qubits())?;

        let inputs: HashSet<&Parameter> = input_params.iter().collect();
        let weights: HashSet<&Parameter> = weight_params.iter().collect();
        if inputs.len() != input_params.len() || weights.len() != weight_params.len() {
            return Err(QnnError::ParameterPartition(
                "parameter listed twice".into(),
            ));
        }
        if let Some(shared) = input_params.iter().find(|p| weights.contains(p)) {
            return Err(QnnError::ParameterPartition(format!(
                "'{}' is both an input and a weight",
                shared
            )));
        }

        let free: HashSet<&Parameter> = circuit.parameters().iter().collect();
        if let Some(missing) = circuit
            .parameters()
            .iter()
            .find(|p| !inputs.contains(p) && !weights.contains(p))
        {
            return Err(QnnError::ParameterPartition(format!(
                "free parameter '{}' is neither an input nor a weight",
                missing
            )));
        }
        if let Some(extra) = input_params
            .iter()
            .chain(&weight_params)
            .find(|p| !free.contains(p))
        {
            return Err(QnnError::ParameterPartition(format!(
                "'{}' is not a free parameter of the circuit",
                extra
            )));
        }

        Ok(Self {
            circuit,
            measurement,
            input_params,
            weight_params,
        })
    }

    /// Feature circuit followed by trainable circuit on one register
    /// Gantree: compose(n,feature_map,ansatz,measurement) -> Result<Self> // 회로 합성
    ///
    /// Inputs are the feature circuit's parameters and weights the trainable
    /// circuit's, each in declaration order.
    pub fn compose(
        num_qubits: usize,
        feature_map: &Circuit,
        ansatz: &Circuit,
        measurement: Measurement,
    ) -> QnnResult<Self> {
        for (component, circuit) in [("feature map", feature_map), ("ansatz", ansatz)] {
            if circuit.num_qubits() != num_qubits {
                return Err(QnnError::QubitCountMismatch {
                    component: component.into(),
                    expected: num_qubits,
                    actual: circuit.num_qubits(),
                });
            }
        }
        measurement.validate(num_qubits)?;

        let mut circuit = Circuit::with_name(num_qubits, "composite");
        circuit.append(feature_map)?;
        circuit.append(ansatz)?;

        Self::new(
            circuit,
            measurement,
            feature_map.parameters().to_vec(),
            ansatz.parameters().to_vec(),
        )
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Composite circuit (unbound)
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Readout
    pub fn measurement(&self) -> &Measurement {
        &self.measurement
    }

    /// Observables, if this is an expectation operator
    pub fn observables(&self) -> Option<&[Observable]> {
        match &self.measurement {
            Measurement::Observables(obs) => Some(obs),
            Measurement::Sampling => None,
        }
    }

    /// Register size
    pub fn num_qubits(&self) -> usize {
        self.circuit.num_qubits()
    }

    /// Input parameters in binding order
    pub fn input_params(&self) -> &[Parameter] {
        &self.input_params
    }

    /// Weight parameters in binding order
    pub fn weight_params(&self) -> &[Parameter] {
        &self.weight_params
    }

    /// Number of inputs
    pub fn num_inputs(&self) -> usize {
        self.input_params.len()
    }

    /// Number of weights
    pub fn num_weights(&self) -> usize {
        self.weight_params.len()
    }

    // ========================================================================
    // Binding
    // ========================================================================

    /// Check one sample and one weight vector against the partition
    pub fn check_shapes(&self, inputs: &[f64], weights: &[f64]) -> QnnResult<()> {
        if inputs.len() != self.num_inputs() {
            return Err(QnnError::InputShapeMismatch {
                expected: self.num_inputs(),
                actual: inputs.len(),
            });
        }
        if weights.len() != self.num_weights() {
            return Err(QnnError::WeightShapeMismatch {
                expected: self.num_weights(),
                actual: weights.len(),
            });
        }
        Ok(())
    }

    /// Bind inputs and weights positionally
    /// Gantree: bind(inputs,weights) -> Result<Circuit> // 위치 바인딩
    pub fn bind(&self, inputs: &[f64], weights: &[f64]) -> QnnResult<Circuit> {
        self.check_shapes(inputs, weights)?;

        let mut params = Vec::with_capacity(self.num_inputs() + self.num_weights());
        params.extend_from_slice(&self.input_params);
        params.extend_from_slice(&self.weight_params);

        let mut values = Vec::with_capacity(params.len());
        values.extend_from_slice(inputs);
        values.extend_from_slice(weights);

        self.circuit.bind_parameters(&params, &values)
    }
}

impl fmt::Display for CompositeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompositeOperator(qubits={}, inputs={}, weights={}, measurement={})",
            self.num_qubits(),
            self.num_inputs(),
            self.num_weights(),
            self.measurement
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use qnn_core::prelude::*;

    fn small_operator() -> CompositeOperator {
        let fm = ZFeatureMap::new(2).with_reps(1).build();
        let ansatz = RealAmplitudes::new(2).with_reps(1).build();
        CompositeOperator::compose(2, &fm, &ansatz, Measurement::observable(Observable::all_z(2)))
            .unwrap()
    }

    #[test]
    fn test_compose_partition() {
        let op = small_operator();

        assert_eq!(op.num_inputs(), 2);
        assert_eq!(op.num_weights(), 4);
        assert_eq!(op.circuit().num_parameters(), 6);
        assert!(op
            .input_params()
            .iter()
            .all(|p| !op.weight_params().contains(p)));
    }

    #[test]
    fn test_feature_map_gates_come_first() {
        let fm = ZFeatureMap::new(2).with_reps(1).build();
        let ansatz = RealAmplitudes::new(2).with_reps(1).build();
        let op = CompositeOperator::compose(2, &fm, &ansatz, Measurement::Sampling).unwrap();

        let gates = op.circuit().gates();
        assert_eq!(gates.len(), fm.gate_count() + ansatz.gate_count());
        assert_eq!(&gates[..fm.gate_count()], fm.gates());
        assert_eq!(&gates[fm.gate_count()..], ansatz.gates());
        assert_eq!(op.input_params(), fm.parameters());
        assert_eq!(op.weight_params(), ansatz.parameters());
    }

    #[test]
    fn test_qubit_mismatch() {
        let fm = ZzFeatureMap::new(2).build();
        let ansatz = RealAmplitudes::new(3).build();
        let err = CompositeOperator::compose(2, &fm, &ansatz, Measurement::Sampling).unwrap_err();
        assert!(matches!(err, QnnError::QubitCountMismatch { expected: 2, actual: 3, .. }));

        let ansatz = RealAmplitudes::new(3).build();
        let fm = ZzFeatureMap::new(3).build();
        let err = CompositeOperator::compose(
            3,
            &fm,
            &ansatz,
            Measurement::observable(Observable::all_z(2)),
        )
        .unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_partition_rejects_overlap_and_gaps() {
        let x = Parameter::new("x");
        let w = Parameter::new("w");
        let circuit = CircuitBuilder::new(1).ry(0, &x).rz(0, &w).build();

        let overlap = CompositeOperator::new(
            circuit.clone(),
            Measurement::Sampling,
            vec![x.clone()],
            vec![x.clone(), w.clone()],
        );
        assert!(matches!(overlap, Err(QnnError::ParameterPartition(_))));

        let gap = CompositeOperator::new(circuit.clone(), Measurement::Sampling, vec![x.clone()], vec![]);
        assert!(matches!(gap, Err(QnnError::ParameterPartition(_))));

        let foreign = CompositeOperator::new(
            circuit,
            Measurement::Sampling,
            vec![x],
            vec![w, Parameter::new("other")],
        );
        assert!(matches!(foreign, Err(QnnError::ParameterPartition(_))));
    }

    #[test]
    fn test_bind_positional() {
        let op = small_operator();
        let bound = op.bind(&[0.1, 0.2], &[0.3, 0.4, 0.5, 0.6]).unwrap();
        assert!(bound.is_bound());

        let err = op.bind(&[0.1], &[0.0; 4]).unwrap_err();
        assert_eq!(err, QnnError::InputShapeMismatch { expected: 2, actual: 1 });
        let err = op.bind(&[0.1, 0.2], &[0.0; 3]).unwrap_err();
        assert_eq!(err, QnnError::WeightShapeMismatch { expected: 4, actual: 3 });
    }

    #[test]
    fn test_empty_observable_list() {
        let circuit = Circuit::new(1);
        let err = CompositeOperator::new(circuit, Measurement::Observables(vec![]), vec![], vec![])
            .unwrap_err();
        assert!(matches!(err, QnnError::InvalidOutputShape(_)));
    }
}
