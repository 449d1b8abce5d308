//! Circuit parameters and parameter expressions
//!
//! Gantree: L1_Circuit → Parameter
//!
//! A [`Parameter`] is an opaque handle for one free scalar of a circuit.
//! Identity is the handle id, not the name: two parameters created with
//! the same name are still different degrees of freedom.
//! [`ParamExpr`] is the symbolic angle carried by rotation gates.

use crate::error::{QnnError, QnnResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PARAMETER_ID: AtomicU64 = AtomicU64::new(0);

/// Values bound to parameters
pub type Binding = HashMap<Parameter, f64>;

// ============================================================================
// Parameter
// ============================================================================

/// Free circuit parameter
/// Gantree: Parameter // 파라미터 핸들
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    id: u64,
    name: String,
}

impl Parameter {
    /// Create a new, unique parameter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NEXT_PARAMETER_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
        }
    }

    /// Create `n` parameters named `prefix[0]` .. `prefix[n-1]`
    /// Gantree: vector(prefix,n) -> Vec<Parameter> // 파라미터 벡터
    pub fn vector(prefix: &str, n: usize) -> Vec<Parameter> {
        (0..n)
            .map(|i| Parameter::new(format!("{}[{}]", prefix, i)))
            .collect()
    }

    /// Get the parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the unique handle id
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Parameter {}

impl Hash for Parameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ============================================================================
// Parameter Expression
// ============================================================================

/// Symbolic or concrete gate angle
/// Gantree: ParamExpr // 파라미터 식
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamExpr {
    /// A constant numeric value
    Constant(f64),
    /// A free parameter
    Symbol(Parameter),
    /// The constant π
    Pi,
    /// Negation
    Neg(Box<ParamExpr>),
    /// Addition
    Add(Box<ParamExpr>, Box<ParamExpr>),
    /// Subtraction
    Sub(Box<ParamExpr>, Box<ParamExpr>),
    /// Multiplication
    Mul(Box<ParamExpr>, Box<ParamExpr>),
    /// Division
    Div(Box<ParamExpr>, Box<ParamExpr>),
}

impl ParamExpr {
    /// Create a constant expression
    pub fn constant(value: f64) -> Self {
        ParamExpr::Constant(value)
    }

    /// Create a symbolic expression for a parameter
    pub fn symbol(parameter: &Parameter) -> Self {
        ParamExpr::Symbol(parameter.clone())
    }

    /// Create the π constant
    pub fn pi() -> Self {
        ParamExpr::Pi
    }

    /// Check if the expression contains any free parameter
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParamExpr::Symbol(_) => true,
            ParamExpr::Constant(_) | ParamExpr::Pi => false,
            ParamExpr::Neg(e) => e.is_symbolic(),
            ParamExpr::Add(a, b)
            | ParamExpr::Sub(a, b)
            | ParamExpr::Mul(a, b)
            | ParamExpr::Div(a, b) => a.is_symbolic() || b.is_symbolic(),
        }
    }

    /// Return the parameter if the expression is exactly one bare symbol
    pub fn as_symbol(&self) -> Option<&Parameter> {
        match self {
            ParamExpr::Symbol(p) => Some(p),
            _ => None,
        }
    }

    /// Try to evaluate as a concrete value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamExpr::Constant(v) => Some(*v),
            ParamExpr::Symbol(_) => None,
            ParamExpr::Pi => Some(PI),
            ParamExpr::Neg(e) => e.as_f64().map(|v| -v),
            ParamExpr::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            ParamExpr::Sub(a, b) => Some(a.as_f64()? - b.as_f64()?),
            ParamExpr::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
            ParamExpr::Div(a, b) => {
                let divisor = b.as_f64()?;
                if divisor == 0.0 {
                    return None;
                }
                Some(a.as_f64()? / divisor)
            }
        }
    }

    /// Free parameters in first-appearance order, without duplicates
    pub fn parameters(&self) -> Vec<Parameter> {
        let mut out = Vec::new();
        self.collect_parameters(&mut out);
        out
    }

    fn collect_parameters(&self, out: &mut Vec<Parameter>) {
        match self {
            ParamExpr::Constant(_) | ParamExpr::Pi => {}
            ParamExpr::Symbol(p) => {
                if !out.contains(p) {
                    out.push(p.clone());
                }
            }
            ParamExpr::Neg(e) => e.collect_parameters(out),
            ParamExpr::Add(a, b)
            | ParamExpr::Sub(a, b)
            | ParamExpr::Mul(a, b)
            | ParamExpr::Div(a, b) => {
                a.collect_parameters(out);
                b.collect_parameters(out);
            }
        }
    }

    /// Substitute bound values, leaving unbound parameters symbolic
    /// Gantree: bind(&self,binding) -> ParamExpr // 값 대입
    pub fn bind(&self, binding: &Binding) -> Self {
        match self {
            ParamExpr::Symbol(p) => match binding.get(p) {
                Some(&v) => ParamExpr::Constant(v),
                None => self.clone(),
            },
            ParamExpr::Constant(_) | ParamExpr::Pi => self.clone(),
            ParamExpr::Neg(e) => ParamExpr::Neg(Box::new(e.bind(binding))),
            ParamExpr::Add(a, b) => {
                ParamExpr::Add(Box::new(a.bind(binding)), Box::new(b.bind(binding)))
            }
            ParamExpr::Sub(a, b) => {
                ParamExpr::Sub(Box::new(a.bind(binding)), Box::new(b.bind(binding)))
            }
            ParamExpr::Mul(a, b) => {
                ParamExpr::Mul(Box::new(a.bind(binding)), Box::new(b.bind(binding)))
            }
            ParamExpr::Div(a, b) => {
                ParamExpr::Div(Box::new(a.bind(binding)), Box::new(b.bind(binding)))
            }
        }
    }

    /// Evaluate to a number; every parameter must be bound
    pub fn evaluate(&self, binding: &Binding) -> QnnResult<f64> {
        let bound = self.bind(binding);
        if let Some(p) = bound.parameters().first() {
            return Err(QnnError::UnboundParameter(p.name().to_string()));
        }
        bound
            .as_f64()
            .ok_or_else(|| QnnError::InvalidGateParameter(format!("cannot evaluate {}", self)))
    }

    /// Fold constant subexpressions
    pub fn simplify(&self) -> Self {
        if let Some(v) = self.as_f64() {
            return ParamExpr::Constant(v);
        }
        match self {
            ParamExpr::Neg(e) => ParamExpr::Neg(Box::new(e.simplify())),
            ParamExpr::Add(a, b) => ParamExpr::Add(Box::new(a.simplify()), Box::new(b.simplify())),
            ParamExpr::Sub(a, b) => ParamExpr::Sub(Box::new(a.simplify()), Box::new(b.simplify())),
            ParamExpr::Mul(a, b) => ParamExpr::Mul(Box::new(a.simplify()), Box::new(b.simplify())),
            ParamExpr::Div(a, b) => ParamExpr::Div(Box::new(a.simplify()), Box::new(b.simplify())),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for ParamExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamExpr::Constant(v) => write!(f, "{}", v),
            ParamExpr::Symbol(p) => write!(f, "{}", p),
            ParamExpr::Pi => write!(f, "pi"),
            ParamExpr::Neg(e) => write!(f, "-({})", e),
            ParamExpr::Add(a, b) => write!(f, "({} + {})", a, b),
            ParamExpr::Sub(a, b) => write!(f, "({} - {})", a, b),
            ParamExpr::Mul(a, b) => write!(f, "({} * {})", a, b),
            ParamExpr::Div(a, b) => write!(f, "({} / {})", a, b),
        }
    }
}

impl From<f64> for ParamExpr {
    fn from(value: f64) -> Self {
        ParamExpr::Constant(value)
    }
}

impl From<&f64> for ParamExpr {
    fn from(value: &f64) -> Self {
        ParamExpr::Constant(*value)
    }
}

impl From<&Parameter> for ParamExpr {
    fn from(parameter: &Parameter) -> Self {
        ParamExpr::symbol(parameter)
    }
}

impl From<Parameter> for ParamExpr {
    fn from(parameter: Parameter) -> Self {
        ParamExpr::Symbol(parameter)
    }
}

impl std::ops::Add for ParamExpr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ParamExpr::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Sub for ParamExpr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        ParamExpr::Sub(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for ParamExpr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        ParamExpr::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Div for ParamExpr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        ParamExpr::Div(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Neg for ParamExpr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParamExpr::Neg(Box::new(self))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_identity() {
        let a = Parameter::new("theta");
        let b = Parameter::new("theta");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_vector_names() {
        let xs = Parameter::vector("x", 3);
        assert_eq!(xs.len(), 3);
        assert_eq!(xs[2].name(), "x[2]");
    }

    #[test]
    fn test_parameters_order_and_dedup() {
        let x = Parameter::vector("x", 2);
        let expr = ParamExpr::from(&x[1]) * (ParamExpr::from(&x[0]) + ParamExpr::from(&x[1]));
        assert_eq!(expr.parameters(), vec![x[1].clone(), x[0].clone()]);
    }

    #[test]
    fn test_partial_bind() {
        let x = Parameter::vector("x", 2);
        let expr = ParamExpr::from(&x[0]) * ParamExpr::from(&x[1]);

        let mut binding = Binding::new();
        binding.insert(x[0].clone(), 2.0);
        let partial = expr.bind(&binding);
        assert!(partial.is_symbolic());
        assert_eq!(partial.parameters(), vec![x[1].clone()]);

        binding.insert(x[1].clone(), 3.0);
        assert_eq!(expr.evaluate(&binding).unwrap(), 6.0);
    }

    #[test]
    fn test_evaluate_unbound() {
        let theta = Parameter::new("theta");
        let expr = ParamExpr::from(2.0) * ParamExpr::from(&theta);
        let err = expr.evaluate(&Binding::new()).unwrap_err();
        assert_eq!(err, QnnError::UnboundParameter("theta".into()));
    }

    #[test]
    fn test_feature_map_product_term() {
        // 2 (π - x0)(π - x1)
        let x = Parameter::vector("x", 2);
        let expr = ParamExpr::from(2.0)
            * (ParamExpr::pi() - ParamExpr::from(&x[0]))
            * (ParamExpr::pi() - ParamExpr::from(&x[1]));

        let mut binding = Binding::new();
        binding.insert(x[0].clone(), PI);
        binding.insert(x[1].clone(), 0.5);
        assert!(expr.evaluate(&binding).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_simplify_constants() {
        let expr = ParamExpr::from(2.0) * ParamExpr::pi();
        assert!(matches!(expr.simplify(), ParamExpr::Constant(v) if (v - 2.0 * PI).abs() < 1e-12));
        assert_eq!((ParamExpr::from(1.0) / ParamExpr::from(0.0)).as_f64(), None);
    }
}
