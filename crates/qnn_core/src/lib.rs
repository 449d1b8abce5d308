//! # QNN Core
//!
//! Parameters, circuits, observables and circuit templates for quantum
//! neural networks.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qnn_core // L0+L1+L2: Foundation + Circuit + Library (완료)
//!     L0_Foundation // 기반 타입/상수/에러 (완료)
//!         CoreTypes // 핵심 타입 (완료)
//!         Constants // 기울기/학습/템플릿 상수 (완료)
//!         Errors // 에러 타입 (완료)
//!     L1_Circuit // 회로 구조 (완료)
//!         Parameter // 파라미터 핸들과 식 (완료)
//!         Gate // 게이트 enum (완료)
//!         Circuit // 회로 구조체 (완료)
//!         CircuitBuilder // 빌더 패턴 (완료)
//!         Observable // 파울리 관측량 (완료)
//!     L2_Library // 회로 템플릿 (완료)
//!         ZzFeatureMap, ZFeatureMap // 특징 맵 (완료)
//!         RealAmplitudes, EfficientSu2 // 안자츠 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qnn_core::prelude::*;
//!
//! let feature_map = ZzFeatureMap::new(2).build();
//! let ansatz = RealAmplitudes::new(2).with_reps(1).build();
//!
//! let mut circuit = feature_map.clone();
//! circuit.append(&ansatz).unwrap();
//!
//! assert_eq!(circuit.num_parameters(), 2 + 4);
//! println!("{}", circuit);
//! ```
//!
//! ## Binding
//!
//! ```rust
//! use qnn_core::prelude::*;
//!
//! let theta = Parameter::vector("θ", 2);
//! let circuit = CircuitBuilder::new(2)
//!     .ry_layer(&theta)
//!     .cx(0, 1)
//!     .build();
//!
//! let bound = circuit.bind_values(&[0.1, 0.2]).unwrap();
//! assert!(bound.is_bound());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Constants (Gantree: L0_Foundation → Constants)
pub mod constants;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Parameters and expressions (Gantree: L1_Circuit → Parameter)
pub mod parameter;

/// Quantum gates (Gantree: L1_Circuit → Gate)
pub mod gate;

/// Circuit structure (Gantree: L1_Circuit → Circuit)
pub mod circuit;

/// Circuit builder (Gantree: L1_Circuit → CircuitBuilder)
pub mod builder;

/// Pauli observables (Gantree: L1_Circuit → Observable)
pub mod observable;

/// Circuit templates (Gantree: L2_Library → Templates)
pub mod library;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::CircuitBuilder;
pub use circuit::Circuit;
pub use constants::{backend, gradient, training};
pub use error::{QnnError, QnnResult};
pub use gate::{EntanglerType, Gate};
pub use library::{
    CircuitTemplate, EfficientSu2, Entanglement, RealAmplitudes, ZFeatureMap, ZzFeatureMap,
};
pub use observable::{Observable, Pauli, PauliString};
pub use parameter::{Binding, ParamExpr, Parameter};
pub use types::{Angle, Counts, ParamVec, QubitId};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qnn_core::prelude::*;
    //! ```

    pub use crate::builder::CircuitBuilder;
    pub use crate::circuit::Circuit;
    pub use crate::constants::{backend, gradient, training};
    pub use crate::error::{QnnError, QnnResult};
    pub use crate::gate::{EntanglerType, Gate};
    pub use crate::library::{
        CircuitTemplate, EfficientSu2, Entanglement, RealAmplitudes, ZFeatureMap, ZzFeatureMap,
    };
    pub use crate::observable::{Observable, Pauli, PauliString};
    pub use crate::parameter::{Binding, ParamExpr, Parameter};
    pub use crate::types::{Angle, Counts, ParamVec, QubitId};
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================
