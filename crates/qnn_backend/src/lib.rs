//! # QNN Backend
//!
//! Execution backends for quantum neural networks.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qnn_backend // L3: Backend (완료)
//!     BackendTrait // expectation + sample 인터페이스 (완료)
//!     Statevector // 상태 벡터 커널 (완료)
//!     Simulators // 정확/샷 시뮬레이터 (완료)
//!     CountingBackend // 작업 카운터 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qnn_backend::prelude::*;
//! use qnn_core::{CircuitBuilder, Observable};
//!
//! let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).build();
//!
//! // Exact expectation
//! let exact = StatevectorBackend::new(2);
//! let e = exact.expectation(&circuit, &Observable::all_z(2)).unwrap();
//! assert!((e - 1.0).abs() < 1e-12);
//!
//! // Shot-based sampling
//! let sampler = SimulatorBackend::new(2).with_shots(1000).with_seed(42);
//! let result = sampler.sample(&circuit).unwrap();
//! println!("Parity expectation: {:.4}", result.parity_expectation());
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Execution types and backend trait (Gantree: L3_Backend → BackendTrait)
pub mod execution;

/// Statevector kernels (Gantree: L3_Backend → Statevector)
pub mod statevector;

/// Simulator backends (Gantree: L3_Backend → Simulators)
pub mod simulator;

/// Job-counting wrapper (Gantree: L3_Backend → CountingBackend)
pub mod counting;

// ============================================================================
// Re-exports
// ============================================================================

pub use counting::CountingBackend;
pub use execution::{sampled_expectation, Backend, ExecutionMetadata, ExecutionResult};
pub use simulator::{SimulatorBackend, StatevectorBackend};
pub use statevector::Statevector;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qnn_backend::prelude::*;
    //! ```

    pub use crate::counting::CountingBackend;
    pub use crate::execution::{sampled_expectation, Backend, ExecutionMetadata, ExecutionResult};
    pub use crate::simulator::{SimulatorBackend, StatevectorBackend};
    pub use crate::statevector::Statevector;
}

// ============================================================================
// Integration Tests
// ============================================================================
