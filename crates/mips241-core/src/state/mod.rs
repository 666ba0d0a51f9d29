//! Architectural CPU state model primitives.

/// Register file types and storage model.
pub mod registers;
/// Host-observable run state of a machine.
pub mod run_state;

pub use registers::{Register, RegisterFile, GENERAL_REGISTER_COUNT, HALT_ADDRESS};
pub use run_state::RunState;
