//! Core of the mips241 instruction-set simulator.
//!
//! A [`Machine`] holds registers, memory and run state. An [`Engine`] fetches,
//! decodes and executes one instruction per [`Engine::step`], reporting a
//! [`Status`]. Faults are precise: the faulting instruction leaves no trace.

/// Word-addressed memory and access policy.
pub mod memory;
pub use memory::{
    decode_mapped_port, validate_data_access, validate_fetch_alignment, validate_fetch_range,
    MappedPort, Memory, WordIndex, DEFAULT_MEMORY_WORDS, INPUT_ADDRESS, OUTPUT_ADDRESS,
    WORD_BYTES,
};

/// Host-facing machine, configuration and status types.
pub mod api;
pub use api::{CharIo, Machine, MachineConfig, Status};

/// Register file and run state.
pub mod state;
pub use state::{Register, RegisterFile, RunState, GENERAL_REGISTER_COUNT, HALT_ADDRESS};

/// Field layout, operation codes and encoding tables.
pub mod encoding;
pub use encoding::{
    classify_funct, classify_opcode, encode_immediate, encode_register, ImmediateOp, RegisterOp,
    RegisterOperands, IMMEDIATE_ENCODING_TABLE, REGISTER_ENCODING_TABLE,
};

/// Total instruction decoder.
pub mod decoder;
pub use decoder::{decode, Instruction, InstructionKind};

/// Simulation fault taxonomy.
pub mod fault;
pub use fault::FaultCode;

/// Host setup errors.
pub mod error;
pub use error::MachineError;

/// Dispatch and execution.
pub mod execute;
pub use execute::{
    commit_execution, execute_instruction, DispatchTable, Engine, ExecuteFault, ExecuteState,
    Handler,
};

/// Mnemonic rendering of decoded instructions.
pub mod disasm;
pub use disasm::{disassemble_words, render, render_into, DisasmError, DisassemblyRow};

/// Image loading and memory dumps.
pub mod image;
pub use image::{boot_program, decode_be_words, dump_memory, load_program};

/// Character I/O backends.
pub mod io;
pub use io::{BufferedIo, NullIo, StdIo};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
