//! Public host-facing API for embedding the simulator core.

use crate::memory::Memory;
use crate::state::{Register, RegisterFile, RunState, HALT_ADDRESS};
use crate::{FaultCode, MachineError};

/// Top-level configuration for a machine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineConfig {
    /// Memory capacity in bytes; `0` selects the 16 MiB default.
    pub memory_bytes: u32,
    /// Word offset at which [`crate::boot_program`] loads the image.
    pub load_offset: u32,
}

/// Outcome of one execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Status {
    /// Step succeeded; `pc` is the next instruction to fetch.
    Continuing {
        /// Program counter after the step.
        pc: u32,
    },
    /// Program counter reached the halt address.
    Halted {
        /// The halt address.
        pc: u32,
    },
    /// A completed step left the program counter on a breakpoint.
    Breakpoint {
        /// Breakpoint address.
        pc: u32,
    },
    /// The instruction in progress faulted and was not committed.
    Fault {
        /// Fault taxonomy entry.
        cause: FaultCode,
        /// Faulting program counter or data byte address.
        addr: u32,
    },
}

impl Status {
    /// Program counter or faulting address carried by this status.
    #[must_use]
    pub const fn address(self) -> u32 {
        match self {
            Self::Continuing { pc } | Self::Halted { pc } | Self::Breakpoint { pc } => pc,
            Self::Fault { addr, .. } => addr,
        }
    }

    /// Returns the fault code for a faulting status.
    #[must_use]
    pub const fn fault(self) -> Option<FaultCode> {
        match self {
            Self::Fault { cause, .. } => Some(cause),
            Self::Continuing { .. } | Self::Halted { .. } | Self::Breakpoint { .. } => None,
        }
    }

    /// Returns `true` once no further step can make progress.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Halted { .. } | Self::Fault { .. })
    }

    /// Human-readable status line.
    #[must_use]
    pub fn describe(self) -> String {
        match self {
            Self::Halted { .. } => "Program completed successfully.".to_string(),
            Self::Continuing { .. } | Self::Breakpoint { .. } => {
                "Program execution paused.".to_string()
            }
            Self::Fault { cause, .. } => cause.to_string(),
        }
    }
}

/// Character stream behind the memory-mapped input and output addresses.
pub trait CharIo {
    /// Consumes one character of program input, or `None` when none is available.
    fn read_byte(&mut self) -> Option<u8>;

    /// Emits one character of program output.
    fn write_byte(&mut self, byte: u8);
}

/// Complete simulated machine: registers, memory and run state.
///
/// The machine is exclusively owned by whoever drives it; it has no internal
/// synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Machine {
    /// Register file, program counter and `HI`/`LO`.
    pub arch: RegisterFile,
    /// Flat word memory.
    pub memory: Memory,
    /// Current execution state.
    pub run_state: RunState,
}

impl Machine {
    /// Creates a zeroed machine with `memory_bytes` of memory (`0` = default).
    ///
    /// # Errors
    ///
    /// See [`Memory::with_capacity_bytes`].
    pub fn new(memory_bytes: u32) -> Result<Self, MachineError> {
        Ok(Self {
            arch: RegisterFile::default(),
            memory: Memory::with_capacity_bytes(memory_bytes)?,
            run_state: RunState::Running,
        })
    }

    /// Creates a machine sized by `config`; the load offset is applied by
    /// [`crate::boot_program`].
    ///
    /// # Errors
    ///
    /// See [`Memory::with_capacity_bytes`].
    pub fn with_config(config: &MachineConfig) -> Result<Self, MachineError> {
        Self::new(config.memory_bytes)
    }

    /// Points execution at `entry_pc` with `$31` holding the halt address.
    pub const fn prepare_entry(&mut self, entry_pc: u32) {
        self.arch.set_pc(entry_pc);
        self.arch.set_gpr(Register::RA, HALT_ADDRESS);
        self.run_state = RunState::Running;
    }
}
