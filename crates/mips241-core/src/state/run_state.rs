use crate::{FaultCode, Status};

/// Execution-state machine for host-observable control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to fetch the next instruction.
    #[default]
    Running,
    /// Program returned to the halt address.
    Halted,
    /// Fault is latched; no further progress until the image is reloaded.
    FaultLatched {
        /// Fault that stopped the program.
        cause: FaultCode,
        /// Program counter or data address the fault was raised at.
        addr: u32,
    },
}

impl RunState {
    /// State a machine is left in after a step reported `status`.
    #[must_use]
    pub const fn after(status: Status) -> Self {
        match status {
            Status::Halted { .. } => Self::Halted,
            Status::Fault { cause, addr } => Self::FaultLatched { cause, addr },
            Status::Continuing { .. } | Status::Breakpoint { .. } => Self::Running,
        }
    }

    /// Status a stopped machine keeps reporting, or `None` while running.
    #[must_use]
    pub const fn latched_status(self, pc: u32) -> Option<Status> {
        match self {
            Self::Running => None,
            Self::Halted => Some(Status::Halted { pc }),
            Self::FaultLatched { cause, addr } => Some(Status::Fault { cause, addr }),
        }
    }
}
