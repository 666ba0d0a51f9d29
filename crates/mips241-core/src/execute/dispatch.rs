//! Fixed 64-slot dispatch tables keyed by function code and opcode.

use crate::decoder::{Instruction, InstructionKind};
use crate::encoding::{
    ImmediateOp, RegisterOp, CODE_SPACE, IMMEDIATE_ENCODING_TABLE, REGISTER_ENCODING_TABLE,
};

/// Number of register-form operations wired into the table.
pub const REGISTER_HANDLER_COUNT: usize = 13;
/// Number of immediate-form operations wired into the table.
pub const IMMEDIATE_HANDLER_COUNT: usize = 4;

/// Tagged handler identifier stored in a dispatch slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    /// Register-form semantic handler.
    Register(RegisterOp),
    /// Immediate-form semantic handler.
    Immediate(ImmediateOp),
    /// Unoccupied slot; always reports an invalid instruction.
    Invalid,
}

impl Handler {
    /// Returns `true` for occupied slots.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

/// Register-form and immediate-form handler tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTable {
    register: [Handler; CODE_SPACE],
    immediate: [Handler; CODE_SPACE],
}

impl DispatchTable {
    /// Table wiring every operation in the encoding tables.
    pub const STANDARD: Self = Self::build();

    /// Builds the table from [`REGISTER_ENCODING_TABLE`] and
    /// [`IMMEDIATE_ENCODING_TABLE`]; unlisted slots stay [`Handler::Invalid`].
    #[must_use]
    pub const fn build() -> Self {
        let mut register = [Handler::Invalid; CODE_SPACE];
        let mut immediate = [Handler::Invalid; CODE_SPACE];

        let mut i = 0;
        while i < REGISTER_ENCODING_TABLE.len() {
            let (funct, op) = REGISTER_ENCODING_TABLE[i];
            register[funct as usize] = Handler::Register(op);
            i += 1;
        }

        let mut i = 0;
        while i < IMMEDIATE_ENCODING_TABLE.len() {
            let (opcode, op) = IMMEDIATE_ENCODING_TABLE[i];
            immediate[opcode as usize] = Handler::Immediate(op);
            i += 1;
        }

        Self {
            register,
            immediate,
        }
    }

    /// Returns the handler for a decoded instruction.
    #[must_use]
    pub const fn lookup(&self, instruction: &Instruction) -> Handler {
        self.handler(instruction.kind(), instruction.code())
    }

    /// Returns the handler stored for `code` in the table for `kind`.
    #[must_use]
    pub const fn handler(&self, kind: InstructionKind, code: u8) -> Handler {
        let slot = (code & 0x3F) as usize;
        match kind {
            InstructionKind::RegisterForm => self.register[slot],
            InstructionKind::ImmediateForm => self.immediate[slot],
        }
    }

    /// Counts occupied slots in the table for `kind`.
    #[must_use]
    pub const fn registered_count(&self, kind: InstructionKind) -> usize {
        let slots = match kind {
            InstructionKind::RegisterForm => &self.register,
            InstructionKind::ImmediateForm => &self.immediate,
        };
        let mut count = 0;
        let mut i = 0;
        while i < CODE_SPACE {
            if slots[i].is_valid() {
                count += 1;
            }
            i += 1;
        }
        count
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

const _: () = assert_handler_counts();

const fn assert_handler_counts() {
    assert!(
        DispatchTable::STANDARD.registered_count(InstructionKind::RegisterForm)
            == REGISTER_HANDLER_COUNT,
        "register-form handler count mismatch"
    );
    assert!(
        DispatchTable::STANDARD.registered_count(InstructionKind::ImmediateForm)
            == IMMEDIATE_HANDLER_COUNT,
        "immediate-form handler count mismatch"
    );
}
