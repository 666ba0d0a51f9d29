//! Instruction field layout, function/opcode values and encoding tables.
//!
//! Layout, most significant bit first:
//! `opcode[6] s[5] t[5] d[5] shamt[5] funct[6]`.

use crate::state::Register;

/// `add $d, $s, $t`
pub const FUNC_ADD: u8 = 0x20;
/// `sub $d, $s, $t`
pub const FUNC_SUB: u8 = 0x22;
/// `mult $s, $t`
pub const FUNC_MULT: u8 = 0x18;
/// `multu $s, $t`
pub const FUNC_MULTU: u8 = 0x19;
/// `div $s, $t`
pub const FUNC_DIV: u8 = 0x1A;
/// `divu $s, $t`
pub const FUNC_DIVU: u8 = 0x1B;
/// `mfhi $d`
pub const FUNC_MFHI: u8 = 0x10;
/// `mflo $d`
pub const FUNC_MFLO: u8 = 0x12;
/// `lis $d`
pub const FUNC_LIS: u8 = 0x14;
/// `slt $d, $s, $t`
pub const FUNC_SLT: u8 = 0x2A;
/// `sltu $d, $s, $t`
pub const FUNC_SLTU: u8 = 0x2B;
/// `jr $s`
pub const FUNC_JR: u8 = 0x08;
/// `jalr $s`
pub const FUNC_JALR: u8 = 0x09;

/// `lw $t, imm($s)`
pub const OP_LW: u8 = 0x23;
/// `sw $t, imm($s)`
pub const OP_SW: u8 = 0x2B;
/// `beq $s, $t, imm`
pub const OP_BEQ: u8 = 0x04;
/// `bne $s, $t, imm`
pub const OP_BNE: u8 = 0x05;

/// Number of slots addressable by a 6-bit function code or opcode.
pub const CODE_SPACE: usize = 64;

/// Register-form operations, selected by function code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum RegisterOp {
    Add,
    Sub,
    Mult,
    Multu,
    Div,
    Divu,
    Mfhi,
    Mflo,
    Lis,
    Slt,
    Sltu,
    Jr,
    Jalr,
}

/// Operand shape of a register-form operation, used for disassembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterOperands {
    /// `$d, $s, $t`
    DestSourceTarget,
    /// `$s, $t`
    SourceTarget,
    /// `$d`
    Dest,
    /// `$s`
    Source,
}

impl RegisterOp {
    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mult => "mult",
            Self::Multu => "multu",
            Self::Div => "div",
            Self::Divu => "divu",
            Self::Mfhi => "mfhi",
            Self::Mflo => "mflo",
            Self::Lis => "lis",
            Self::Slt => "slt",
            Self::Sltu => "sltu",
            Self::Jr => "jr",
            Self::Jalr => "jalr",
        }
    }

    /// Which register fields the operation reads or writes.
    #[must_use]
    pub const fn operands(self) -> RegisterOperands {
        match self {
            Self::Add | Self::Sub | Self::Slt | Self::Sltu => RegisterOperands::DestSourceTarget,
            Self::Mult | Self::Multu | Self::Div | Self::Divu => RegisterOperands::SourceTarget,
            Self::Mfhi | Self::Mflo | Self::Lis => RegisterOperands::Dest,
            Self::Jr | Self::Jalr => RegisterOperands::Source,
        }
    }
}

/// Immediate-form operations, selected by opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum ImmediateOp {
    Lw,
    Sw,
    Beq,
    Bne,
}

impl ImmediateOp {
    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Lw => "lw",
            Self::Sw => "sw",
            Self::Beq => "beq",
            Self::Bne => "bne",
        }
    }

    /// Returns `true` for `lw`/`sw`, which go through data-access checks.
    #[must_use]
    pub const fn accesses_memory(self) -> bool {
        matches!(self, Self::Lw | Self::Sw)
    }
}

/// Single source-of-truth table of supported function codes.
///
/// Any function code not present here is an invalid instruction.
pub const REGISTER_ENCODING_TABLE: &[(u8, RegisterOp)] = &[
    (FUNC_ADD, RegisterOp::Add),
    (FUNC_SUB, RegisterOp::Sub),
    (FUNC_MULT, RegisterOp::Mult),
    (FUNC_MULTU, RegisterOp::Multu),
    (FUNC_DIV, RegisterOp::Div),
    (FUNC_DIVU, RegisterOp::Divu),
    (FUNC_MFHI, RegisterOp::Mfhi),
    (FUNC_MFLO, RegisterOp::Mflo),
    (FUNC_LIS, RegisterOp::Lis),
    (FUNC_SLT, RegisterOp::Slt),
    (FUNC_SLTU, RegisterOp::Sltu),
    (FUNC_JR, RegisterOp::Jr),
    (FUNC_JALR, RegisterOp::Jalr),
];

/// Single source-of-truth table of supported opcodes.
///
/// Any non-zero opcode not present here is an invalid instruction.
pub const IMMEDIATE_ENCODING_TABLE: &[(u8, ImmediateOp)] = &[
    (OP_LW, ImmediateOp::Lw),
    (OP_SW, ImmediateOp::Sw),
    (OP_BEQ, ImmediateOp::Beq),
    (OP_BNE, ImmediateOp::Bne),
];

/// Returns the register-form operation for a function code.
#[must_use]
pub fn classify_funct(funct: u8) -> Option<RegisterOp> {
    REGISTER_ENCODING_TABLE
        .iter()
        .find_map(|(code, op)| (*code == funct).then_some(*op))
}

/// Returns the immediate-form operation for an opcode.
#[must_use]
pub fn classify_opcode(opcode: u8) -> Option<ImmediateOp> {
    IMMEDIATE_ENCODING_TABLE
        .iter()
        .find_map(|(code, op)| (*code == opcode).then_some(*op))
}

/// Extracts the `opcode` field (bits 31..26).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn opcode_field(word: u32) -> u8 {
    (word >> 26) as u8
}

/// Extracts the `funct` field (bits 5..0).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn funct_field(word: u32) -> u8 {
    (word & 0x3F) as u8
}

/// Extracts the `(s, t, d)` register fields.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn register_fields(word: u32) -> (Register, Register, Register) {
    (
        Register::from_u5((word >> 21) as u8),
        Register::from_u5((word >> 16) as u8),
        Register::from_u5((word >> 11) as u8),
    )
}

/// Extracts the low 16 bits as a two's-complement immediate.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const fn immediate_field(word: u32) -> i16 {
    (word & 0xFFFF) as u16 as i16
}

/// Builds a register-form word (`opcode = 0`, `shamt = 0`).
#[must_use]
pub const fn encode_register(funct: u8, d: Register, s: Register, t: Register) -> u32 {
    ((s.number() as u32) << 21)
        | ((t.number() as u32) << 16)
        | ((d.number() as u32) << 11)
        | (funct as u32 & 0x3F)
}

/// Builds an immediate-form word.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn encode_immediate(opcode: u8, s: Register, t: Register, imm: i16) -> u32 {
    ((opcode as u32 & 0x3F) << 26)
        | ((s.number() as u32) << 21)
        | ((t.number() as u32) << 16)
        | (imm as u16 as u32)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{
        classify_funct, classify_opcode, encode_immediate, encode_register, funct_field,
        immediate_field, opcode_field, register_fields, ImmediateOp, RegisterOp, FUNC_ADD,
        IMMEDIATE_ENCODING_TABLE, OP_LW, REGISTER_ENCODING_TABLE,
    };
    use crate::state::Register;

    #[test]
    fn tables_contain_unique_codes() {
        let funct: HashSet<_> = REGISTER_ENCODING_TABLE.iter().map(|(c, _)| *c).collect();
        assert_eq!(funct.len(), REGISTER_ENCODING_TABLE.len());

        let opcodes: HashSet<_> = IMMEDIATE_ENCODING_TABLE.iter().map(|(c, _)| *c).collect();
        assert_eq!(opcodes.len(), IMMEDIATE_ENCODING_TABLE.len());
    }

    #[test]
    fn every_table_entry_resolves_via_lookup() {
        for (code, op) in REGISTER_ENCODING_TABLE {
            assert_eq!(classify_funct(*code), Some(*op));
        }
        for (code, op) in IMMEDIATE_ENCODING_TABLE {
            assert_eq!(classify_opcode(*code), Some(*op));
        }
    }

    #[test]
    fn codes_fit_six_bits_and_opcodes_are_nonzero() {
        for (code, _) in REGISTER_ENCODING_TABLE {
            assert!(*code < 64);
        }
        for (code, _) in IMMEDIATE_ENCODING_TABLE {
            assert!(*code < 64 && *code != 0);
        }
    }

    #[test]
    fn unassigned_codes_are_rejected() {
        assert_eq!(classify_funct(0x00), None);
        assert_eq!(classify_funct(0x3F), None);
        assert_eq!(classify_opcode(0x02), None);
        assert_eq!(classify_opcode(0x3F), None);
    }

    #[test]
    fn field_extraction_matches_layout() {
        let word = 0x0043_0820;
        assert_eq!(opcode_field(word), 0);
        assert_eq!(funct_field(word), FUNC_ADD);
        assert_eq!(
            register_fields(word),
            (
                Register::from_u5(2),
                Register::from_u5(3),
                Register::from_u5(1)
            )
        );

        let word = 0x8E51_FFE8;
        assert_eq!(opcode_field(word), OP_LW);
        assert_eq!(immediate_field(word), -24);
    }

    #[test]
    fn encoders_rebuild_reference_words() {
        let add = encode_register(
            FUNC_ADD,
            Register::from_u5(1),
            Register::from_u5(2),
            Register::from_u5(3),
        );
        assert_eq!(add, 0x0043_0820);

        let lw = encode_immediate(OP_LW, Register::from_u5(18), Register::from_u5(17), -24);
        assert_eq!(lw, 0x8E51_FFE8);
    }

    #[test]
    fn only_loads_and_stores_access_memory() {
        assert!(ImmediateOp::Lw.accesses_memory());
        assert!(ImmediateOp::Sw.accesses_memory());
        assert!(!ImmediateOp::Beq.accesses_memory());
        assert!(!ImmediateOp::Bne.accesses_memory());
        assert_eq!(RegisterOp::Jalr.mnemonic(), "jalr");
    }
}
