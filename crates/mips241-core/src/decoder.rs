//! Instruction decoder.
//!
//! Decoding is total: every 32-bit word produces an [`Instruction`]. Whether its
//! code names a supported operation is decided by dispatch, not here.

use crate::encoding::{funct_field, immediate_field, opcode_field, register_fields};
use crate::state::Register;

/// Encoding family of a decoded word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    /// All operands are registers; selected by function code.
    RegisterForm,
    /// One 16-bit signed immediate operand; selected by opcode.
    ImmediateForm,
}

/// Immutable decoded view of one instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Instruction {
    /// Word with a zero opcode.
    Register {
        /// Destination register (bits 15..11).
        d: Register,
        /// Source register (bits 25..21).
        s: Register,
        /// Target register (bits 20..16).
        t: Register,
        /// Function code (bits 5..0).
        funct: u8,
    },
    /// Word with a non-zero opcode.
    Immediate {
        /// Address/compare operand register (bits 25..21).
        s: Register,
        /// Data/compare operand register (bits 20..16).
        t: Register,
        /// Sign-extended immediate (bits 15..0).
        imm: i16,
        /// Opcode (bits 31..26).
        opcode: u8,
    },
}

impl Instruction {
    /// Returns the encoding family.
    #[must_use]
    pub const fn kind(&self) -> InstructionKind {
        match self {
            Self::Register { .. } => InstructionKind::RegisterForm,
            Self::Immediate { .. } => InstructionKind::ImmediateForm,
        }
    }

    /// Returns the 6-bit dispatch code: function code or opcode.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::Register { funct, .. } => *funct,
            Self::Immediate { opcode, .. } => *opcode,
        }
    }
}

/// Decodes a 32-bit instruction word.
#[must_use]
pub const fn decode(word: u32) -> Instruction {
    let (s, t, d) = register_fields(word);
    let opcode = opcode_field(word);

    if opcode == 0 {
        Instruction::Register {
            d,
            s,
            t,
            funct: funct_field(word),
        }
    } else {
        Instruction::Immediate {
            s,
            t,
            imm: immediate_field(word),
            opcode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{
        FUNC_ADD, FUNC_DIV, FUNC_DIVU, FUNC_JALR, FUNC_JR, FUNC_LIS, FUNC_MFHI, FUNC_MFLO,
        FUNC_MULT, FUNC_MULTU, FUNC_SLT, FUNC_SLTU, FUNC_SUB, OP_BEQ, OP_BNE, OP_LW, OP_SW,
    };

    fn reg(n: u8) -> Register {
        Register::from_u5(n)
    }

    fn assert_register(word: u32, d: u8, s: u8, t: u8, funct: u8) {
        assert_eq!(
            decode(word),
            Instruction::Register {
                d: reg(d),
                s: reg(s),
                t: reg(t),
                funct,
            },
            "word {word:#010x}"
        );
    }

    fn assert_immediate(word: u32, s: u8, t: u8, imm: i16, opcode: u8) {
        assert_eq!(
            decode(word),
            Instruction::Immediate {
                s: reg(s),
                t: reg(t),
                imm,
                opcode,
            },
            "word {word:#010x}"
        );
    }

    #[test]
    fn decode_register_forms() {
        assert_register(0x0043_0820, 1, 2, 3, FUNC_ADD);
        assert_register(0x0049_2822, 5, 2, 9, FUNC_SUB);
        assert_register(0x00C7_0018, 0, 6, 7, FUNC_MULT);
        assert_register(0x0109_0019, 0, 8, 9, FUNC_MULTU);
        assert_register(0x014B_001A, 0, 10, 11, FUNC_DIV);
        assert_register(0x018D_001B, 0, 12, 13, FUNC_DIVU);
        assert_register(0x0000_7810, 15, 0, 0, FUNC_MFHI);
        assert_register(0x0000_7012, 14, 0, 0, FUNC_MFLO);
        assert_register(0x0000_8014, 16, 0, 0, FUNC_LIS);
        assert_register(0x02D7_A82A, 21, 22, 23, FUNC_SLT);
        assert_register(0x03FF_F82B, 31, 31, 31, FUNC_SLTU);
        assert_register(0x03E0_0008, 0, 31, 0, FUNC_JR);
        assert_register(0x0340_0009, 0, 26, 0, FUNC_JALR);
    }

    #[test]
    fn decode_immediate_forms() {
        assert_immediate(0x8E51_FFE8, 18, 17, -24, OP_LW);
        assert_immediate(0xAE93_0000, 20, 19, 0, OP_SW);
        assert_immediate(0x1085_0010, 4, 5, 16, OP_BEQ);
        assert_immediate(0x1719_FA0B, 24, 25, -1525, OP_BNE);
    }

    #[test]
    fn immediate_sign_extension_covers_extremes() {
        assert_eq!(decode(0x8C00_8000).code(), OP_LW);
        let Instruction::Immediate { imm, .. } = decode(0x8C00_8000) else {
            panic!("lw must decode as immediate form");
        };
        assert_eq!(imm, i16::MIN);

        let Instruction::Immediate { imm, .. } = decode(0x8C00_7FFF) else {
            panic!("lw must decode as immediate form");
        };
        assert_eq!(imm, i16::MAX);

        let Instruction::Immediate { imm, .. } = decode(0x8C00_FFFF) else {
            panic!("lw must decode as immediate form");
        };
        assert_eq!(imm, -1);
    }

    #[test]
    fn unknown_codes_still_decode() {
        let word = 0xFC00_0000;
        assert_eq!(decode(word).kind(), InstructionKind::ImmediateForm);
        assert_eq!(decode(word).code(), 0x3F);

        let word = 0x0000_003F;
        assert_eq!(decode(word).kind(), InstructionKind::RegisterForm);
        assert_eq!(decode(word).code(), 0x3F);
    }

    #[test]
    fn shamt_bits_are_ignored() {
        assert_eq!(decode(0x0043_0820), decode(0x0043_0FE0));
    }
}
