//! Instruction disassembly.
//!
//! Purely presentational: the execution engine never consults this module.

use std::fmt;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::decoder::{decode, Instruction};
use crate::encoding::{classify_funct, classify_opcode, ImmediateOp, RegisterOperands};

/// Disassembly failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DisasmError {
    /// Function code or opcode names no supported operation.
    #[error("unknown instruction code {code:#04x}")]
    UnknownCode {
        /// Offending function code or opcode.
        code: u8,
    },
    /// Destination buffer cannot hold the text plus its terminator.
    #[error("disassembly needs {needed} bytes but the buffer holds {available}")]
    BufferTooSmall {
        /// Bytes required, terminator included.
        needed: usize,
        /// Buffer length.
        available: usize,
    },
}

/// Renders `instruction` as mnemonic and operands, e.g. `lw $17, -24($18)`.
///
/// # Errors
///
/// Returns [`DisasmError::UnknownCode`] for unsupported codes.
pub fn render(instruction: &Instruction) -> Result<String, DisasmError> {
    match *instruction {
        Instruction::Register { d, s, t, funct } => {
            let op = classify_funct(funct).ok_or(DisasmError::UnknownCode { code: funct })?;
            let mnemonic = op.mnemonic();
            Ok(match op.operands() {
                RegisterOperands::DestSourceTarget => format!("{mnemonic} {d}, {s}, {t}"),
                RegisterOperands::SourceTarget => format!("{mnemonic} {s}, {t}"),
                RegisterOperands::Dest => format!("{mnemonic} {d}"),
                RegisterOperands::Source => format!("{mnemonic} {s}"),
            })
        }
        Instruction::Immediate { s, t, imm, opcode } => {
            let op = classify_opcode(opcode).ok_or(DisasmError::UnknownCode { code: opcode })?;
            let mnemonic = op.mnemonic();
            Ok(match op {
                ImmediateOp::Lw | ImmediateOp::Sw => format!("{mnemonic} {t}, {imm}({s})"),
                ImmediateOp::Beq | ImmediateOp::Bne => format!("{mnemonic} {s}, {t}, {imm}"),
            })
        }
    }
}

/// Renders `instruction` into `buf` followed by a NUL byte.
///
/// Returns the text length, terminator excluded. `buf` is left untouched on
/// failure.
///
/// # Errors
///
/// Returns [`DisasmError::UnknownCode`] for unsupported codes and
/// [`DisasmError::BufferTooSmall`] when `buf` is shorter than the text plus one.
pub fn render_into(instruction: &Instruction, buf: &mut [u8]) -> Result<usize, DisasmError> {
    let text = render(instruction)?;
    let needed = text.len() + 1;
    if needed > buf.len() {
        return Err(DisasmError::BufferTooSmall {
            needed,
            available: buf.len(),
        });
    }

    buf[..text.len()].copy_from_slice(text.as_bytes());
    buf[text.len()] = 0;
    Ok(text.len())
}

/// One line of an image listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// Byte address of the word.
    pub addr: u32,
    /// Raw instruction word.
    pub word: u32,
    /// Rendered text, or `None` when the word is not a supported instruction.
    pub text: Option<String>,
}

impl DisassemblyRow {
    /// Disassembles `word` located at `addr`.
    #[must_use]
    pub fn new(addr: u32, word: u32) -> Self {
        Self {
            addr,
            word,
            text: render(&decode(word)).ok(),
        }
    }

    /// Returns `true` if the word did not decode to a supported instruction.
    #[must_use]
    pub const fn is_illegal(&self) -> bool {
        self.text.is_none()
    }
}

impl fmt::Display for DisassemblyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}: {:#010x}  ", self.addr, self.word)?;
        match &self.text {
            Some(text) => f.write_str(text),
            None => write!(f, ".word {:#010x}", self.word),
        }
    }
}

/// Disassembles consecutive words starting at byte address `base`.
#[must_use]
pub fn disassemble_words(words: &[u32], base: u32) -> Vec<DisassemblyRow> {
    let mut addr = base;
    words
        .iter()
        .map(|word| {
            let row = DisassemblyRow::new(addr, *word);
            addr = addr.wrapping_add(4);
            row
        })
        .collect()
}
