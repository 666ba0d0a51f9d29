//! Program image loading and memory dumps.
//!
//! Images and dumps are flat sequences of big-endian 32-bit words.

use std::io::{self, Read, Write};

use crate::memory::{Memory, WORD_BYTES};
use crate::{Machine, MachineConfig, MachineError};

/// Splits `bytes` into big-endian words.
///
/// # Errors
///
/// Returns [`MachineError::TruncatedImage`] if the length is not a multiple of 4.
pub fn decode_be_words(bytes: &[u8]) -> Result<Vec<u32>, MachineError> {
    let chunks = bytes.chunks_exact(WORD_BYTES as usize);
    if !chunks.remainder().is_empty() {
        return Err(MachineError::TruncatedImage { bytes: bytes.len() });
    }

    Ok(chunks
        .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Loads an image from `reader` at word `offset` and prepares entry there.
///
/// On success `pc` is `offset * 4`, `$31` holds the halt address and the
/// number of loaded words is returned. Memory is untouched on failure.
///
/// # Errors
///
/// Returns [`MachineError::Io`] if reading fails,
/// [`MachineError::TruncatedImage`] for a trailing partial word,
/// [`MachineError::OffsetOutOfRange`] if `offset` is past the end of memory, and
/// [`MachineError::ImageTooLarge`] if the image does not fit after `offset`.
pub fn load_program<R: Read>(
    machine: &mut Machine,
    mut reader: R,
    offset: u32,
) -> Result<usize, MachineError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let words = decode_be_words(&bytes)?;

    let capacity = machine.memory.len_words();
    let start = usize::try_from(offset).map_err(|_| MachineError::OffsetOutOfRange {
        offset,
        capacity,
    })?;
    if start >= capacity {
        return Err(MachineError::OffsetOutOfRange { offset, capacity });
    }
    if words.len() > capacity - start {
        return Err(MachineError::ImageTooLarge {
            words: words.len(),
            offset,
            capacity,
        });
    }
    let entry_pc = offset
        .checked_mul(WORD_BYTES)
        .ok_or(MachineError::OffsetOutOfRange { offset, capacity })?;

    machine.memory.words_mut()[start..start + words.len()].copy_from_slice(&words);
    machine.prepare_entry(entry_pc);

    tracing::info!(
        words = words.len(),
        entry = format_args!("{entry_pc:#010x}"),
        "program image loaded"
    );
    Ok(words.len())
}

/// Builds a machine from `config` and loads the image from `reader` at
/// `config.load_offset`.
///
/// # Errors
///
/// Returns allocation failures from [`Machine::with_config`] and any error
/// from [`load_program`].
pub fn boot_program<R: Read>(config: &MachineConfig, reader: R) -> Result<Machine, MachineError> {
    let mut machine = Machine::with_config(config)?;
    load_program(&mut machine, reader, config.load_offset)?;
    Ok(machine)
}

/// Writes every memory word, in address order, as big-endian bytes.
///
/// # Errors
///
/// Propagates write failures from `writer`.
pub fn dump_memory<W: Write>(memory: &Memory, writer: W) -> io::Result<()> {
    let mut writer = io::BufWriter::new(writer);
    for word in memory.words() {
        writer.write_all(&word.to_be_bytes())?;
    }
    writer.flush()?;

    tracing::info!(words = memory.len_words(), "memory dumped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{boot_program, decode_be_words, dump_memory, load_program};
    use crate::state::{Register, HALT_ADDRESS};
    use crate::{Machine, MachineConfig, MachineError};

    const IMAGE: [u8; 8] = [0x00, 0x43, 0x08, 0x20, 0x03, 0xE0, 0x00, 0x08];

    #[test]
    fn words_are_big_endian() {
        assert_eq!(
            decode_be_words(&IMAGE).expect("whole words"),
            vec![0x0043_0820, 0x03E0_0008]
        );
        assert!(decode_be_words(&[]).expect("empty").is_empty());
    }

    #[test]
    fn partial_word_is_rejected() {
        assert!(matches!(
            decode_be_words(&IMAGE[..7]),
            Err(MachineError::TruncatedImage { bytes: 7 })
        ));
    }

    #[test]
    fn load_places_words_and_sets_entry() {
        let mut machine = Machine::new(64).expect("allocation");

        let loaded = load_program(&mut machine, &IMAGE[..], 2).expect("fits");

        assert_eq!(loaded, 2);
        assert_eq!(machine.memory.read_word(8), Ok(0x0043_0820));
        assert_eq!(machine.memory.read_word(12), Ok(0x03E0_0008));
        assert_eq!(machine.arch.pc(), 8);
        assert_eq!(machine.arch.gpr(Register::RA), HALT_ADDRESS);
    }

    #[test]
    fn image_filling_memory_exactly_fits() {
        let mut machine = Machine::new(8).expect("allocation");
        assert_eq!(load_program(&mut machine, &IMAGE[..], 0).expect("fits"), 2);
    }

    #[test]
    fn oversized_image_leaves_memory_untouched() {
        let mut machine = Machine::new(8).expect("allocation");
        let before = machine.clone();

        let err = load_program(&mut machine, &IMAGE[..], 1).expect_err("too large");

        assert!(matches!(
            err,
            MachineError::ImageTooLarge {
                words: 2,
                offset: 1,
                capacity: 2,
            }
        ));
        assert_eq!(machine, before);
    }

    #[test]
    fn offset_past_memory_is_rejected() {
        let mut machine = Machine::new(8).expect("allocation");
        assert!(matches!(
            load_program(&mut machine, &[0u8; 0][..], 2),
            Err(MachineError::OffsetOutOfRange { offset: 2, .. })
        ));
    }

    #[test]
    fn boot_applies_configured_capacity_and_offset() {
        let config = MachineConfig {
            memory_bytes: 64,
            load_offset: 3,
        };

        let machine = boot_program(&config, &IMAGE[..]).expect("fits");

        assert_eq!(machine.memory.len_words(), 16);
        assert_eq!(machine.memory.read_word(12), Ok(0x0043_0820));
        assert_eq!(machine.arch.pc(), 12);
    }

    #[test]
    fn boot_rejects_offset_past_configured_memory() {
        let config = MachineConfig {
            memory_bytes: 16,
            load_offset: 4,
        };

        assert!(matches!(
            boot_program(&config, &IMAGE[..]),
            Err(MachineError::OffsetOutOfRange {
                offset: 4,
                capacity: 4,
            })
        ));
    }

    #[test]
    fn dump_writes_every_word_big_endian() {
        let mut machine = Machine::new(8).expect("allocation");
        load_program(&mut machine, &IMAGE[..], 0).expect("fits");

        let mut out = Vec::new();
        dump_memory(&machine.memory, &mut out).expect("vec write");

        assert_eq!(out, IMAGE);
    }
}
