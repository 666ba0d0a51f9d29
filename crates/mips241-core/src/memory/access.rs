//! Alignment and bounds policy for instruction fetch and data access.
//!
//! Every check that turns a byte address into a word index lives here, so the
//! fetch path, `lis` and `lw`/`sw` share one definition of "valid".

use crate::FaultCode;

/// Width in bytes of every architectural access.
pub const WORD_BYTES: u32 = 4;

/// Validates that the program counter is word aligned.
///
/// # Errors
///
/// Returns [`FaultCode::UnalignedInstructionFetch`] when `pc % 4 != 0`.
pub const fn validate_fetch_alignment(pc: u32) -> Result<(), FaultCode> {
    if pc % WORD_BYTES == 0 {
        Ok(())
    } else {
        Err(FaultCode::UnalignedInstructionFetch)
    }
}

/// Resolves an aligned program counter to a word index inside memory.
///
/// # Errors
///
/// Returns [`FaultCode::OutOfRangeInstructionFetch`] when `pc / 4` is not below
/// `words`.
pub const fn validate_fetch_range(pc: u32, words: usize) -> Result<usize, FaultCode> {
    let index = (pc / WORD_BYTES) as usize;
    if index < words {
        Ok(index)
    } else {
        Err(FaultCode::OutOfRangeInstructionFetch)
    }
}

/// Resolves a data byte address to a word index.
///
/// Range is checked before alignment.
///
/// # Errors
///
/// Returns [`FaultCode::OutOfRangeMemoryAccess`] when the word index
/// `byte_addr / 4`, truncated toward zero, is negative or not below `words`, and
/// [`FaultCode::UnalignedMemoryAccess`] when it is not a multiple of four.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
pub const fn validate_data_access(byte_addr: i64, words: usize) -> Result<usize, FaultCode> {
    let word = byte_addr / WORD_BYTES as i64;
    if word < 0 || word >= words as i64 {
        return Err(FaultCode::OutOfRangeMemoryAccess);
    }
    if byte_addr % WORD_BYTES as i64 != 0 {
        return Err(FaultCode::UnalignedMemoryAccess);
    }
    Ok(word as usize)
}

#[cfg(test)]
mod tests {
    use super::{
        validate_data_access, validate_fetch_alignment, validate_fetch_range, WORD_BYTES,
    };
    use crate::FaultCode;

    #[test]
    fn fetch_alignment_rejects_non_word_addresses() {
        assert_eq!(validate_fetch_alignment(0), Ok(()));
        assert_eq!(validate_fetch_alignment(0x8123_456C), Ok(()));
        for offset in 1..WORD_BYTES {
            assert_eq!(
                validate_fetch_alignment(0x100 + offset),
                Err(FaultCode::UnalignedInstructionFetch)
            );
        }
    }

    #[test]
    fn fetch_range_is_bounded_by_memory_words() {
        assert_eq!(validate_fetch_range(0, 4), Ok(0));
        assert_eq!(validate_fetch_range(12, 4), Ok(3));
        assert_eq!(
            validate_fetch_range(16, 4),
            Err(FaultCode::OutOfRangeInstructionFetch)
        );
        assert_eq!(
            validate_fetch_range(u32::MAX - 3, 4),
            Err(FaultCode::OutOfRangeInstructionFetch)
        );
    }

    #[test]
    fn data_access_checks_range_before_alignment() {
        assert_eq!(validate_data_access(0, 4), Ok(0));
        assert_eq!(validate_data_access(12, 4), Ok(3));
        assert_eq!(
            validate_data_access(13, 4),
            Err(FaultCode::UnalignedMemoryAccess)
        );
        assert_eq!(
            validate_data_access(16, 4),
            Err(FaultCode::OutOfRangeMemoryAccess)
        );
        assert_eq!(
            validate_data_access(17, 4),
            Err(FaultCode::OutOfRangeMemoryAccess)
        );
    }

    #[test]
    fn negative_word_addresses_are_out_of_range() {
        for byte_addr in [-4_i64, -5, -8, -32768] {
            assert_eq!(
                validate_data_access(byte_addr, 1024),
                Err(FaultCode::OutOfRangeMemoryAccess)
            );
        }
    }

    #[test]
    fn bytes_just_below_zero_truncate_to_word_zero() {
        for byte_addr in [-1_i64, -2, -3] {
            assert_eq!(
                validate_data_access(byte_addr, 1024),
                Err(FaultCode::UnalignedMemoryAccess)
            );
        }
    }
}
