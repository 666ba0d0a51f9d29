//! Word-addressed backing store and access policy.

/// Alignment and bounds policy helpers.
pub mod access;
/// Memory-mapped character port addresses.
pub mod map;

pub use access::{
    validate_data_access, validate_fetch_alignment, validate_fetch_range, WORD_BYTES,
};
pub use map::{decode_mapped_port, MappedPort, INPUT_ADDRESS, OUTPUT_ADDRESS};

use crate::{FaultCode, MachineError};

/// Capacity used when a machine is created with zero requested bytes (16 MiB).
pub const DEFAULT_MEMORY_WORDS: usize = 4_194_304;

/// Word index proven in range by one of the [`Memory`] resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WordIndex(usize);

impl WordIndex {
    /// Returns the raw word index.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

/// Flat, zero-initialized memory of 32-bit words, addressed by byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Memory {
    words: Box<[u32]>,
}

impl Memory {
    /// Allocates zeroed memory of `bytes` bytes, or the default when `bytes == 0`.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::MisalignedCapacity`] when `bytes` is not a multiple
    /// of four and [`MachineError::AllocationFailed`] when the storage cannot be
    /// reserved.
    pub fn with_capacity_bytes(bytes: u32) -> Result<Self, MachineError> {
        if bytes % WORD_BYTES != 0 {
            return Err(MachineError::MisalignedCapacity { bytes });
        }
        let words = if bytes == 0 {
            DEFAULT_MEMORY_WORDS
        } else {
            (bytes / WORD_BYTES) as usize
        };

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(words)
            .map_err(|_| MachineError::AllocationFailed { words })?;
        storage.resize(words, 0);

        Ok(Self {
            words: storage.into_boxed_slice(),
        })
    }

    /// Capacity in words.
    #[must_use]
    pub const fn len_words(&self) -> usize {
        self.words.len()
    }

    /// All words in address order.
    #[must_use]
    pub const fn words(&self) -> &[u32] {
        &self.words
    }

    /// Mutable view of all words, used by image loading.
    pub fn words_mut(&mut self) -> &mut [u32] {
        &mut self.words
    }

    /// Resolves an aligned program counter to the word it fetches.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::OutOfRangeInstructionFetch`] past the end of memory.
    pub const fn fetch_index(&self, pc: u32) -> Result<WordIndex, FaultCode> {
        match validate_fetch_range(pc, self.words.len()) {
            Ok(index) => Ok(WordIndex(index)),
            Err(cause) => Err(cause),
        }
    }

    /// Resolves an effective data address to the word it accesses.
    ///
    /// # Errors
    ///
    /// See [`validate_data_access`].
    pub const fn data_index(&self, byte_addr: i64) -> Result<WordIndex, FaultCode> {
        match validate_data_access(byte_addr, self.words.len()) {
            Ok(index) => Ok(WordIndex(index)),
            Err(cause) => Err(cause),
        }
    }

    /// Reads a resolved word.
    #[must_use]
    pub fn word(&self, index: WordIndex) -> u32 {
        self.words[index.0]
    }

    /// Writes a resolved word.
    pub fn set_word(&mut self, index: WordIndex, value: u32) {
        self.words[index.0] = value;
    }

    /// Reads the word at a byte address with data-access checks.
    ///
    /// # Errors
    ///
    /// See [`validate_data_access`].
    pub fn read_word(&self, byte_addr: u32) -> Result<u32, FaultCode> {
        self.data_index(i64::from(byte_addr))
            .map(|index| self.word(index))
    }

    /// Writes the word at a byte address with data-access checks.
    ///
    /// # Errors
    ///
    /// See [`validate_data_access`].
    pub fn write_word(&mut self, byte_addr: u32, value: u32) -> Result<(), FaultCode> {
        let index = self.data_index(i64::from(byte_addr))?;
        self.set_word(index, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Memory, WordIndex, DEFAULT_MEMORY_WORDS};
    use crate::{FaultCode, MachineError};

    #[test]
    fn zero_request_allocates_default_capacity() {
        let memory = Memory::with_capacity_bytes(0).expect("default allocation");
        assert_eq!(memory.len_words(), DEFAULT_MEMORY_WORDS);
        assert!(memory.words().iter().all(|word| *word == 0));
    }

    #[test]
    fn explicit_capacity_is_measured_in_bytes() {
        let memory = Memory::with_capacity_bytes(64).expect("small allocation");
        assert_eq!(memory.len_words(), 16);
    }

    #[test]
    fn misaligned_capacity_is_rejected() {
        let err = Memory::with_capacity_bytes(10).expect_err("10 is not a word multiple");
        assert!(matches!(err, MachineError::MisalignedCapacity { bytes: 10 }));
    }

    #[test]
    fn checked_word_access_round_trips_and_faults() {
        let mut memory = Memory::with_capacity_bytes(16).expect("allocation");

        memory.write_word(8, 0xDEAD_BEEF).expect("aligned in-range write");
        assert_eq!(memory.read_word(8), Ok(0xDEAD_BEEF));
        assert_eq!(memory.words()[2], 0xDEAD_BEEF);

        assert_eq!(
            memory.write_word(9, 1),
            Err(FaultCode::UnalignedMemoryAccess)
        );
        assert_eq!(
            memory.read_word(16),
            Err(FaultCode::OutOfRangeMemoryAccess)
        );
        assert_eq!(memory.words(), &[0, 0, 0xDEAD_BEEF, 0]);
    }

    #[test]
    fn fetch_index_reports_out_of_range_fetch() {
        let memory = Memory::with_capacity_bytes(16).expect("allocation");
        assert_eq!(memory.fetch_index(12).map(WordIndex::get), Ok(3));
        assert_eq!(
            memory.fetch_index(16),
            Err(FaultCode::OutOfRangeInstructionFetch)
        );
    }

    #[test]
    fn data_index_maps_byte_address_to_word() {
        let memory = Memory::with_capacity_bytes(64).expect("allocation");
        let index = memory.data_index(40).expect("in range");
        assert_eq!(index.get(), 10);
    }
}
