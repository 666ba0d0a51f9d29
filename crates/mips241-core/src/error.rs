//! Host-level failures raised while building or loading a machine.
//!
//! These are distinct from [`crate::FaultCode`]: a fault is something the
//! simulated program did, a [`MachineError`] means there is no usable machine.

use std::io;

use thiserror::Error;

/// Setup and image errors that prevent a run from starting.
#[derive(Debug, Error)]
pub enum MachineError {
    /// Requested capacity is not a whole number of words.
    #[error("memory capacity of {bytes} bytes is not a multiple of 4")]
    MisalignedCapacity {
        /// Requested capacity in bytes.
        bytes: u32,
    },
    /// Backing storage could not be allocated.
    #[error("unable to allocate {words} words of simulated memory")]
    AllocationFailed {
        /// Requested capacity in words.
        words: usize,
    },
    /// Image does not fit between the load offset and the end of memory.
    #[error("program image of {words} words at word offset {offset} exceeds memory of {capacity} words")]
    ImageTooLarge {
        /// Number of words in the image.
        words: usize,
        /// Load offset in words.
        offset: u32,
        /// Memory capacity in words.
        capacity: usize,
    },
    /// Image length is not a whole number of words.
    #[error("program image of {bytes} bytes ends with a partial word")]
    TruncatedImage {
        /// Image length in bytes.
        bytes: usize,
    },
    /// Load offset does not address a word inside memory.
    #[error("load offset {offset} is outside memory of {capacity} words")]
    OffsetOutOfRange {
        /// Load offset in words.
        offset: u32,
        /// Memory capacity in words.
        capacity: usize,
    },
    /// Reading the image or writing a dump failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::MachineError;

    #[test]
    fn messages_name_the_offending_values() {
        let err = MachineError::ImageTooLarge {
            words: 10,
            offset: 4,
            capacity: 8,
        };
        assert_eq!(
            err.to_string(),
            "program image of 10 words at word offset 4 exceeds memory of 8 words"
        );
        assert_eq!(
            MachineError::MisalignedCapacity { bytes: 6 }.to_string(),
            "memory capacity of 6 bytes is not a multiple of 4"
        );
    }

    #[test]
    fn io_errors_convert_transparently() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err = MachineError::from(io);
        assert!(matches!(err, MachineError::Io(_)));
        assert_eq!(err.to_string(), "eof");
    }
}
