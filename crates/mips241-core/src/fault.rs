use thiserror::Error;

/// Taxonomy of simulation faults surfaced by a step.
///
/// Every fault is terminal for the running program. The `#[error]` text is the
/// human-readable status line reported by drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultCode {
    /// Data access whose byte address is not a multiple of four.
    #[error("Program attempted to read/write an unaligned address.")]
    UnalignedMemoryAccess,
    /// Program counter is not a multiple of four.
    #[error("Program counter contains an unaligned address.")]
    UnalignedInstructionFetch,
    /// Data access whose word address lies outside memory.
    #[error("Program attempted to read/write memory that was out of bounds.")]
    OutOfRangeMemoryAccess,
    /// Program counter (or `lis` inline word) lies outside memory.
    #[error("Program counter contains an out-of-bounds address.")]
    OutOfRangeInstructionFetch,
    /// Decoded code has no registered handler.
    #[error("An invalid instruction was encountered.")]
    InvalidInstruction,
}

#[cfg(test)]
mod tests {
    use super::FaultCode;

    #[test]
    fn messages_are_status_lines() {
        assert_eq!(
            FaultCode::InvalidInstruction.to_string(),
            "An invalid instruction was encountered."
        );
        assert_eq!(
            FaultCode::UnalignedInstructionFetch.to_string(),
            "Program counter contains an unaligned address."
        );
        assert_eq!(
            FaultCode::UnalignedMemoryAccess.to_string(),
            "Program attempted to read/write an unaligned address."
        );
        assert_eq!(
            FaultCode::OutOfRangeMemoryAccess.to_string(),
            "Program attempted to read/write memory that was out of bounds."
        );
        assert_eq!(
            FaultCode::OutOfRangeInstructionFetch.to_string(),
            "Program counter contains an out-of-bounds address."
        );
    }
}
