//! Reserved byte addresses intercepted before ordinary data access.

/// Loading from this address reads one character from the host input.
pub const INPUT_ADDRESS: u32 = 0xFFFF_0008;
/// Storing to this address writes the low byte of the value to the host output.
pub const OUTPUT_ADDRESS: u32 = 0xFFFF_000C;

/// Memory-mapped character port selected by an effective address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappedPort {
    /// Character input (`lw` only).
    Input,
    /// Character output (`sw` only).
    Output,
}

/// Decodes an effective byte address into a mapped port, if it is one.
///
/// Effective addresses are computed in 64 bits so negative results never alias
/// the ports.
#[must_use]
pub const fn decode_mapped_port(byte_addr: i64) -> Option<MappedPort> {
    if byte_addr == INPUT_ADDRESS as i64 {
        Some(MappedPort::Input)
    } else if byte_addr == OUTPUT_ADDRESS as i64 {
        Some(MappedPort::Output)
    } else {
        None
    }
}

const _: () = assert_port_layout();

const fn assert_port_layout() {
    assert!(INPUT_ADDRESS % 4 == 0, "input port must be word aligned");
    assert!(OUTPUT_ADDRESS % 4 == 0, "output port must be word aligned");
    assert!(INPUT_ADDRESS != OUTPUT_ADDRESS, "ports must not overlap");
}
