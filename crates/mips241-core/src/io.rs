//! [`CharIo`] implementations for hosts and tests.

use std::collections::VecDeque;
use std::io::{self, Read, Write};

use crate::CharIo;

/// Process stdin/stdout, one byte at a time, flushing after every write.
#[derive(Debug)]
pub struct StdIo {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl StdIo {
    /// Binds to the process standard streams.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Default for StdIo {
    fn default() -> Self {
        Self::new()
    }
}

impl CharIo for StdIo {
    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.stdin.lock().read(&mut byte) {
            Ok(1) => Some(byte[0]),
            Ok(_) => None,
            Err(error) => {
                tracing::warn!(%error, "program input unavailable");
                None
            }
        }
    }

    fn write_byte(&mut self, byte: u8) {
        let mut out = self.stdout.lock();
        if let Err(error) = out.write_all(&[byte]).and_then(|()| out.flush()) {
            tracing::warn!(%error, "program output dropped");
        }
    }
}

/// In-memory input queue and output buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedIo {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl BufferedIo {
    /// Creates a buffer whose input yields `input` in order.
    #[must_use]
    pub fn new(input: impl Into<Vec<u8>>) -> Self {
        Self {
            input: input.into().into(),
            output: Vec::new(),
        }
    }

    /// Characters written so far.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Number of input characters not yet consumed.
    #[must_use]
    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }
}

impl CharIo for BufferedIo {
    fn read_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    fn write_byte(&mut self, byte: u8) {
        self.output.push(byte);
    }
}

/// No input; output is discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullIo;

impl CharIo for NullIo {
    fn read_byte(&mut self) -> Option<u8> {
        None
    }

    fn write_byte(&mut self, _byte: u8) {}
}

#[cfg(test)]
mod tests {
    use super::{BufferedIo, NullIo};
    use crate::CharIo;

    #[test]
    fn buffered_io_is_fifo() {
        let mut io = BufferedIo::new(b"ab".to_vec());
        assert_eq!(io.read_byte(), Some(b'a'));
        assert_eq!(io.remaining_input(), 1);
        assert_eq!(io.read_byte(), Some(b'b'));
        assert_eq!(io.read_byte(), None);

        io.write_byte(b'x');
        io.write_byte(b'y');
        assert_eq!(io.output(), b"xy");
    }

    #[test]
    fn null_io_has_no_input() {
        let mut io = NullIo;
        assert_eq!(io.read_byte(), None);
        io.write_byte(b'z');
    }
}
