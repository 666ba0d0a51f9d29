use std::fmt;

/// Number of architecturally visible general-purpose registers (`$0..$31`).
pub const GENERAL_REGISTER_COUNT: usize = 32;

/// Reserved return address preloaded into `$31`; reaching it halts the program.
pub const HALT_ADDRESS: u32 = 0x8123_456C;

/// General-purpose register identifier decoded from a 5-bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Register(u8);

impl Register {
    /// Hardwired zero register.
    pub const ZERO: Self = Self(0);
    /// Link register written by `jalr`.
    pub const RA: Self = Self(31);

    /// Builds a register from the low five bits of `bits`.
    #[must_use]
    pub const fn from_u5(bits: u8) -> Self {
        Self(bits & 0x1F)
    }

    /// Returns the array index for this register (`0..=31`).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw 5-bit register number.
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Register file, program counter and the `HI`/`LO` pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    gpr: [u32; GENERAL_REGISTER_COUNT],
    pc: u32,
    hi: u32,
    lo: u32,
}

impl RegisterFile {
    /// Reads a general-purpose register.
    #[must_use]
    pub const fn gpr(&self, reg: Register) -> u32 {
        self.gpr[reg.index()]
    }

    /// Writes a general-purpose register.
    ///
    /// Writes to `$0` are stored; the engine clears `$0` after every step.
    pub const fn set_gpr(&mut self, reg: Register, value: u32) {
        self.gpr[reg.index()] = value;
    }

    /// All general-purpose registers in index order.
    #[must_use]
    pub const fn gprs(&self) -> &[u32; GENERAL_REGISTER_COUNT] {
        &self.gpr
    }

    /// Reads the program counter (a byte address).
    #[must_use]
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    /// Writes the program counter.
    pub const fn set_pc(&mut self, value: u32) {
        self.pc = value;
    }

    /// Reads `HI`.
    #[must_use]
    pub const fn hi(&self) -> u32 {
        self.hi
    }

    /// Reads `LO`.
    #[must_use]
    pub const fn lo(&self) -> u32 {
        self.lo
    }

    /// Writes both halves of the multiply/divide result pair.
    pub const fn set_hi_lo(&mut self, hi: u32, lo: u32) {
        self.hi = hi;
        self.lo = lo;
    }

    /// Forces `$0` back to zero.
    pub const fn clear_zero_register(&mut self) {
        self.gpr[0] = 0;
    }
}

/// One `register NN: 0xXXXXXXXX` line per register, then `pc`, `hi` and `lo`.
impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, value) in self.gpr.iter().enumerate() {
            writeln!(f, "register {index:2}: 0x{value:08x}")?;
        }
        writeln!(f, "pc: 0x{:08x}", self.pc)?;
        writeln!(f, "hi: 0x{:08x}", self.hi)?;
        writeln!(f, "lo: 0x{:08x}", self.lo)
    }
}
