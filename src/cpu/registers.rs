//! 6502 CPU registers.
//!
//! The 6502 has six programmer-visible registers:
//! - A: 8-bit accumulator
//! - X, Y: 8-bit index registers
//! - SP: 8-bit stack pointer (offset into page one)
//! - PC: 16-bit program counter
//! - P: 8-bit status (flags) byte

use std::fmt;
use serde::{Serialize, Deserialize};

/// A single bit of the status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Flag {
    /// N: bit 7 of the last result
    Negative = 0x80,
    /// V: set when an add/subtract wrapped
    Overflow = 0x40,
    /// High bit of the B field (unused)
    BreakHigh = 0x20,
    /// Low bit of the B field (unused)
    BreakLow = 0x10,
    /// D: stored but never consulted
    Decimal = 0x08,
    /// I: set by BRK
    InterruptDisable = 0x04,
    /// Z: last result was zero
    Zero = 0x02,
    /// C: carry/borrow
    Carry = 0x01,
}

impl Flag {
    /// All flags from bit 7 down to bit 0.
    pub const ALL: [Flag; 8] = [
        Flag::Negative,
        Flag::Overflow,
        Flag::BreakHigh,
        Flag::BreakLow,
        Flag::Decimal,
        Flag::InterruptDisable,
        Flag::Zero,
        Flag::Carry,
    ];

    /// The bit mask of this flag within the status byte.
    #[inline]
    pub const fn mask(self) -> u8 {
        self as u8
    }

    /// Column letter used in register dumps (`NV--DIZC`).
    pub const fn letter(self) -> char {
        match self {
            Flag::Negative => 'N',
            Flag::Overflow => 'V',
            Flag::BreakHigh | Flag::BreakLow => '-',
            Flag::Decimal => 'D',
            Flag::InterruptDisable => 'I',
            Flag::Zero => 'Z',
            Flag::Carry => 'C',
        }
    }
}

/// How a "clear flag" operation affects the status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlagClear {
    /// Zero exactly the named bit.
    #[default]
    Bitwise,
    /// Zero the whole status byte, whichever flag was named.
    ///
    /// Reproduces cores that mask with a logical negation (`!mask == 0`)
    /// instead of a bitwise complement.
    WholeRegister,
}

/// The packed status byte together with its clearing policy.
#[derive(Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Status {
    bits: u8,
    clear: FlagClear,
}

impl Status {
    /// An all-clear status byte with the given clearing policy.
    pub const fn new(clear: FlagClear) -> Self {
        Self { bits: 0, clear }
    }

    /// The raw status byte.
    #[inline]
    pub const fn bits(&self) -> u8 {
        self.bits
    }

    /// Overwrite the raw status byte (PLP, RTI).
    #[inline]
    pub fn set_bits(&mut self, bits: u8) {
        self.bits = bits;
    }

    /// The clearing policy in effect.
    pub const fn policy(&self) -> FlagClear {
        self.clear
    }

    #[inline]
    pub const fn is_set(&self, flag: Flag) -> bool {
        self.bits & flag.mask() != 0
    }

    /// OR in exactly the bit of `flag`.
    #[inline]
    pub fn set(&mut self, flag: Flag) {
        self.bits |= flag.mask();
    }

    /// Clear `flag` according to the clearing policy.
    #[inline]
    pub fn clear(&mut self, flag: Flag) {
        match self.clear {
            FlagClear::Bitwise => self.bits &= !flag.mask(),
            FlagClear::WholeRegister => self.bits = 0,
        }
    }

    /// Set `flag` when `on`, otherwise clear it.
    #[inline]
    pub fn assign(&mut self, flag: Flag, on: bool) {
        if on {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P=")?;
        for flag in Flag::ALL {
            let c = if self.is_set(flag) { flag.letter() } else { '.' };
            write!(f, "{}", c)?;
        }
        write!(f, " (${:02X})", self.bits)
    }
}

/// The 6502 register file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Registers {
    /// A: accumulator
    pub a: u8,

    /// X: index register
    pub x: u8,

    /// Y: index register
    pub y: u8,

    /// SP: stack pointer, addresses `0x0100 | sp`
    pub sp: u8,

    /// PC: program counter
    pub pc: u16,

    /// P: status byte
    pub status: Status,
}

impl Registers {
    /// Power-on values: A/X/Y/P zero, SP = 0xFF, PC = 0.
    pub fn new(clear: FlagClear) -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFF,
            pc: 0,
            status: Status::new(clear),
        }
    }

    /// Return to power-on values, keeping the flag clearing policy.
    pub fn reset(&mut self) {
        *self = Self::new(self.status.policy());
    }

    /// Move the program counter forward by `n` bytes, wrapping at 64K.
    /// Returns the old value.
    #[inline]
    pub fn advance_pc(&mut self, n: u16) -> u16 {
        let old = self.pc;
        self.pc = self.pc.wrapping_add(n);
        old
    }

    /// Read-only copy of the registers for diagnostics.
    pub fn snapshot(&self) -> RegisterSnapshot {
        RegisterSnapshot {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            flags: self.status.bits(),
        }
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new(FlagClear::default())
    }
}

/// Plain-data register values handed to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSnapshot {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub flags: u8,
}

impl fmt::Display for RegisterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "X: ${:02X}  Y:${:02X}  a:${:02X}", self.x, self.y, self.a)?;
        writeln!(f, "SP: ${:02X} PC: ${:04X}", self.sp, self.pc)?;
        writeln!(f, "NV--DIZC")?;
        for flag in Flag::ALL {
            let bit = if self.flags & flag.mask() != 0 { '1' } else { '0' };
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}
