//! Flag engine and arithmetic/shift primitives.
//!
//! Each primitive takes the status byte and an operand, returns the new
//! operand value, and leaves the flags as the instruction defines them.
//! The dispatch engine writes the result back to a register or memory.
//!
//! ADC and SBC work one unit at a time: the accumulator is stepped `b`
//! times (plus once more for carry-in) and any wrap past the 8-bit
//! boundary sets V, which is then copied into C. Decimal mode is ignored.

use crate::cpu::registers::{Flag, FlagClear, Status};

const SIGN: u8 = 0x80;

/// Update Z and N from a result byte. C, V, D and I are untouched.
pub fn set_flags(status: &mut Status, value: u8) {
    if value == 0 {
        status.set(Flag::Zero);
    } else {
        status.clear(Flag::Zero);
    }

    match status.policy() {
        FlagClear::Bitwise => status.assign(Flag::Negative, value & SIGN != 0),
        // The whole-register policy only ever ORs N in.
        FlagClear::WholeRegister => {
            if value & SIGN != 0 {
                status.set(Flag::Negative);
            }
        }
    }
}

/// CMP/CPX/CPY: compare register `a` with operand `b`.
///
/// N is an approximation: on inequality it is set only when bit 7 is set
/// in both `a` and `b`. Under the whole-register policy N is applied as an
/// AND mask, so it can only stay set, never come back.
pub fn compare(status: &mut Status, a: u8, b: u8) {
    if a == b {
        status.clear(Flag::Negative);
        status.set(Flag::Zero);
    } else {
        status.clear(Flag::Zero);
        match status.policy() {
            FlagClear::Bitwise => status.assign(Flag::Negative, a & SIGN & b != 0),
            FlagClear::WholeRegister => status.set_bits(status.bits() & a & SIGN),
        }
    }

    status.assign(Flag::Carry, a >= b);
}

/// ADC: returns `a + b (+1 if C)` modulo 256.
pub fn add(status: &mut Status, a: u8, b: u8) -> u8 {
    status.clear(Flag::Overflow);

    let mut acc = a;
    for _ in 0..b {
        acc = acc.wrapping_add(1);
        if acc == 0x00 {
            status.set(Flag::Overflow);
        }
    }

    if status.is_set(Flag::Carry) {
        acc = acc.wrapping_add(1);
        if acc == 0x00 {
            status.set(Flag::Overflow);
        }
    }

    let wrapped = status.is_set(Flag::Overflow);
    status.assign(Flag::Carry, wrapped);
    set_flags(status, acc);
    acc
}

/// SBC: returns `a - b (-1 if C)` modulo 256.
pub fn subtract(status: &mut Status, a: u8, b: u8) -> u8 {
    status.clear(Flag::Overflow);

    let mut acc = a;
    for _ in 0..b {
        acc = acc.wrapping_sub(1);
        if acc == 0xFF {
            status.set(Flag::Overflow);
        }
    }

    if status.is_set(Flag::Carry) {
        acc = acc.wrapping_sub(1);
        if acc == 0xFF {
            status.set(Flag::Overflow);
        }
    }

    let wrapped = status.is_set(Flag::Overflow);
    status.assign(Flag::Carry, wrapped);
    set_flags(status, acc);
    acc
}

/// ASL: C takes bit 7.
pub fn shift_left(status: &mut Status, value: u8) -> u8 {
    status.assign(Flag::Carry, value & 0x80 != 0);
    let result = value << 1;
    set_flags(status, result);
    result
}

/// LSR: C takes bit 0.
pub fn shift_right(status: &mut Status, value: u8) -> u8 {
    status.assign(Flag::Carry, value & 0x01 != 0);
    let result = value >> 1;
    set_flags(status, result);
    result
}

/// ROL: shift left, then the old carry goes into bit 0.
/// N and Z reflect the value before the carry is merged in.
pub fn rotate_left(status: &mut Status, value: u8) -> u8 {
    let carry_in = status.is_set(Flag::Carry);
    let result = shift_left(status, value);
    if carry_in { result | 0x01 } else { result }
}

/// ROR: shift right, then the old carry goes into bit 7.
/// N and Z reflect the value before the carry is merged in.
pub fn rotate_right(status: &mut Status, value: u8) -> u8 {
    let carry_in = status.is_set(Flag::Carry);
    let result = shift_right(status, value);
    if carry_in { result | 0x80 } else { result }
}

pub fn increment(status: &mut Status, value: u8) -> u8 {
    let result = value.wrapping_add(1);
    set_flags(status, result);
    result
}

pub fn decrement(status: &mut Status, value: u8) -> u8 {
    let result = value.wrapping_sub(1);
    set_flags(status, result);
    result
}
