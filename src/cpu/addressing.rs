//! Addressing-mode resolution.
//!
//! Operand bytes follow the opcode little-endian: `l` at PC+1, `h` at PC+2.
//! All address arithmetic wraps within its width (8 bits for zero-page
//! indexing, 16 bits otherwise), so no mode can produce an invalid address.

use crate::cpu::memory::Memory;
use crate::cpu::opcodes::AddrMode;
use crate::cpu::registers::Registers;

/// What an instruction operates on once its operand bytes are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// No operand.
    Implied,
    /// The accumulator.
    Accumulator,
    /// The operand byte itself.
    Immediate(u8),
    /// A memory cell.
    Address(u16),
    /// Branch displacement.
    Relative(i8),
}

/// Low operand byte of the instruction at PC.
#[inline]
fn low(regs: &Registers, mem: &Memory) -> u8 {
    mem.read(regs.pc.wrapping_add(1))
}

/// 16-bit operand of the instruction at PC.
#[inline]
pub fn operand_word(regs: &Registers, mem: &Memory) -> u16 {
    let l = mem.read(regs.pc.wrapping_add(1)) as u16;
    let h = mem.read(regs.pc.wrapping_add(2)) as u16;
    (h << 8) | l
}

/// Read a pointer from page zero. The high byte comes from `ptr + 1`
/// without wrapping back into page zero.
#[inline]
fn zero_page_pointer(mem: &Memory, lo_addr: u16, hi_addr: u16) -> u16 {
    let lo = mem.read(lo_addr) as u16;
    let hi = mem.read(hi_addr) as u16;
    (hi << 8) | lo
}

/// Target of `JMP (nnnn)`. Only the low operand byte is used as a
/// page-zero pointer; the high operand byte is ignored.
pub fn indirect_target(regs: &Registers, mem: &Memory) -> u16 {
    let l = low(regs, mem) as u16;
    zero_page_pointer(mem, l, l + 1)
}

/// Compute the effective address for the instruction at PC without
/// moving PC. Returns `None` for modes that do not address memory.
pub fn effective_address(regs: &Registers, mem: &Memory, mode: AddrMode) -> Option<u16> {
    let addr = match mode {
        AddrMode::Implied
        | AddrMode::Accumulator
        | AddrMode::Immediate
        | AddrMode::Relative => return None,

        AddrMode::ZeroPage => low(regs, mem) as u16,
        AddrMode::ZeroPageX => low(regs, mem).wrapping_add(regs.x) as u16,
        AddrMode::ZeroPageY => low(regs, mem).wrapping_add(regs.y) as u16,

        AddrMode::Absolute => operand_word(regs, mem),
        AddrMode::AbsoluteX => operand_word(regs, mem).wrapping_add(regs.x as u16),
        AddrMode::AbsoluteY => operand_word(regs, mem).wrapping_add(regs.y as u16),

        AddrMode::Indirect => indirect_target(regs, mem),
        AddrMode::IndirectX => {
            let l = low(regs, mem);
            let lo_addr = l.wrapping_add(regs.x) as u16;
            let hi_addr = l as u16 + regs.x as u16 + 1;
            zero_page_pointer(mem, lo_addr, hi_addr)
        }
        AddrMode::IndirectY => {
            let l = low(regs, mem) as u16;
            zero_page_pointer(mem, l, l + 1).wrapping_add(regs.y as u16)
        }
    };

    Some(addr)
}

/// Decode the operand of the instruction at PC and advance PC past it.
pub fn resolve(regs: &mut Registers, mem: &Memory, mode: AddrMode) -> Operand {
    let operand = match mode {
        AddrMode::Implied => Operand::Implied,
        AddrMode::Accumulator => Operand::Accumulator,
        AddrMode::Immediate => Operand::Immediate(low(regs, mem)),
        AddrMode::Relative => Operand::Relative(low(regs, mem) as i8),
        _ => match effective_address(regs, mem, mode) {
            Some(addr) => Operand::Address(addr),
            None => Operand::Implied,
        },
    };

    regs.advance_pc(mode.len());
    operand
}
