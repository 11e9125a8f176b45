//! Property-based tests for CPU invariants.
//!
//! These tests use proptest to check flag, stack, branch and addressing
//! behavior across the whole input space.

use proptest::prelude::*;
use s6502::cpu::addressing::effective_address;
use s6502::cpu::alu;
use s6502::cpu::{AddrMode, OPCODE_TABLE, Status};
use s6502::{Cpu, Flag, FlagClear, ProgramImage};

fn cpu_with(load_address: u16, bytes: &[u8]) -> Cpu {
    let mut cpu = Cpu::new();
    cpu.load_image(&ProgramImage::new(load_address, bytes.to_vec()));
    cpu
}

/// Opcodes that only advance PC by their length.
fn straight_line_opcodes() -> Vec<u8> {
    OPCODE_TABLE
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| entry.map(|op| (i as u8, op)))
        .filter(|(_, op)| {
            !matches!(
                op.mnemonic(),
                "BCC" | "BCS" | "BEQ" | "BMI" | "BNE" | "BPL" | "BVC" | "BVS" | "JMP" | "JSR"
                    | "RTS" | "RTI" | "BRK"
            )
        })
        .map(|(i, _)| i)
        .collect()
}

// ========== Flag Engine ==========

proptest! {
    /// Property: Z and N follow the value regardless of their prior state
    #[test]
    fn prop_set_flags_reflects_value(value in any::<u8>(), prior in any::<u8>()) {
        let mut status = Status::new(FlagClear::Bitwise);
        status.set_bits(prior);

        alu::set_flags(&mut status, value);

        prop_assert_eq!(status.is_set(Flag::Zero), value == 0);
        prop_assert_eq!(status.is_set(Flag::Negative), value & 0x80 != 0);
        // Everything else is untouched.
        prop_assert_eq!(status.bits() & 0x7D, prior & 0x7D);
    }

    /// Property: INC then DEC on a memory cell restores it
    #[test]
    fn prop_inc_dec_restores(value in any::<u8>()) {
        // INC $10; DEC $10
        let mut cpu = cpu_with(0x0600, &[0xE6, 0x10, 0xC6, 0x10]);
        cpu.mem.write(0x0010, value);

        cpu.step();
        cpu.step();

        prop_assert_eq!(cpu.mem.read(0x0010), value);
        prop_assert_eq!(cpu.regs.status.is_set(Flag::Zero), value == 0);
        prop_assert_eq!(cpu.regs.status.is_set(Flag::Negative), value & 0x80 != 0);
    }

    /// Property: compare sets C exactly when the register is not below the operand
    #[test]
    fn prop_compare_carry(a in any::<u8>(), b in any::<u8>()) {
        let mut status = Status::new(FlagClear::Bitwise);
        alu::compare(&mut status, a, b);
        prop_assert_eq!(status.is_set(Flag::Carry), a >= b);
        prop_assert_eq!(status.is_set(Flag::Zero), a == b);
    }

    /// Property: ADC without carry-in is modular addition, C set on wrap
    #[test]
    fn prop_add_is_modular(a in any::<u8>(), b in any::<u8>()) {
        let mut status = Status::new(FlagClear::Bitwise);
        let result = alu::add(&mut status, a, b);
        prop_assert_eq!(result, a.wrapping_add(b));
        prop_assert_eq!(status.is_set(Flag::Carry), a.checked_add(b).is_none());
    }
}

// ========== Stack ==========

proptest! {
    /// Property: push then pop returns the byte and restores SP
    #[test]
    fn prop_push_pop(value in any::<u8>(), sp in any::<u8>()) {
        let mut cpu = Cpu::new();
        cpu.regs.sp = sp;

        cpu.push(value);
        prop_assert_eq!(cpu.pop(), value);
        prop_assert_eq!(cpu.regs.sp, sp);
    }

    /// Property: push_pc then pop_pc leaves PC unchanged
    #[test]
    fn prop_push_pop_pc(pc in any::<u16>(), sp in any::<u8>()) {
        let mut cpu = Cpu::new();
        cpu.regs.pc = pc;
        cpu.regs.sp = sp;

        cpu.push_pc();
        cpu.regs.pc = 0;
        cpu.pop_pc();

        prop_assert_eq!(cpu.regs.pc, pc);
        prop_assert_eq!(cpu.regs.sp, sp);
    }
}

// ========== Branches ==========

proptest! {
    /// Property: a taken branch lands at PC+2 plus the signed displacement
    #[test]
    fn prop_branch_displacement_is_signed(start in 0x0200u16..0xFE00, offset in any::<u8>()) {
        // BNE with Z clear always branches.
        let mut cpu = cpu_with(start, &[0xD0, offset]);

        cpu.step();

        let expected = (start as i32 + 2 + offset as i8 as i32) as u16;
        prop_assert_eq!(cpu.regs.pc, expected);
    }

    /// Property: a branch not taken only skips the instruction
    #[test]
    fn prop_branch_not_taken(start in any::<u16>(), offset in any::<u8>()) {
        // BEQ with Z clear never branches.
        let mut cpu = cpu_with(start, &[0xF0, offset]);
        cpu.step();
        prop_assert_eq!(cpu.regs.pc, start.wrapping_add(2));
    }
}

#[test]
fn test_branch_extremes() {
    let mut cpu = cpu_with(0x0600, &[0xD0, 0x7F]);
    cpu.step();
    assert_eq!(cpu.regs.pc, 0x0602 + 127);

    let mut cpu = cpu_with(0x0600, &[0xD0, 0x80]);
    cpu.step();
    assert_eq!(cpu.regs.pc, 0x0602 - 128);
}

// ========== Addressing ==========

proptest! {
    /// Property: zero-page indexing never leaves page zero
    #[test]
    fn prop_zero_page_indexed_stays_in_page_zero(base in any::<u8>(), x in any::<u8>()) {
        let mut cpu = cpu_with(0x0600, &[0xB5, base]);
        cpu.regs.x = x;

        let addr = effective_address(&cpu.regs, &cpu.mem, AddrMode::ZeroPageX);
        prop_assert_eq!(addr, Some(base.wrapping_add(x) as u16));
    }

    /// Property: absolute indexing wraps modulo 64K
    #[test]
    fn prop_absolute_indexed_wraps(base in any::<u16>(), y in any::<u8>()) {
        let [lo, hi] = base.to_le_bytes();
        let mut cpu = cpu_with(0x0600, &[0xB9, lo, hi]);
        cpu.regs.y = y;

        let addr = effective_address(&cpu.regs, &cpu.mem, AddrMode::AbsoluteY);
        prop_assert_eq!(addr, Some(base.wrapping_add(y as u16)));
    }

    /// Property: straight-line instructions advance PC by their length
    #[test]
    fn prop_pc_advances_by_instruction_length(
        opcode in prop::sample::select(straight_line_opcodes()),
        operand1 in any::<u8>(),
        operand2 in any::<u8>(),
    ) {
        let mut cpu = cpu_with(0x8000, &[opcode, operand1, operand2]);
        let expected = OPCODE_TABLE[opcode as usize].map(|op| op.len()).unwrap_or(1);

        prop_assert!(cpu.step());
        prop_assert_eq!(cpu.regs.pc, 0x8000 + expected);
    }
}
