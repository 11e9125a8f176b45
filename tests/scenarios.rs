//! End-to-end scenarios driven through the public `Cpu` API.
//!
//! Each test builds a fresh machine, loads a few bytes and steps it.

use s6502::cpu::addressing::effective_address;
use s6502::cpu::AddrMode;
use s6502::{Cpu, CpuConfig, CpuState, Flag, FlagClear, ProgramImage};

fn cpu_with(load_address: u16, bytes: &[u8]) -> Cpu {
    let mut cpu = Cpu::new();
    cpu.load_image(&ProgramImage::new(load_address, bytes.to_vec()));
    cpu
}

// ========== Immediate Load ==========

#[test]
fn test_lda_immediate_zero() {
    let mut cpu = cpu_with(0x0000, &[0xA9, 0x00]);

    assert!(cpu.step());

    assert_eq!(cpu.regs.a, 0x00);
    assert!(cpu.regs.status.is_set(Flag::Zero));
    assert!(!cpu.regs.status.is_set(Flag::Negative));
    assert_eq!(cpu.regs.pc, 0x0002);
}

// ========== Call / Trap Idiom ==========

#[test]
fn test_jsr_to_trap_returns_past_call() {
    let mut cpu = cpu_with(0x0000, &[0x20, 0x00, 0xF0, 0xEA]);
    cpu.plant(0xF000, 0x60);
    let sp_before = cpu.regs.sp;

    assert!(cpu.step());
    assert_eq!(cpu.regs.pc, 0xF000);

    assert!(cpu.step());
    assert_eq!(cpu.regs.pc, 0x0003);
    assert_eq!(cpu.regs.sp, sp_before);
}

#[test]
fn test_trap_sees_accumulator() {
    // LDA #'H'; JSR $F000; LDA #'i'; JSR $F000; BRK
    let program = [0xA9, b'H', 0x20, 0x00, 0xF0, 0xA9, b'i', 0x20, 0x00, 0xF0, 0x00];
    let mut cpu = cpu_with(0x0600, &program);
    cpu.plant(0xF000, 0x60);

    let mut output = Vec::new();
    while cpu.step() {
        if cpu.regs.pc == 0xF000 {
            output.push(cpu.regs.a);
        }
    }

    assert_eq!(output, b"Hi");
    assert!(cpu.is_halted());
}

// ========== Address Wraparound ==========

#[test]
fn test_absolute_x_wraps_into_stack_page() {
    // LDA $0001,X with X = $FF
    let mut cpu = cpu_with(0x0600, &[0xBD, 0x01, 0x00]);
    cpu.regs.x = 0xFF;
    cpu.mem.write(0x0100, 0x5A);

    assert_eq!(effective_address(&cpu.regs, &cpu.mem, AddrMode::AbsoluteX), Some(0x0100));
    cpu.step();
    assert_eq!(cpu.regs.a, 0x5A);
}

#[test]
fn test_pc_wraps_at_top_of_memory() {
    let mut cpu = cpu_with(0xFFFF, &[0xEA]);
    assert!(cpu.step());
    assert_eq!(cpu.regs.pc, 0x0000);
}

// ========== Halting ==========

#[test]
fn test_unmapped_opcode_halts_with_interrupt_disable() {
    let mut cpu = cpu_with(0x0000, &[0xFF]);

    assert!(!cpu.step());
    assert!(cpu.regs.status.is_set(Flag::InterruptDisable));
    assert_eq!(cpu.state, CpuState::Halted);
}

#[test]
fn test_bit_opcodes_halt() {
    for opcode in [0x24, 0x2C] {
        let mut cpu = cpu_with(0x0600, &[opcode, 0x10, 0x00]);
        assert!(!cpu.step(), "opcode ${:02X} should halt", opcode);
    }
}

#[test]
fn test_brk_pushes_pc_plus_two_and_flags() {
    let mut cpu = cpu_with(0x1234, &[0x00]);
    cpu.regs.status.set(Flag::Zero);

    assert!(!cpu.step());

    assert_eq!(cpu.regs.pc, 0x1234);
    assert_eq!(cpu.regs.sp, 0xFC);
    assert_eq!(cpu.mem.read(0x01FF), 0x12);
    assert_eq!(cpu.mem.read(0x01FE), 0x36);
    assert_eq!(cpu.mem.read(0x01FD), Flag::Zero.mask());
}

#[test]
fn test_run_counts_steps() {
    let mut cpu = cpu_with(0x0600, &[0xE8, 0xE8, 0xE8, 0x00]);
    assert_eq!(cpu.run(), 4);
    assert_eq!(cpu.regs.x, 3);
    assert_eq!(cpu.steps, 4);
}

// ========== Control Flow ==========

#[test]
fn test_jmp_pushes_return_address() {
    let mut cpu = cpu_with(0x0600, &[0x4C, 0x00, 0x08]);
    cpu.step();

    assert_eq!(cpu.regs.pc, 0x0800);
    assert_eq!(cpu.regs.sp, 0xFD);
    assert_eq!(cpu.mem.read(0x01FF), 0x06);
    assert_eq!(cpu.mem.read(0x01FE), 0x02);
}

#[test]
fn test_counting_loop() {
    // LDX #$00; INX; CPX #$10; BNE -5; STX $20; BRK
    let program = [0xA2, 0x00, 0xE8, 0xE0, 0x10, 0xD0, 0xFB, 0x86, 0x20, 0x00];
    let mut cpu = cpu_with(0x0600, &program);

    cpu.run_limited(1000);

    assert!(cpu.is_halted());
    assert_eq!(cpu.mem.read(0x0020), 0x10);
}

// ========== Flag Clearing Policy ==========

#[test]
fn test_clc_clears_one_bit_by_default() {
    // SEC; SED; CLC
    let mut cpu = cpu_with(0x0600, &[0x38, 0xF8, 0x18, 0x00]);
    cpu.run();
    assert!(cpu.regs.status.is_set(Flag::Decimal));
    assert!(!cpu.regs.status.is_set(Flag::Carry));
}

#[test]
fn test_clc_clears_everything_under_legacy_policy() {
    let mut cpu = Cpu::with_config(CpuConfig { flag_clear: FlagClear::WholeRegister });
    cpu.load_image(&ProgramImage::new(0x0600, vec![0x38, 0xF8, 0x18]));

    for _ in 0..3 {
        cpu.step();
    }
    assert_eq!(cpu.regs.status.bits(), 0x00);
}

// ========== Image Loading ==========

#[test]
fn test_load_image_file_sets_pc() {
    let path = std::env::temp_dir().join(format!("s6502-scenario-{}.bin", std::process::id()));
    std::fs::write(&path, [0x00, 0xC0, 0xA9, 0x41, 0x00]).unwrap();

    let mut cpu = Cpu::new();
    let addr = cpu.load_image_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(addr, 0xC000);
    assert_eq!(cpu.regs.pc, 0xC000);
    cpu.run();
    assert_eq!(cpu.regs.a, 0x41);
}

#[test]
fn test_failed_load_leaves_state_unchanged() {
    let mut cpu = cpu_with(0x0600, &[0xA9, 0x42]);
    cpu.step();
    let before = cpu.registers();

    let missing = std::env::temp_dir().join("s6502-no-such-image.bin");
    assert!(cpu.load_image_file(&missing).is_err());

    assert_eq!(cpu.registers(), before);
    assert_eq!(cpu.mem.read(0x0600), 0xA9);
    assert!(cpu.is_running());
}

#[test]
fn test_register_dump_layout() {
    let mut cpu = cpu_with(0x0600, &[0xA9, 0x80, 0x00]);
    cpu.step();

    assert_eq!(
        cpu.registers().to_string(),
        "X: $00  Y:$00  a:$80\nSP: $FF PC: $0602\nNV--DIZC\n10000000"
    );
}
