//! CPU execution engine for the 6502.
//!
//! Implements the fetch-decode-execute cycle, the stack primitives and all
//! instruction behaviors. `step` never fails: unmapped opcode bytes take
//! the BRK path and stop the run.

use std::path::Path;

use crate::cpu::addressing::{self, Operand};
use crate::cpu::alu;
use crate::cpu::memory::{Memory, STACK_BASE};
use crate::cpu::opcodes::{self, AddrMode, Opcode, Operation};
use crate::cpu::registers::{Flag, FlagClear, RegisterSnapshot, Registers, Status};
use crate::image::{self, ImageError, ProgramImage};
use serde::{Serialize, Deserialize};

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// CPU is running normally.
    Running,
    /// CPU has stopped on BRK or an unmapped opcode.
    Halted,
}

/// Per-machine emulation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CpuConfig {
    /// How CLC/CLV/etc. and the flag engine clear bits.
    pub flag_clear: FlagClear,
}

/// A register or memory cell that a read-modify-write instruction updates.
#[derive(Debug, Clone, Copy)]
enum Target {
    A,
    X,
    Y,
    Memory(u16),
}

type Primitive = fn(&mut Status, u8) -> u8;

/// One emulated 6502 machine.
#[derive(Clone)]
pub struct Cpu {
    /// CPU registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Current execution state.
    pub state: CpuState,
    /// Instructions executed (for profiling).
    pub steps: u64,
    config: CpuConfig,
}

impl Cpu {
    /// Create a new CPU with zeroed state and default options.
    pub fn new() -> Self {
        Self::with_config(CpuConfig::default())
    }

    pub fn with_config(config: CpuConfig) -> Self {
        Self {
            regs: Registers::new(config.flag_clear),
            mem: Memory::new(),
            state: CpuState::Running,
            steps: 0,
            config,
        }
    }

    pub fn config(&self) -> CpuConfig {
        self.config
    }

    /// Reset the CPU to power-on state, clearing memory.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.state = CpuState::Running;
        self.steps = 0;
        log::debug!("cpu reset");
    }

    /// Copy an image into memory and point PC at its load address.
    pub fn load_image(&mut self, image: &ProgramImage) {
        self.mem.load(image.load_address, &image.bytes);
        self.regs.pc = image.load_address;
        self.state = CpuState::Running;
    }

    /// Read an image file and load it. On error the CPU is left untouched.
    /// Returns the load address.
    pub fn load_image_file<P: AsRef<Path>>(&mut self, path: P) -> Result<u16, ImageError> {
        let image = image::load_image(path)?;
        self.load_image(&image);
        Ok(image.load_address)
    }

    /// Store a single byte, e.g. a trap instruction at a fixed address.
    pub fn plant(&mut self, addr: u16, byte: u8) {
        self.mem.write(addr, byte);
    }

    /// Read-only copy of A, X, Y, SP, PC and the flags byte.
    pub fn registers(&self) -> RegisterSnapshot {
        self.regs.snapshot()
    }

    // ==================== Stack ====================

    /// Store at `0x0100 | SP`, then decrement SP (wrapping).
    pub fn push(&mut self, value: u8) {
        self.mem.write(STACK_BASE | self.regs.sp as u16, value);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
    }

    /// Increment SP (wrapping), then read `0x0100 | SP`.
    pub fn pop(&mut self) -> u8 {
        self.regs.sp = self.regs.sp.wrapping_add(1);
        self.mem.read(STACK_BASE | self.regs.sp as u16)
    }

    /// Push PC high byte first, so the low byte pops first.
    pub fn push_pc(&mut self) {
        let [lo, hi] = self.regs.pc.to_le_bytes();
        self.push(hi);
        self.push(lo);
    }

    pub fn pop_pc(&mut self) {
        let lo = self.pop();
        let hi = self.pop();
        self.regs.pc = u16::from_le_bytes([lo, hi]);
    }

    // ==================== Execution ====================

    /// Execute the instruction at PC.
    ///
    /// Returns `false` when the instruction was BRK or an unmapped opcode;
    /// the host should stop calling `step` at that point.
    pub fn step(&mut self) -> bool {
        let pc = self.regs.pc;
        let byte = self.mem.read(pc);
        self.steps += 1;

        let Some(opcode) = opcodes::decode(byte) else {
            log::warn!("unrecognized opcode ${:02X} at ${:04X}, halting", byte, pc);
            self.brk();
            return false;
        };

        log::trace!("${:04X}: {:02X} {}", pc, byte, opcode.mnemonic());
        self.execute(opcode)
    }

    /// Run until halt.
    ///
    /// Returns the number of instructions executed. A program that never
    /// reaches BRK never returns; use `run_limited` for untrusted images.
    pub fn run(&mut self) -> u64 {
        let start_steps = self.steps;

        while self.is_running() {
            self.step();
        }

        self.steps - start_steps
    }

    /// Run for at most `max_steps` instructions.
    pub fn run_limited(&mut self, max_steps: u64) -> u64 {
        let start_steps = self.steps;
        let limit = self.steps.saturating_add(max_steps);

        while self.is_running() && self.steps < limit {
            self.step();
        }

        self.steps - start_steps
    }

    /// Execute a decoded instruction.
    fn execute(&mut self, opcode: Opcode) -> bool {
        use Operation::*;

        // Control flow reads its own operands before moving PC.
        match opcode.operation {
            Jmp | Jsr => {
                let target = match opcode.mode {
                    AddrMode::Indirect => addressing::indirect_target(&self.regs, &self.mem),
                    _ => addressing::operand_word(&self.regs, &self.mem),
                };
                // Both push the address of the instruction's last byte.
                self.regs.advance_pc(2);
                self.push_pc();
                self.regs.pc = target;
                return true;
            }
            Rts => {
                self.pop_pc();
                self.regs.advance_pc(1);
                return true;
            }
            Rti => {
                let flags = self.pop();
                self.regs.status.set_bits(flags);
                self.pop_pc();
                self.regs.advance_pc(1);
                return true;
            }
            Brk => {
                self.brk();
                return false;
            }
            _ => {}
        }

        let operand = addressing::resolve(&mut self.regs, &self.mem, opcode.mode);

        match opcode.operation {
            // ==================== Load / Store ====================

            Lda => {
                self.regs.a = self.read_operand(operand);
                alu::set_flags(&mut self.regs.status, self.regs.a);
            }
            Ldx => {
                self.regs.x = self.read_operand(operand);
                alu::set_flags(&mut self.regs.status, self.regs.x);
            }
            Ldy => {
                self.regs.y = self.read_operand(operand);
                alu::set_flags(&mut self.regs.status, self.regs.y);
            }

            Sta => self.write_operand(operand, self.regs.a),
            Stx => self.write_operand(operand, self.regs.x),
            Sty => self.write_operand(operand, self.regs.y),

            // ==================== Transfer ====================

            Tax => {
                self.regs.x = self.regs.a;
                alu::set_flags(&mut self.regs.status, self.regs.x);
            }
            Txa => {
                self.regs.a = self.regs.x;
                alu::set_flags(&mut self.regs.status, self.regs.a);
            }
            Tay => {
                self.regs.y = self.regs.a;
                alu::set_flags(&mut self.regs.status, self.regs.y);
            }
            Tya => {
                self.regs.a = self.regs.y;
                alu::set_flags(&mut self.regs.status, self.regs.a);
            }
            Tsx => {
                self.regs.x = self.regs.sp;
                alu::set_flags(&mut self.regs.status, self.regs.x);
            }
            Txs => self.regs.sp = self.regs.x,

            // ==================== Increment / Decrement ====================

            Inc => self.modify(Self::target_of(operand), alu::increment),
            Dec => self.modify(Self::target_of(operand), alu::decrement),
            Inx => self.modify(Target::X, alu::increment),
            Iny => self.modify(Target::Y, alu::increment),
            Dex => self.modify(Target::X, alu::decrement),
            Dey => self.modify(Target::Y, alu::decrement),

            // ==================== Compare ====================

            Cmp => {
                let value = self.read_operand(operand);
                alu::compare(&mut self.regs.status, self.regs.a, value);
            }
            Cpx => {
                let value = self.read_operand(operand);
                alu::compare(&mut self.regs.status, self.regs.x, value);
            }
            Cpy => {
                let value = self.read_operand(operand);
                alu::compare(&mut self.regs.status, self.regs.y, value);
            }

            // ==================== Logical ====================

            // AND leaves the flags alone.
            And => self.regs.a &= self.read_operand(operand),
            Ora => {
                self.regs.a |= self.read_operand(operand);
                alu::set_flags(&mut self.regs.status, self.regs.a);
            }
            Eor => {
                self.regs.a ^= self.read_operand(operand);
                alu::set_flags(&mut self.regs.status, self.regs.a);
            }

            // ==================== Shift / Rotate ====================

            Asl => self.modify(Self::target_of(operand), alu::shift_left),
            Lsr => self.modify(Self::target_of(operand), alu::shift_right),
            Rol => self.modify(Self::target_of(operand), alu::rotate_left),
            Ror => self.modify(Self::target_of(operand), alu::rotate_right),

            // ==================== Arithmetic ====================

            Adc => {
                let value = self.read_operand(operand);
                self.regs.a = alu::add(&mut self.regs.status, self.regs.a, value);
            }
            Sbc => {
                let value = self.read_operand(operand);
                self.regs.a = alu::subtract(&mut self.regs.status, self.regs.a, value);
            }

            // ==================== Branches ====================

            Bcc => self.branch_if(operand, !self.regs.status.is_set(Flag::Carry)),
            Bcs => self.branch_if(operand, self.regs.status.is_set(Flag::Carry)),
            Beq => self.branch_if(operand, self.regs.status.is_set(Flag::Zero)),
            Bne => self.branch_if(operand, !self.regs.status.is_set(Flag::Zero)),
            Bmi => self.branch_if(operand, self.regs.status.is_set(Flag::Negative)),
            Bpl => self.branch_if(operand, !self.regs.status.is_set(Flag::Negative)),
            Bvc => self.branch_if(operand, !self.regs.status.is_set(Flag::Overflow)),
            Bvs => self.branch_if(operand, self.regs.status.is_set(Flag::Overflow)),

            // ==================== Flags ====================

            Sec => self.regs.status.set(Flag::Carry),
            Sed => self.regs.status.set(Flag::Decimal),
            Sei => self.regs.status.set(Flag::InterruptDisable),
            Clc => self.regs.status.clear(Flag::Carry),
            Cld => self.regs.status.clear(Flag::Decimal),
            Cli => self.regs.status.clear(Flag::InterruptDisable),
            Clv => self.regs.status.clear(Flag::Overflow),

            // ==================== Stack ====================

            Pha => self.push(self.regs.a),
            Php => self.push(self.regs.status.bits()),
            Pla => self.regs.a = self.pop(),
            Plp => {
                let flags = self.pop();
                self.regs.status.set_bits(flags);
            }

            // Control flow returned early above.
            Nop | Jmp | Jsr | Rts | Rti | Brk => {}
        }

        true
    }

    /// BRK and unmapped opcodes: push PC+2 and the flags, set I, halt.
    /// PC is left on the halting instruction.
    fn brk(&mut self) {
        self.regs.advance_pc(2);
        self.push_pc();
        self.regs.pc = self.regs.pc.wrapping_sub(2);
        let flags = self.regs.status.bits();
        self.push(flags);
        self.regs.status.set(Flag::InterruptDisable);
        self.state = CpuState::Halted;
        log::info!("halted at ${:04X} after {} steps", self.regs.pc, self.steps);
    }

    /// PC already points past the branch; add the signed displacement.
    fn branch_if(&mut self, operand: Operand, condition: bool) {
        if let Operand::Relative(offset) = operand {
            if condition {
                self.regs.pc = self.regs.pc.wrapping_add_signed(offset as i16);
            }
        }
    }

    fn target_of(operand: Operand) -> Target {
        match operand {
            Operand::Address(addr) => Target::Memory(addr),
            _ => Target::A,
        }
    }

    fn read_operand(&self, operand: Operand) -> u8 {
        match operand {
            Operand::Immediate(value) => value,
            Operand::Address(addr) => self.mem.read(addr),
            Operand::Accumulator => self.regs.a,
            Operand::Implied | Operand::Relative(_) => 0,
        }
    }

    fn write_operand(&mut self, operand: Operand, value: u8) {
        if let Operand::Address(addr) = operand {
            self.mem.write(addr, value);
        }
    }

    fn read_target(&self, target: Target) -> u8 {
        match target {
            Target::A => self.regs.a,
            Target::X => self.regs.x,
            Target::Y => self.regs.y,
            Target::Memory(addr) => self.mem.read(addr),
        }
    }

    fn write_target(&mut self, target: Target, value: u8) {
        match target {
            Target::A => self.regs.a = value,
            Target::X => self.regs.x = value,
            Target::Y => self.regs.y = value,
            Target::Memory(addr) => self.mem.write(addr, value),
        }
    }

    /// Read-modify-write through one of the ALU primitives.
    fn modify(&mut self, target: Target, primitive: Primitive) {
        let value = self.read_target(target);
        let result = primitive(&mut self.regs.status, value);
        self.write_target(target, result);
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("steps", &self.steps)
            .field("regs", &self.regs)
            .finish()
    }
}
