//! CPU emulation for the 6502.
//!
//! This module implements the instruction-level machine:
//! - 64K of byte-addressed memory with the stack in page one
//! - 6 registers: A, X, Y, SP, PC and the status byte P
//! - a 149-entry opcode table dispatched one instruction per step

pub mod memory;
pub mod registers;
pub mod opcodes;
pub mod addressing;
pub mod alu;
pub mod execute;

pub use memory::Memory;
pub use registers::{Flag, FlagClear, RegisterSnapshot, Registers, Status};
pub use opcodes::{decode, AddrMode, Opcode, Operation, OPCODE_TABLE};
pub use execute::{Cpu, CpuConfig, CpuState};
