//! # s6502
//!
//! An instruction-level emulator of the MOS 6502.
//!
//! The machine is a 64K flat memory plus the six 6502 registers. Each
//! call to [`Cpu::step`] executes one whole instruction; there is no cycle
//! timing, no interrupt lines and no decimal mode. Programs are loaded from
//! a two-byte-header binary image (see [`image`]).

pub mod cpu;
pub mod image;
pub mod asm;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use cpu::{Cpu, CpuConfig, CpuState, Flag, FlagClear, Memory, RegisterSnapshot, Registers};
pub use image::{load_image, save_image, ImageError, ProgramImage};
pub use asm::{disassemble, disassemble_instruction};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
