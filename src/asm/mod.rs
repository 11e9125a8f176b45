//! Disassembler for 6502 programs.
//!
//! Driven by the same opcode table the CPU dispatches from, so anything the
//! CPU can execute has a listing and every unmapped byte shows as `???`.

pub mod disasm;

pub use disasm::{disassemble, disassemble_instruction, format_operand};
