//! TUI debugger for the 6502 emulator.
//!
//! Provides an interactive terminal-based debugger with:
//! - Register and flag visualization
//! - Hex memory view
//! - Step/run/breakpoint controls
//! - Disassembly view

mod app;
mod ui;

pub use app::{DebuggerApp, run_debugger};
