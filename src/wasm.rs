//! WebAssembly bindings for the 6502 emulator.
//!
//! This module provides JavaScript-friendly wrappers around the core emulator.

use wasm_bindgen::prelude::*;
use crate::asm::disasm::disassemble_instruction;
use crate::cpu::{Cpu, CpuConfig, FlagClear};
use crate::image::ProgramImage;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly CPU wrapper.
#[wasm_bindgen]
pub struct WasmCpu {
    cpu: Cpu,
    image: Option<ProgramImage>,
}

#[wasm_bindgen]
impl WasmCpu {
    /// Create a new CPU instance.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            image: None,
        }
    }

    /// Create a CPU whose flag clears zero the whole status byte.
    #[wasm_bindgen]
    pub fn with_legacy_flags() -> Self {
        Self {
            cpu: Cpu::with_config(CpuConfig { flag_clear: FlagClear::WholeRegister }),
            image: None,
        }
    }

    /// Load an image (two-byte load address, then payload).
    /// Returns the load address.
    #[wasm_bindgen]
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<u16, JsError> {
        let image = ProgramImage::parse(bytes)
            .map_err(|e| JsError::new(&format!("{}", e)))?;

        self.cpu.reset();
        self.cpu.load_image(&image);
        let addr = image.load_address;
        self.image = Some(image);
        Ok(addr)
    }

    /// Step one instruction. Returns the disassembled instruction.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        if !self.cpu.is_running() {
            return Err(JsError::new("CPU is halted"));
        }

        let (text, _) = disassemble_instruction(&self.cpu.mem, self.cpu.regs.pc);
        self.cpu.step();
        Ok(text)
    }

    /// Run until halt or `max_steps`. Returns the total step count.
    #[wasm_bindgen]
    pub fn run(&mut self, max_steps: u32) -> u64 {
        self.cpu.run_limited(max_steps as u64);
        self.cpu.steps
    }

    /// Reset CPU to initial state with the loaded image.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.cpu.reset();
        if let Some(image) = &self.image {
            self.cpu.load_image(image);
        }
    }

    /// Check if CPU is running.
    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.cpu.is_running()
    }

    /// Check if CPU is halted.
    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    #[wasm_bindgen]
    pub fn steps(&self) -> u64 {
        self.cpu.steps
    }

    #[wasm_bindgen]
    pub fn pc(&self) -> u16 {
        self.cpu.regs.pc
    }

    #[wasm_bindgen]
    pub fn a(&self) -> u8 {
        self.cpu.regs.a
    }

    #[wasm_bindgen]
    pub fn x(&self) -> u8 {
        self.cpu.regs.x
    }

    #[wasm_bindgen]
    pub fn y(&self) -> u8 {
        self.cpu.regs.y
    }

    #[wasm_bindgen]
    pub fn sp(&self) -> u8 {
        self.cpu.regs.sp
    }

    /// Status byte (NV--DIZC).
    #[wasm_bindgen]
    pub fn flags(&self) -> u8 {
        self.cpu.regs.status.bits()
    }

    /// Get state as string.
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        format!("{:?}", self.cpu.state)
    }

    #[wasm_bindgen]
    pub fn memory_at(&self, addr: u16) -> u8 {
        self.cpu.mem.read(addr)
    }

    /// Copy of one 256-byte page.
    #[wasm_bindgen]
    pub fn memory_page(&self, page: u8) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(self.cpu.mem.page(page))
    }

    #[wasm_bindgen]
    pub fn disassemble_at(&self, addr: u16) -> String {
        disassemble_instruction(&self.cpu.mem, addr).0
    }

    /// Get registers as JSON string.
    #[wasm_bindgen]
    pub fn registers_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.cpu.registers())
            .map_err(|e| JsError::new(&format!("{}", e)))
    }

    /// Register dump in the `NV--DIZC` text layout.
    #[wasm_bindgen]
    pub fn registers_text(&self) -> String {
        self.cpu.registers().to_string()
    }
}

impl Default for WasmCpu {
    fn default() -> Self {
        Self::new()
    }
}
