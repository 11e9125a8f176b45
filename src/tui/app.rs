//! Debugger application state and logic.

use crate::asm::disasm::disassemble_instruction;
use crate::cpu::{Cpu, CpuConfig};
use crate::image::ProgramImage;
use std::collections::HashSet;

/// Bytes shown per memory row.
pub const MEM_ROW_BYTES: usize = 16;

/// Number of memory rows covering the full 64K.
pub const MEM_ROWS: usize = 0x1_0000 / MEM_ROW_BYTES;

/// Debugger application state.
pub struct DebuggerApp {
    /// The CPU being debugged.
    pub cpu: Cpu,
    /// Loaded image, kept for reset.
    pub image: ProgramImage,
    /// Breakpoints (by PC).
    pub breakpoints: HashSet<u16>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// First memory row shown.
    pub mem_scroll: usize,
    /// Let the next tick run past a breakpoint at PC.
    resume: bool,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded image.
    pub fn new(image: ProgramImage, config: CpuConfig) -> Self {
        let mut cpu = Cpu::with_config(config);
        cpu.load_image(&image);
        let mem_scroll = image.load_address as usize / MEM_ROW_BYTES;

        Self {
            cpu,
            image,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            mem_scroll,
            resume: false,
        }
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        if !self.cpu.is_running() {
            self.status = format!("CPU halted at ${:04X}", self.cpu.regs.pc);
            self.running = false;
            return;
        }

        let pc = self.cpu.regs.pc;
        let (disasm, _) = disassemble_instruction(&self.cpu.mem, pc);
        if self.cpu.step() {
            self.status = format!("${:04X}: {}", pc, disasm);
        } else {
            self.status = format!("Halted at ${:04X}: {}", pc, disasm);
            self.running = false;
        }
    }

    /// Run until halt or breakpoint.
    pub fn run(&mut self) {
        self.running = true;
        self.resume = true;
        self.status = "Running...".into();
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        if !self.cpu.is_running() {
            self.running = false;
            self.status = format!("Halted after {} steps", self.cpu.steps);
            return;
        }

        let pc = self.cpu.regs.pc;
        let resume = std::mem::take(&mut self.resume);
        if !resume && self.breakpoints.contains(&pc) {
            self.running = false;
            self.status = format!("Breakpoint at ${:04X}", pc);
            return;
        }

        self.step();
    }

    /// Toggle breakpoint at current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.cpu.regs.pc;
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at ${:04X}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at ${:04X}", pc);
        }
    }

    /// Reset CPU and reload the image. Breakpoints survive.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.cpu.load_image(&self.image);
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.mem_scroll = self.mem_scroll.saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.mem_scroll = (self.mem_scroll + rows).min(MEM_ROWS - 1);
    }

    /// Disassembly of `lines` instructions starting at PC.
    pub fn get_disassembly(&self, lines: usize) -> Vec<(u16, String, bool)> {
        let pc = self.cpu.regs.pc;
        let mut addr = pc;

        (0..lines)
            .map(|_| {
                let (text, len) = disassemble_instruction(&self.cpu.mem, addr);
                let line = (addr, text, addr == pc);
                addr = addr.wrapping_add(len);
                line
            })
            .collect()
    }
}

/// Run the debugger on an image.
pub fn run_debugger(image: ProgramImage, config: CpuConfig) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(image, config);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => app.scroll_up(1),
                        KeyCode::Down => app.scroll_down(1),
                        KeyCode::PageUp => app.scroll_up(16),
                        KeyCode::PageDown => app.scroll_down(16),
                        _ => {}
                    }
                }
            }
        }

        // Tick for continuous running
        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(bytes: &[u8]) -> DebuggerApp {
        DebuggerApp::new(ProgramImage::new(0x0600, bytes.to_vec()), CpuConfig::default())
    }

    #[test]
    fn test_step_updates_status() {
        let mut app = app(&[0xA9, 0x01, 0x00]);
        app.step();
        assert_eq!(app.status, "$0600: LDA #$01");
        assert_eq!(app.cpu.regs.a, 0x01);
    }

    #[test]
    fn test_run_stops_at_breakpoint() {
        let mut app = app(&[0xEA, 0xEA, 0xEA, 0x00]);
        app.cpu.regs.pc = 0x0602;
        app.toggle_breakpoint();
        app.cpu.regs.pc = 0x0600;

        app.run();
        for _ in 0..10 {
            app.tick();
        }

        assert!(!app.running);
        assert_eq!(app.cpu.regs.pc, 0x0602);
        assert!(app.cpu.is_running());
    }

    #[test]
    fn test_run_resumes_from_breakpoint() {
        let mut app = app(&[0xEA, 0xEA, 0xEA, 0x00]);
        app.cpu.regs.pc = 0x0601;
        app.toggle_breakpoint();
        app.cpu.regs.pc = 0x0600;

        app.run();
        for _ in 0..10 {
            app.tick();
        }
        assert_eq!(app.cpu.regs.pc, 0x0601);

        app.run();
        for _ in 0..10 {
            app.tick();
        }
        assert!(app.cpu.is_halted());
        assert_eq!(app.cpu.regs.pc, 0x0603);
    }

    #[test]
    fn test_reset_reloads_image() {
        let mut app = app(&[0xA9, 0x07, 0x85, 0x10, 0x00]);
        app.run();
        for _ in 0..10 {
            app.tick();
        }
        assert!(app.cpu.is_halted());

        app.reset();
        assert!(app.cpu.is_running());
        assert_eq!(app.cpu.regs.pc, 0x0600);
        assert_eq!(app.cpu.mem.read(0x0010), 0x00);
        assert_eq!(app.cpu.mem.read(0x0600), 0xA9);
    }

    #[test]
    fn test_disassembly_starts_at_pc() {
        let app = app(&[0xA9, 0x01, 0x8D, 0x00, 0x02]);
        let lines = app.get_disassembly(2);
        assert_eq!(lines[0], (0x0600, "LDA #$01".to_string(), true));
        assert_eq!(lines[1], (0x0602, "STA $0200".to_string(), false));
    }
}
