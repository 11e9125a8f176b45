//! s6502 Emulator - CLI Entry Point
//!
//! Commands:
//! - `s6502-emu run <image>` - Run an image until it halts
//! - `s6502-emu trace <image>` - Run, dumping registers around every step
//! - `s6502-emu disasm <image>` - Disassemble an image
//! - `s6502-emu debug <image>` - Interactive debugger

use std::io::Write;

use clap::{Parser, Subcommand};
use s6502::{load_image, Cpu, CpuConfig, FlagClear, ProgramImage};

/// RTS, planted at the trap address.
const RTS: u8 = 0x60;

#[derive(Parser)]
#[command(name = "s6502-emu")]
#[command(version = "0.1.0")]
#[command(about = "An instruction-level MOS 6502 emulator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an image until it halts
    Run {
        /// Path to the image (2-byte load address + payload)
        image: String,
        /// Stop after this many instructions
        #[arg(short, long)]
        max_steps: Option<u64>,
        /// Plant RTS at ADDR (hex) and print A as a character whenever
        /// execution reaches it
        #[arg(long, value_name = "ADDR", num_args = 0..=1,
              default_missing_value = "F000", value_parser = parse_address)]
        trap: Option<u16>,
        /// Print the final registers as JSON
        #[arg(long)]
        json: bool,
        /// Flag clears zero the whole status byte
        #[arg(long)]
        legacy_flags: bool,
    },
    /// Run an image, printing the registers before every step and after the halt
    Trace {
        /// Path to the image
        image: String,
        /// Stop after this many instructions
        #[arg(short, long)]
        max_steps: Option<u64>,
        /// Flag clears zero the whole status byte
        #[arg(long)]
        legacy_flags: bool,
    },
    /// Disassemble an image's payload
    Disasm {
        /// Path to the image
        image: String,
    },
    /// Interactive debugger
    #[cfg(feature = "tui")]
    Debug {
        /// Path to the image
        image: String,
        /// Flag clears zero the whole status byte
        #[arg(long)]
        legacy_flags: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { image, max_steps, trap, json, legacy_flags }) => {
            run_program(&image, max_steps, trap, json, legacy_flags);
        }
        Some(Commands::Trace { image, max_steps, legacy_flags }) => {
            trace_program(&image, max_steps, legacy_flags);
        }
        Some(Commands::Disasm { image }) => {
            disassemble_file(&image);
        }
        #[cfg(feature = "tui")]
        Some(Commands::Debug { image, legacy_flags }) => {
            debug_program(&image, legacy_flags);
        }
        None => {
            println!("s6502 Emulator v0.1.0");
            println!("An instruction-level MOS 6502 emulator");
            println!();
            println!("Use --help for available commands");
        }
    }
}

fn parse_address(s: &str) -> Result<u16, String> {
    let digits = s
        .trim_start_matches('$')
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn config(legacy_flags: bool) -> CpuConfig {
    let flag_clear = if legacy_flags {
        FlagClear::WholeRegister
    } else {
        FlagClear::Bitwise
    };
    CpuConfig { flag_clear }
}

fn load_or_exit(path: &str) -> ProgramImage {
    match load_image(path) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("❌ Failed to load image: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_program(path: &str, max_steps: Option<u64>, trap: Option<u16>, json: bool, legacy_flags: bool) {
    let image = load_or_exit(path);
    if !json {
        println!("📂 Loaded {} bytes at ${:04X}", image.len(), image.load_address);
    }

    let mut cpu = Cpu::with_config(config(legacy_flags));
    cpu.load_image(&image);
    if let Some(addr) = trap {
        cpu.plant(addr, RTS);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let limit = max_steps.unwrap_or(u64::MAX);
    let mut executed = 0u64;

    while executed < limit {
        let more = cpu.step();
        executed += 1;
        if !more {
            break;
        }
        if trap == Some(cpu.regs.pc) {
            if let Err(e) = out.write_all(&[cpu.regs.a]).and_then(|_| out.flush()) {
                eprintln!("❌ Failed to write output: {}", e);
                std::process::exit(1);
            }
        }
    }

    if json {
        match serde_json::to_string_pretty(&cpu.registers()) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to encode registers: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!();
    println!("━━━ Result ━━━");
    println!("Steps: {}", executed);
    println!("State: {:?}", cpu.state);
    println!("{}", cpu.registers());

    if cpu.is_running() {
        println!();
        println!("⚠️  Reached max steps limit ({}). Use --max-steps to increase.", executed);
    }
}

fn trace_program(path: &str, max_steps: Option<u64>, legacy_flags: bool) {
    let image = load_or_exit(path);
    let mut cpu = Cpu::with_config(config(legacy_flags));
    cpu.load_image(&image);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = write_trace(&mut cpu, max_steps.unwrap_or(u64::MAX), &mut out) {
        eprintln!("❌ Failed to write output: {}", e);
        std::process::exit(1);
    }
}

/// Dump the registers before every step and once more after the halting
/// step. Hitting `limit` ends the trace on the last dump already written.
fn write_trace<W: Write>(cpu: &mut Cpu, limit: u64, out: &mut W) -> std::io::Result<()> {
    let mut executed = 0u64;

    loop {
        writeln!(out, "{}", cpu.registers())?;
        if executed >= limit {
            return Ok(());
        }
        if !cpu.step() {
            break;
        }
        executed += 1;
    }
    writeln!(out, "{}", cpu.registers())
}

fn disassemble_file(path: &str) {
    use s6502::{disassemble, Memory};

    let image = load_or_exit(path);
    println!("📖 Disassembling: {} (${:04X}, {} bytes)", path, image.load_address, image.len());
    println!();

    let mut mem = Memory::new();
    mem.load(image.load_address, &image.bytes);
    print!("{}", disassemble(&mem, image.load_address, image.len()));
}

#[cfg(feature = "tui")]
fn debug_program(path: &str, legacy_flags: bool) {
    use s6502::tui::run_debugger;

    let image = load_or_exit(path);
    println!("🔍 Loaded {} bytes at ${:04X}", image.len(), image.load_address);
    println!("🚀 Launching debugger...");
    println!();

    if let Err(e) = run_debugger(image, config(legacy_flags)) {
        eprintln!("❌ Debugger error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traced(bytes: &[u8], limit: u64) -> Vec<String> {
        let mut cpu = Cpu::new();
        cpu.load_image(&ProgramImage::new(0x0600, bytes.to_vec()));
        let mut out = Vec::new();
        write_trace(&mut cpu, limit, &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .filter(|line| line.starts_with("SP:"))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_trace_dumps_before_each_step_and_after_halt() {
        // NOP; BRK
        let pcs = traced(&[0xEA, 0x00], u64::MAX);
        assert_eq!(pcs, ["SP: $FF PC: $0600", "SP: $FF PC: $0601", "SP: $FC PC: $0601"]);
    }

    #[test]
    fn test_trace_limit_prints_last_state_once() {
        let pcs = traced(&[0xEA, 0xEA, 0xEA, 0x00], 2);
        assert_eq!(pcs, ["SP: $FF PC: $0600", "SP: $FF PC: $0601", "SP: $FF PC: $0602"]);
    }

    #[test]
    fn test_parse_address_forms() {
        assert_eq!(parse_address("F000"), Ok(0xF000));
        assert_eq!(parse_address("$0600"), Ok(0x0600));
        assert_eq!(parse_address("0x10"), Ok(0x0010));
        assert!(parse_address("zz").is_err());
    }
}
