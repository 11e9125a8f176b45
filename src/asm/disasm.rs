//! Disassembler for 6502 programs.
//!
//! Converts bytes in memory back to readable assembly.

use crate::cpu::memory::Memory;
use crate::cpu::opcodes::{decode, AddrMode};

/// Disassemble the instruction at `addr`.
///
/// Returns the text and the number of bytes the instruction occupies.
/// Unmapped opcode bytes render as `???` with a length of one.
pub fn disassemble_instruction(mem: &Memory, addr: u16) -> (String, u16) {
    let byte = mem.read(addr);
    match decode(byte) {
        Some(opcode) => {
            let operand = format_operand(mem, addr, opcode.mode);
            let text = if operand.is_empty() {
                opcode.mnemonic().to_string()
            } else {
                format!("{} {}", opcode.mnemonic(), operand)
            };
            (text, opcode.len())
        }
        None => ("???".to_string(), 1),
    }
}

/// Disassemble the `len` bytes starting at `start`.
///
/// Each line shows the address, the raw bytes and the instruction. The last
/// instruction may extend past `start + len`.
pub fn disassemble(mem: &Memory, start: u16, len: usize) -> String {
    let mut output = String::new();
    let mut addr = start;
    let mut offset = 0usize;

    while offset < len {
        let (text, size) = disassemble_instruction(mem, addr);
        let raw: Vec<String> = (0..size)
            .map(|i| format!("{:02X}", mem.read(addr.wrapping_add(i))))
            .collect();
        output.push_str(&format!("${:04X}: {:<9} {}\n", addr, raw.join(" "), text));
        addr = addr.wrapping_add(size);
        offset += size as usize;
    }

    output
}

/// Format the operand of the instruction at `addr` for `mode`.
pub fn format_operand(mem: &Memory, addr: u16, mode: AddrMode) -> String {
    let l = mem.read(addr.wrapping_add(1));
    let word = mem.read_word(addr.wrapping_add(1));

    match mode {
        AddrMode::Implied => String::new(),
        AddrMode::Accumulator => "A".to_string(),
        AddrMode::Immediate => format!("#${:02X}", l),
        AddrMode::ZeroPage => format!("${:02X}", l),
        AddrMode::ZeroPageX => format!("${:02X},X", l),
        AddrMode::ZeroPageY => format!("${:02X},Y", l),
        AddrMode::Absolute => format!("${:04X}", word),
        AddrMode::AbsoluteX => format!("${:04X},X", word),
        AddrMode::AbsoluteY => format!("${:04X},Y", word),
        AddrMode::Indirect => format!("(${:04X})", word),
        AddrMode::IndirectX => format!("(${:02X},X)", l),
        AddrMode::IndirectY => format!("(${:02X}),Y", l),
        AddrMode::Relative => {
            let target = addr.wrapping_add(2).wrapping_add_signed(l as i8 as i16);
            format!("${:04X}", target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem_with(start: u16, bytes: &[u8]) -> Memory {
        let mut mem = Memory::new();
        mem.load(start, bytes);
        mem
    }

    #[test]
    fn test_disassemble_implied() {
        let mem = mem_with(0x0600, &[0xEA]);
        assert_eq!(disassemble_instruction(&mem, 0x0600), ("NOP".to_string(), 1));
    }

    #[test]
    fn test_disassemble_modes() {
        let cases: &[(&[u8], &str)] = &[
            (&[0xA9, 0x42], "LDA #$42"),
            (&[0xB5, 0x10], "LDA $10,X"),
            (&[0xB6, 0x10], "LDX $10,Y"),
            (&[0x8D, 0x00, 0x02], "STA $0200"),
            (&[0x7D, 0x34, 0x12], "ADC $1234,X"),
            (&[0x6C, 0x40, 0x00], "JMP ($0040)"),
            (&[0xA1, 0x20], "LDA ($20,X)"),
            (&[0x91, 0x20], "STA ($20),Y"),
            (&[0x0A], "ASL A"),
        ];

        for (bytes, expected) in cases {
            let mem = mem_with(0x0600, bytes);
            let (text, len) = disassemble_instruction(&mem, 0x0600);
            assert_eq!(text, *expected);
            assert_eq!(len as usize, bytes.len());
        }
    }

    #[test]
    fn test_branch_target() {
        let mem = mem_with(0x0603, &[0xD0, 0xFD]);
        assert_eq!(disassemble_instruction(&mem, 0x0603).0, "BNE $0602");
    }

    #[test]
    fn test_unmapped_byte() {
        let mem = mem_with(0x0600, &[0x24, 0x10]);
        assert_eq!(disassemble_instruction(&mem, 0x0600), ("???".to_string(), 1));
    }

    #[test]
    fn test_listing() {
        let mem = mem_with(0x0600, &[0xA9, 0x01, 0x00]);
        let listing = disassemble(&mem, 0x0600, 3);
        let lines: Vec<&str> = listing.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("$0600: A9 01"));
        assert!(lines[0].ends_with("LDA #$01"));
        assert!(lines[1].ends_with("BRK"));
    }
}
