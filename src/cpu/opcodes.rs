//! Opcode dispatch table.
//!
//! Every opcode byte maps to an (operation, addressing mode) pair, or to
//! nothing. Unmapped bytes are executed as BRK by the dispatch engine.
//! The same table drives the disassembler.

use serde::{Serialize, Deserialize};

/// How an instruction's operand bytes are turned into a value or address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddrMode {
    /// No operand (CLC, RTS, NOP).
    Implied,
    /// Operates on A (ASL A).
    Accumulator,
    /// `#nn`: the operand byte itself.
    Immediate,
    /// `nn`
    ZeroPage,
    /// `nn,X`, wraps within page zero.
    ZeroPageX,
    /// `nn,Y`, wraps within page zero.
    ZeroPageY,
    /// `nnnn`
    Absolute,
    /// `nnnn,X`, wraps at 64K.
    AbsoluteX,
    /// `nnnn,Y`, wraps at 64K.
    AbsoluteY,
    /// `(nnnn)`: JMP through a pointer. Only the low operand byte is
    /// used, so the pointer always lives in page zero.
    Indirect,
    /// `(nn,X)`
    IndirectX,
    /// `(nn),Y`
    IndirectY,
    /// Signed 8-bit branch displacement.
    Relative,
}

impl AddrMode {
    /// Total instruction length in bytes, opcode included.
    pub const fn len(self) -> u16 {
        match self {
            AddrMode::Implied | AddrMode::Accumulator => 1,
            AddrMode::Absolute
            | AddrMode::AbsoluteX
            | AddrMode::AbsoluteY
            | AddrMode::Indirect => 3,
            AddrMode::Immediate
            | AddrMode::ZeroPage
            | AddrMode::ZeroPageX
            | AddrMode::ZeroPageY
            | AddrMode::IndirectX
            | AddrMode::IndirectY
            | AddrMode::Relative => 2,
        }
    }
}

/// The operation half of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    // ==================== Load / Store ====================
    Lda, Ldx, Ldy,
    Sta, Stx, Sty,

    // ==================== Transfer ====================
    Tax, Txa, Tay, Tya, Tsx, Txs,

    // ==================== Increment / Decrement ====================
    Inc, Dec, Inx, Iny, Dex, Dey,

    // ==================== Compare ====================
    Cmp, Cpx, Cpy,

    // ==================== Logical ====================
    And, Ora, Eor,

    // ==================== Shift / Rotate ====================
    Asl, Lsr, Rol, Ror,

    // ==================== Arithmetic ====================
    Adc, Sbc,

    // ==================== Control Flow ====================
    Jmp, Jsr, Rts, Rti,
    Bcc, Bcs, Beq, Bne, Bmi, Bpl, Bvc, Bvs,

    // ==================== Flags ====================
    Sec, Clc, Sed, Cld, Sei, Cli, Clv,

    // ==================== Stack ====================
    Pha, Php, Pla, Plp,

    // ==================== Special ====================
    Nop,
    Brk,
}

impl Operation {
    /// Upper-case assembler mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        use Operation::*;
        match self {
            Lda => "LDA", Ldx => "LDX", Ldy => "LDY",
            Sta => "STA", Stx => "STX", Sty => "STY",
            Tax => "TAX", Txa => "TXA", Tay => "TAY", Tya => "TYA", Tsx => "TSX", Txs => "TXS",
            Inc => "INC", Dec => "DEC", Inx => "INX", Iny => "INY", Dex => "DEX", Dey => "DEY",
            Cmp => "CMP", Cpx => "CPX", Cpy => "CPY",
            And => "AND", Ora => "ORA", Eor => "EOR",
            Asl => "ASL", Lsr => "LSR", Rol => "ROL", Ror => "ROR",
            Adc => "ADC", Sbc => "SBC",
            Jmp => "JMP", Jsr => "JSR", Rts => "RTS", Rti => "RTI",
            Bcc => "BCC", Bcs => "BCS", Beq => "BEQ", Bne => "BNE",
            Bmi => "BMI", Bpl => "BPL", Bvc => "BVC", Bvs => "BVS",
            Sec => "SEC", Clc => "CLC", Sed => "SED", Cld => "CLD",
            Sei => "SEI", Cli => "CLI", Clv => "CLV",
            Pha => "PHA", Php => "PHP", Pla => "PLA", Plp => "PLP",
            Nop => "NOP",
            Brk => "BRK",
        }
    }
}

/// A decoded opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Opcode {
    pub operation: Operation,
    pub mode: AddrMode,
}

impl Opcode {
    pub const fn len(&self) -> u16 {
        self.mode.len()
    }

    pub const fn mnemonic(&self) -> &'static str {
        self.operation.mnemonic()
    }
}

const fn entry(operation: Operation, mode: AddrMode) -> Option<Opcode> {
    Some(Opcode { operation, mode })
}

/// Opcode byte → decoded opcode. `None` entries halt the machine.
pub static OPCODE_TABLE: [Option<Opcode>; 256] = {
    use AddrMode::*;
    use Operation::*;

    let mut t: [Option<Opcode>; 256] = [None; 256];

    t[0x00] = entry(Brk, Implied);
    t[0x01] = entry(Ora, IndirectX);
    t[0x05] = entry(Ora, ZeroPage);
    t[0x06] = entry(Asl, ZeroPage);
    t[0x08] = entry(Php, Implied);
    t[0x09] = entry(Ora, Immediate);
    t[0x0A] = entry(Asl, Accumulator);
    t[0x0D] = entry(Ora, Absolute);
    t[0x0E] = entry(Asl, Absolute);
    t[0x10] = entry(Bpl, Relative);
    t[0x11] = entry(Ora, IndirectY);
    t[0x15] = entry(Ora, ZeroPageX);
    t[0x16] = entry(Asl, ZeroPageX);
    t[0x18] = entry(Clc, Implied);
    t[0x19] = entry(Ora, AbsoluteY);
    t[0x1D] = entry(Ora, AbsoluteX);
    t[0x1E] = entry(Asl, AbsoluteX);
    t[0x20] = entry(Jsr, Absolute);
    t[0x21] = entry(And, IndirectX);
    t[0x25] = entry(And, ZeroPage);
    t[0x26] = entry(Rol, ZeroPage);
    t[0x28] = entry(Plp, Implied);
    t[0x29] = entry(And, Immediate);
    t[0x2A] = entry(Rol, Accumulator);
    t[0x2D] = entry(And, Absolute);
    t[0x2E] = entry(Rol, Absolute);
    t[0x30] = entry(Bmi, Relative);
    t[0x31] = entry(And, IndirectY);
    t[0x35] = entry(And, ZeroPageX);
    t[0x36] = entry(Rol, ZeroPageX);
    t[0x38] = entry(Sec, Implied);
    t[0x39] = entry(And, AbsoluteY);
    t[0x3D] = entry(And, AbsoluteX);
    t[0x3E] = entry(Rol, AbsoluteX);
    t[0x40] = entry(Rti, Implied);
    t[0x41] = entry(Eor, IndirectX);
    t[0x45] = entry(Eor, ZeroPage);
    t[0x46] = entry(Lsr, ZeroPage);
    t[0x48] = entry(Pha, Implied);
    t[0x49] = entry(Eor, Immediate);
    t[0x4A] = entry(Lsr, Accumulator);
    t[0x4C] = entry(Jmp, Absolute);
    t[0x4D] = entry(Eor, Absolute);
    t[0x4E] = entry(Lsr, Absolute);
    t[0x50] = entry(Bvc, Relative);
    t[0x51] = entry(Eor, IndirectY);
    t[0x55] = entry(Eor, ZeroPageX);
    t[0x56] = entry(Lsr, ZeroPageX);
    t[0x58] = entry(Cli, Implied);
    t[0x59] = entry(Eor, AbsoluteY);
    t[0x5D] = entry(Eor, AbsoluteX);
    t[0x5E] = entry(Lsr, AbsoluteX);
    t[0x60] = entry(Rts, Implied);
    t[0x61] = entry(Adc, IndirectX);
    t[0x65] = entry(Adc, ZeroPage);
    t[0x66] = entry(Ror, ZeroPage);
    t[0x68] = entry(Pla, Implied);
    t[0x69] = entry(Adc, Immediate);
    t[0x6A] = entry(Ror, Accumulator);
    t[0x6C] = entry(Jmp, Indirect);
    t[0x6D] = entry(Adc, Absolute);
    t[0x6E] = entry(Ror, Absolute);
    t[0x70] = entry(Bvs, Relative);
    t[0x71] = entry(Adc, IndirectY);
    t[0x75] = entry(Adc, ZeroPageX);
    t[0x76] = entry(Ror, ZeroPageX);
    t[0x78] = entry(Sei, Implied);
    t[0x79] = entry(Adc, AbsoluteY);
    t[0x7D] = entry(Adc, AbsoluteX);
    t[0x7E] = entry(Ror, AbsoluteX);
    t[0x81] = entry(Sta, IndirectX);
    t[0x84] = entry(Sty, ZeroPage);
    t[0x85] = entry(Sta, ZeroPage);
    t[0x86] = entry(Stx, ZeroPage);
    t[0x88] = entry(Dey, Implied);
    t[0x8A] = entry(Txa, Implied);
    t[0x8C] = entry(Sty, Absolute);
    t[0x8D] = entry(Sta, Absolute);
    t[0x8E] = entry(Stx, Absolute);
    t[0x90] = entry(Bcc, Relative);
    t[0x91] = entry(Sta, IndirectY);
    t[0x94] = entry(Sty, ZeroPageX);
    t[0x95] = entry(Sta, ZeroPageX);
    t[0x96] = entry(Stx, ZeroPageY);
    t[0x98] = entry(Tya, Implied);
    t[0x99] = entry(Sta, AbsoluteY);
    t[0x9A] = entry(Txs, Implied);
    t[0x9D] = entry(Sta, AbsoluteX);
    t[0xA0] = entry(Ldy, Immediate);
    t[0xA1] = entry(Lda, IndirectX);
    t[0xA2] = entry(Ldx, Immediate);
    t[0xA4] = entry(Ldy, ZeroPage);
    t[0xA5] = entry(Lda, ZeroPage);
    t[0xA6] = entry(Ldx, ZeroPage);
    t[0xA8] = entry(Tay, Implied);
    t[0xA9] = entry(Lda, Immediate);
    t[0xAA] = entry(Tax, Implied);
    t[0xAC] = entry(Ldy, Absolute);
    t[0xAD] = entry(Lda, Absolute);
    t[0xAE] = entry(Ldx, Absolute);
    t[0xB0] = entry(Bcs, Relative);
    t[0xB1] = entry(Lda, IndirectY);
    t[0xB4] = entry(Ldy, ZeroPageX);
    t[0xB5] = entry(Lda, ZeroPageX);
    t[0xB6] = entry(Ldx, ZeroPageY);
    t[0xB8] = entry(Clv, Implied);
    t[0xB9] = entry(Lda, AbsoluteY);
    t[0xBA] = entry(Tsx, Implied);
    t[0xBC] = entry(Ldy, AbsoluteX);
    t[0xBD] = entry(Lda, AbsoluteX);
    t[0xBE] = entry(Ldx, AbsoluteY);
    t[0xC0] = entry(Cpy, Immediate);
    t[0xC1] = entry(Cmp, IndirectX);
    t[0xC4] = entry(Cpy, ZeroPage);
    t[0xC5] = entry(Cmp, ZeroPage);
    t[0xC6] = entry(Dec, ZeroPage);
    t[0xC8] = entry(Iny, Implied);
    t[0xC9] = entry(Cmp, Immediate);
    t[0xCA] = entry(Dex, Implied);
    t[0xCC] = entry(Cpy, Absolute);
    t[0xCD] = entry(Cmp, Absolute);
    t[0xCE] = entry(Dec, Absolute);
    t[0xD0] = entry(Bne, Relative);
    t[0xD1] = entry(Cmp, IndirectY);
    t[0xD5] = entry(Cmp, ZeroPageX);
    t[0xD6] = entry(Dec, ZeroPageX);
    t[0xD8] = entry(Cld, Implied);
    t[0xD9] = entry(Cmp, AbsoluteY);
    t[0xDD] = entry(Cmp, AbsoluteX);
    t[0xDE] = entry(Dec, AbsoluteX);
    t[0xE0] = entry(Cpx, Immediate);
    t[0xE1] = entry(Sbc, IndirectX);
    t[0xE4] = entry(Cpx, ZeroPage);
    t[0xE5] = entry(Sbc, ZeroPage);
    t[0xE6] = entry(Inc, ZeroPage);
    t[0xE8] = entry(Inx, Implied);
    t[0xE9] = entry(Sbc, Immediate);
    t[0xEA] = entry(Nop, Implied);
    t[0xEC] = entry(Cpx, Absolute);
    t[0xED] = entry(Sbc, Absolute);
    t[0xEE] = entry(Inc, Absolute);
    t[0xF0] = entry(Beq, Relative);
    t[0xF1] = entry(Sbc, IndirectY);
    t[0xF5] = entry(Sbc, ZeroPageX);
    t[0xF6] = entry(Inc, ZeroPageX);
    t[0xF8] = entry(Sed, Implied);
    t[0xF9] = entry(Sbc, AbsoluteY);
    t[0xFD] = entry(Sbc, AbsoluteX);
    t[0xFE] = entry(Inc, AbsoluteX);

    t
};

/// Look up an opcode byte.
#[inline]
pub fn decode(opcode: u8) -> Option<Opcode> {
    OPCODE_TABLE[opcode as usize]
}
