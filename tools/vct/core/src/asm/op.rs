use core::fmt::{self, Display, Formatter};
use crate::registers::symbol;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Immediate(u8),
    ZeroPage(u8),
    /// Always two address bytes, even for a zero-page address (`sta.w`).
    Absolute(u16),
}

impl Operand {
    /// The shortest addressing mode that reaches `addr`.
    pub fn address(addr: u16) -> Operand {
        if addr < 0x100 {
            Operand::ZeroPage(addr as u8)
        } else {
            Operand::Absolute(addr)
        }
    }

    #[inline(always)]
    fn size(self) -> u16 {
        match self {
            Operand::Immediate(_) | Operand::ZeroPage(_) => 1,
            Operand::Absolute(_) => 2,
        }
    }

    /// Cost of a load, store or BIT through this operand.
    #[inline(always)]
    fn cycles(self) -> u32 {
        match self {
            Operand::Immediate(_) => 2,
            Operand::ZeroPage(_) => 3,
            Operand::Absolute(_) => 4,
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Operand::Immediate(v) => write!(f, "#{v}"),
            Operand::ZeroPage(a) => match symbol(a as u16) {
                Some(name) => f.write_str(name),
                None => write!(f, "${a:02X}"),
            },
            Operand::Absolute(a) => match symbol(a) {
                Some(name) => f.write_str(name),
                None => write!(f, "${a:04X}"),
            },
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    Pl,
    Mi,
    Vc,
    Vs,
    Cc,
    Cs,
    Ne,
    Eq,
}

impl Condition {
    fn opcode(self) -> u8 {
        match self {
            Condition::Pl => 0x10,
            Condition::Mi => 0x30,
            Condition::Vc => 0x50,
            Condition::Vs => 0x70,
            Condition::Cc => 0x90,
            Condition::Cs => 0xB0,
            Condition::Ne => 0xD0,
            Condition::Eq => 0xF0,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Condition::Pl => "bpl",
            Condition::Mi => "bmi",
            Condition::Vc => "bvc",
            Condition::Vs => "bvs",
            Condition::Cc => "bcc",
            Condition::Cs => "bcs",
            Condition::Ne => "bne",
            Condition::Eq => "beq",
        }
    }
}

/// One 6507 instruction with its operand already known.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Lda(Operand),
    Ldx(Operand),
    Ldy(Operand),
    Sta(Operand),
    Stx(Operand),
    Sty(Operand),
    Bit(Operand),
    Nop,
    Dex,
    Dey,
    Inx,
    Iny,
    Rts,
    Jsr(u16),
    Jmp(u16),
    /// Offset is relative to the address after the branch.
    Branch(Condition, i8),
}

impl Op {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Op::Lda(_) => "lda",
            Op::Ldx(_) => "ldx",
            Op::Ldy(_) => "ldy",
            Op::Sta(_) => "sta",
            Op::Stx(_) => "stx",
            Op::Sty(_) => "sty",
            Op::Bit(_) => "bit",
            Op::Nop => "nop",
            Op::Dex => "dex",
            Op::Dey => "dey",
            Op::Inx => "inx",
            Op::Iny => "iny",
            Op::Rts => "rts",
            Op::Jsr(_) => "jsr",
            Op::Jmp(_) => "jmp",
            Op::Branch(cond, _) => cond.mnemonic(),
        }
    }

    /// `None` for combinations the 6507 has no opcode for, like `sta #1`.
    pub fn opcode(&self) -> Option<u8> {
        use Operand::*;
        Some(match *self {
            Op::Lda(Immediate(_)) => 0xA9,
            Op::Lda(ZeroPage(_)) => 0xA5,
            Op::Lda(Absolute(_)) => 0xAD,
            Op::Ldx(Immediate(_)) => 0xA2,
            Op::Ldx(ZeroPage(_)) => 0xA6,
            Op::Ldx(Absolute(_)) => 0xAE,
            Op::Ldy(Immediate(_)) => 0xA0,
            Op::Ldy(ZeroPage(_)) => 0xA4,
            Op::Ldy(Absolute(_)) => 0xAC,
            Op::Sta(ZeroPage(_)) => 0x85,
            Op::Sta(Absolute(_)) => 0x8D,
            Op::Stx(ZeroPage(_)) => 0x86,
            Op::Stx(Absolute(_)) => 0x8E,
            Op::Sty(ZeroPage(_)) => 0x84,
            Op::Sty(Absolute(_)) => 0x8C,
            Op::Bit(ZeroPage(_)) => 0x24,
            Op::Bit(Absolute(_)) => 0x2C,
            Op::Nop => 0xEA,
            Op::Dex => 0xCA,
            Op::Dey => 0x88,
            Op::Inx => 0xE8,
            Op::Iny => 0xC8,
            Op::Rts => 0x60,
            Op::Jsr(_) => 0x20,
            Op::Jmp(_) => 0x4C,
            Op::Branch(cond, _) => cond.opcode(),
            Op::Sta(Immediate(_)) | Op::Stx(Immediate(_)) | Op::Sty(Immediate(_)) | Op::Bit(Immediate(_)) => return None,
        })
    }

    pub fn size(&self) -> u16 {
        match self {
            Op::Lda(o) | Op::Ldx(o) | Op::Ldy(o) | Op::Sta(o) | Op::Stx(o) | Op::Sty(o) | Op::Bit(o) => 1 + o.size(),
            Op::Nop | Op::Dex | Op::Dey | Op::Inx | Op::Iny | Op::Rts => 1,
            Op::Jsr(_) | Op::Jmp(_) => 3,
            Op::Branch(..) => 2,
        }
    }

    /// Base cost. A taken branch costs one more, two more if it lands on
    /// another page.
    pub fn cycles(&self) -> u32 {
        match self {
            Op::Lda(o) | Op::Ldx(o) | Op::Ldy(o) | Op::Sta(o) | Op::Stx(o) | Op::Sty(o) | Op::Bit(o) => o.cycles(),
            Op::Nop | Op::Dex | Op::Dey | Op::Inx | Op::Iny => 2,
            Op::Rts | Op::Jsr(_) => 6,
            Op::Jmp(_) => 3,
            Op::Branch(..) => 2,
        }
    }

    /// Appends the machine code. Returns `false` (and appends nothing) if the
    /// op can't be encoded.
    pub fn encode(&self, out: &mut alloc::vec::Vec<u8>) -> bool {
        let Some(opcode) = self.opcode() else {
            return false;
        };
        out.push(opcode);
        match *self {
            Op::Lda(o) | Op::Ldx(o) | Op::Ldy(o) | Op::Sta(o) | Op::Stx(o) | Op::Sty(o) | Op::Bit(o) => match o {
                Operand::Immediate(v) | Operand::ZeroPage(v) => out.push(v),
                Operand::Absolute(a) => out.extend_from_slice(&a.to_le_bytes()),
            },
            Op::Jsr(a) | Op::Jmp(a) => out.extend_from_slice(&a.to_le_bytes()),
            Op::Branch(_, offset) => out.push(offset as u8),
            Op::Nop | Op::Dex | Op::Dey | Op::Inx | Op::Iny | Op::Rts => {}
        }
        true
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Op::Lda(o) | Op::Ldx(o) | Op::Ldy(o) | Op::Sta(o) | Op::Stx(o) | Op::Sty(o) | Op::Bit(o) => {
                let forced = matches!(o, Operand::Absolute(a) if a < 0x100);
                write!(f, "{}{} {}", self.mnemonic(), if forced { ".w" } else { "" }, o)
            }
            Op::Jsr(a) | Op::Jmp(a) => write!(f, "{} ${a:04X}", self.mnemonic()),
            Op::Branch(cond, offset) => write!(f, "{} *{:+}", cond.mnemonic(), offset as i16 + 2),
            _ => f.write_str(self.mnemonic()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec::Vec;

    #[test]
    fn listing_uses_register_names() {
        assert_eq!(Op::Sty(Operand::address(0x02)).to_string(), "sty WSYNC");
        assert_eq!(Op::Lda(Operand::address(0x284)).to_string(), "lda INTIM");
        assert_eq!(Op::Sta(Operand::Absolute(0x02)).to_string(), "sta.w WSYNC");
        assert_eq!(Op::Bit(Operand::ZeroPage(0x80)).to_string(), "bit $80");
        assert_eq!(Op::Ldy(Operand::Immediate(10)).to_string(), "ldy #10");
        assert_eq!(Op::Branch(Condition::Pl, -3).to_string(), "bpl *-1");
    }

    #[test]
    fn encodes_little_endian() {
        let mut out = Vec::new();
        assert!(Op::Sta(Operand::address(0x296)).encode(&mut out));
        assert!(Op::Jsr(0xF800).encode(&mut out));
        assert_eq!(out, [0x8D, 0x96, 0x02, 0x20, 0x00, 0xF8]);
    }

    #[test]
    fn store_immediate_is_not_an_instruction() {
        let mut out = Vec::new();
        assert!(!Op::Sta(Operand::Immediate(1)).encode(&mut out));
        assert!(out.is_empty());
    }
}
