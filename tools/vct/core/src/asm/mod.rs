//! A small two-pass assembler for the instructions timing code needs.
//!
//! Labels are created up front, bound as code is appended, and resolved in
//! [`Assembler::finish`]. A primitive can therefore reference a label that is
//! bound later, or one that belongs to the caller.

mod op;

pub use op::{Condition, Op, Operand};

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;
use log::{debug, trace};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Label(usize);

/// Where a `jsr` or `jmp` goes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Label(Label),
    Address(u16),
}

impl From<Label> for Target {
    fn from(label: Label) -> Self {
        Target::Label(label)
    }
}

impl From<u16> for Target {
    fn from(addr: u16) -> Self {
        Target::Address(addr)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AsmError {
    #[error("label {name} was never bound")]
    UnboundLabel { name: String },
    #[error("label {name} bound twice")]
    LabelBoundTwice { name: String },
    #[error("branch at ${at:04X} can't reach ${target:04X}")]
    BranchOutOfRange { at: u16, target: u16 },
    #[error("branch at ${at:04X} to ${target:04X} crosses a page and would cost an extra cycle")]
    BranchCrossesPage { at: u16, target: u16 },
    #[error("`{op}` at ${at:04X} has no encoding")]
    Unencodable { at: u16, op: Op },
    #[error("code from ${origin:04X} to ${end:05X} doesn't fit in one 4K cartridge bank")]
    OutOfRom { origin: u16, end: u32 },
    #[error("exit ${exit:04X} is also a `jsr` target, so a run would stop inside the call")]
    ExitIsCallTarget { exit: u16 },
}

#[derive(Copy, Clone, Debug)]
enum Item {
    Op(Op),
    Branch(Condition, Label),
    Jsr(Target),
    Jmp(Target),
    Bind(Label),
}

impl Item {
    fn size(&self) -> u16 {
        match self {
            Item::Op(op) => op.size(),
            Item::Branch(..) => 2,
            Item::Jsr(_) | Item::Jmp(_) => 3,
            Item::Bind(_) => 0,
        }
    }
}

pub struct Assembler {
    origin: u16,
    items: Vec<Item>,
    names: Vec<&'static str>,
    entry: Option<Label>,
    exit: Option<Label>,
}

impl Assembler {
    /// Code will be placed at `origin`, which must have A12 set so the 6507
    /// sees cartridge ROM there.
    pub fn new(origin: u16) -> Self {
        Assembler {
            origin,
            items: Vec::new(),
            names: Vec::new(),
            entry: None,
            exit: None,
        }
    }

    pub fn origin(&self) -> u16 {
        self.origin
    }

    /// Address the next appended instruction will land on.
    pub fn here(&self) -> u32 {
        self.origin as u32 + self.items.iter().map(|item| item.size() as u32).sum::<u32>()
    }

    /// Names starting with `.` are local in the listing. Every label gets its
    /// index appended, so reusing a name is fine.
    pub fn new_label(&mut self, name: &'static str) -> Label {
        self.names.push(name);
        Label(self.names.len() - 1)
    }

    pub fn bind(&mut self, label: Label) {
        self.items.push(Item::Bind(label));
    }

    pub fn emit(&mut self, op: Op) {
        self.items.push(Item::Op(op));
    }

    pub fn branch(&mut self, cond: Condition, label: Label) {
        self.items.push(Item::Branch(cond, label));
    }

    pub fn jsr(&mut self, target: impl Into<Target>) {
        self.items.push(Item::Jsr(target.into()));
    }

    pub fn jmp(&mut self, target: impl Into<Target>) {
        self.items.push(Item::Jmp(target.into()));
    }

    /// Execution of the finished program starts here instead of at `origin`.
    pub fn mark_entry(&mut self) -> Label {
        let label = self.new_label("Start");
        self.bind(label);
        self.entry = Some(label);
        label
    }

    /// A simulated run stops here instead of at the end of the code. Must not
    /// be where a `jsr` lands; put called procedures before the entry or
    /// leave code between them and the exit.
    pub fn mark_exit(&mut self) -> Label {
        let label = self.new_label("Done");
        self.bind(label);
        self.exit = Some(label);
        label
    }

    fn display_name(&self, label: Label) -> String {
        format!("{}{}", self.names[label.0], label.0)
    }

    pub fn finish(self) -> Result<Program, AsmError> {
        let bank = self.origin as u32 & 0xF000;
        let end = self.here();
        if self.origin & 0x1000 == 0 || end > bank + 0x1000 {
            return Err(AsmError::OutOfRom { origin: self.origin, end });
        }

        // pass 1: addresses
        let mut addresses: Vec<Option<u16>> = alloc::vec![None; self.names.len()];
        let mut pc = self.origin;
        for item in &self.items {
            if let Item::Bind(label) = *item {
                if addresses[label.0].replace(pc).is_some() {
                    return Err(AsmError::LabelBoundTwice { name: self.display_name(label) });
                }
            }
            pc = pc.wrapping_add(item.size());
        }
        let resolve = |label: Label| {
            addresses[label.0].ok_or_else(|| AsmError::UnboundLabel { name: self.display_name(label) })
        };
        let resolve_target = |target: Target| match target {
            Target::Label(label) => resolve(label),
            Target::Address(addr) => Ok(addr),
        };

        // pass 2: bytes and listing
        let mut bytes = Vec::with_capacity((end - self.origin as u32) as usize);
        let mut listing = String::new();
        let _ = writeln!(listing, "        ORG ${:04X}", self.origin);
        let mut pc = self.origin;
        let mut static_cycles = 0;
        let mut called = Vec::new();
        for item in &self.items {
            let (op, text) = match *item {
                Item::Bind(label) => {
                    let _ = writeln!(listing, "{}", self.display_name(label));
                    continue;
                }
                Item::Op(op) => (op, format!("{op}")),
                Item::Branch(cond, label) => {
                    let target = resolve(label)?;
                    let next = pc.wrapping_add(2);
                    let offset = target as i32 - next as i32;
                    if !(-128..=127).contains(&offset) {
                        return Err(AsmError::BranchOutOfRange { at: pc, target });
                    }
                    if next & 0xFF00 != target & 0xFF00 {
                        return Err(AsmError::BranchCrossesPage { at: pc, target });
                    }
                    (Op::Branch(cond, offset as i8), format!("{} {}", cond.mnemonic(), self.display_name(label)))
                }
                Item::Jsr(target) | Item::Jmp(target) => {
                    let addr = resolve_target(target)?;
                    let op = if matches!(item, Item::Jsr(_)) {
                        called.push(addr);
                        Op::Jsr(addr)
                    } else {
                        Op::Jmp(addr)
                    };
                    let text = match target {
                        Target::Label(label) => format!("{} {}", op.mnemonic(), self.display_name(label)),
                        Target::Address(_) => format!("{op}"),
                    };
                    (op, text)
                }
            };
            if !op.encode(&mut bytes) {
                return Err(AsmError::Unencodable { at: pc, op });
            }
            let cost = match op {
                Op::Branch(..) => String::from("+2/3"),
                _ => format!("+{}", op.cycles()),
            };
            let _ = writeln!(listing, "        {text:<24}; {cost}");
            trace!("${:04X}: {}", pc, text);
            static_cycles += op.cycles();
            pc = pc.wrapping_add(op.size());
        }

        let entry = match self.entry {
            Some(label) => resolve(label)?,
            None => self.origin,
        };
        let exit = match self.exit {
            Some(label) => {
                let exit = resolve(label)?;
                if called.contains(&exit) {
                    return Err(AsmError::ExitIsCallTarget { exit });
                }
                exit
            }
            None => pc,
        };
        let labels = self.names.iter().zip(&addresses).map(|(name, addr)| (*name, *addr)).collect();
        debug!("assembled {} bytes at ${:04X}, entry ${:04X}", bytes.len(), self.origin, entry);

        Ok(Program { origin: self.origin, entry, exit, bytes, labels, listing, static_cycles })
    }
}

/// Finished machine code for one contiguous block of ROM.
#[derive(Debug, Clone)]
pub struct Program {
    origin: u16,
    entry: u16,
    exit: u16,
    bytes: Vec<u8>,
    labels: Vec<(&'static str, Option<u16>)>,
    listing: String,
    static_cycles: u32,
}

impl Program {
    pub fn origin(&self) -> u16 { self.origin }
    pub fn entry(&self) -> u16 { self.entry }
    pub fn exit(&self) -> u16 { self.exit }
    pub fn bytes(&self) -> &[u8] { &self.bytes }
    pub fn size(&self) -> usize { self.bytes.len() }

    /// First address past the code.
    pub fn end(&self) -> u16 {
        self.origin.wrapping_add(self.bytes.len() as u16)
    }

    pub fn address(&self, label: Label) -> Option<u16> {
        self.labels.get(label.0).and_then(|(_, addr)| *addr)
    }

    /// Looks a label up by the name it was created with. First match wins.
    pub fn find(&self, name: &str) -> Option<u16> {
        self.labels.iter().find(|(n, _)| *n == name).and_then(|(_, addr)| *addr)
    }

    /// Every instruction once, branches not taken. Loops make the real
    /// figure larger.
    pub fn static_cycles(&self) -> u32 {
        self.static_cycles
    }

    /// DASM-flavoured source with the base cost of each instruction.
    pub fn listing(&self) -> &str {
        &self.listing
    }
}
