//! Cycle-exact simulator of the NMOS 6502 core, as found in the 6507.
//!
//! Only the part of the instruction set that timing code actually uses is
//! implemented. What is implemented is exact: every cycle an instruction takes
//! is exactly one call into [`System`], dummy reads included, so a bus can
//! clock its peripherals once per access and see the same interleaving the
//! real chip produces. Anything else jams the CPU, like the NMOS `KIL` opcodes.
#![no_std]

mod addressing;
mod instructions;

use addressing::*;

pub const P_C: u8 = 0x01;
pub const P_Z: u8 = 0x02;
pub const P_I: u8 = 0x04;
pub const P_D: u8 = 0x08;
pub const P_B: u8 = 0x10;
pub const P_1: u8 = 0x20;
pub const P_V: u8 = 0x40;
pub const P_N: u8 = 0x80;

pub const STACK_PAGE: u16 = 0x0100;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    Running,
    /// Hit an opcode this core doesn't execute. The bus keeps getting read at
    /// the jam address until the CPU is reset.
    Jammed(u8),
}

/// The outside world, as seen from the address and data pins.
///
/// One call is one cycle.
pub trait System {
    fn read(&mut self, cpu: &mut M6507, addr: u16) -> u8;
    fn write(&mut self, cpu: &mut M6507, addr: u16, data: u8);

    /// A read whose result the CPU throws away. Still a bus cycle.
    fn read_spurious(&mut self, cpu: &mut M6507, addr: u16) {
        let _ = self.read(cpu, addr);
    }
}

#[derive(Clone, Debug)]
pub struct M6507 {
    pub(crate) state: State,
    pub(crate) pc: u16,
    pub(crate) a: u8,
    pub(crate) x: u8,
    pub(crate) y: u8,
    pub(crate) s: u8,
    pub(crate) p: u8,
    pub(crate) cycles: u64,
}

impl Default for M6507 {
    fn default() -> Self {
        Self::new()
    }
}

impl M6507 {
    pub fn new() -> M6507 {
        M6507 {
            state: State::Running,
            pc: 0,
            a: 0,
            x: 0,
            y: 0,
            s: 0xFD,
            p: P_1 | P_I,
            cycles: 0,
        }
    }

    pub fn get_state(&self) -> State { self.state }
    pub fn get_pc(&self) -> u16 { self.pc }
    pub fn set_pc(&mut self, pc: u16) { self.pc = pc }
    pub fn get_a(&self) -> u8 { self.a }
    pub fn set_a(&mut self, a: u8) { self.a = a }
    pub fn get_x(&self) -> u8 { self.x }
    pub fn set_x(&mut self, x: u8) { self.x = x }
    pub fn get_y(&self) -> u8 { self.y }
    pub fn set_y(&mut self, y: u8) { self.y = y }
    pub fn get_s(&self) -> u8 { self.s }
    pub fn set_s(&mut self, s: u8) { self.s = s }
    pub fn get_p(&self) -> u8 { self.p }
    pub fn set_p(&mut self, p: u8) { self.p = p | P_1 | P_B }

    /// Total bus cycles this CPU has driven since it was created.
    pub fn get_cycles(&self) -> u64 { self.cycles }

    /// Runs one instruction and returns how many cycles it took.
    ///
    /// A jammed CPU burns one cycle per call.
    pub fn step<S: System>(&mut self, system: &mut S) -> u32 {
        let start = self.cycles;
        match self.state {
            State::Jammed(_) => {
                let pc = self.pc;
                self.spurious_read(system, pc);
            }
            State::Running => {
                let opcode = self.read_pc_postincrement(system);
                self.execute(system, opcode);
            }
        }
        (self.cycles - start) as u32
    }

    fn execute<S: System>(&mut self, system: &mut S, opcode: u8) {
        let p = self.p;
        match opcode {
            // loads
            0xA9 => self.lda::<ImmediateResult, Immediate, S>(system),
            0xA5 => self.lda::<EffectiveAddress, ZeroPage, S>(system),
            0xAD => self.lda::<EffectiveAddress, Absolute, S>(system),
            0xA2 => self.ldx::<ImmediateResult, Immediate, S>(system),
            0xA6 => self.ldx::<EffectiveAddress, ZeroPage, S>(system),
            0xAE => self.ldx::<EffectiveAddress, Absolute, S>(system),
            0xA0 => self.ldy::<ImmediateResult, Immediate, S>(system),
            0xA4 => self.ldy::<EffectiveAddress, ZeroPage, S>(system),
            0xAC => self.ldy::<EffectiveAddress, Absolute, S>(system),

            // stores
            0x85 => self.sta::<EffectiveAddress, ZeroPage, S>(system),
            0x8D => self.sta::<EffectiveAddress, Absolute, S>(system),
            0x86 => self.stx::<EffectiveAddress, ZeroPage, S>(system),
            0x8E => self.stx::<EffectiveAddress, Absolute, S>(system),
            0x84 => self.sty::<EffectiveAddress, ZeroPage, S>(system),
            0x8C => self.sty::<EffectiveAddress, Absolute, S>(system),

            0x24 => self.bit::<EffectiveAddress, ZeroPage, S>(system),
            0x2C => self.bit::<EffectiveAddress, Absolute, S>(system),
            0xEA => self.nop(system),

            // counters
            0xCA => self.dex(system),
            0x88 => self.dey(system),
            0xE8 => self.inx(system),
            0xC8 => self.iny(system),

            // branches
            0x10 => self.branch::<RelativeResult, Relative, S>(system, p & P_N == 0),
            0x30 => self.branch::<RelativeResult, Relative, S>(system, p & P_N != 0),
            0x50 => self.branch::<RelativeResult, Relative, S>(system, p & P_V == 0),
            0x70 => self.branch::<RelativeResult, Relative, S>(system, p & P_V != 0),
            0x90 => self.branch::<RelativeResult, Relative, S>(system, p & P_C == 0),
            0xB0 => self.branch::<RelativeResult, Relative, S>(system, p & P_C != 0),
            0xD0 => self.branch::<RelativeResult, Relative, S>(system, p & P_Z == 0),
            0xF0 => self.branch::<RelativeResult, Relative, S>(system, p & P_Z != 0),

            // jumps
            0x4C => self.jmp::<EffectiveAddress, Absolute, S>(system),
            0x20 => self.jsr(system),
            0x60 => self.rts(system),

            _ => {
                self.pc = self.pc.wrapping_sub(1);
                self.state = State::Jammed(opcode);
            }
        }
    }

    #[inline(always)]
    pub(crate) fn read<S: System>(&mut self, system: &mut S, addr: u16) -> u8 {
        self.cycles += 1;
        system.read(self, addr)
    }

    #[inline(always)]
    pub(crate) fn write<S: System>(&mut self, system: &mut S, addr: u16, data: u8) {
        self.cycles += 1;
        system.write(self, addr, data)
    }

    #[inline(always)]
    pub(crate) fn spurious_read<S: System>(&mut self, system: &mut S, addr: u16) {
        self.cycles += 1;
        system.read_spurious(self, addr)
    }

    #[inline(always)]
    pub(crate) fn read_pc_postincrement<S: System>(&mut self, system: &mut S) -> u8 {
        let pc = self.pc;
        self.pc = pc.wrapping_add(1);
        self.read(system, pc)
    }

    #[inline(always)]
    pub(crate) fn push<S: System>(&mut self, system: &mut S, data: u8) {
        let addr = STACK_PAGE | self.s as u16;
        self.write(system, addr, data);
        self.s = self.s.wrapping_sub(1);
    }

    #[inline(always)]
    pub(crate) fn pop<S: System>(&mut self, system: &mut S) -> u8 {
        self.s = self.s.wrapping_add(1);
        let addr = STACK_PAGE | self.s as u16;
        self.read(system, addr)
    }

    #[inline(always)]
    pub(crate) fn spurious_stack_read<S: System>(&mut self, system: &mut S) {
        let addr = STACK_PAGE | self.s as u16;
        self.spurious_read(system, addr)
    }

    #[inline(always)]
    pub(crate) fn nz_p(&mut self, v: u8) {
        self.p = (self.p & !(P_N | P_Z)) | (v & P_N) | if v == 0 { P_Z } else { 0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 64K of flat memory that remembers every address it was asked for.
    struct Flat {
        mem: [u8; 0x10000],
        trace: [(u16, bool); 16],
        accesses: usize,
    }

    impl Flat {
        fn with_code(origin: u16, code: &[u8]) -> Self {
            let mut mem = [0x02; 0x10000];
            mem[origin as usize..origin as usize + code.len()].copy_from_slice(code);
            Flat { mem, trace: [(0, false); 16], accesses: 0 }
        }

        fn log(&mut self, addr: u16, write: bool) {
            if self.accesses < self.trace.len() {
                self.trace[self.accesses] = (addr, write);
            }
            self.accesses += 1;
        }
    }

    impl System for Flat {
        fn read(&mut self, _: &mut M6507, addr: u16) -> u8 {
            self.log(addr, false);
            self.mem[addr as usize]
        }

        fn write(&mut self, _: &mut M6507, addr: u16, data: u8) {
            self.log(addr, true);
            self.mem[addr as usize] = data;
        }
    }

    fn cpu_at(pc: u16) -> M6507 {
        let mut cpu = M6507::new();
        cpu.set_pc(pc);
        cpu
    }

    #[test]
    fn one_bus_access_per_cycle() {
        // lda #$10, sta $80, lda $1234, sty $1234, nop
        let mut sys = Flat::with_code(0xF000, &[0xA9, 0x10, 0x85, 0x80, 0xAD, 0x34, 0x12, 0x8C, 0x34, 0x12, 0xEA]);
        let mut cpu = cpu_at(0xF000);

        let costs: [u32; 5] = core::array::from_fn(|_| cpu.step(&mut sys));
        assert_eq!(costs, [2, 3, 4, 4, 2]);
        assert_eq!(sys.accesses as u64, cpu.get_cycles());
        assert_eq!(sys.mem[0x80], 0x10);
    }

    #[test]
    fn store_writes_on_last_cycle() {
        let mut sys = Flat::with_code(0xF000, &[0x84, 0x02]);
        let mut cpu = cpu_at(0xF000);
        cpu.step(&mut sys);
        assert_eq!(&sys.trace[..3], &[(0xF000, false), (0xF001, false), (0x0002, true)]);
    }

    #[test]
    fn branch_costs() {
        // ldy #1 / dey / bpl -3
        let mut sys = Flat::with_code(0xF000, &[0xA0, 0x01, 0x88, 0x10, 0xFD]);
        let mut cpu = cpu_at(0xF000);

        assert_eq!(cpu.step(&mut sys), 2);
        assert_eq!(cpu.step(&mut sys), 2);
        assert_eq!(cpu.step(&mut sys), 3, "taken, same page");
        assert_eq!(cpu.step(&mut sys), 2);
        assert_eq!(cpu.step(&mut sys), 2, "not taken once Y wraps negative");
        assert_eq!(cpu.get_y(), 0xFF);
        assert_eq!(cpu.get_pc(), 0xF005);
    }

    #[test]
    fn branch_across_page_costs_four() {
        // bne +2 from $F0FD lands on $F101
        let mut sys = Flat::with_code(0xF0FD, &[0xD0, 0x02]);
        let mut cpu = cpu_at(0xF0FD);
        cpu.set_p(0);
        assert_eq!(cpu.step(&mut sys), 4);
        assert_eq!(cpu.get_pc(), 0xF101);
    }

    #[test]
    fn jsr_rts_round_trip() {
        let mut sys = Flat::with_code(0xF000, &[0x20, 0x00, 0xF8]);
        sys.mem[0xF800] = 0x60;
        let mut cpu = cpu_at(0xF000);
        cpu.set_s(0xFF);

        assert_eq!(cpu.step(&mut sys), 6);
        assert_eq!(cpu.get_pc(), 0xF800);
        assert_eq!(sys.mem[0x01FF], 0xF0);
        assert_eq!(sys.mem[0x01FE], 0x02);
        assert_eq!(cpu.step(&mut sys), 6);
        assert_eq!(cpu.get_pc(), 0xF003);
        assert_eq!(cpu.get_s(), 0xFF);
    }

    #[test]
    fn bit_copies_high_bits() {
        let mut sys = Flat::with_code(0xF000, &[0xA9, 0x01, 0x24, 0x80]);
        sys.mem[0x80] = 0xC0;
        let mut cpu = cpu_at(0xF000);
        cpu.step(&mut sys);
        cpu.step(&mut sys);
        assert_eq!(cpu.get_p() & (P_N | P_V | P_Z), P_N | P_V | P_Z);
    }

    #[test]
    fn unknown_opcode_jams() {
        let mut sys = Flat::with_code(0xF000, &[0xEA, 0x02]);
        let mut cpu = cpu_at(0xF000);
        cpu.step(&mut sys);
        cpu.step(&mut sys);
        assert_eq!(cpu.get_state(), State::Jammed(0x02));
        assert_eq!(cpu.get_pc(), 0xF001);
        assert_eq!(cpu.step(&mut sys), 1);
        assert_eq!(cpu.get_pc(), 0xF001);
    }
}
