//! A VCS with nothing on the screen: enough of the 6507, RIOT and TIA to run
//! timing code and count its cycles exactly.

pub mod bus;
pub mod riot;
pub mod tia;

use log::{debug, warn};
use vct_6507::{State, M6507};
use crate::asm::Program;
use crate::machine::bus::Bus;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    #[error("CPU jammed on opcode ${opcode:02X} at ${pc:04X}")]
    Jammed { pc: u16, opcode: u8 },
    #[error("didn't reach ${stop:04X} within {budget} cycles")]
    Timeout { stop: u16, budget: u64 },
}

#[derive(Debug)]
pub struct Machine {
    pub cpu: M6507,
    pub bus: Bus,
    pub wait_counter: u64,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    pub fn new() -> Self {
        let mut cpu = M6507::new();
        cpu.set_s(0xFF);
        Machine { cpu, bus: Bus::default(), wait_counter: 0 }
    }

    /// Puts the program in ROM and points the CPU at its entry.
    pub fn load(&mut self, program: &Program) {
        self.bus.load_rom(program.origin(), program.bytes());
        self.cpu.set_pc(program.entry());
        debug!("loaded {} bytes at ${:04X}, entry ${:04X}", program.size(), program.origin(), program.entry());
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.cpu.set_pc(pc);
    }

    /// Cycles since power-on, halted cycles included.
    pub fn cycles(&self) -> u64 {
        self.bus.clock
    }

    /// One instruction, or one cycle while the TIA holds RDY.
    pub fn step(&mut self) -> Result<u32, SimError> {
        if self.bus.tia.rdy_held() {
            self.bus.tick();
            self.wait_counter += 1;
            return Ok(1);
        } else if self.wait_counter > 0 {
            debug!("waited {} cycles", self.wait_counter);
            self.wait_counter = 0;
        }

        let cycles = self.cpu.step(&mut self.bus);
        if let State::Jammed(opcode) = self.cpu.get_state() {
            let pc = self.cpu.get_pc();
            warn!("CPU jammed on ${:02X} at ${:04X}", opcode, pc);
            return Err(SimError::Jammed { pc, opcode });
        }
        Ok(cycles)
    }

    /// Runs until the CPU is about to fetch from `stop`, and returns the
    /// cycles that took. A halt pending from a `WSYNC` write is part of the
    /// run.
    pub fn run_until(&mut self, stop: u16, budget: u64) -> Result<u64, SimError> {
        let start = self.cycles();
        while self.cpu.get_pc() != stop || self.bus.tia.rdy_held() {
            if self.cycles() - start >= budget {
                return Err(SimError::Timeout { stop, budget });
            }
            self.step()?;
        }
        Ok(self.cycles() - start)
    }

    /// Loads `program` and runs it from its entry to its exit.
    pub fn run(&mut self, program: &Program, budget: u64) -> Result<u64, SimError> {
        self.load(program);
        self.run_until(program.exit(), budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::{Assembler, Op, Operand};
    use crate::registers::WSYNC;

    fn assemble(ops: &[Op]) -> Program {
        let mut asm = Assembler::new(0xF000);
        for op in ops {
            asm.emit(*op);
        }
        asm.finish().unwrap()
    }

    #[test]
    fn counts_instruction_cycles() {
        let program = assemble(&[Op::Nop, Op::Lda(Operand::Immediate(1)), Op::Bit(Operand::ZeroPage(0))]);
        let mut machine = Machine::new();
        assert_eq!(machine.run(&program, 100), Ok(7));
        assert_eq!(machine.cpu.get_a(), 1);
    }

    #[test]
    fn wsync_halts_to_end_of_line() {
        let program = assemble(&[Op::Sta(Operand::address(WSYNC))]);
        let mut machine = Machine::new();
        assert_eq!(machine.run(&program, 200), Ok(76));
        assert_eq!(machine.bus.tia.scanline(), 1);
        assert_eq!(machine.bus.tia.line_cycle(), 0);
    }

    #[test]
    fn running_off_the_code_jams() {
        let program = assemble(&[Op::Nop]);
        let mut machine = Machine::new();
        machine.load(&program);
        assert_eq!(machine.run_until(0xF800, 100), Err(SimError::Jammed { pc: 0xF001, opcode: 0xFF }));
    }

    #[test]
    fn budget_stops_endless_loops() {
        let program = assemble(&[Op::Jmp(0xF000)]);
        let mut machine = Machine::new();
        machine.load(&program);
        assert_eq!(machine.run_until(0xF003, 30), Err(SimError::Timeout { stop: 0xF003, budget: 30 }));
    }
}
