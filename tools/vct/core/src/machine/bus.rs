use alloc::boxed::Box;
use core::fmt::{Debug, Formatter};
use bit_field::BitField;
use log::warn;
use vct_6507::{System, M6507};
use crate::machine::riot::Riot;
use crate::machine::tia::Tia;
use crate::machine::bus::ByteDecorator::{Ram, Riot as RiotReg, Rom, Tia as TiaReg};

pub const ROM_SIZE: usize = 0x1000;
pub const RAM_SIZE: usize = 0x80;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ByteDecorator {
    Tia(u8),
    Ram(u8),
    Riot(u8),
    Rom(u8),
}

/// The 6507's 8K address space: TIA, 128 bytes of RAM, RIOT and 4K of ROM,
/// each mirrored wherever the partial decoding lets it be seen.
///
/// Every access is one cycle, and each one ticks the TIA and the RIOT after
/// it completes.
pub struct Bus {
    pub tia: Tia,
    pub riot: Riot,
    pub ram: [u8; RAM_SIZE],
    // heap allocation to keep the machine cheap to move
    pub rom: Box<[u8; ROM_SIZE]>,
    pub clock: u64,
}

impl Default for Bus {
    fn default() -> Self {
        Bus {
            tia: Tia::default(),
            riot: Riot::default(),
            ram: [0; RAM_SIZE],
            // $FF is not an opcode the CPU runs, so straying off the code jams
            rom: Box::new([0xFF; ROM_SIZE]),
            clock: 0,
        }
    }
}

impl Debug for Bus {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        f.debug_struct("Bus")
            .field("tia", &self.tia)
            .field("riot", &self.riot)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Bus {
    pub fn tick(&mut self) {
        self.tia.tick();
        self.riot.tick();
        self.clock += 1;
    }

    pub fn write_byte(&mut self, address: u16, data: u8) {
        let addr = address & 0x1FFF;
        if addr.get_bit(12) {
            warn!("Attempted to write ROM at ${:04X}", address);
        } else if !addr.get_bit(7) {
            self.tia.write(addr, data);
        } else if !addr.get_bit(9) {
            self.ram[(addr & 0x7F) as usize] = data;
        } else {
            self.riot.write(addr, data, self.clock);
        }
    }

    pub fn read_byte(&mut self, address: u16) -> u8 {
        match self.peek_byte_decorated(address) {
            TiaReg(v) | Ram(v) | RiotReg(v) | Rom(v) => v,
        }
    }

    pub fn peek_byte_decorated(&self, address: u16) -> ByteDecorator {
        let addr = address & 0x1FFF;
        if addr.get_bit(12) {
            Rom(self.rom[(addr & 0x0FFF) as usize])
        } else if !addr.get_bit(7) {
            TiaReg(self.tia.read(addr))
        } else if !addr.get_bit(9) {
            Ram(self.ram[(addr & 0x7F) as usize])
        } else {
            RiotReg(self.riot.read(addr))
        }
    }

    /// Copies `bytes` into ROM at `origin`, wrapping within the 4K bank.
    pub fn load_rom(&mut self, origin: u16, bytes: &[u8]) {
        for (i, byte) in bytes.iter().enumerate() {
            let addr = origin.wrapping_add(i as u16) & 0x0FFF;
            self.rom[addr as usize] = *byte;
        }
    }
}

impl System for Bus {
    fn read(&mut self, _: &mut M6507, addr: u16) -> u8 {
        let data = self.read_byte(addr);
        self.tick();
        data
    }

    fn write(&mut self, _: &mut M6507, addr: u16, data: u8) {
        self.write_byte(addr, data);
        self.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::*;

    #[test]
    fn decodes_mirrors() {
        let mut bus = Bus::default();
        bus.write_byte(0x0080, 0x12);
        // stack page mirrors zero-page RAM
        assert_eq!(bus.peek_byte_decorated(0x0180), Ram(0x12));
        // so does the upper half of the address space
        assert_eq!(bus.peek_byte_decorated(0x2080), Ram(0x12));
        assert_eq!(bus.peek_byte_decorated(0xF000), Rom(0xFF));
        assert_eq!(bus.peek_byte_decorated(0x1000), Rom(0xFF));
        assert_eq!(bus.peek_byte_decorated(SWCHA), RiotReg(0xFF));
        assert_eq!(bus.peek_byte_decorated(0x0030), TiaReg(0));
    }

    #[test]
    fn rom_ignores_writes() {
        let mut bus = Bus::default();
        bus.load_rom(0xF000, &[0xEA]);
        bus.write_byte(0xF000, 0x00);
        assert_eq!(bus.read_byte(0xF000), 0xEA);
        assert_eq!(bus.read_byte(0x1000), 0xEA);
    }

    #[test]
    fn timer_write_records_the_cycle() {
        let mut bus = Bus::default();
        bus.clock = 42;
        bus.write_byte(TIM64T, 10);
        assert_eq!(bus.riot.armed_at(), Some(42));
        assert_eq!(bus.read_byte(INTIM), 10);
        assert_eq!(bus.read_byte(INTIM | 0x08), 10);
    }

    #[test]
    fn each_access_is_one_cycle() {
        let mut bus = Bus::default();
        let mut cpu = M6507::new();
        bus.read(&mut cpu, 0xF000);
        bus.write(&mut cpu, WSYNC, 0);
        assert_eq!(bus.clock, 2);
        assert_eq!(bus.tia.line_cycle(), 2);
        assert!(bus.tia.rdy_held());
    }
}
