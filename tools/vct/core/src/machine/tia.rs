use log::trace;
use crate::registers::{CYCLES_PER_LINE, WSYNC};

/// Beam timing and `WSYNC`. Nothing is drawn.
#[derive(Debug, Clone, Default)]
pub struct Tia {
    line_cycle: u32,
    scanline: u64,
    rdy_held: bool,
    wsync_writes: u64,
}

impl Tia {
    pub fn read(&self, _addr: u16) -> u8 {
        // no collisions, no paddles, fire buttons up
        0
    }

    pub fn write(&mut self, addr: u16, _data: u8) {
        if addr & 0x3F == WSYNC {
            self.rdy_held = true;
            self.wsync_writes += 1;
        }
    }

    /// One CPU cycle. RDY is released when a new line starts.
    pub fn tick(&mut self) {
        self.line_cycle += 1;
        if self.line_cycle == CYCLES_PER_LINE {
            self.line_cycle = 0;
            self.scanline += 1;
            self.rdy_held = false;
            trace!("scanline {}", self.scanline);
        }
    }

    /// The CPU is halted until the end of the line.
    pub fn rdy_held(&self) -> bool {
        self.rdy_held
    }

    pub fn line_cycle(&self) -> u32 {
        self.line_cycle
    }

    pub fn scanline(&self) -> u64 {
        self.scanline
    }

    /// Puts the beam at the start of `scanline`.
    pub fn set_scanline(&mut self, scanline: u64) {
        self.scanline = scanline;
        self.line_cycle = 0;
    }

    pub fn wsync_writes(&self) -> u64 {
        self.wsync_writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wsync_holds_until_line_end() {
        let mut tia = Tia::default();
        for _ in 0..10 {
            tia.tick();
        }
        tia.write(WSYNC, 0);
        assert!(tia.rdy_held());
        for _ in 10..CYCLES_PER_LINE - 1 {
            tia.tick();
        }
        assert!(tia.rdy_held());
        tia.tick();
        assert!(!tia.rdy_held());
        assert_eq!(tia.scanline(), 1);
        assert_eq!(tia.line_cycle(), 0);
        assert_eq!(tia.wsync_writes(), 1);
    }

    #[test]
    fn wsync_mirrors() {
        let mut tia = Tia::default();
        tia.write(0x42, 0);
        assert!(tia.rdy_held());
    }
}
