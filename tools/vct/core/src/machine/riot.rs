use bit_field::BitField;
use bitfield::bitfield;
use log::{debug, trace};
use crate::registers::Timer;

bitfield! {
    #[derive(Copy, Clone, Default, PartialEq, Eq)]
    pub struct TimerFlags(u8);
    impl Debug;
    /// Set when `INTIM` underflows, cleared by arming the timer again.
    pub expired, set_expired: 7;
}

/// The timer half of the 6532 RIOT. RAM lives on the bus; the I/O ports
/// read as idle joysticks and console switches.
#[derive(Debug, Clone)]
pub struct Riot {
    intim: u8,
    timer: Timer,
    /// Cycles per decrement: the divisor, or 1 once expired.
    interval: u32,
    /// Cycles left until the next decrement.
    prescaler: u32,
    flags: TimerFlags,
    armed_at: Option<u64>,
}

impl Default for Riot {
    fn default() -> Self {
        Riot {
            intim: 0,
            timer: Timer::T1024T,
            interval: Timer::T1024T.divisor(),
            prescaler: Timer::T1024T.divisor(),
            flags: TimerFlags::default(),
            armed_at: None,
        }
    }
}

impl Riot {
    /// `value` is visible in `INTIM` at cycle `now`. It decrements every
    /// divisor cycles after that, reaching zero `value * divisor` cycles
    /// after the write.
    pub fn arm(&mut self, timer: Timer, value: u8, now: u64) {
        debug!("{} armed with {} ({} cycles) at cycle {}", timer.name(), value, value as u32 * timer.divisor(), now);
        self.intim = value;
        self.timer = timer;
        self.interval = timer.divisor();
        self.prescaler = self.interval;
        self.flags.set_expired(false);
        self.armed_at = Some(now);
    }

    /// One CPU cycle.
    pub fn tick(&mut self) {
        self.prescaler -= 1;
        if self.prescaler > 0 {
            return;
        }
        if self.intim == 0 && !self.flags.expired() {
            trace!("{} expired", self.timer.name());
            self.flags.set_expired(true);
            self.interval = 1;
        }
        self.intim = self.intim.wrapping_sub(1);
        self.prescaler = self.interval;
    }

    pub fn intim(&self) -> u8 {
        self.intim
    }

    /// `INTIM` reads as negative, i.e. bit 7 is set.
    pub fn is_negative(&self) -> bool {
        self.intim.get_bit(7)
    }

    pub fn flags(&self) -> TimerFlags {
        self.flags
    }

    pub fn timer(&self) -> Timer {
        self.timer
    }

    /// Cycle of the last write to a timer register.
    pub fn armed_at(&self) -> Option<u64> {
        self.armed_at
    }

    /// Register reads, with `addr` already known to select the RIOT.
    pub fn read(&self, addr: u16) -> u8 {
        if addr.get_bit(2) {
            if addr.get_bit(0) { self.flags.0 } else { self.intim }
        } else {
            match addr & 0x03 {
                // SWCHA: no joystick direction pressed
                0 => 0xFF,
                // SWCHB: color, both difficulties B, no console switch pressed
                2 => 0x0B,
                _ => 0x00,
            }
        }
    }

    /// Register writes, with `addr` already known to select the RIOT.
    pub fn write(&mut self, addr: u16, data: u8, now: u64) {
        if addr.get_bit(2) && addr.get_bit(4) {
            self.arm(Timer::from_write_address(addr), data, now);
        } else {
            debug!("Ignoring RIOT write ${:02X} to ${:04X}", data, addr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{INTIM, TIM8T, TIMINT};

    #[test]
    fn counts_down_once_per_interval() {
        let mut riot = Riot::default();
        riot.arm(Timer::Tim8T, 3, 0);
        let mut seen = [0u8; 33];
        for value in seen.iter_mut() {
            *value = riot.intim();
            riot.tick();
        }
        assert!(seen[..8].iter().all(|&v| v == 3));
        assert!(seen[8..16].iter().all(|&v| v == 2));
        assert!(seen[24..32].iter().all(|&v| v == 0));
        assert_eq!(seen[32], 0xFF);
    }

    #[test]
    fn counts_every_cycle_after_underflow() {
        let mut riot = Riot::default();
        riot.arm(Timer::Tim64T, 0, 0);
        for _ in 0..64 {
            riot.tick();
        }
        assert_eq!(riot.intim(), 0xFF);
        assert!(riot.flags().expired());
        assert!(riot.is_negative());
        riot.tick();
        assert_eq!(riot.intim(), 0xFE);
        for _ in 0..0xFE {
            riot.tick();
        }
        assert_eq!(riot.intim(), 0x00);
        riot.tick();
        assert_eq!(riot.intim(), 0xFF);
    }

    #[test]
    fn writes_decode_to_timers() {
        let mut riot = Riot::default();
        riot.write(TIM8T, 5, 100);
        assert_eq!(riot.timer(), Timer::Tim8T);
        assert_eq!(riot.read(INTIM), 5);
        assert_eq!(riot.read(TIMINT), 0);
        assert_eq!(riot.armed_at(), Some(100));

        // TIM64T with the interrupt-enable bit set
        riot.write(0x29E, 7, 200);
        assert_eq!(riot.timer(), Timer::Tim64T);
        assert_eq!(riot.armed_at(), Some(200));
    }

    #[test]
    fn rearming_clears_expired() {
        let mut riot = Riot::default();
        riot.arm(Timer::Tim1T, 0, 0);
        riot.tick();
        assert_eq!(riot.read(TIMINT), 0x80);
        riot.arm(Timer::Tim1T, 10, 1);
        assert_eq!(riot.read(TIMINT), 0x00);
    }
}
