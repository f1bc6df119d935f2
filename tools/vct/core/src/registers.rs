// TIA
pub const VSYNC: u16  = 0x00;
pub const VBLANK: u16 = 0x01;
pub const WSYNC: u16  = 0x02;
pub const RSYNC: u16  = 0x03;

// RIOT
pub const SWCHA: u16  = 0x280;
pub const SWACNT: u16 = 0x281;
pub const SWCHB: u16  = 0x282;
pub const SWBCNT: u16 = 0x283;
pub const INTIM: u16  = 0x284;
pub const TIMINT: u16 = 0x285;
pub const TIM1T: u16  = 0x294;
pub const TIM8T: u16  = 0x295;
pub const TIM64T: u16 = 0x296;
pub const T1024T: u16 = 0x297;

/// CPU cycles per scan line (228 color clocks / 3).
pub const CYCLES_PER_LINE: u32 = 76;

/// Which RIOT write register arms the timer, and so how many CPU cycles make
/// one tick of `INTIM`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Timer {
    Tim1T,
    Tim8T,
    Tim64T,
    T1024T,
}

impl Timer {
    pub const ALL: [Timer; 4] = [Timer::Tim1T, Timer::Tim8T, Timer::Tim64T, Timer::T1024T];

    #[inline(always)]
    pub fn write_register(self) -> u16 {
        match self {
            Timer::Tim1T => TIM1T,
            Timer::Tim8T => TIM8T,
            Timer::Tim64T => TIM64T,
            Timer::T1024T => T1024T,
        }
    }

    #[inline(always)]
    pub fn divisor(self) -> u32 {
        match self {
            Timer::Tim1T => 1,
            Timer::Tim8T => 8,
            Timer::Tim64T => 64,
            Timer::T1024T => 1024,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Timer::Tim1T => "TIM1T",
            Timer::Tim8T => "TIM8T",
            Timer::Tim64T => "TIM64T",
            Timer::T1024T => "T1024T",
        }
    }

    /// The timer a RIOT write address selects, ignoring the interrupt-enable bit.
    pub fn from_write_address(addr: u16) -> Timer {
        match addr & 0x03 {
            0 => Timer::Tim1T,
            1 => Timer::Tim8T,
            2 => Timer::Tim64T,
            _ => Timer::T1024T,
        }
    }
}

/// Conventional name of a register, for listings.
pub fn symbol(addr: u16) -> Option<&'static str> {
    Some(match addr {
        VSYNC => "VSYNC",
        VBLANK => "VBLANK",
        WSYNC => "WSYNC",
        RSYNC => "RSYNC",
        SWCHA => "SWCHA",
        SWACNT => "SWACNT",
        SWCHB => "SWCHB",
        SWBCNT => "SWBCNT",
        INTIM => "INTIM",
        TIMINT => "TIMINT",
        TIM1T => "TIM1T",
        TIM8T => "TIM8T",
        TIM64T => "TIM64T",
        T1024T => "T1024T",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_registers_decode_back() {
        for timer in Timer::ALL {
            assert_eq!(Timer::from_write_address(timer.write_register()), timer);
            assert_eq!(symbol(timer.write_register()), Some(timer.name()));
        }
    }
}
