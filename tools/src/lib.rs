//! VCS timing toolkit - shared library code
//!
//! The `vct` binary is a thin front end over `vct-core`; the pieces here are
//! the argument types it shares with anything else that wants to drive it.

use clap::ValueEnum;
use vct_core::Timer;

/// Parses `$F000`, `0xF000` or `F000` as a 16-bit address.
pub fn parse_address(s: &str) -> Result<u16, String> {
    let digits = s
        .strip_prefix('$')
        .or_else(|| s.strip_prefix("0x"))
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u16::from_str_radix(digits, 16).map_err(|e| format!("`{s}` is not a hex address: {e}"))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TimerArg {
    Tim1t,
    Tim8t,
    Tim64t,
    T1024t,
}

impl From<TimerArg> for Timer {
    fn from(arg: TimerArg) -> Timer {
        match arg {
            TimerArg::Tim1t => Timer::Tim1T,
            TimerArg::Tim8t => Timer::Tim8T,
            TimerArg::Tim64t => Timer::Tim64T,
            TimerArg::T1024t => Timer::T1024T,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_parse_in_every_spelling() {
        assert_eq!(parse_address("$F000"), Ok(0xF000));
        assert_eq!(parse_address("0xf800"), Ok(0xF800));
        assert_eq!(parse_address("1000"), Ok(0x1000));
        assert!(parse_address("$10000").is_err());
        assert!(parse_address("zz").is_err());
    }
}
