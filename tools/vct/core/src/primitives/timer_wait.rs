use crate::asm::{Assembler, Condition};
use super::poll_intim;

/// Waits for `INTIM` to read zero. The timer must already be running.
///
/// Only an exact zero stops it, so a value with bit 7 set keeps it waiting.
/// With `TIM1T` the zero lasts one cycle and a poll can miss it; the loop
/// then runs until the counter wraps back round.
///
/// Clobbers A and N/Z.
pub fn timer_wait(asm: &mut Assembler) {
    poll_intim(asm, ".WaitZero", Condition::Ne);
}

/// Waits for `INTIM` to go negative, that is past zero. The timer must
/// already be running.
///
/// Unlike [`timer_wait`] this can't be missed: once the timer underflows it
/// stays negative for at least 128 cycles.
///
/// Clobbers A and N/Z.
pub fn timer_wait_negative(asm: &mut Assembler) {
    poll_intim(asm, ".WaitNegative", Condition::Pl);
}
