use crate::asm::{Assembler, Condition, Op, Operand, Target};
use crate::registers::Timer;
use super::poll_intim;

/// Calls `procedure` and returns no earlier than `interval` timer ticks after
/// the timer was armed, whatever the procedure took (as long as it took less).
///
/// ```text
///         lda #interval
///         sta TIMxxT
///         jsr procedure
/// .Wait   lda INTIM
///         bne .Wait
/// ```
///
/// Clobbers A and N/Z. A is 0 afterwards. If the procedure overruns the
/// interval the wait ends at some later, unspecified point.
pub fn timed_call(asm: &mut Assembler, procedure: impl Into<Target>, interval: u8, timer: Timer) {
    asm.emit(Op::Lda(Operand::Immediate(interval)));
    asm.emit(Op::Sta(Operand::address(timer.write_register())));
    asm.jsr(procedure);
    poll_intim(asm, ".TimedCall", Condition::Ne);
}
