//! The timing primitives.
//!
//! Each one appends its instructions to an [`Assembler`]. None of them saves
//! registers; what each one clobbers is listed on it. Labels they create are
//! private to the emitted sequence.

mod timed_call;
mod timer_wait;
mod sleep_lines;
mod sleep;

pub use timed_call::timed_call;
pub use timer_wait::{timer_wait, timer_wait_negative};
pub use sleep_lines::sleep_lines;
pub use sleep::*;

use crate::asm::{Assembler, Condition, Op, Operand};
use crate::registers::INTIM;

/// `lda INTIM` until `cond` fails. Seven cycles per iteration, so the value
/// that stops it is seen up to six cycles late.
fn poll_intim(asm: &mut Assembler, name: &'static str, cond: Condition) {
    let poll = asm.new_label(name);
    asm.bind(poll);
    asm.emit(Op::Lda(Operand::address(INTIM)));
    asm.branch(cond, poll);
}

/// Cycles between two `INTIM` reads of a polling loop.
pub const POLL_PERIOD: u32 = 7;
