//! Cycle-exact timing primitives for the Atari VCS.
//!
//! [`primitives`] appends the timing sequences to an [`asm::Assembler`];
//! [`machine`] is a simulated 6507 + RIOT + TIA that runs the result and
//! counts every cycle, which is how the sequences are checked.
#![no_std]
extern crate alloc;

pub mod registers;
pub mod asm;
pub mod primitives;
pub mod machine;

pub use asm::{Assembler, AsmError, Label, Program, Target};
pub use machine::{Machine, SimError};
pub use registers::Timer;
