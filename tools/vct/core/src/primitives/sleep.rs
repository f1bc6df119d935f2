use alloc::vec;
use alloc::vec::Vec;
use crate::asm::{Assembler, Condition, Op, Operand};

/// Instructions that do nothing but take time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pad {
    Nop,
    /// `bit $00`. Only the flags change.
    BitZp,
}

impl Pad {
    pub const ALL: [Pad; 2] = [Pad::Nop, Pad::BitZp];

    pub const fn cycles(self) -> u32 {
        match self {
            Pad::Nop => 2,
            Pad::BitZp => 3,
        }
    }

    pub const fn size(self) -> u32 {
        match self {
            Pad::Nop => 1,
            Pad::BitZp => 2,
        }
    }

    pub fn op(self) -> Op {
        match self {
            Pad::Nop => Op::Nop,
            Pad::BitZp => Op::Bit(Operand::ZeroPage(0x00)),
        }
    }
}

/// Largest `ldy` count the planner uses.
pub const MAX_LOOP_COUNT: u8 = 127;
/// `dey / bpl` runs `n + 1` times up to here. From 129 on, Y is already
/// negative after the first `dey`.
const LONGEST_LOOP: u8 = 128;
/// Fewest cycles any sleep can take (one `nop`).
pub const MIN_SLEEP: u32 = 2;
/// Most cycles a single plan covers: the longest loop plus six cycles of padding.
pub const MAX_SLEEP: u32 = SleepPlan::loop_cycles(MAX_LOOP_COUNT) + 6;

/// How to burn a fixed number of cycles.
///
/// ```text
///         ldy #n          ; only with a loop
/// .Sleep  dey
///         bpl .Sleep
///         bit $00         ; bit_zp times
///         nop             ; nops times
/// ```
///
/// The loop clobbers Y. The loop and `bit` clobber N and Z, `bit` also V.
/// A `bit $1000` would cost as much as two `nop`s in one more byte, so it
/// never appears.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SleepPlan {
    pub loop_count: Option<u8>,
    pub bit_zp: u8,
    pub nops: u8,
}

impl SleepPlan {
    /// Just `nop`s.
    pub const fn unrolled(nops: u8) -> SleepPlan {
        SleepPlan { loop_count: None, bit_zp: 0, nops }
    }

    pub const fn looped(n: u8, bit_zp: u8, nops: u8) -> SleepPlan {
        SleepPlan { loop_count: Some(n), bit_zp, nops }
    }

    /// `ldy #n / dey / bpl`: the `bpl` falls through once Y wraps to $FF.
    pub const fn loop_cycles(n: u8) -> u32 {
        5 * n as u32 + 6
    }

    pub const fn cycles(&self) -> u32 {
        let looped = match self.loop_count {
            Some(n) => Self::loop_cycles(n),
            None => 0,
        };
        looped
            + self.bit_zp as u32 * Pad::BitZp.cycles()
            + self.nops as u32 * Pad::Nop.cycles()
    }

    pub const fn size(&self) -> u32 {
        let looped = if self.loop_count.is_some() { 5 } else { 0 };
        looped
            + self.bit_zp as u32 * Pad::BitZp.size()
            + self.nops as u32 * Pad::Nop.size()
    }

    pub const fn instructions(&self) -> u32 {
        let looped = if self.loop_count.is_some() { 3 } else { 0 };
        looped + self.bit_zp as u32 + self.nops as u32
    }

    pub const fn clobbers_y(&self) -> bool {
        self.loop_count.is_some()
    }

    /// The smallest plan that takes exactly `cycles`.
    ///
    /// Ties on size go to the plan that leaves Y alone, then to the one with
    /// fewer instructions. `None` below [`MIN_SLEEP`], above [`MAX_SLEEP`],
    /// and for exactly 1 cycle, which nothing can burn.
    pub fn minimal(cycles: u32) -> Option<SleepPlan> {
        if !(MIN_SLEEP..=MAX_SLEEP).contains(&cycles) {
            return None;
        }
        let padding = padding_table(cycles);

        let mut best: Option<SleepPlan> = padding[cycles as usize].and_then(|pad| pad.into_plan(None));
        for n in 0..=MAX_LOOP_COUNT {
            let looped = Self::loop_cycles(n);
            if looped > cycles {
                break;
            }
            let Some(plan) = padding[(cycles - looped) as usize].and_then(|pad| pad.into_plan(Some(n))) else {
                continue;
            };
            if best.map_or(true, |b| plan.rank() < b.rank()) {
                best = Some(plan);
            }
        }
        best
    }

    fn rank(&self) -> (u32, bool, u32) {
        (self.size(), self.clobbers_y(), self.instructions())
    }

    /// Appends the plan. The loop's branch must not cross a page.
    pub fn emit(&self, asm: &mut Assembler) {
        if let Some(n) = self.loop_count {
            debug_assert!(n <= LONGEST_LOOP, "a loop count of {n} exits after one pass");
            asm.emit(Op::Ldy(Operand::Immediate(n)));
            let sleep = asm.new_label(".Sleep");
            asm.bind(sleep);
            asm.emit(Op::Dey);
            asm.branch(Condition::Pl, sleep);
        }
        for (pad, count) in [(Pad::BitZp, self.bit_zp), (Pad::Nop, self.nops)] {
            for _ in 0..count {
                asm.emit(pad.op());
            }
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct Padding {
    counts: [u32; 2],
    size: u32,
    instructions: u32,
}

impl Padding {
    fn into_plan(self, loop_count: Option<u8>) -> Option<SleepPlan> {
        let [nops, bit_zp] = self.counts;
        Some(SleepPlan {
            loop_count,
            bit_zp: u8::try_from(bit_zp).ok()?,
            nops: u8::try_from(nops).ok()?,
        })
    }
}

/// Cheapest padding for every cycle count up to `max`, by size then
/// instruction count. Entry 1 is `None`.
fn padding_table(max: u32) -> Vec<Option<Padding>> {
    let mut table = vec![None; max as usize + 1];
    table[0] = Some(Padding::default());
    for cycles in 1..=max as usize {
        for (i, pad) in Pad::ALL.iter().enumerate() {
            let Some(rest) = cycles.checked_sub(pad.cycles() as usize) else { continue };
            let Some(mut candidate) = table[rest] else { continue };
            candidate.counts[i] += 1;
            candidate.size += pad.size();
            candidate.instructions += 1;
            let better = match table[cycles] {
                None => true,
                Some(current) => (candidate.size, candidate.instructions) < (current.size, current.instructions),
            };
            if better {
                table[cycles] = Some(candidate);
            }
        }
    }
    table
}

/// A hand-picked sleep for one cycle count.
#[derive(Copy, Clone, Debug)]
pub struct FixedSleep {
    pub cycles: u32,
    pub plan: SleepPlan,
    pub emit: fn(&mut Assembler),
}

macro_rules! fixed_sleeps {
    ($($name:ident = $cycles:literal => $plan:expr;)*) => {
        $(
            #[doc = concat!("Burns exactly ", stringify!($cycles), " cycles.")]
            pub fn $name(asm: &mut Assembler) {
                const PLAN: SleepPlan = $plan;
                PLAN.emit(asm)
            }
        )*

        /// Every fixed sleep, shortest first.
        pub const FIXED_SLEEPS: &[FixedSleep] = &[
            $(FixedSleep { cycles: $cycles, plan: $plan, emit: $name },)*
        ];
    };
}

fixed_sleeps! {
    sleep_14 = 14 => SleepPlan::unrolled(7);
    sleep_17 = 17 => SleepPlan::looped(1, 0, 3);
    sleep_32 = 32 => SleepPlan::looped(4, 0, 3);
    sleep_34 = 34 => SleepPlan::looped(5, 1, 0);
    sleep_35 = 35 => SleepPlan::looped(5, 0, 2);
    sleep_36 = 36 => SleepPlan::looped(6, 0, 0);
    sleep_43 = 43 => SleepPlan::looped(7, 0, 1);
    sleep_45 = 45 => SleepPlan::looped(7, 0, 2);
    sleep_48 = 48 => SleepPlan::looped(8, 0, 1);
    sleep_49 = 49 => SleepPlan::looped(8, 1, 0);
    sleep_51 = 51 => SleepPlan::looped(9, 0, 0);
    sleep_52 = 52 => SleepPlan::looped(8, 0, 3);
    sleep_54 = 54 => SleepPlan::looped(9, 1, 0);
    sleep_55 = 55 => SleepPlan::looped(9, 0, 2);
    sleep_56 = 56 => SleepPlan::looped(10, 0, 0);
    sleep_61 = 61 => SleepPlan::looped(11, 0, 0);
}

pub fn fixed_sleep(cycles: u32) -> Option<&'static FixedSleep> {
    FIXED_SLEEPS.iter().find(|sleep| sleep.cycles == cycles)
}

/// Burns exactly `cycles`, using the hand-picked sequence when there is one
/// and the planner otherwise. Returns the plan used, or `None` (emitting
/// nothing) if no plan reaches that count.
pub fn sleep(asm: &mut Assembler, cycles: u32) -> Option<SleepPlan> {
    let plan = match fixed_sleep(cycles) {
        Some(fixed) => fixed.plan,
        None => SleepPlan::minimal(cycles)?,
    };
    plan.emit(asm);
    Some(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_sleeps_take_their_cycles() {
        for fixed in FIXED_SLEEPS {
            assert_eq!(fixed.plan.cycles(), fixed.cycles, "{:?}", fixed.plan);
        }
    }

    #[test]
    fn fixed_sleeps_are_as_small_as_the_planner_can_do() {
        for fixed in FIXED_SLEEPS {
            let planned = SleepPlan::minimal(fixed.cycles).unwrap();
            assert_eq!(fixed.plan.size(), planned.size(), "{} cycles", fixed.cycles);
            assert_eq!(fixed.plan, planned, "{} cycles", fixed.cycles);
        }
    }

    #[test]
    fn short_sleeps_leave_y_alone() {
        assert_eq!(SleepPlan::minimal(2), Some(SleepPlan::unrolled(1)));
        assert_eq!(SleepPlan::minimal(3).unwrap().bit_zp, 1);
        assert_eq!(SleepPlan::minimal(14), Some(SleepPlan::unrolled(7)));
        assert!(!SleepPlan::minimal(13).unwrap().clobbers_y());
    }

    #[test]
    fn planner_covers_its_whole_range() {
        assert_eq!(SleepPlan::minimal(0), None);
        assert_eq!(SleepPlan::minimal(1), None);
        assert_eq!(SleepPlan::minimal(MAX_SLEEP + 1), None);
        for cycles in MIN_SLEEP..=MAX_SLEEP {
            let plan = SleepPlan::minimal(cycles).unwrap();
            assert_eq!(plan.cycles(), cycles, "{plan:?}");
            assert!(plan.size() <= 8, "{cycles} cycles: {plan:?}");
        }
    }

    #[test]
    fn longest_sleep_is_a_full_loop() {
        let plan = SleepPlan::minimal(MAX_SLEEP).unwrap();
        assert_eq!(plan.loop_count, Some(MAX_LOOP_COUNT));
        assert_eq!(MAX_SLEEP, 647);
    }

    #[test]
    fn emit_matches_size() {
        for fixed in FIXED_SLEEPS {
            let mut asm = Assembler::new(0xF000);
            (fixed.emit)(&mut asm);
            assert_eq!(asm.finish().unwrap().size() as u32, fixed.plan.size());
        }
    }

    #[test]
    fn loop_counts_up_to_128_run_every_pass() {
        use crate::machine::Machine;

        for n in [MAX_LOOP_COUNT, LONGEST_LOOP] {
            let mut asm = Assembler::new(0xF000);
            SleepPlan::looped(n, 0, 0).emit(&mut asm);
            let program = asm.finish().unwrap();
            let mut machine = Machine::new();
            assert_eq!(machine.run(&program, 1000), Ok(SleepPlan::loop_cycles(n) as u64), "ldy #{n}");
        }
    }

    #[test]
    fn sleep_falls_back_to_the_planner() {
        let mut asm = Assembler::new(0xF000);
        assert_eq!(sleep(&mut asm, 36), Some(fixed_sleep(36).unwrap().plan));
        assert!(sleep(&mut asm, 100).is_some());
        assert_eq!(sleep(&mut asm, 1), None);
    }
}
