use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};
use vct_core::asm::{Op, Operand};
use vct_core::primitives::*;
use vct_core::registers::{Timer, TIM64T, TIM8T};
use vct_core::{Assembler, Machine};

/// One simulated run: the machine afterwards and the cycles it took.
struct Run {
    machine: Machine,
    elapsed: u64,
}

impl Run {
    /// Cycles from the timer write to the `INTIM` read that ended the final
    /// poll loop (the `lda`'s last cycle, before the untaken branch).
    fn waited(&self) -> Option<u64> {
        let armed = self.machine.bus.riot.armed_at()?;
        Some(self.machine.cycles() - 3 - armed)
    }
}

struct Verifier {
    origin: u16,
    budget: u64,
    passed: usize,
    failed: usize,
}

impl Verifier {
    fn run(&self, build: impl FnOnce(&mut Assembler)) -> Result<Run> {
        self.try_run(|asm| {
            build(asm);
            Ok(())
        })
    }

    fn try_run(&self, build: impl FnOnce(&mut Assembler) -> Result<()>) -> Result<Run> {
        let mut asm = Assembler::new(self.origin);
        build(&mut asm)?;
        let program = asm.finish()?;
        let mut machine = Machine::new();
        let elapsed = machine.run(&program, self.budget)?;
        Ok(Run { machine, elapsed })
    }

    fn check(&mut self, name: &str, outcome: Result<Run>, expect: impl FnOnce(&Run) -> Result<(), String>) {
        let verdict = match outcome {
            Ok(run) => expect(&run),
            Err(e) => Err(format!("{e:#}")),
        };
        match verdict {
            Ok(()) => {
                debug!("{}: ok", name);
                self.passed += 1;
            }
            Err(why) => {
                warn!("{}: {}", name, why);
                self.failed += 1;
            }
        }
    }
}

fn exactly(expected: u64) -> impl FnOnce(&Run) -> Result<(), String> {
    move |run| {
        if run.elapsed == expected {
            Ok(())
        } else {
            Err(format!("took {} cycles, expected {}", run.elapsed, expected))
        }
    }
}

/// The loop saw its condition within one poll of `from`.
fn detected_within_poll(from: u64) -> impl FnOnce(&Run) -> Result<(), String> {
    move |run| match run.waited() {
        Some(waited) if (from..from + POLL_PERIOD as u64).contains(&waited) => Ok(()),
        Some(waited) => Err(format!("stopped {waited} cycles after arming, expected {from}..{}", from + POLL_PERIOD as u64)),
        None => Err(String::from("timer was never armed")),
    }
}

fn armed_wait(timer_register: u16, value: u8, wait: fn(&mut Assembler)) -> impl FnOnce(&mut Assembler) {
    move |asm| {
        asm.emit(Op::Lda(Operand::Immediate(value)));
        asm.emit(Op::Sta(Operand::address(timer_register)));
        wait(asm);
    }
}

pub fn verify(origin: u16, budget: u64) -> Result<()> {
    let mut v = Verifier { origin, budget, passed: 0, failed: 0 };

    for fixed in FIXED_SLEEPS {
        let outcome = v.run(fixed.emit);
        v.check(&format!("sleep_{}", fixed.cycles), outcome, exactly(fixed.cycles as u64));
    }

    for cycles in MIN_SLEEP..=MAX_SLEEP {
        let outcome = v.try_run(|asm| {
            sleep(asm, cycles).with_context(|| format!("no plan burns exactly {cycles} cycles"))?;
            Ok(())
        });
        v.check(&format!("planned sleep of {cycles}"), outcome, exactly(cycles as u64));
    }

    for lines in 1..=255u8 {
        let outcome = v.run(|asm| sleep_lines(asm, lines));
        v.check(&format!("sleep_lines({lines})"), outcome, |run| {
            let tia = &run.machine.bus.tia;
            if tia.scanline() == lines as u64 && tia.wsync_writes() == lines as u64 {
                Ok(())
            } else {
                Err(format!("ended on line {} after {} WSYNC writes", tia.scanline(), tia.wsync_writes()))
            }
        });
    }

    let outcome = v.run(armed_wait(TIM64T, 3, timer_wait));
    v.check("timer_wait", outcome, detected_within_poll(3 * 64));
    let outcome = v.run(armed_wait(TIM64T, 0xC0, timer_wait));
    v.check("timer_wait past negative values", outcome, detected_within_poll(0xC0 * 64));
    let outcome = v.run(armed_wait(TIM8T, 2, timer_wait_negative));
    v.check("timer_wait_negative", outcome, detected_within_poll(3 * 8));

    // TIM1T is left out: its zero lasts one cycle and a poll can miss it
    for timer in [Timer::Tim8T, Timer::Tim64T, Timer::T1024T] {
        let outcome = v.run(|asm| {
            let null = asm.new_label("NullProcedure");
            asm.bind(null);
            asm.emit(Op::Rts);
            asm.mark_entry();
            timed_call(asm, null, 20, timer);
        });
        v.check(&format!("timed_call with {}", timer.name()), outcome, detected_within_poll(20 * timer.divisor() as u64));
    }

    let total = v.passed + v.failed;
    if v.failed > 0 {
        bail!("{} of {} checks failed", v.failed, total);
    }
    info!("all {} checks passed", total);
    println!("{total} checks passed");
    Ok(())
}
