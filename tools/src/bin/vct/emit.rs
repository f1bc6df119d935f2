use anyhow::{bail, Context, Result};
use tracing::info;
use vct_core::primitives::*;
use vct_core::{Assembler, Program};
use crate::Primitive;

pub fn emit(origin: u16, primitive: &Primitive, hex: bool) -> Result<()> {
    let mut asm = Assembler::new(origin);

    match *primitive {
        Primitive::TimedCall { procedure, interval, timer } => {
            timed_call(&mut asm, procedure, interval, timer.into());
        }
        Primitive::TimerWait { negative: false } => timer_wait(&mut asm),
        Primitive::TimerWait { negative: true } => timer_wait_negative(&mut asm),
        Primitive::SleepLines { lines } => sleep_lines(&mut asm, lines),
        Primitive::Sleep { cycles, plan } => match fixed_sleep(cycles) {
            Some(fixed) => (fixed.emit)(&mut asm),
            None if plan => {
                let plan = SleepPlan::minimal(cycles)
                    .with_context(|| format!("no plan burns exactly {cycles} cycles"))?;
                info!("no hand-picked sleep for {} cycles, using the planner", cycles);
                plan.emit(&mut asm);
            }
            None => {
                let menu: Vec<String> = FIXED_SLEEPS.iter().map(|s| s.cycles.to_string()).collect();
                bail!("no fixed sleep for {cycles} cycles (have {}); pass --plan to use the planner", menu.join(", "));
            }
        },
    }

    let program = asm.finish().context("failed to assemble")?;
    if hex {
        print_hex(&program);
    } else {
        print!("{}", program.listing());
        println!("; {} bytes, {} cycles straight through", program.size(), program.static_cycles());
    }
    Ok(())
}

fn print_hex(program: &Program) {
    for (i, row) in program.bytes().chunks(16).enumerate() {
        let bytes: Vec<String> = row.iter().map(|b| format!("{b:02X}")).collect();
        println!("${:04X}: {}", program.origin() as usize + i * 16, bytes.join(" "));
    }
}
