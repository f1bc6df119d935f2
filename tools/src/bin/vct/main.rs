mod emit;
mod verify;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;
use vcs_timing_sdk::{parse_address, TimerArg};
use vct_core::primitives::{SleepPlan, MAX_SLEEP, MIN_SLEEP};

#[derive(Parser)]
#[command(name = "vct")]
#[command(version, about = "Atari VCS cycle-timing toolkit", long_about = None)]
struct Cli {
    /// Address code is assembled at ($F000, 0xF000 or F000)
    #[arg(long, global = true, default_value = "$F000", value_parser = parse_address)]
    origin: u16,

    /// Cycle budget for each simulated run
    #[arg(long, global = true, default_value_t = 100_000)]
    budget: u64,

    /// More logging; repeat for trace output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a primitive as DASM source
    Emit {
        /// Print the assembled bytes instead of source
        #[arg(long)]
        hex: bool,

        #[command(subcommand)]
        primitive: Primitive,
    },

    /// Show the smallest sequence that burns a cycle count
    Plan {
        cycles: u32,
    },

    /// Run every primitive in the simulator and check its timing
    Verify,
}

#[derive(Subcommand)]
pub enum Primitive {
    /// Arm the timer, call a procedure, wait out the rest of the interval
    TimedCall {
        /// Address of the procedure to call
        #[arg(long, value_parser = parse_address)]
        procedure: u16,

        /// Interval in timer ticks
        #[arg(long)]
        interval: u8,

        #[arg(long, value_enum, default_value_t = TimerArg::Tim8t)]
        timer: TimerArg,
    },

    /// Wait for the running timer to reach zero
    TimerWait {
        /// Wait for it to go past zero instead
        #[arg(long)]
        negative: bool,
    },

    /// Burn whole scan lines
    SleepLines {
        #[arg(value_parser = clap::value_parser!(u8).range(1..))]
        lines: u8,
    },

    /// Burn an exact number of cycles
    Sleep {
        cycles: u32,

        /// Allow counts without a hand-picked sequence
        #[arg(long)]
        plan: bool,
    },
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .compact()
        .finish()
        .init();
}

fn plan(cycles: u32) -> anyhow::Result<()> {
    let Some(plan) = SleepPlan::minimal(cycles) else {
        anyhow::bail!("{cycles} cycles can't be burned by one plan (range is {MIN_SLEEP}..={MAX_SLEEP}, and 1 is impossible)");
    };
    match plan.loop_count {
        Some(n) => println!("loop:    ldy #{n} / dey / bpl  ({} cycles)", SleepPlan::loop_cycles(n)),
        None => println!("loop:    none"),
    }
    println!("bit zp:  {}", plan.bit_zp);
    println!("nop:     {}", plan.nops);
    println!("{} cycles, {} bytes, {} instructions{}", plan.cycles(), plan.size(), plan.instructions(),
        if plan.clobbers_y() { ", clobbers Y" } else { "" });
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Emit { hex, primitive } => emit::emit(cli.origin, &primitive, hex),
        Commands::Plan { cycles } => plan(cycles),
        Commands::Verify => verify::verify(cli.origin, cli.budget),
    }
}
