//! Subcommand handlers for the simulator CLI.
use anyhow::{Context, Result};
use colored::Colorize;
use rv32_core::cpu::Cpu;
use tracing::info;

use crate::command::RunArgs;

/// Load the program image, run it to completion, and report the outcome.
pub fn run_program(args: &RunArgs) -> Result<()> {
    let mut cpu = Cpu::new(args.memory_size);

    let loaded = cpu
        .load_program(&args.program)
        .with_context(|| format!("failed to load program {}", args.program.display()))?;
    info!("Loaded {} bytes from {}", loaded, args.program.display());

    match args.max_cycles {
        Some(budget) => cpu.run_for(budget),
        None => cpu.run(),
    }
    .context("execution stopped on a fault")?;

    println!("\n✅ {}\n", "Program halted normally".green().bold());

    if args.registers {
        println!("{}", cpu.regs);
    }

    Ok(())
}
