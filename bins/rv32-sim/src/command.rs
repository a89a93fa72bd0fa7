//! holding command related structures
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(name = "rv32-sim")]
#[clap(version, about = "Cycle-level simulator for RV32I flat binaries")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a flat RV32I binary until it halts or faults
    Run(RunArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Path to the raw little-endian instruction stream
    pub program: PathBuf,

    /// Physical memory size in bytes
    #[clap(long, default_value_t = 1024 * 1024)]
    pub memory_size: usize,

    /// Stop with an error after this many cycles
    #[clap(long)]
    pub max_cycles: Option<u64>,

    /// Dump x0..x31 and the pc after the run
    #[clap(long)]
    pub registers: bool,
}
