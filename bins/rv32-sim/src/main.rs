//! rv32-sim cli
mod command;
mod handlers;
mod utils;

use anyhow::Result;
use clap::Parser;
use command::{Cli, Commands};
use handlers::run_program;
use utils::init_logger;

fn main() -> Result<()> {
    // Initialize the logger
    init_logger();

    // Parse the command line arguments
    let cli = Cli::parse();

    // Handle the command
    match cli.command {
        Some(Commands::Run(args)) => run_program(&args)?,
        None => {
            println!("Usage: rv32-sim <COMMAND>");
            println!("\nFor more information try 'rv32-sim --help'");
        }
    }

    Ok(())
}
