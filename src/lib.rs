#![doc = include_str!("../README.md")]

pub mod access;
pub mod cache;
pub mod cli;
pub mod command;
pub mod error;
pub mod fs;

pub use error::*;
pub use fs::{Outcome, RollbackPolicy, Transaction, run_transaction};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() -> Result<()> {
    use clap::Parser;
    use command::Command;

    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbose);

    match cli.command {
        Command::Write(args) => command::write::execute(args),
        Command::Inspect(args) => command::inspect::execute(args),
    }
}
