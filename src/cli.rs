use crate::command::Command;
use clap::{ArgAction, Parser};

#[derive(Parser)]
#[command(name = "safe-write", version, about)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Installs the logger. `RUST_LOG`, when set, overrides `verbosity`.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}
