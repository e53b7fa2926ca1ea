use crate::command::display_path;
use crate::error::Result;
use crate::fs::capture;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// File to inspect
    pub path: PathBuf,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let snapshot = capture(&args.path)?;
    let display = display_path(&args.path);

    match snapshot.content() {
        Some(content) => {
            let encoding = if std::str::from_utf8(content).is_ok() {
                "utf-8"
            } else {
                "binary"
            };
            println!(
                "{} {} ({} bytes, {})",
                "exists".green().bold(),
                display,
                content.len(),
                encoding
            );
        }
        None => println!("{} {}", "absent".yellow().bold(), display),
    }

    Ok(())
}
