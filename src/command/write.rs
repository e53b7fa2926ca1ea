use crate::access::{RequestContext, Role};
use crate::command::display_path;
use crate::error::{Result, SafeWriteError};
use crate::fs::{Outcome, Restoration, RollbackPolicy, Snapshot, Transaction, capture};
use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[clap(verbatim_doc_comment)]
pub struct WriteArgs {
    /// File whose contents will be replaced
    pub path: PathBuf,

    /// Text to write
    ///
    /// When neither --content nor --from is given, the content is read from stdin.
    #[arg(long, short = 'c', conflicts_with = "from")]
    pub content: Option<String>,

    /// Read the new content from this file
    #[arg(long, value_name = "FILE")]
    pub from: Option<PathBuf>,

    /// Reject content that is not valid UTF-8
    ///
    /// The check runs after the bytes are written, so rejected content is
    /// rolled back like any other failed write.
    #[arg(long)]
    pub utf8: bool,

    /// What to do when restoring the original state fails
    ///
    ///   lenient   Log only
    ///   standard  Fail on a failed restore; log a failed cleanup
    ///   strict    Fail on a failed restore or cleanup
    #[arg(long, value_enum, default_value_t = RollbackPolicy::Standard, verbatim_doc_comment)]
    pub rollback_policy: RollbackPolicy,

    /// Role of the caller
    #[arg(long, value_enum, default_value_t = Role::User)]
    pub role: Role,

    /// Refuse to write unless the caller holds this role
    #[arg(long, value_enum, value_name = "ROLE")]
    pub require_role: Option<Role>,

    /// Show what would change without writing
    #[arg(long, short = 'n')]
    pub dry_run: bool,
}

pub fn execute(args: WriteArgs) -> Result<()> {
    if let Some(required) = args.require_role {
        RequestContext::new(args.role).require(required)?;
    }

    let content = read_content(&args)?;

    if args.dry_run {
        let snapshot = capture(&args.path)?;
        print_plan(&args.path, &snapshot, content.len());
        return Ok(());
    }

    let require_utf8 = args.utf8;
    let outcome = Transaction::new(&args.path)
        .with_policy(args.rollback_policy)
        .run(|session| -> Result<()> {
            session.append(&content)?;
            if require_utf8 {
                std::str::from_utf8(&content)
                    .map_err(|e| SafeWriteError::InvalidContent(e.to_string()))?;
            }
            Ok(())
        })?;

    print_outcome(&args.path, &outcome);
    Ok(())
}

fn read_content(args: &WriteArgs) -> Result<Vec<u8>> {
    if let Some(text) = &args.content {
        return Ok(text.clone().into_bytes());
    }

    if let Some(source) = &args.from {
        let bytes = fs::read(source)
            .with_context(|| format!("Failed to read content from {}", source.display()))?;
        return Ok(bytes);
    }

    log::debug!("Reading content from stdin");
    let mut bytes = Vec::new();
    std::io::stdin()
        .read_to_end(&mut bytes)
        .context("Failed to read content from stdin")?;
    Ok(bytes)
}

fn print_plan(path: &Path, snapshot: &Snapshot, new_len: usize) {
    println!("\n{}", "DRY RUN - No changes will be made".yellow().bold());

    let display = display_path(path);
    if snapshot.existed() {
        println!(
            "   {} {} ({} → {} bytes)",
            "Replace:".bold(),
            display.dimmed(),
            snapshot.len(),
            new_len
        );
    } else {
        println!(
            "   {} {} ({} bytes)",
            "Create:".bold(),
            display.dimmed(),
            new_len
        );
    }

    println!("\nRun without {} to apply.", "--dry-run".cyan());
}

fn print_outcome(path: &Path, outcome: &Outcome) {
    let display = display_path(path);

    match outcome {
        Outcome::Committed { bytes_written } => {
            println!(
                "{} {} ({} bytes)",
                "✓ Wrote".green().bold(),
                display,
                bytes_written
            );
        }
        Outcome::RolledBack { cause, restoration } => {
            println!(
                "{} {} during write to {}: {}",
                "Rolled back:".yellow().bold(),
                cause.kind.red(),
                display,
                cause.message
            );

            match restoration {
                Restoration::Restored { bytes } => println!(
                    "   {} Restored original content ({} bytes)",
                    "✓".green(),
                    bytes
                ),
                Restoration::Removed => {
                    println!("   {} Removed newly created file", "✓".green())
                }
                Restoration::AlreadyAbsent => {
                    println!("   {} File was not left behind", "✓".green())
                }
                Restoration::Incomplete { error } => eprintln!(
                    "   {} Rollback incomplete: {}",
                    "✗".red().bold(),
                    error
                ),
            }
        }
    }
}
