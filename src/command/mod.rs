pub mod inspect;
pub mod write;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Command {
    /// Replace a file's contents, restoring it if the write fails.
    Write(write::WriteArgs),
    /// Show the state a write would snapshot for a file.
    Inspect(inspect::InspectArgs),
}

/// Formats `path` relative to the working directory with forward slashes.
pub(crate) fn display_path(path: &std::path::Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .filter(|_| path.is_absolute())
        .and_then(|cwd| pathdiff::diff_paths(path, cwd))
        .unwrap_or_else(|| path.to_path_buf());
    relative.to_string_lossy().replace('\\', "/")
}
