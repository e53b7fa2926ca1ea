//! Shared helpers for integration tests.

use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a scratch directory holding `song.txt` with the given content.
#[allow(unused)]
pub fn workspace_with_song(content: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let song = temp.path().join("song.txt");
    fs::write(&song, content).unwrap();
    (temp, song)
}

/// Replaces the target file with a directory of the same name.
///
/// Makes any later attempt to rewrite or unlink the path as a file fail.
#[allow(unused)]
pub fn swap_file_for_directory(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    fs::create_dir(path)
}

/// Runs `safe-write write <path>` with extra arguments inside `dir`.
#[allow(unused)]
pub fn run_write(dir: &Path, path: &str, extra_args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = cargo_bin_cmd!("safe-write");
    cmd.arg("write")
        .arg(path)
        .args(extra_args)
        .current_dir(dir)
        .env("NO_COLOR", "1");
    cmd.assert()
}

/// Like [`run_write`] but feeds `stdin` to the process.
#[allow(unused)]
pub fn run_write_stdin(
    dir: &Path,
    path: &str,
    stdin: &[u8],
    extra_args: &[&str],
) -> assert_cmd::assert::Assert {
    let mut cmd = cargo_bin_cmd!("safe-write");
    cmd.arg("write")
        .arg(path)
        .args(extra_args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .write_stdin(stdin.to_vec());
    cmd.assert()
}
