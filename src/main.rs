//! Binary entry point for `safe-write`.

use std::process;

fn main() {
    if let Err(e) = safe_write::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
