//! Pre-write snapshots of a target file.
//!
//! A snapshot records whether the target existed and, if it did, its exact
//! bytes. It is taken before the target is truncated and is what rollback
//! restores from.

use crate::error::{Result, SafeWriteError};

use std::fs;
use std::io;
use std::path::Path;

/// Recorded prior state of a file.
///
/// `content` is `Some` exactly when the file existed, so an "existed but no
/// content" snapshot cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    content: Option<Vec<u8>>,
}

impl Snapshot {
    /// Snapshot of a path that did not exist.
    pub fn absent() -> Self {
        Self { content: None }
    }

    /// Snapshot of a file holding `content`.
    pub fn existing(content: Vec<u8>) -> Self {
        Self {
            content: Some(content),
        }
    }

    pub fn existed(&self) -> bool {
        self.content.is_some()
    }

    /// Prior bytes, or `None` if the file did not exist.
    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }

    /// Size of the prior content in bytes (0 when absent).
    pub fn len(&self) -> usize {
        self.content.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Captures the current state of `path`.
///
/// Absence is not an error. Any other read failure (permission denied, path
/// is a directory, ...) is returned as [`SafeWriteError::Capture`].
pub fn capture(path: &Path) -> Result<Snapshot> {
    match fs::read(path) {
        Ok(content) => {
            log::debug!(
                "Captured {} bytes from {}",
                content.len(),
                path.display()
            );
            Ok(Snapshot::existing(content))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("Captured absent target: {}", path.display());
            Ok(Snapshot::absent())
        }
        Err(e) => {
            log::error!("Failed to read {}: {}", path.display(), e);
            Err(SafeWriteError::Capture {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }
}
