//! Append-only write handle over a single target file.

use crate::error::{Result, SafeWriteError};

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Exclusive writable handle bound to one target.
///
/// Opening truncates (or creates) the target. Only appending is exposed; the
/// handle is released by [`close`](Self::close) or on drop, whichever comes
/// first.
#[derive(Debug)]
pub struct WriteSession {
    path: PathBuf,
    file: Option<File>,
    bytes_written: u64,
}

impl WriteSession {
    /// Truncates or creates `path` and binds a handle to it.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| {
            log::error!("Failed to open {}: {}", path.display(), e);
            SafeWriteError::Open {
                path: path.to_path_buf(),
                source: e,
            }
        })?;

        log::debug!("Opened write session: {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            bytes_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends all of `bytes` to the target.
    pub fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)
    }

    /// Total bytes appended so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    /// Releases the handle. Subsequent calls do nothing.
    pub fn close(&mut self) {
        if let Some(file) = self.file.take() {
            drop(file);
            log::debug!("Closed write session: {}", self.path.display());
        }
    }

    fn handle(&mut self) -> io::Result<&mut File> {
        self.file.as_mut().ok_or_else(|| {
            io::Error::other(format!(
                "write session for {} is closed",
                self.path.display()
            ))
        })
    }
}

impl Write for WriteSession {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.handle()?.write(buf)?;
        self.bytes_written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for WriteSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_missing_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("new.txt");

        let session = WriteSession::open(&file).unwrap();

        assert!(file.exists());
        assert_eq!(session.bytes_written(), 0);
        assert_eq!(fs::read(&file).unwrap(), b"");
    }

    #[test]
    fn test_open_truncates_existing_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("old.txt");
        fs::write(&file, "previous content").unwrap();

        let _session = WriteSession::open(&file).unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "");
    }

    #[test]
    fn test_append_counts_bytes() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("out.txt");

        let mut session = WriteSession::open(&file).unwrap();
        session.append(b"Hello").unwrap();
        write!(session, ", {}!", "world").unwrap();
        session.close();

        assert_eq!(session.bytes_written(), 13);
        assert_eq!(fs::read_to_string(&file).unwrap(), "Hello, world!");
    }

    #[test]
    fn test_write_after_close_fails() {
        let temp = TempDir::new().unwrap();
        let mut session = WriteSession::open(&temp.path().join("out.txt")).unwrap();

        session.close();
        session.close();

        assert!(session.is_closed());
        assert!(session.append(b"late").is_err());
        assert!(session.flush().is_ok());
    }

    #[test]
    fn test_open_in_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("no/such/dir/out.txt");

        let result = WriteSession::open(&file);

        assert!(matches!(result, Err(SafeWriteError::Open { .. })));
        assert!(!file.exists());
    }
}
