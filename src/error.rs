//! Error types for safe-write.
//!
//! All operations return `Result<T>` which aliases `Result<T, SafeWriteError>`.

use crate::access::Role;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from transactional write operations.
#[derive(Debug, Error)]
pub enum SafeWriteError {
    /// Existing content could not be read (anything other than absence).
    ///
    /// Fatal: raised before any write session is opened.
    #[error("Failed to read existing content of {}: {}", .path.display(), .source)]
    Capture {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Target could not be created or truncated for writing.
    #[error("Failed to open {} for writing: {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Original content could not be written back during rollback.
    ///
    /// Leaves the target partially written.
    #[error("Failed to restore original content of {}: {}", .path.display(), .source)]
    Restore {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file created by the failed write could not be removed.
    #[error("Failed to remove {} after rollback: {}", .path.display(), .source)]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Caller's role does not match the required role.
    #[error("Access denied: requires role '{required}', current role is '{actual}'")]
    AccessDenied { required: Role, actual: Role },

    /// Content rejected by validation inside a write scope.
    #[error("Invalid content: {0}")]
    InvalidContent(String),

    /// File system operation failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Unexpected error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SafeWriteError {
    /// Short label naming the variant, used when reporting rollbacks.
    pub fn kind(&self) -> &'static str {
        match self {
            SafeWriteError::Capture { .. } => "CaptureError",
            SafeWriteError::Open { .. } => "OpenError",
            SafeWriteError::Restore { .. } => "RestoreError",
            SafeWriteError::Cleanup { .. } => "CleanupError",
            SafeWriteError::AccessDenied { .. } => "AccessDenied",
            SafeWriteError::InvalidContent(_) => "InvalidContent",
            SafeWriteError::Io(_) => "IoError",
            SafeWriteError::Other(_) => "Error",
        }
    }
}

/// Result type alias for safe-write operations.
pub type Result<T> = std::result::Result<T, SafeWriteError>;
