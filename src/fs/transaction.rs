//! Transactional replacement of a single file's contents.
//!
//! A transaction snapshots the target, truncates it, and hands the caller an
//! append-only session. When the caller's scope finishes normally the new
//! bytes are kept; when it fails the target is put back exactly as the
//! snapshot recorded it.
//!
//! ## Execution Guarantees
//!
//! - **Ordering**: the snapshot is captured strictly before the target is
//!   truncated, and the handle is closed strictly before rollback touches the
//!   path again
//! - **Exactly one outcome**: every guard resolves to commit or rollback, on
//!   normal return, early return, `?` propagation or panic
//! - **Swallowed write errors**: an error raised inside the scope is logged
//!   and reported through [`Outcome::RolledBack`], not returned as `Err`
//!
//! ## Phases
//!
//! 1. **Capture**: read the prior content (absence is fine, anything else is
//!    fatal)
//! 2. **Open**: truncate/create the target
//! 3. **Write**: caller appends through [`WriteSession`]
//! 4. **Resolve**: commit, or close + restore/remove per the snapshot
//!
//! ## Example
//!
//! ```no_run
//! # use safe_write::fs::{run_transaction, Outcome};
//! # use std::io::Write;
//! # fn example() -> safe_write::error::Result<()> {
//! let outcome = run_transaction("poem.txt", |session| {
//!     session.write_all(b"White sails on the blue sea\n")?;
//!     Ok::<_, std::io::Error>(())
//! })?;
//!
//! assert!(outcome.is_committed());
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SafeWriteError};
use crate::fs::session::WriteSession;
use crate::fs::snapshot::{self, Snapshot};

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Nothing done yet.
    Idle,
    /// Reading prior content.
    Capturing,
    /// Session open; caller is writing.
    Open,
    /// Flushing and closing after a successful scope.
    Committing,
    /// Scope failed; handle being closed.
    Failing,
    /// Restoring or removing the target.
    RollingBack,
    /// Terminal.
    Closed,
}

/// How rollback failures are reported.
///
/// The triggering write error is always swallowed once rollback finishes;
/// the policy only decides what happens when rollback itself fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RollbackPolicy {
    /// Never escalate. Failed restores and cleanups are logged only.
    Lenient,
    /// Escalate failed restores; log failed cleanups.
    #[default]
    Standard,
    /// Escalate failed restores and failed cleanups.
    Strict,
}

impl RollbackPolicy {
    /// Returns true if `error`, raised while rolling back, must reach the caller.
    pub fn escalates(self, error: &SafeWriteError) -> bool {
        match (self, error) {
            (RollbackPolicy::Lenient, _) => false,
            (_, SafeWriteError::Restore { .. }) => true,
            (RollbackPolicy::Strict, SafeWriteError::Cleanup { .. }) => true,
            _ => false,
        }
    }
}

/// Error that triggered a rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackCause {
    /// I/O error kind, crate error label, or the caller's error type name.
    pub kind: String,
    pub message: String,
}

impl RollbackCause {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Describes a caller-supplied error.
    pub fn from_error<E: Into<anyhow::Error>>(error: E) -> Self {
        let fallback = short_type_name::<E>();
        let error = error.into();
        let kind = error
            .chain()
            .find_map(classify)
            .unwrap_or_else(|| fallback.to_string());

        Self {
            kind,
            message: error.to_string(),
        }
    }

    fn from_io(error: &io::Error) -> Self {
        Self::new(format!("{:?}", error.kind()), error.to_string())
    }
}

fn classify(cause: &(dyn std::error::Error + 'static)) -> Option<String> {
    if let Some(e) = cause.downcast_ref::<io::Error>() {
        return Some(format!("{:?}", e.kind()));
    }

    match cause.downcast_ref::<SafeWriteError>()? {
        SafeWriteError::Io(e) => Some(format!("{:?}", e.kind())),
        other => Some(other.kind().to_string()),
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// How a rollback left the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restoration {
    /// Prior content written back.
    Restored { bytes: usize },
    /// Target did not exist before and was removed.
    Removed,
    /// Target did not exist before and was already gone.
    AlreadyAbsent,
    /// Rollback failed but the policy did not escalate it.
    Incomplete { error: String },
}

/// Terminal result of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// New content retained.
    Committed { bytes_written: u64 },
    /// Prior state restored (or restoration attempted, see [`Restoration`]).
    RolledBack {
        cause: RollbackCause,
        restoration: Restoration,
    },
}

impl Outcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed { .. })
    }

    pub fn is_rolled_back(&self) -> bool {
        matches!(self, Outcome::RolledBack { .. })
    }
}

/// Transaction over one target file.
#[derive(Debug, Clone)]
pub struct Transaction {
    path: PathBuf,
    policy: RollbackPolicy,
}

impl Transaction {
    /// Creates a transaction with the default [`RollbackPolicy`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            policy: RollbackPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RollbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> RollbackPolicy {
        self.policy
    }

    /// Captures the target, then opens a write session over it.
    ///
    /// A capture failure is returned before the target is touched.
    pub fn begin(self) -> Result<WriteGuard> {
        log::debug!(
            "{}: {:?} -> {:?}",
            self.path.display(),
            TransactionState::Idle,
            TransactionState::Capturing
        );
        let snapshot = snapshot::capture(&self.path)?;

        let session = WriteSession::open(&self.path)?;
        log::debug!(
            "{}: {:?} -> {:?}",
            self.path.display(),
            TransactionState::Capturing,
            TransactionState::Open
        );

        Ok(WriteGuard {
            path: self.path,
            snapshot,
            session,
            state: TransactionState::Open,
            policy: self.policy,
        })
    }

    /// Runs `body` inside a write scope.
    ///
    /// `Ok(())` from `body` commits; `Err` rolls back and is swallowed into
    /// [`Outcome::RolledBack`]. A panic in `body` rolls back while unwinding.
    pub fn run<F, E>(self, body: F) -> Result<Outcome>
    where
        F: FnOnce(&mut WriteSession) -> std::result::Result<(), E>,
        E: Into<anyhow::Error>,
    {
        let mut guard = self.begin()?;

        match body(guard.session()) {
            Ok(()) => guard.commit(),
            Err(e) => guard.rollback(e),
        }
    }
}

/// Replaces the contents of `path` with whatever `body` writes.
///
/// Shorthand for `Transaction::new(path).run(body)`.
pub fn run_transaction<P, F, E>(path: P, body: F) -> Result<Outcome>
where
    P: Into<PathBuf>,
    F: FnOnce(&mut WriteSession) -> std::result::Result<(), E>,
    E: Into<anyhow::Error>,
{
    Transaction::new(path).run(body)
}

/// Open write scope over a target.
///
/// Must be resolved with [`commit`](Self::commit) or
/// [`rollback`](Self::rollback). If dropped unresolved (early return, `?`,
/// panic), rolls back; failures in that path can only be logged.
#[must_use = "dropping a WriteGuard without commit rolls the target back"]
pub struct WriteGuard {
    path: PathBuf,
    snapshot: Snapshot,
    session: WriteSession,
    state: TransactionState,
    policy: RollbackPolicy,
}

impl WriteGuard {
    /// The append-only sink over the target.
    pub fn session(&mut self) -> &mut WriteSession {
        &mut self.session
    }

    /// State of the target before this scope truncated it.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keeps the written bytes as the target's content.
    ///
    /// A flush failure here is a write error and rolls back instead.
    pub fn commit(mut self) -> Result<Outcome> {
        self.transition(TransactionState::Committing);

        if let Err(e) = self.session.flush() {
            return self.resolve_failure(RollbackCause::from_io(&e));
        }

        let bytes_written = self.session.bytes_written();
        self.session.close();
        self.transition(TransactionState::Closed);

        log::info!(
            "Committed {} bytes to {}",
            bytes_written,
            self.path.display()
        );

        Ok(Outcome::Committed { bytes_written })
    }

    /// Restores the target because of `error`.
    ///
    /// `error` is swallowed; only a rollback failure the policy escalates is
    /// returned as `Err`.
    pub fn rollback<E: Into<anyhow::Error>>(mut self, error: E) -> Result<Outcome> {
        self.resolve_failure(RollbackCause::from_error(error))
    }

    fn resolve_failure(&mut self, cause: RollbackCause) -> Result<Outcome> {
        self.transition(TransactionState::Failing);
        log::warn!(
            "{} raised while writing {}: {}",
            cause.kind,
            self.path.display(),
            cause.message
        );

        // Release before rewriting; some platforms lock open files.
        self.session.close();

        self.transition(TransactionState::RollingBack);
        let result = self.restore();
        self.transition(TransactionState::Closed);

        match result {
            Ok(restoration) => Ok(Outcome::RolledBack { cause, restoration }),
            Err(e) if self.policy.escalates(&e) => {
                log::error!("Rollback of {} failed: {}", self.path.display(), e);
                Err(e)
            }
            Err(e) => {
                log::error!(
                    "Rollback of {} failed (not escalated): {}",
                    self.path.display(),
                    e
                );
                Ok(Outcome::RolledBack {
                    cause,
                    restoration: Restoration::Incomplete {
                        error: e.to_string(),
                    },
                })
            }
        }
    }

    fn restore(&self) -> Result<Restoration> {
        match self.snapshot.content() {
            Some(content) => {
                fs::write(&self.path, content).map_err(|e| SafeWriteError::Restore {
                    path: self.path.clone(),
                    source: e,
                })?;
                log::warn!("Restored original content of {}", self.path.display());
                Ok(Restoration::Restored {
                    bytes: content.len(),
                })
            }
            None => match fs::remove_file(&self.path) {
                Ok(()) => {
                    log::warn!("Removed {} created by failed write", self.path.display());
                    Ok(Restoration::Removed)
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::debug!("{} already absent", self.path.display());
                    Ok(Restoration::AlreadyAbsent)
                }
                Err(e) => Err(SafeWriteError::Cleanup {
                    path: self.path.clone(),
                    source: e,
                }),
            },
        }
    }

    fn transition(&mut self, next: TransactionState) {
        log::debug!("{}: {:?} -> {:?}", self.path.display(), self.state, next);
        self.state = next;
    }
}

impl Drop for WriteGuard {
    fn drop(&mut self) {
        if self.state == TransactionState::Closed {
            return;
        }

        let cause = if std::thread::panicking() {
            RollbackCause::new("Panic", "write scope panicked")
        } else {
            RollbackCause::new("Dropped", "write guard dropped without commit")
        };

        if let Err(e) = self.resolve_failure(cause) {
            log::error!("Rollback on drop left {} inconsistent: {}", self.path.display(), e);
        }
    }
}

impl std::fmt::Debug for WriteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteGuard")
            .field("path", &self.path)
            .field("existed", &self.snapshot.existed())
            .field("state", &self.state)
            .field("policy", &self.policy)
            .finish()
    }
}
