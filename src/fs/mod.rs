//! File system operations with transaction support.
//!
//! Replaces a single file's contents so that a failed write leaves the file
//! exactly as it was, or absent if it did not exist.

pub mod session;
pub mod snapshot;
pub mod transaction;

pub use session::WriteSession;
pub use snapshot::{Snapshot, capture};
pub use transaction::{
    Outcome, Restoration, RollbackCause, RollbackPolicy, Transaction, TransactionState,
    WriteGuard, run_transaction,
};
