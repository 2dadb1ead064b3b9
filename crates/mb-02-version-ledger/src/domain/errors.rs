//! Error types for the ledger and the bootstrap lock.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors from ledger reads and writes.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Underlying file I/O failed
    #[error("Ledger I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Persisted ledger could not be decoded
    #[error("Ledger file {} is corrupted: {message}", path.display())]
    Corrupted { path: PathBuf, message: String },

    /// Entries could not be encoded
    #[error("Ledger encoding failed: {0}")]
    Encoding(String),
}

/// Errors from lock backends.
#[derive(Debug, Error)]
pub enum LockError {
    /// Lock still held by someone else when the timeout expired
    #[error("Timed out after {waited:?} waiting for lock '{name}'{}", holder_suffix(.holder))]
    Timeout {
        name: String,
        waited: Duration,
        holder: Option<u32>,
    },

    /// Lock file could not be opened, locked or written
    #[error("Lock '{name}' I/O error: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    /// Unlock called on a lock this holder does not own
    #[error("Lock '{name}' is not held")]
    NotHeld { name: String },
}

fn holder_suffix(holder: &Option<u32>) -> String {
    match holder {
        Some(pid) => format!(" (held by process {pid})"),
        None => String::new(),
    }
}
