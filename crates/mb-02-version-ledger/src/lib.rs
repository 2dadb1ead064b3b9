//! # MB-02: Version Ledger Subsystem
//!
//! Durable `(module, installer) → version` records and the bootstrap lock.
//!
//! ## Architecture
//!
//! - **Domain**: `LedgerEntry`, errors
//! - **Ports**: `VersionLedgerStore`, `LockBackend`, `TimeSource`
//! - **Adapters**: in-memory and file ledgers, process and file locks
//! - **Lock**: `BootstrapLock`, the re-entrant hold-counted lock the
//!   installer engine takes around version-gated work
//!
//! ## Ledger contract
//!
//! - At most one entry per key; writes are upserts.
//! - Entries are never deleted by the bootstrap.
//! - `read_version` always reflects the latest committed write, including
//!   writes by other processes, so the engine can double-check under lock.

pub mod adapters;
pub mod domain;
pub mod lock;
pub mod ports;

pub use adapters::ledger::{FileVersionLedger, InMemoryVersionLedger};
pub use adapters::lock::{FileLock, ProcessLock, DEFAULT_LOCK_TIMEOUT};
pub use adapters::time::SystemTimeSource;
pub use domain::entities::LedgerEntry;
pub use domain::errors::{LedgerError, LockError};
pub use lock::{BootstrapLock, BootstrapLockGuard, BOOTSTRAP_LOCK_NAME};
pub use ports::outbound::{LockBackend, TimeSource, VersionLedgerStore};
