//! Outbound ports: what the host supplies to the bootstrap.

use chrono::{DateTime, Utc};

use crate::domain::entities::LedgerEntry;
use crate::domain::errors::{LedgerError, LockError};

/// Persisted `(module, installer) → version` store.
///
/// Implementations must make every committed `upsert` visible to later
/// `read_version` calls, in this process and in others sharing the store.
pub trait VersionLedgerStore: Send + Sync {
    /// Installed version, or `None` if the installer never ran.
    fn read_version(&self, module: &str, installer_id: &str) -> Result<Option<u32>, LedgerError>;

    /// Insert or replace the entry for `(entry.module, entry.installer_id)`.
    fn upsert(&self, entry: LedgerEntry) -> Result<(), LedgerError>;

    /// All entries, ordered by module then installer id.
    fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError>;
}

/// Mutual exclusion shared by every bootstrap that writes one ledger.
///
/// Not re-entrant; `BootstrapLock` adds the hold count on top.
pub trait LockBackend: Send + Sync {
    /// Block until the lock is owned, or fail on timeout.
    fn lock(&self) -> Result<(), LockError>;

    /// Give up ownership.
    fn unlock(&self) -> Result<(), LockError>;

    /// Name used in logs and errors.
    fn name(&self) -> &str;
}

/// Clock used for `installed_at` timestamps.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
