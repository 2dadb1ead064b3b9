use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::domain::entities::LedgerEntry;
use crate::domain::errors::LedgerError;
use crate::ports::outbound::VersionLedgerStore;

/// In-memory ledger for tests and single-process runs.
#[derive(Debug, Default)]
pub struct InMemoryVersionLedger {
    entries: RwLock<BTreeMap<(String, String), LedgerEntry>>,
    writes: AtomicUsize,
}

impl InMemoryVersionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger pre-populated with `entries`, without counting them as writes.
    pub fn with_entries(entries: impl IntoIterator<Item = LedgerEntry>) -> Self {
        let ledger = Self::new();
        {
            let mut map = ledger.entries.write();
            for entry in entries {
                map.insert(entry.key(), entry);
            }
        }
        ledger
    }

    /// Number of upserts applied since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl VersionLedgerStore for InMemoryVersionLedger {
    fn read_version(&self, module: &str, installer_id: &str) -> Result<Option<u32>, LedgerError> {
        Ok(self
            .entries
            .read()
            .get(&(module.to_string(), installer_id.to_string()))
            .map(|e| e.version))
    }

    fn upsert(&self, entry: LedgerEntry) -> Result<(), LedgerError> {
        self.entries.write().insert(entry.key(), entry);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.entries.read().values().cloned().collect())
    }
}
