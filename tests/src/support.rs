//! Shared fixtures for the integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mb_02_version_ledger::{LedgerEntry, LedgerError, VersionLedgerStore};
use shared_types::{
    BootstrapPhase, InstallerAction, InstallerDescriptor, RunCondition, SettingsSource,
    SettingsTable,
};

/// Settings source that counts how often it is consulted.
#[derive(Debug, Default)]
pub struct SpySettings {
    table: SettingsTable,
    calls: AtomicUsize,
}

impl SpySettings {
    pub fn new(table: SettingsTable) -> Self {
        Self {
            table,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SettingsSource for SpySettings {
    fn action_for(&self, key: &str) -> Option<InstallerAction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.table.action_for(key)
    }

    fn default_action(&self) -> Option<InstallerAction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.table.default_action()
    }
}

/// Ledger decorator counting upserts, for stores without their own counter.
pub struct CountingLedger {
    inner: Arc<dyn VersionLedgerStore>,
    upserts: AtomicUsize,
}

impl CountingLedger {
    pub fn new(inner: Arc<dyn VersionLedgerStore>) -> Self {
        Self {
            inner,
            upserts: AtomicUsize::new(0),
        }
    }

    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }
}

impl VersionLedgerStore for CountingLedger {
    fn read_version(&self, module: &str, installer_id: &str) -> Result<Option<u32>, LedgerError> {
        self.inner.read_version(module, installer_id)
    }

    fn upsert(&self, entry: LedgerEntry) -> Result<(), LedgerError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(entry)
    }

    fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.inner.entries()
    }
}

/// Context settings that execute every installer.
pub fn execute_all() -> Arc<dyn SettingsSource> {
    Arc::new(SettingsTable::new().with_default(InstallerAction::Execute))
}

/// `AfterModuleBootstrap` installer that bumps `counter` each time its work
/// runs. `hold` keeps the work busy to widen race windows.
pub fn counting_installer(
    id: &str,
    version: u32,
    condition: RunCondition,
    counter: &Arc<AtomicUsize>,
    hold: Duration,
) -> InstallerDescriptor {
    let counter = Arc::clone(counter);
    InstallerDescriptor::new(id)
        .version(version)
        .phase(BootstrapPhase::AfterModuleBootstrap)
        .run_condition(condition)
        .description(format!("{id} v{version}"))
        .work(move |_| {
            std::thread::sleep(hold);
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
}
