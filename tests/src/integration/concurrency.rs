//! # Concurrent Bootstraps
//!
//! Several orchestrators sharing one ledger race through the same
//! version-gated installer. Exactly one of them may run it and write the
//! ledger; the others must see the committed version and skip.

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    use bootstrap_runtime::{BootstrapReport, Orchestrator};
    use mb_02_version_ledger::{
        FileLock, FileVersionLedger, InMemoryVersionLedger, LockBackend, ProcessLock,
        VersionLedgerStore, BOOTSTRAP_LOCK_NAME,
    };
    use shared_types::{InstallerStatus, ModuleDescriptor, RunCondition};

    use crate::support::{counting_installer, execute_all, CountingLedger};

    const RACERS: usize = 8;
    const HOLD: Duration = Duration::from_millis(40);

    fn racing_module(counter: &Arc<AtomicUsize>) -> ModuleDescriptor {
        ModuleDescriptor::new("Billing").add_installer(counting_installer(
            "schema",
            3,
            RunCondition::VersionDifferent,
            counter,
            HOLD,
        ))
    }

    fn bootstrap_with(
        ledger: Arc<dyn VersionLedgerStore>,
        backend: Arc<dyn LockBackend>,
        counter: &Arc<AtomicUsize>,
    ) -> BootstrapReport {
        let mut orchestrator = Orchestrator::builder()
            .ledger(ledger)
            .lock_backend(backend)
            .settings(execute_all())
            .module(racing_module(counter))
            .build()
            .unwrap();
        orchestrator.bootstrap().unwrap().clone()
    }

    fn assert_single_winner(reports: &[BootstrapReport]) {
        let executed = reports.iter().map(BootstrapReport::executed).sum::<usize>();
        assert_eq!(executed, 1);

        let skipped = reports
            .iter()
            .filter_map(|r| r.outcome("Billing", "schema"))
            .filter(|o| matches!(o.status, InstallerStatus::Skipped(_)))
            .count();
        assert_eq!(skipped, reports.len() - 1);
    }

    // =========================================================================
    // IN-PROCESS
    // =========================================================================

    #[test]
    fn test_threads_sharing_process_lock_run_installer_once() {
        let ledger = Arc::new(InMemoryVersionLedger::new());
        let backend = Arc::new(ProcessLock::new(BOOTSTRAP_LOCK_NAME));
        let counter = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(RACERS));

        let handles: Vec<_> = (0..RACERS)
            .map(|_| {
                let ledger = ledger.clone();
                let backend = backend.clone();
                let counter = Arc::clone(&counter);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    bootstrap_with(ledger, backend, &counter)
                })
            })
            .collect();

        let reports: Vec<BootstrapReport> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(ledger.write_count(), 1);
        assert_eq!(ledger.read_version("Billing", "schema").unwrap(), Some(3));
        assert!(!backend.is_locked());
        assert_single_winner(&reports);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_blocking_tasks_run_installer_once() {
        let ledger = Arc::new(InMemoryVersionLedger::new());
        let backend = Arc::new(ProcessLock::new(BOOTSTRAP_LOCK_NAME));
        let counter = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..RACERS)
            .map(|_| {
                let ledger = ledger.clone();
                let backend = backend.clone();
                let counter = Arc::clone(&counter);
                tokio::task::spawn_blocking(move || bootstrap_with(ledger, backend, &counter))
            })
            .collect();

        let mut reports = Vec::with_capacity(RACERS);
        for task in tasks {
            reports.push(task.await.unwrap());
        }

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(ledger.write_count(), 1);
        assert_single_winner(&reports);
    }

    // =========================================================================
    // FILE-BACKED
    // =========================================================================

    /// Each racer opens its own lock file handle and ledger instance, as
    /// separate processes would.
    fn file_racer(
        dir: &Path,
        counter: &Arc<AtomicUsize>,
        barrier: &Barrier,
    ) -> (BootstrapReport, usize) {
        let ledger = Arc::new(CountingLedger::new(Arc::new(FileVersionLedger::new(
            dir.join("ledger.bin"),
        ))));
        let backend = Arc::new(FileLock::with_timeout(dir, Duration::from_secs(10)));

        barrier.wait();
        let report = bootstrap_with(ledger.clone(), backend, counter);
        (report, ledger.upserts())
    }

    #[test]
    fn test_separate_file_handles_run_installer_once() {
        let dir = tempfile::tempdir().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let barrier = Barrier::new(RACERS);

        let (path, counter_ref, barrier_ref) = (dir.path(), &counter, &barrier);
        let results: Vec<(BootstrapReport, usize)> = thread::scope(|scope| {
            let handles: Vec<_> = (0..RACERS)
                .map(|_| scope.spawn(move || file_racer(path, counter_ref, barrier_ref)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let upserts: usize = results.iter().map(|(_, upserts)| upserts).sum();
        assert_eq!(upserts, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let reports: Vec<BootstrapReport> = results.into_iter().map(|(r, _)| r).collect();
        assert_single_winner(&reports);

        let reopened = FileVersionLedger::new(dir.path().join("ledger.bin"));
        assert_eq!(reopened.read_version("Billing", "schema").unwrap(), Some(3));
    }
}
