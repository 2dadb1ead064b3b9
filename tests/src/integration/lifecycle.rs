//! # Bootstrap Lifecycle
//!
//! Restarts against a persisted ledger, and teardown of a running
//! composite.

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use bootstrap_runtime::{BootstrapConfig, BootstrapError, BootstrapState, Orchestrator};
    use mb_02_version_ledger::{FileVersionLedger, VersionLedgerStore};
    use parking_lot::Mutex;
    use shared_types::{
        InstallerAction, InstallerStatus, ModuleDescriptor, RunCondition, ServiceDefinition,
        SkipReason,
    };

    use crate::support::counting_installer;

    fn file_config(dir: &Path) -> BootstrapConfig {
        let json = format!(
            r#"{{
                "ledger": {{ "path": {ledger:?} }},
                "lock": {{ "dir": {lock:?}, "timeout_secs": 5 }},
                "installers": {{ "default_action": "EXECUTE" }}
            }}"#,
            ledger = dir.join("ledger.bin").display().to_string(),
            lock = dir.display().to_string(),
        );
        BootstrapConfig::from_json(&json).unwrap()
    }

    fn start(config: BootstrapConfig, module: ModuleDescriptor) -> Orchestrator {
        let mut orchestrator = Orchestrator::builder()
            .config(config)
            .module(module)
            .build()
            .unwrap();
        orchestrator.bootstrap().unwrap();
        orchestrator
    }

    // =========================================================================
    // RESTART
    // =========================================================================

    #[test]
    fn test_restart_with_file_ledger_skips_then_upgrades() {
        let dir = tempfile::tempdir().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let module = |version| {
            ModuleDescriptor::new("Billing").add_installer(counting_installer(
                "schema",
                version,
                RunCondition::VersionDifferent,
                &counter,
                Duration::ZERO,
            ))
        };

        let mut first = start(file_config(dir.path()), module(1));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        first.shutdown().unwrap();

        let second = start(file_config(dir.path()), module(1));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(
            second.report().outcome("Billing", "schema").map(|o| o.status),
            Some(InstallerStatus::Skipped(SkipReason::UpToDate { installed: 1 }))
        );

        let third = start(file_config(dir.path()), module(2));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(third.report().executed(), 1);

        let ledger = FileVersionLedger::new(dir.path().join("ledger.bin"));
        let entries = ledger.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].version, 2);
        assert_eq!(entries[0].description, "schema v2");
    }

    #[test]
    fn test_force_reruns_current_version() {
        let dir = tempfile::tempdir().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let module = || {
            ModuleDescriptor::new("Billing").add_installer(counting_installer(
                "schema",
                1,
                RunCondition::VersionDifferent,
                &counter,
                Duration::ZERO,
            ))
        };

        start(file_config(dir.path()), module());

        let mut forced = file_config(dir.path());
        forced.installers.insert("schema", InstallerAction::Force);
        start(forced, module());

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    // =========================================================================
    // TEARDOWN
    // =========================================================================

    fn tracked_module(name: &str, log: &Arc<Mutex<Vec<String>>>) -> ModuleDescriptor {
        let first = Arc::clone(log);
        let second = Arc::clone(log);
        let (a, b) = (format!("{name}.first"), format!("{name}.second"));
        ModuleDescriptor::new(name)
            .add_service(
                ServiceDefinition::instance("first", 1u8).on_shutdown(move |_| {
                    first.lock().push(a.clone());
                    Ok(())
                }),
            )
            .add_service(
                ServiceDefinition::instance("second", 2u8).on_shutdown(move |_| {
                    second.lock().push(b.clone());
                    Ok(())
                }),
            )
    }

    #[test]
    fn test_shutdown_hooks_run_in_reverse_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut orchestrator = Orchestrator::builder()
            .module(tracked_module("Web", &log).requires("Data"))
            .module(tracked_module("Data", &log))
            .build()
            .unwrap();

        orchestrator.bootstrap().unwrap();
        assert_eq!(orchestrator.module_order(), ["Data", "Web"]);

        orchestrator.shutdown().unwrap();
        assert_eq!(
            *log.lock(),
            ["Web.second", "Web.first", "Data.second", "Data.first"]
        );
        assert_eq!(orchestrator.state(), BootstrapState::ShutDown);
        assert!(orchestrator.started_modules().is_empty());
    }

    #[test]
    fn test_failing_hook_does_not_stop_teardown() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let broken = ModuleDescriptor::new("Broken").add_service(
            ServiceDefinition::instance("socket", 0u8)
                .on_shutdown(|_| anyhow::bail!("socket already closed")),
        );

        let mut orchestrator = Orchestrator::builder()
            .module(tracked_module("Data", &log))
            .module(broken)
            .build()
            .unwrap();
        orchestrator.bootstrap().unwrap();

        let err = orchestrator.shutdown().unwrap_err();
        match &err {
            BootstrapError::Teardown { failures } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].module, "Broken");
            }
            other => panic!("expected teardown failure, got {other}"),
        }
        assert!(err.to_string().contains("socket already closed"));
        assert_eq!(*log.lock(), ["Data.second", "Data.first"]);
        assert_eq!(orchestrator.state(), BootstrapState::ShutDown);

        orchestrator.shutdown().unwrap();
    }
}
