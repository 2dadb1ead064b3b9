//! Bootstrap lifecycle state and run report.

use std::fmt;

use chrono::{DateTime, Utc};
use mb_03_installer_engine::PhaseReport;
use shared_types::{BootstrapPhase, InstallerOutcome, InstallerStatus};
use uuid::Uuid;

/// Orchestrator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootstrapState {
    #[default]
    NotStarted,
    Bootstrapping,
    Running,
    /// Bootstrap aborted. Partially started modules can still be shut down.
    Failed,
    ShutDown,
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::Bootstrapping => "bootstrapping",
            Self::Running => "running",
            Self::Failed => "failed",
            Self::ShutDown => "shut down",
        };
        f.write_str(name)
    }
}

/// What one bootstrap run did.
#[derive(Debug, Clone, Default)]
pub struct BootstrapReport {
    pub run_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Module names in bootstrap order.
    pub order: Vec<String>,
    /// One report per phase that ran, in phase order.
    pub phases: Vec<PhaseReport>,
    /// Exposed names per module, in bootstrap order.
    pub exposed: Vec<(String, Vec<String>)>,
}

impl BootstrapReport {
    pub(crate) fn begin(run_id: Uuid) -> Self {
        Self {
            run_id: Some(run_id),
            started_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, phase: BootstrapPhase, outcomes: Vec<InstallerOutcome>) {
        match self.phases.iter_mut().find(|p| p.phase == phase) {
            Some(report) => report.extend(outcomes),
            None => {
                let mut report = PhaseReport::new(phase);
                report.extend(outcomes);
                self.phases.push(report);
            }
        }
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn phase(&self, phase: BootstrapPhase) -> Option<&PhaseReport> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    /// Every installer outcome, in execution order.
    pub fn outcomes(&self) -> impl Iterator<Item = &InstallerOutcome> {
        self.phases.iter().flat_map(|p| p.outcomes.iter())
    }

    /// Outcome of one installer, searched across phases.
    pub fn outcome(&self, module: &str, installer_id: &str) -> Option<&InstallerOutcome> {
        self.outcomes()
            .find(|o| o.module == module && o.installer_id == installer_id)
    }

    pub fn count(&self, status: InstallerStatus) -> usize {
        self.outcomes().filter(|o| o.status == status).count()
    }

    pub fn executed(&self) -> usize {
        self.count(InstallerStatus::Executed)
    }

    /// Names `module` exposed, empty if none or not reached.
    pub fn exposed_by(&self, module: &str) -> &[String] {
        self.exposed
            .iter()
            .find(|(name, _)| name == module)
            .map(|(_, names)| names.as_slice())
            .unwrap_or_default()
    }
}
