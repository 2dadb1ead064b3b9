//! Phase reports.

use shared_types::{BootstrapPhase, InstallerOutcome, InstallerStatus};

/// Outcomes of every installer considered in one phase run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    pub phase: BootstrapPhase,
    pub outcomes: Vec<InstallerOutcome>,
}

impl PhaseReport {
    pub fn new(phase: BootstrapPhase) -> Self {
        Self {
            phase,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: InstallerOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn extend(&mut self, outcomes: impl IntoIterator<Item = InstallerOutcome>) {
        self.outcomes.extend(outcomes);
    }

    /// Number of outcomes with `status`.
    pub fn count(&self, status: InstallerStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn executed(&self) -> usize {
        self.count(InstallerStatus::Executed)
    }

    /// Outcome for one installer of one module.
    pub fn outcome(&self, module: &str, installer_id: &str) -> Option<&InstallerOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.module == module && o.installer_id == installer_id)
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
