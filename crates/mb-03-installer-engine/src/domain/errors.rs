//! Error types for installer execution.

use mb_02_version_ledger::{LedgerError, LockError};
use thiserror::Error;

/// Installer work failed, or a required parameter was unavailable.
#[derive(Debug, Error)]
#[error("Installer '{installer_id}' of module '{module}' failed in step '{step}': {cause}")]
pub struct InstallerExecutionError {
    pub module: String,
    pub installer_id: String,
    pub step: String,
    #[source]
    pub cause: anyhow::Error,
}

/// All errors that abort an installer phase.
#[derive(Debug, Error)]
pub enum InstallerError {
    #[error(transparent)]
    Execution(#[from] Box<InstallerExecutionError>),

    #[error("Ledger access failed for installer '{installer_id}' of module '{module}': {source}")]
    Ledger {
        module: String,
        installer_id: String,
        #[source]
        source: LedgerError,
    },

    #[error("Bootstrap lock failed for installer '{installer_id}' of module '{module}': {source}")]
    Lock {
        module: String,
        installer_id: String,
        #[source]
        source: LockError,
    },
}

impl InstallerError {
    pub fn module(&self) -> &str {
        match self {
            Self::Execution(e) => &e.module,
            Self::Ledger { module, .. } | Self::Lock { module, .. } => module,
        }
    }

    pub fn installer_id(&self) -> &str {
        match self {
            Self::Execution(e) => &e.installer_id,
            Self::Ledger { installer_id, .. } | Self::Lock { installer_id, .. } => installer_id,
        }
    }
}
