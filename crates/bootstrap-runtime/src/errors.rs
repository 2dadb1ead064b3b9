//! Error types for the bootstrap runtime.

use mb_01_module_ordering::OrderingError;
use mb_02_version_ledger::LockError;
use mb_03_installer_engine::InstallerError;
use mb_04_service_federation::{ExposureError, RegistryError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::state::BootstrapState;

/// A module that failed to tear down.
#[derive(Debug)]
pub struct TeardownFailure {
    pub module: String,
    pub cause: anyhow::Error,
}

/// Everything that can abort a bootstrap or a teardown.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Duplicate, missing or cyclic module dependencies.
    #[error(transparent)]
    Ordering(#[from] OrderingError),

    #[error(transparent)]
    Installer(#[from] InstallerError),

    #[error(transparent)]
    Exposure(#[from] ExposureError),

    /// The module provider failed.
    #[error("Failed to construct module '{module}': {source:#}")]
    ModuleConstruction {
        module: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Releasing the bootstrap lock at the end of the run failed.
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Bootstrap can only run once; orchestrator is {state}")]
    AlreadyStarted { state: BootstrapState },

    #[error(
        "Teardown failed for module(s): {}",
        .failures.iter().map(|f| format!("{} ({:#})", f.module, f.cause)).collect::<Vec<_>>().join(", ")
    )]
    Teardown { failures: Vec<TeardownFailure> },
}

impl BootstrapError {
    /// Module the error is about, when there is one.
    pub fn module(&self) -> Option<&str> {
        match self {
            Self::Ordering(e) => Some(e.module()),
            Self::Installer(e) => Some(e.module()),
            Self::Exposure(e) => Some(e.module()),
            Self::ModuleConstruction { module, .. } => Some(module),
            Self::Registry(RegistryError::DuplicateService { module, .. })
            | Self::Registry(RegistryError::Sealed { module }) => Some(module),
            Self::Teardown { failures } => failures.first().map(|f| f.module.as_str()),
            Self::Lock(_) | Self::Config(_) | Self::AlreadyStarted { .. } => None,
        }
    }

    /// Installer the error is about, when there is one.
    pub fn installer_id(&self) -> Option<&str> {
        match self {
            Self::Installer(e) => Some(e.installer_id()),
            _ => None,
        }
    }
}
