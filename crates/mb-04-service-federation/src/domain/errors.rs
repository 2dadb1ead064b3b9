//! Error types for service registration and exposure.

use thiserror::Error;

/// Exposure could not be merged into the federation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExposureError {
    /// A non-primary exposed name collides with an already federated one.
    #[error(
        "Module '{module}' exposes '{name}', already exposed by module '{existing_module}' (mark it primary to shadow)"
    )]
    Conflict {
        module: String,
        name: String,
        existing_module: String,
    },
}

impl ExposureError {
    pub fn module(&self) -> &str {
        match self {
            Self::Conflict { module, .. } => module,
        }
    }
}

/// Errors from a module's local registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Local names are unique within a module.
    #[error("Module '{module}' already has a service named '{name}'")]
    DuplicateService { module: String, name: String },

    /// Registration after the module's exposure step.
    #[error("Registry of module '{module}' is read-only after exposure")]
    Sealed { module: String },
}
