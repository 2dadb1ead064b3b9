//! # Error Types
//!
//! Errors shared across the bootstrap subsystems.

use thiserror::Error;

/// Errors raised by service lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No service with this name is visible.
    #[error("Service not found: {name}")]
    NotFound { name: String },

    /// The service exists but is of a different type.
    #[error("Service '{name}' is a {actual}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Several services match and none is marked primary.
    #[error("Ambiguous lookup for capability '{capability}': {candidates:?}")]
    Ambiguous {
        capability: String,
        candidates: Vec<String>,
    },
}

/// Errors parsing textual configuration values (actions, roles, phases).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} value: '{value}'")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
}
