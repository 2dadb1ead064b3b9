//! Error types for module ordering.
//!
//! All of these are configuration errors: they abort the bootstrap before
//! any installer runs or any module is constructed.

use std::fmt;

use thiserror::Error;

/// Why a required dependency could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    /// No module of that name was declared.
    Absent,
    /// The module was declared but is disabled.
    Disabled,
}

impl fmt::Display for MissingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("not declared"),
            Self::Disabled => f.write_str("disabled"),
        }
    }
}

/// All errors that can occur while ordering modules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    /// Two descriptors share a name.
    #[error("Duplicate module name: {name}")]
    DuplicateModule { name: String },

    /// A required dependency does not resolve to an enabled module.
    #[error("Module '{module}' requires '{dependency}', which is {reason}")]
    MissingDependency {
        module: String,
        dependency: String,
        reason: MissingReason,
    },

    /// The dependency graph contains a cycle. The first member is repeated
    /// at the end.
    #[error("Cyclic dependency between modules: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
}

impl OrderingError {
    /// Module the error is attributed to.
    pub fn module(&self) -> &str {
        match self {
            Self::DuplicateModule { name } => name,
            Self::MissingDependency { module, .. } => module,
            Self::CyclicDependency { cycle } => cycle.first().map(String::as_str).unwrap_or(""),
        }
    }
}
