//! Outbound ports.

use shared_types::{ParameterSpec, ServiceHandle, ServiceLookup};

/// Resolves an installer step's declared parameter to a value.
///
/// Returning `None` means "unavailable"; the engine decides whether that is
/// fatal based on `spec.required`.
pub trait ParameterResolver: Send + Sync {
    fn resolve(&self, spec: &ParameterSpec, services: &dyn ServiceLookup) -> Option<ServiceHandle>;
}
