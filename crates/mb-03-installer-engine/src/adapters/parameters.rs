use shared_types::{ParameterSpec, ServiceHandle, ServiceLookup};

use crate::ports::outbound::ParameterResolver;

/// Resolves parameters by service name in the target registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameParameterResolver;

impl ParameterResolver for NameParameterResolver {
    fn resolve(&self, spec: &ParameterSpec, services: &dyn ServiceLookup) -> Option<ServiceHandle> {
        services.lookup(&spec.name)
    }
}
