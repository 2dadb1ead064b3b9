//! # Definition Module Provider
//!
//! Builds a module from the [`ServiceDefinition`]s registered on its
//! descriptor. Factories run in registration order and may look up
//! services registered before them, in this module or exposed earlier.
//! Shutdown callbacks run in reverse registration order.
//!
//! [`ServiceDefinition`]: shared_types::ServiceDefinition

use anyhow::Context;
use mb_04_service_federation::{LookupScope, ServiceRegistry};
use shared_types::ModuleDescriptor;
use tracing::{debug, warn};

use crate::ports::ModuleProvider;

#[derive(Debug, Default, Clone, Copy)]
pub struct DefinitionModuleProvider;

impl DefinitionModuleProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleProvider for DefinitionModuleProvider {
    fn construct(
        &self,
        descriptor: &ModuleDescriptor,
        registry: &mut ServiceRegistry,
    ) -> anyhow::Result<()> {
        for definition in descriptor.services() {
            let entry = definition
                .build(&*registry)
                .with_context(|| format!("service '{}' failed to build", definition.name()))?;
            registry.register(entry)?;
        }
        debug!(
            module = %descriptor.name(),
            services = descriptor.services().len(),
            "[Provider] Module services built"
        );
        Ok(())
    }

    fn destroy(
        &self,
        descriptor: &ModuleDescriptor,
        registry: &ServiceRegistry,
    ) -> anyhow::Result<()> {
        let mut first_error = None;

        for definition in descriptor.services().iter().rev() {
            let Some(hook) = definition.shutdown_hook() else {
                continue;
            };
            // Not built: construction stopped before this service
            let Some(handle) = registry.get(definition.name(), LookupScope::Local) else {
                continue;
            };
            if let Err(e) = hook(&handle) {
                warn!(
                    module = %descriptor.name(),
                    service = %definition.name(),
                    error = %e,
                    "[Provider] Service shutdown failed"
                );
                first_error.get_or_insert(
                    e.context(format!("service '{}' failed to shut down", definition.name())),
                );
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
