//! # Exposure Federator
//!
//! Publishes a module's local services into the federation according to
//! its [`ExposureRules`], then seals the module's registry.

use shared_types::{ExposedService, ExposureRules};
use tracing::{debug, info, warn};

use crate::domain::errors::ExposureError;
use crate::registry::ServiceRegistry;

/// Runs the exposure step for one module.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExposureFederator;

impl ExposureFederator {
    pub fn new() -> Self {
        Self
    }

    /// Filter, transform and merge `registry`'s local services.
    ///
    /// Returns the exposed names in registration order. The registry is
    /// sealed whether or not the merge succeeds; on conflict nothing from
    /// this module reaches the federation.
    pub fn expose(
        &self,
        registry: &mut ServiceRegistry,
        rules: &ExposureRules,
    ) -> Result<Vec<String>, ExposureError> {
        let exposed: Vec<ExposedService> = registry
            .local_entries()
            .iter()
            .filter(|entry| rules.matches(entry))
            .map(|entry| rules.apply(entry))
            .collect();
        let names: Vec<String> = exposed.iter().map(|svc| svc.name.clone()).collect();

        registry.seal();
        if exposed.is_empty() {
            debug!(module = %registry.module(), "[Federation] Nothing to expose");
            return Ok(names);
        }

        registry
            .federation()
            .merge(registry.module(), registry.module_index(), exposed)
            .inspect_err(|e| warn!(error = %e, "[Federation] Exposure rejected"))?;

        info!(
            module = %registry.module(),
            count = names.len(),
            services = ?names,
            "[Federation] Exposed services"
        );
        Ok(names)
    }
}
