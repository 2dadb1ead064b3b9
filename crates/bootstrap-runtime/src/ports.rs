//! Ports the host implements.

use mb_04_service_federation::ServiceRegistry;
use shared_types::ModuleDescriptor;

/// Builds a module's services.
///
/// `construct` is called exactly once per module, after every module it
/// depends on has been constructed and has exposed its services. The
/// registry's lookups already see those services.
pub trait ModuleProvider: Send + Sync {
    /// Populate `registry` with the module's local services.
    fn construct(
        &self,
        descriptor: &ModuleDescriptor,
        registry: &mut ServiceRegistry,
    ) -> anyhow::Result<()>;

    /// Release the module's resources during teardown.
    ///
    /// Also called for a module whose construction failed part way, with
    /// whatever it managed to register.
    fn destroy(
        &self,
        _descriptor: &ModuleDescriptor,
        _registry: &ServiceRegistry,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
