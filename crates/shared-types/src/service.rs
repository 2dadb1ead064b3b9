//! # Service Handles
//!
//! Type-erased services contributed by modules.
//!
//! A module's construction provider produces [`ServiceHandle`]s; the
//! orchestrator never inspects how they were built. Exposure is a visibility
//! operation: a federated entry holds a clone of the same handle, so both
//! views point at one instance.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::errors::LookupError;

// =============================================================================
// SERVICE HANDLE
// =============================================================================

/// Shared, type-erased reference to a live service instance.
#[derive(Clone)]
pub struct ServiceHandle {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ServiceHandle {
    /// Wrap a freshly constructed service.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an already shared service.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Typed access to the underlying instance.
    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    /// Whether the underlying instance is a `T`.
    #[must_use]
    pub fn is<T: Any + Send + Sync>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// True if both handles point at the same instance.
    #[must_use]
    pub fn same_instance(&self, other: &ServiceHandle) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }

    /// Rust type name of the wrapped instance.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("type_name", &self.type_name)
            .field("ptr", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

// =============================================================================
// REGISTERED ENTRY
// =============================================================================

/// A named service as held in a module's local registry.
#[derive(Debug, Clone)]
pub struct ServiceEntry {
    /// Local name, unique within the module.
    pub name: String,
    /// The service instance.
    pub handle: ServiceHandle,
    /// Capability tags used by `all_of_capability` lookups.
    pub capabilities: Vec<String>,
    /// Tagged as externally visible by convention.
    pub exposed: bool,
}

impl ServiceEntry {
    /// Create an internal (non-exposed) entry.
    pub fn new(name: impl Into<String>, handle: ServiceHandle) -> Self {
        Self {
            name: name.into(),
            handle,
            capabilities: Vec::new(),
            exposed: false,
        }
    }

    /// Mark as externally visible.
    #[must_use]
    pub fn exposed(mut self) -> Self {
        self.exposed = true;
        self
    }

    /// Add a capability tag.
    #[must_use]
    pub fn capability(mut self, tag: impl Into<String>) -> Self {
        self.capabilities.push(tag.into());
        self
    }

    /// Check a capability tag.
    #[must_use]
    pub fn has_capability(&self, tag: &str) -> bool {
        self.capabilities.iter().any(|c| c == tag)
    }
}

// =============================================================================
// LOOKUP CONTRACT
// =============================================================================

/// Read access to services, as seen from some point in the bootstrap.
///
/// Implemented by module registries (federated scope) and the root registry.
pub trait ServiceLookup {
    /// Find a service by name.
    fn lookup(&self, name: &str) -> Option<ServiceHandle>;

    /// All services carrying `tag`, in bootstrap order.
    fn lookup_all_of_capability(&self, tag: &str) -> Vec<ServiceHandle>;

    /// Typed lookup that fails when the service is missing or of another type.
    fn lookup_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, LookupError>
    where
        Self: Sized,
    {
        let handle = self.lookup(name).ok_or_else(|| LookupError::NotFound {
            name: name.to_string(),
        })?;
        handle.downcast::<T>().ok_or_else(|| LookupError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
            actual: handle.type_name(),
        })
    }
}

/// A lookup that finds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyLookup;

impl ServiceLookup for EmptyLookup {
    fn lookup(&self, _name: &str) -> Option<ServiceHandle> {
        None
    }

    fn lookup_all_of_capability(&self, _tag: &str) -> Vec<ServiceHandle> {
        Vec::new()
    }
}

// =============================================================================
// SERVICE DEFINITIONS
// =============================================================================

/// Builds a service, with the module's federated view available for wiring.
pub type ServiceFactory =
    Arc<dyn Fn(&dyn ServiceLookup) -> anyhow::Result<ServiceHandle> + Send + Sync>;

/// Called during teardown with the instance built by the factory.
pub type ServiceShutdown = Arc<dyn Fn(&ServiceHandle) -> anyhow::Result<()> + Send + Sync>;

/// Explicit registration of a service on a module descriptor.
#[derive(Clone)]
pub struct ServiceDefinition {
    name: String,
    capabilities: Vec<String>,
    exposed: bool,
    factory: ServiceFactory,
    on_shutdown: Option<ServiceShutdown>,
}

impl ServiceDefinition {
    /// Define a service built by `factory`.
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&dyn ServiceLookup) -> anyhow::Result<ServiceHandle> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            capabilities: Vec::new(),
            exposed: false,
            factory: Arc::new(factory),
            on_shutdown: None,
        }
    }

    /// Define a service from a ready value; every construction shares it.
    pub fn instance<T: Any + Send + Sync>(name: impl Into<String>, value: T) -> Self {
        let handle = ServiceHandle::new(value);
        Self::new(name, move |_| Ok(handle.clone()))
    }

    /// Tag as externally visible.
    #[must_use]
    pub fn exposed(mut self) -> Self {
        self.exposed = true;
        self
    }

    /// Add a capability tag.
    #[must_use]
    pub fn capability(mut self, tag: impl Into<String>) -> Self {
        self.capabilities.push(tag.into());
        self
    }

    /// Register a teardown callback.
    #[must_use]
    pub fn on_shutdown<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ServiceHandle) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_shutdown = Some(Arc::new(callback));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    pub fn is_exposed(&self) -> bool {
        self.exposed
    }

    pub fn shutdown_hook(&self) -> Option<&ServiceShutdown> {
        self.on_shutdown.as_ref()
    }

    /// Run the factory and wrap the result as a registry entry.
    pub fn build(&self, lookup: &dyn ServiceLookup) -> anyhow::Result<ServiceEntry> {
        let handle = (self.factory)(lookup)?;
        Ok(ServiceEntry {
            name: self.name.clone(),
            handle,
            capabilities: self.capabilities.clone(),
            exposed: self.exposed,
        })
    }
}

impl fmt::Debug for ServiceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDefinition")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .field("exposed", &self.exposed)
            .field("on_shutdown", &self.on_shutdown.is_some())
            .finish_non_exhaustive()
    }
}
