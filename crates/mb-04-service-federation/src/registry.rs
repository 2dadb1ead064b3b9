//! # Service Registry
//!
//! One registry per module: an insertion-ordered table of local services
//! plus a read-only view of the federation.
//!
//! ## Scopes
//!
//! - [`LookupScope::Local`]: the module's own services only.
//! - [`LookupScope::Federated`]: services exposed by modules bootstrapped
//!   earlier. Never the module's own internals.
//! - [`LookupScope::All`]: local first, then federated. This is what the
//!   module's factories and installers see through [`ServiceLookup`].

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use shared_types::{LookupError, ServiceEntry, ServiceHandle, ServiceLookup};
use tracing::debug;

use crate::domain::errors::RegistryError;
use crate::domain::federation::Federation;

/// Module name used by the root registry.
pub const ROOT_MODULE: &str = "<root>";

/// Which tables a lookup consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupScope {
    Local,
    #[default]
    Federated,
    All,
}

/// A module's service registry.
#[derive(Debug)]
pub struct ServiceRegistry {
    module: String,
    /// Bootstrap index; federation entries below it are visible
    module_index: usize,
    local: Vec<ServiceEntry>,
    by_name: HashMap<String, usize>,
    federation: Federation,
    sealed: bool,
}

impl ServiceRegistry {
    pub fn new(module: impl Into<String>, module_index: usize, federation: Federation) -> Self {
        Self {
            module: module.into(),
            module_index,
            local: Vec::new(),
            by_name: HashMap::new(),
            federation,
            sealed: false,
        }
    }

    /// Registry of the root context. Sees every exposed service.
    pub fn root(federation: Federation) -> Self {
        Self::new(ROOT_MODULE, usize::MAX, federation)
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn module_index(&self) -> usize {
        self.module_index
    }

    pub fn federation(&self) -> &Federation {
        &self.federation
    }

    // =========================================================================
    // LOCAL TABLE
    // =========================================================================

    /// Add a local service.
    pub fn register(&mut self, entry: ServiceEntry) -> Result<(), RegistryError> {
        if self.sealed {
            return Err(RegistryError::Sealed {
                module: self.module.clone(),
            });
        }
        if self.by_name.contains_key(&entry.name) {
            return Err(RegistryError::DuplicateService {
                module: self.module.clone(),
                name: entry.name,
            });
        }

        debug!(module = %self.module, service = %entry.name, exposed = entry.exposed, "[Registry] Registered service");
        self.by_name.insert(entry.name.clone(), self.local.len());
        self.local.push(entry);
        Ok(())
    }

    /// Local entries in registration order.
    pub fn local_entries(&self) -> &[ServiceEntry] {
        &self.local
    }

    /// Make the local table read-only.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Empty the local table for teardown, returning entries in
    /// registration order.
    pub fn clear(&mut self) -> Vec<ServiceEntry> {
        self.by_name.clear();
        std::mem::take(&mut self.local)
    }

    // =========================================================================
    // LOOKUPS
    // =========================================================================

    pub fn get(&self, name: &str, scope: LookupScope) -> Option<ServiceHandle> {
        match scope {
            LookupScope::Local => self.get_local(name),
            LookupScope::Federated => self.federation.get_by_name(name, self.module_index),
            LookupScope::All => self
                .get_local(name)
                .or_else(|| self.federation.get_by_name(name, self.module_index)),
        }
    }

    /// Typed lookup.
    pub fn get_as<T: Any + Send + Sync>(
        &self,
        name: &str,
        scope: LookupScope,
    ) -> Result<Arc<T>, LookupError> {
        let handle = self.get(name, scope).ok_or_else(|| LookupError::NotFound {
            name: name.to_string(),
        })?;
        handle.downcast::<T>().ok_or_else(|| LookupError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
            actual: handle.type_name(),
        })
    }

    /// Services carrying `tag`, in bootstrap order (local ones last).
    pub fn all_of_capability(&self, tag: &str, scope: LookupScope) -> Vec<ServiceHandle> {
        let local = || {
            self.local
                .iter()
                .filter(|e| e.has_capability(tag))
                .map(|e| e.handle.clone())
        };
        match scope {
            LookupScope::Local => local().collect(),
            LookupScope::Federated => self.federation.all_of_capability(tag, self.module_index),
            LookupScope::All => {
                let mut all = self.federation.all_of_capability(tag, self.module_index);
                all.extend(local());
                all
            }
        }
    }

    /// Preferred federated service for `tag`.
    pub fn get_of_capability(&self, tag: &str) -> Result<ServiceHandle, LookupError> {
        self.federation.get_of_capability(tag, self.module_index)
    }

    /// Federated service exposed by a specific earlier module.
    pub fn get_from_module(&self, module: &str, name: &str) -> Option<ServiceHandle> {
        self.federation
            .get_from_module(module, name, self.module_index)
    }

    fn get_local(&self, name: &str) -> Option<ServiceHandle> {
        self.by_name
            .get(name)
            .map(|&i| self.local[i].handle.clone())
    }
}

impl ServiceLookup for ServiceRegistry {
    fn lookup(&self, name: &str) -> Option<ServiceHandle> {
        self.get(name, LookupScope::All)
    }

    fn lookup_all_of_capability(&self, tag: &str) -> Vec<ServiceHandle> {
        self.all_of_capability(tag, LookupScope::All)
    }
}
