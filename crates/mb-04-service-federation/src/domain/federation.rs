//! # Federation
//!
//! The shared space of exposed services. Entries are kept in merge order,
//! which is module bootstrap order, then registration order within a module.
//!
//! Visibility is bounded by bootstrap index: a reader with index `n` sees
//! entries from modules with index `< n`. The root reads with
//! `usize::MAX` and sees everything.

use std::sync::Arc;

use parking_lot::RwLock;
use shared_types::{ExposedService, LookupError, ServiceHandle};

use super::errors::ExposureError;

/// One exposed service.
#[derive(Debug, Clone)]
pub struct FederatedEntry {
    /// Exposing module
    pub module: String,
    /// Bootstrap index of the exposing module
    pub module_index: usize,
    /// Name after exposure transforms
    pub name: String,
    pub service: ServiceHandle,
    pub capabilities: Vec<String>,
    pub primary: bool,
}

impl FederatedEntry {
    fn visible_to(&self, reader_index: usize) -> bool {
        self.module_index < reader_index
    }

    fn has_capability(&self, tag: &str) -> bool {
        self.capabilities.iter().any(|c| c == tag)
    }
}

/// Shared federation space. Cloning shares the same underlying list.
#[derive(Debug, Clone, Default)]
pub struct Federation {
    entries: Arc<RwLock<Vec<FederatedEntry>>>,
}

impl Federation {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Merge one module's exposed services.
    ///
    /// All entries are checked before any is added, so a conflict leaves the
    /// federation unchanged. A name already present (from any module, or
    /// earlier in this batch) is a conflict unless the new entry is primary,
    /// in which case it shadows the earlier one for by-name lookups.
    pub fn merge(
        &self,
        module: &str,
        module_index: usize,
        services: Vec<ExposedService>,
    ) -> Result<usize, ExposureError> {
        let mut entries = self.entries.write();

        for (i, svc) in services.iter().enumerate() {
            if svc.primary {
                continue;
            }
            let existing = entries
                .iter()
                .find(|e| e.name == svc.name)
                .map(|e| e.module.clone())
                .or_else(|| {
                    services[..i]
                        .iter()
                        .any(|earlier| earlier.name == svc.name)
                        .then(|| module.to_string())
                });
            if let Some(existing_module) = existing {
                return Err(ExposureError::Conflict {
                    module: module.to_string(),
                    name: svc.name.clone(),
                    existing_module,
                });
            }
        }

        let count = services.len();
        entries.extend(services.into_iter().map(|svc| FederatedEntry {
            module: module.to_string(),
            module_index,
            name: svc.name,
            service: svc.service,
            capabilities: svc.capabilities,
            primary: svc.primary,
        }));
        Ok(count)
    }

    /// Remove every entry exposed by `module`. Returns how many were removed.
    pub fn remove_module(&self, module: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.module != module);
        before - entries.len()
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// By-name lookup: the latest primary entry, otherwise the only one.
    pub fn get_by_name(&self, name: &str, reader_index: usize) -> Option<ServiceHandle> {
        let entries = self.entries.read();
        let candidates = entries
            .iter()
            .filter(|e| e.visible_to(reader_index) && e.name == name);

        let mut fallback = None;
        let mut primary = None;
        for entry in candidates {
            if entry.primary {
                primary = Some(entry);
            }
            fallback = Some(entry);
        }
        primary.or(fallback).map(|e| e.service.clone())
    }

    /// All entries carrying `tag`, in bootstrap order.
    pub fn all_of_capability(&self, tag: &str, reader_index: usize) -> Vec<ServiceHandle> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.visible_to(reader_index) && e.has_capability(tag))
            .map(|e| e.service.clone())
            .collect()
    }

    /// Single preferred entry for `tag`: the only one, or the latest primary.
    pub fn get_of_capability(
        &self,
        tag: &str,
        reader_index: usize,
    ) -> Result<ServiceHandle, LookupError> {
        let entries = self.entries.read();
        let candidates: Vec<&FederatedEntry> = entries
            .iter()
            .filter(|e| e.visible_to(reader_index) && e.has_capability(tag))
            .collect();

        match candidates.as_slice() {
            [] => Err(LookupError::NotFound {
                name: tag.to_string(),
            }),
            [only] => Ok(only.service.clone()),
            many => many
                .iter()
                .rev()
                .find(|e| e.primary)
                .map(|e| e.service.clone())
                .ok_or_else(|| LookupError::Ambiguous {
                    capability: tag.to_string(),
                    candidates: many
                        .iter()
                        .map(|e| format!("{}.{}", e.module, e.name))
                        .collect(),
                }),
        }
    }

    /// Qualified lookup that also reaches shadowed entries.
    pub fn get_from_module(
        &self,
        module: &str,
        name: &str,
        reader_index: usize,
    ) -> Option<ServiceHandle> {
        self.entries
            .read()
            .iter()
            .find(|e| e.visible_to(reader_index) && e.module == module && e.name == name)
            .map(|e| e.service.clone())
    }

    /// Snapshot of every entry, in order.
    pub fn entries(&self) -> Vec<FederatedEntry> {
        self.entries.read().clone()
    }

    /// Names of entries visible at `reader_index`, in order.
    pub fn visible_names(&self, reader_index: usize) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.visible_to(reader_index))
            .map(|e| e.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
