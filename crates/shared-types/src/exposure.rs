//! # Exposure Rules
//!
//! Which of a module's local services become visible to later modules and
//! the root, and under which names.
//!
//! The predicate decides *whether* an entry is exposed (default: the entry's
//! own `exposed` tag). Transforms then run in declaration order and may
//! rename, prefix, or mark the entry primary. The service handle is never
//! replaced by the built-in transforms.

use std::fmt;
use std::sync::Arc;

use crate::service::{ServiceEntry, ServiceHandle};

/// An entry after exposure transforms, ready to merge into the federation.
#[derive(Debug, Clone)]
pub struct ExposedService {
    pub name: String,
    pub service: ServiceHandle,
    pub capabilities: Vec<String>,
    /// Preferred resolution for ambiguous lookups.
    pub primary: bool,
}

impl From<&ServiceEntry> for ExposedService {
    fn from(entry: &ServiceEntry) -> Self {
        Self {
            name: entry.name.clone(),
            service: entry.handle.clone(),
            capabilities: entry.capabilities.clone(),
            primary: false,
        }
    }
}

type Predicate = Arc<dyn Fn(&ServiceEntry) -> bool + Send + Sync>;
type Transform = Arc<dyn Fn(ExposedService) -> ExposedService + Send + Sync>;

/// Predicate + ordered transforms.
#[derive(Clone, Default)]
pub struct ExposureRules {
    predicate: Option<Predicate>,
    transforms: Vec<Transform>,
}

impl ExposureRules {
    /// Expose entries tagged `exposed`, unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose nothing.
    pub fn none() -> Self {
        Self::new().filter(|_| false)
    }

    /// Expose every local entry.
    pub fn all() -> Self {
        Self::new().filter(|_| true)
    }

    /// Replace the predicate.
    #[must_use]
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ServiceEntry) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Append an arbitrary transform.
    #[must_use]
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(ExposedService) -> ExposedService + Send + Sync + 'static,
    {
        self.transforms.push(Arc::new(transform));
        self
    }

    /// Prefix every exposed name.
    #[must_use]
    pub fn with_prefix(self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.transform(move |mut svc| {
            svc.name = format!("{prefix}{}", svc.name);
            svc
        })
    }

    /// Rename one entry (matched on its name at this point of the chain).
    #[must_use]
    pub fn rename(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        let (from, to) = (from.into(), to.into());
        self.transform(move |mut svc| {
            if svc.name == from {
                svc.name = to.clone();
            }
            svc
        })
    }

    /// Mark one entry primary (matched on its name at this point of the chain).
    #[must_use]
    pub fn primary(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.transform(move |mut svc| {
            if svc.name == name {
                svc.primary = true;
            }
            svc
        })
    }

    pub fn matches(&self, entry: &ServiceEntry) -> bool {
        match &self.predicate {
            Some(predicate) => predicate(entry),
            None => entry.exposed,
        }
    }

    pub fn apply(&self, entry: &ServiceEntry) -> ExposedService {
        self.transforms
            .iter()
            .fold(ExposedService::from(entry), |svc, t| t(svc))
    }
}

impl fmt::Debug for ExposureRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExposureRules")
            .field("custom_predicate", &self.predicate.is_some())
            .field("transforms", &self.transforms.len())
            .finish()
    }
}
