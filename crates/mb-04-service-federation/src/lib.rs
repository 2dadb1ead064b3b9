//! # MB-04: Service Federation Subsystem
//!
//! Lets a module's services become visible to modules bootstrapped after it,
//! and to the root, while keeping everything else private.
//!
//! ## Architecture
//!
//! ```text
//!   Module One                Module Two                  Root
//!  ┌───────────────┐        ┌───────────────┐        ┌──────────┐
//!  │ local:        │        │ local:        │        │          │
//!  │  numberOne  ──┼─expose─┼─► federated ──┼────────┼─► all    │
//!  │  internalBean │        │   numberOne   │        │  exposed │
//!  └───────────────┘        └───────────────┘        └──────────┘
//! ```
//!
//! - **Federation**: shared, append-only (until teardown) list of exposed
//!   entries, tagged with the exposing module and its bootstrap index.
//! - **ServiceRegistry**: a module's local table plus its view of the
//!   federation (entries from earlier modules only).
//! - **ExposureFederator**: filters, transforms and merges one module's
//!   local services into the federation, then seals the registry.
//!
//! Exposure never copies a service: federated and local entries share one
//! instance.

pub mod domain;
pub mod federator;
pub mod registry;

pub use domain::errors::{ExposureError, RegistryError};
pub use domain::federation::{FederatedEntry, Federation};
pub use federator::ExposureFederator;
pub use registry::{LookupScope, ServiceRegistry, ROOT_MODULE};
