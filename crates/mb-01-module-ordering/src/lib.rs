//! # MB-01: Module Ordering Subsystem
//!
//! Orders module descriptors so that every module comes after the modules
//! it depends on.
//!
//! ## Architecture
//!
//! - **Domain**: dependency graph over enabled modules, errors, invariants
//! - **Algorithms**: stable Kahn's sort, cycle extraction, infrastructure bias
//! - **Resolver**: validation and the public `order` entry point
//!
//! ## Ordering rules
//!
//! 1. Disabled modules are removed. A required dependency on a disabled or
//!    absent module is fatal; an optional one is dropped.
//! 2. Among modules whose dependencies are all placed, the one declared
//!    earliest goes next.
//! 3. Infrastructure modules are then moved up to right after their last
//!    dependency, keeping their relative order.

pub mod algorithms;
pub mod domain;
pub mod resolver;

#[cfg(test)]
mod properties;

pub use domain::errors::{MissingReason, OrderingError};
pub use domain::graph::ModuleGraph;
pub use resolver::ModuleOrderResolver;
