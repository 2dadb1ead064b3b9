//! Domain layer for module ordering.

pub mod errors;
pub mod graph;
pub mod invariants;
