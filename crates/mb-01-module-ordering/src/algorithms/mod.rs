//! Ordering algorithms.
//!
//! All functions work on node indices of a [`ModuleGraph`](crate::ModuleGraph).

pub mod cycles;
pub mod kahns;
pub mod role_bias;

pub use cycles::find_cycle;
pub use kahns::stable_topological_sort;
pub use role_bias::apply_infrastructure_bias;
