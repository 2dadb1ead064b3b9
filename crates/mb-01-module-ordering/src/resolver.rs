//! # Module Order Resolver
//!
//! Entry point: `order(descriptors) -> descriptors`, deterministic for a
//! given input order. All failures happen before anything is returned, so a
//! caller that gets an error has not started any module.

use std::collections::HashSet;

use shared_types::ModuleDescriptor;
use tracing::{debug, error, info};

use crate::algorithms::{apply_infrastructure_bias, stable_topological_sort};
use crate::domain::errors::OrderingError;
use crate::domain::graph::ModuleGraph;
use crate::domain::invariants::{invariant_complete, invariant_dependencies_precede};

/// Orders module descriptors by dependency, role and declaration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleOrderResolver;

impl ModuleOrderResolver {
    pub fn new() -> Self {
        Self
    }

    /// Return the enabled modules in bootstrap order.
    pub fn order(
        &self,
        descriptors: Vec<ModuleDescriptor>,
    ) -> Result<Vec<ModuleDescriptor>, OrderingError> {
        let positions = self.order_positions(&descriptors)?;

        let mut slots: Vec<Option<ModuleDescriptor>> = descriptors.into_iter().map(Some).collect();
        Ok(positions
            .into_iter()
            .filter_map(|pos| slots[pos].take())
            .collect())
    }

    /// Same as [`order`](Self::order), returning positions into the input.
    pub fn order_positions(
        &self,
        descriptors: &[ModuleDescriptor],
    ) -> Result<Vec<usize>, OrderingError> {
        self.resolve(descriptors).inspect_err(|e| {
            error!(module = %e.module(), error = %e, "[Ordering] Module ordering failed");
        })
    }

    fn resolve(&self, descriptors: &[ModuleDescriptor]) -> Result<Vec<usize>, OrderingError> {
        // 1. Names are unique across the whole input, disabled modules included
        let mut declared: HashSet<&str> = HashSet::with_capacity(descriptors.len());
        for descriptor in descriptors {
            if !declared.insert(descriptor.name()) {
                return Err(OrderingError::DuplicateModule {
                    name: descriptor.name().to_string(),
                });
            }
        }

        // 2. Drop disabled modules
        let enabled: Vec<usize> = descriptors
            .iter()
            .enumerate()
            .filter(|(_, d)| {
                if !d.is_enabled() {
                    debug!(module = %d.name(), "[Ordering] Skipping disabled module");
                }
                d.is_enabled()
            })
            .map(|(pos, _)| pos)
            .collect();
        let modules: Vec<&ModuleDescriptor> = enabled.iter().map(|&pos| &descriptors[pos]).collect();

        // 3. Graph, sort, bias
        let graph = ModuleGraph::build(&modules, &declared)?;
        let order = stable_topological_sort(&graph)?;
        let order = apply_infrastructure_bias(order, &graph);

        debug_assert!(invariant_complete(&order, &graph));
        debug_assert!(invariant_dependencies_precede(&order, &graph));

        info!(
            modules = order.len(),
            order = ?graph.names_of(&order),
            "[Ordering] Resolved module order"
        );

        Ok(order.into_iter().map(|node| enabled[node]).collect())
    }
}
