//! Invariants of a module order.

use std::collections::HashSet;

use super::graph::ModuleGraph;

/// Every module appears after all of its resolved dependencies.
pub fn invariant_dependencies_precede(order: &[usize], graph: &ModuleGraph) -> bool {
    let mut placed = HashSet::with_capacity(order.len());

    for &node in order {
        if !graph.dependencies(node).iter().all(|dep| placed.contains(dep)) {
            return false;
        }
        placed.insert(node);
    }

    true
}

/// The order is a permutation of the graph's nodes.
pub fn invariant_complete(order: &[usize], graph: &ModuleGraph) -> bool {
    let unique: HashSet<usize> = order.iter().copied().collect();
    order.len() == graph.len() && unique.len() == graph.len() && order.iter().all(|&n| n < graph.len())
}
