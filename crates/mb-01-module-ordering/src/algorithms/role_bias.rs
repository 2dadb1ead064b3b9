//! Infrastructure role bias.
//!
//! Applied after the topological sort. Each infrastructure module moves up
//! to the earliest slot that still follows all of its dependencies. When
//! that slot is held by an infrastructure module already placed, it goes
//! behind it, so infrastructure modules keep their relative order.
//! Moving a module earlier only shifts the modules it jumps over by one, so
//! the result stays a valid topological order.

use std::collections::HashSet;

use shared_types::ModuleRole;
use tracing::debug;

use crate::domain::graph::ModuleGraph;

pub fn apply_infrastructure_bias(mut order: Vec<usize>, graph: &ModuleGraph) -> Vec<usize> {
    let infrastructure: Vec<usize> = order
        .iter()
        .copied()
        .filter(|&node| graph.role(node) == ModuleRole::Infrastructure)
        .collect();

    let mut placed = HashSet::with_capacity(infrastructure.len());

    for node in infrastructure {
        let Some(current) = order.iter().position(|&n| n == node) else {
            continue;
        };

        let after_dependencies = order[..current]
            .iter()
            .rposition(|n| graph.dependencies(node).contains(n))
            .map_or(0, |pos| pos + 1);
        let mut target = after_dependencies;
        while target < current && placed.contains(&order[target]) {
            target += 1;
        }

        if target < current {
            order.remove(current);
            order.insert(target, node);
            debug!(
                module = %graph.name(node),
                from = current,
                to = target,
                "[Ordering] Pulled infrastructure module forward"
            );
        }

        placed.insert(node);
    }

    order
}
