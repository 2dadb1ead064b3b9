//! Stable Kahn's Topological Sort
//!
//! Repeatedly places, among the modules whose dependencies are all placed,
//! the one declared earliest. O((V + E) log V).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::cycles::find_cycle;
use crate::domain::errors::OrderingError;
use crate::domain::graph::ModuleGraph;

/// Sort the graph's nodes so every node follows its dependencies.
///
/// Ties are always broken by declaration order, so identical input yields
/// identical output. If some nodes can never be placed, the graph has a
/// cycle and the error names its members.
pub fn stable_topological_sort(graph: &ModuleGraph) -> Result<Vec<usize>, OrderingError> {
    let mut in_degree: Vec<usize> = (0..graph.len())
        .map(|node| graph.dependencies(node).len())
        .collect();

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &degree)| degree == 0)
        .map(|(node, _)| Reverse(node))
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(Reverse(node)) = ready.pop() {
        order.push(node);

        for &dependent in graph.dependents(node) {
            let degree = &mut in_degree[dependent];
            *degree = degree.saturating_sub(1);
            if *degree == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }

    if order.len() < graph.len() {
        let mut placed = vec![false; graph.len()];
        for &node in &order {
            placed[node] = true;
        }
        let cycle = find_cycle(graph, &placed);
        return Err(OrderingError::CyclicDependency {
            cycle: graph.names_of(&cycle),
        });
    }

    Ok(order)
}
