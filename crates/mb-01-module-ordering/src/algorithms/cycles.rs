//! Cycle extraction by DFS coloring.

use crate::domain::graph::ModuleGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Find a dependency cycle among the nodes not marked in `excluded`.
///
/// The returned path follows dependency edges and repeats its first node at
/// the end (`[X, Y, X]`). Returns an empty vector for an acyclic graph.
pub fn find_cycle(graph: &ModuleGraph, excluded: &[bool]) -> Vec<usize> {
    let mut color = vec![Color::White; graph.len()];
    let mut path = Vec::new();

    for start in 0..graph.len() {
        if excluded[start] || color[start] != Color::White {
            continue;
        }
        if let Some(cycle) = visit(graph, start, excluded, &mut color, &mut path) {
            return cycle;
        }
    }

    Vec::new()
}

/// Whether the graph contains any cycle.
pub fn has_cycle(graph: &ModuleGraph) -> bool {
    !find_cycle(graph, &vec![false; graph.len()]).is_empty()
}

fn visit(
    graph: &ModuleGraph,
    node: usize,
    excluded: &[bool],
    color: &mut [Color],
    path: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    color[node] = Color::Gray;
    path.push(node);

    for &dep in graph.dependencies(node) {
        if excluded[dep] {
            continue;
        }
        match color[dep] {
            Color::Gray => {
                // Back edge: the cycle is the path suffix starting at `dep`.
                let start = path.iter().position(|&n| n == dep).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(dep);
                return Some(cycle);
            }
            Color::White => {
                if let Some(cycle) = visit(graph, dep, excluded, color, path) {
                    return Some(cycle);
                }
            }
            Color::Black => {}
        }
    }

    path.pop();
    color[node] = Color::Black;
    None
}
