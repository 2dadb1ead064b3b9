//! Dependency graph over enabled modules.
//!
//! Nodes are positions in the list of enabled modules, so index order is
//! declaration order. An edge from `a` to `b` in `dependencies(a)` means
//! "a must come after b".

use std::collections::{HashMap, HashSet};

use shared_types::{ModuleDescriptor, ModuleRole};
use tracing::debug;

use super::errors::{MissingReason, OrderingError};

#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    names: Vec<String>,
    roles: Vec<ModuleRole>,
    /// Sorted, deduplicated dependency indices per node.
    dependencies: Vec<Vec<usize>>,
    /// Reverse edges, in ascending node order.
    dependents: Vec<Vec<usize>>,
}

impl ModuleGraph {
    /// Build the graph for `modules` (all enabled).
    ///
    /// `declared` holds every declared module name, enabled or not, and is
    /// used to tell a disabled dependency from an absent one.
    pub fn build(
        modules: &[&ModuleDescriptor],
        declared: &HashSet<&str>,
    ) -> Result<Self, OrderingError> {
        let index: HashMap<&str, usize> = modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name(), i))
            .collect();

        let mut dependencies = vec![Vec::new(); modules.len()];

        for (i, module) in modules.iter().enumerate() {
            for dep in module.required_dependencies() {
                let Some(&j) = index.get(dep.as_str()) else {
                    let reason = if declared.contains(dep.as_str()) {
                        MissingReason::Disabled
                    } else {
                        MissingReason::Absent
                    };
                    return Err(OrderingError::MissingDependency {
                        module: module.name().to_string(),
                        dependency: dep.clone(),
                        reason,
                    });
                };
                dependencies[i].push(j);
            }

            for dep in module.optional_dependencies() {
                match index.get(dep.as_str()) {
                    Some(&j) => dependencies[i].push(j),
                    None => debug!(
                        module = %module.name(),
                        dependency = %dep,
                        "[Ordering] Dropping unresolved optional dependency"
                    ),
                }
            }

            dependencies[i].sort_unstable();
            dependencies[i].dedup();
        }

        let mut dependents = vec![Vec::new(); modules.len()];
        for (i, deps) in dependencies.iter().enumerate() {
            for &j in deps {
                dependents[j].push(i);
            }
        }

        Ok(Self {
            names: modules.iter().map(|m| m.name().to_string()).collect(),
            roles: modules.iter().map(|m| m.module_role()).collect(),
            dependencies,
            dependents,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, node: usize) -> &str {
        &self.names[node]
    }

    pub fn role(&self, node: usize) -> ModuleRole {
        self.roles[node]
    }

    pub fn dependencies(&self, node: usize) -> &[usize] {
        &self.dependencies[node]
    }

    pub fn dependents(&self, node: usize) -> &[usize] {
        &self.dependents[node]
    }

    /// Node names for a list of indices.
    pub fn names_of(&self, nodes: &[usize]) -> Vec<String> {
        nodes.iter().map(|&i| self.names[i].clone()).collect()
    }
}
