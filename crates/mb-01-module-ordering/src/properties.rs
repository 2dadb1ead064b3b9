//! Property tests for module ordering.

use std::collections::HashMap;

use proptest::prelude::*;
use shared_types::{ModuleDescriptor, ModuleRole};

use crate::ModuleOrderResolver;

/// Random acyclic module sets.
///
/// A hidden rank permutation decides which edges are allowed, so dependency
/// direction is independent of declaration order.
fn acyclic_modules(max_infra: usize) -> impl Strategy<Value = Vec<ModuleDescriptor>> {
    (1usize..10)
        .prop_flat_map(move |n| {
            (
                Just((0..n).collect::<Vec<usize>>()).prop_shuffle(),
                prop::collection::vec((0..n, 0..n, any::<bool>()), 0..n * 2),
                prop::sample::subsequence((0..n).collect::<Vec<usize>>(), 0..=max_infra.min(n)),
            )
        })
        .prop_map(|(rank, edges, infra)| {
            let mut modules: Vec<ModuleDescriptor> = (0..rank.len())
                .map(|i| ModuleDescriptor::new(format!("m{i}")))
                .collect();

            for (from, to, required) in edges {
                if rank[from] <= rank[to] {
                    continue;
                }
                let dep = format!("m{to}");
                let module = std::mem::replace(&mut modules[from], ModuleDescriptor::new(""));
                modules[from] = if required {
                    module.requires(dep)
                } else {
                    module.optionally_requires(dep)
                };
            }

            for i in infra {
                let module = std::mem::replace(&mut modules[i], ModuleDescriptor::new(""));
                modules[i] = module.role(ModuleRole::Infrastructure);
            }

            modules
        })
}

fn all_dependencies(module: &ModuleDescriptor) -> impl Iterator<Item = &String> {
    module
        .required_dependencies()
        .iter()
        .chain(module.optional_dependencies())
}

fn positions(ordered: &[ModuleDescriptor]) -> HashMap<String, usize> {
    ordered
        .iter()
        .enumerate()
        .map(|(i, m)| (m.name().to_string(), i))
        .collect()
}

proptest! {
    /// Property: every dependency appears at a strictly earlier index.
    #[test]
    fn prop_dependencies_come_first(modules in acyclic_modules(usize::MAX)) {
        let ordered = ModuleOrderResolver::new().order(modules).unwrap();
        let pos = positions(&ordered);

        for module in &ordered {
            for dep in all_dependencies(module) {
                prop_assert!(pos[dep] < pos[module.name()]);
            }
        }
    }

    /// Property: ordering the same input twice gives the same output.
    #[test]
    fn prop_order_is_deterministic(modules in acyclic_modules(usize::MAX)) {
        let resolver = ModuleOrderResolver::new();
        let first = resolver.order_positions(&modules).unwrap();
        let second = resolver.order_positions(&modules).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Property: without infrastructure modules, a module only overtakes an
    /// earlier-declared one when it directly depends on it.
    #[test]
    fn prop_inversions_are_forced(modules in acyclic_modules(0)) {
        let declared: HashMap<String, usize> = positions(&modules);
        let ordered = ModuleOrderResolver::new().order(modules).unwrap();

        for pair in ordered.windows(2) {
            let (first, second) = (&pair[0], &pair[1]);
            if declared[first.name()] > declared[second.name()] {
                prop_assert!(
                    all_dependencies(second).any(|d| d == first.name()),
                    "{} moved ahead of {} without depending on it",
                    first.name(),
                    second.name()
                );
            }
        }
    }

    /// Property: without dependencies, output equals input.
    #[test]
    fn prop_independent_modules_keep_input_order(n in 0usize..12) {
        let modules: Vec<ModuleDescriptor> =
            (0..n).map(|i| ModuleDescriptor::new(format!("m{i}"))).collect();
        let ordered = ModuleOrderResolver::new().order_positions(&modules).unwrap();
        prop_assert_eq!(ordered, (0..n).collect::<Vec<_>>());
    }

    /// Property: a lone infrastructure module sits right after its last
    /// dependency, or first if it has none.
    #[test]
    fn prop_infrastructure_placed_after_last_dependency(modules in acyclic_modules(1)) {
        let ordered = ModuleOrderResolver::new().order(modules).unwrap();
        let pos = positions(&ordered);

        for module in &ordered {
            if module.module_role() != ModuleRole::Infrastructure {
                continue;
            }
            let expected = all_dependencies(module)
                .map(|d| pos[d] + 1)
                .max()
                .unwrap_or(0);
            prop_assert_eq!(pos[module.name()], expected);
        }
    }

    /// Property: with several infrastructure modules, only other
    /// infrastructure modules sit between one and its last dependency.
    #[test]
    fn prop_only_infrastructure_delays_infrastructure(modules in acyclic_modules(usize::MAX)) {
        let ordered = ModuleOrderResolver::new().order(modules).unwrap();
        let pos = positions(&ordered);

        for module in &ordered {
            if module.module_role() != ModuleRole::Infrastructure {
                continue;
            }
            let earliest = all_dependencies(module)
                .map(|d| pos[d] + 1)
                .max()
                .unwrap_or(0);
            let at = pos[module.name()];
            prop_assert!(earliest <= at);
            for between in &ordered[earliest..at] {
                prop_assert_eq!(
                    between.module_role(),
                    ModuleRole::Infrastructure,
                    "{} held {} back",
                    between.name(),
                    module.name()
                );
            }
        }
    }
}
