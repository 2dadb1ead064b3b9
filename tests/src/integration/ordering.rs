//! # Module Ordering Through the Orchestrator
//!
//! Resolver behaviour as seen by a full bootstrap: resolved order drives
//! construction order, and configuration errors abort before anything
//! starts.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use bootstrap_runtime::{BootstrapError, BootstrapState, Orchestrator};
    use mb_01_module_ordering::{MissingReason, ModuleOrderResolver, OrderingError};
    use shared_types::{
        BootstrapPhase, InstallerDescriptor, ModuleDescriptor, ModuleRole, RunCondition,
    };

    fn names(modules: &[ModuleDescriptor]) -> Vec<&str> {
        modules.iter().map(ModuleDescriptor::name).collect()
    }

    fn bootstrap(modules: Vec<ModuleDescriptor>) -> (Orchestrator, Result<(), BootstrapError>) {
        let mut orchestrator = Orchestrator::builder().modules(modules).build().unwrap();
        let result = orchestrator.bootstrap().map(|_| ());
        (orchestrator, result)
    }

    // =========================================================================
    // STABLE ORDER
    // =========================================================================

    /// Input [C, B(requires A), A]: only the B/A pair is constrained.
    #[test]
    fn test_declaration_order_kept_between_dependencies() {
        let (orchestrator, result) = bootstrap(vec![
            ModuleDescriptor::new("C"),
            ModuleDescriptor::new("B").requires("A"),
            ModuleDescriptor::new("A"),
        ]);

        result.unwrap();
        assert_eq!(orchestrator.module_order(), ["C", "A", "B"]);
        assert_eq!(orchestrator.started_modules(), ["C", "A", "B"]);
    }

    #[test]
    fn test_infrastructure_module_declared_last_follows_its_dependency() {
        let input = vec![
            ModuleDescriptor::new("RequiresTwoThreeOptOne")
                .requires("Two")
                .requires("Three")
                .optionally_requires("One"),
            ModuleDescriptor::new("One"),
            ModuleDescriptor::new("RequiresTwo").requires("Two"),
            ModuleDescriptor::new("Two"),
            ModuleDescriptor::new("Three"),
            ModuleDescriptor::new("Infra")
                .role(ModuleRole::Infrastructure)
                .requires("Two"),
        ];

        let (orchestrator, result) = bootstrap(input);
        result.unwrap();

        let order = orchestrator.module_order();
        let two = order.iter().position(|m| *m == "Two").unwrap();
        assert_eq!(order[two + 1], "Infra");
        assert_eq!(
            order,
            ["One", "Two", "Infra", "RequiresTwo", "Three", "RequiresTwoThreeOptOne"]
        );
    }

    #[test]
    fn test_order_is_repeatable() {
        let input = || {
            vec![
                ModuleDescriptor::new("Web").requires("Data"),
                ModuleDescriptor::new("Audit").optionally_requires("Web"),
                ModuleDescriptor::new("Data"),
                ModuleDescriptor::new("Cache").role(ModuleRole::Infrastructure),
            ]
        };

        let resolver = ModuleOrderResolver::new();
        let first = resolver.order(input()).unwrap();
        let second = resolver.order(input()).unwrap();
        assert_eq!(names(&first), names(&second));
        assert_eq!(names(&first), ["Cache", "Data", "Web", "Audit"]);
    }

    // =========================================================================
    // DISABLED MODULES
    // =========================================================================

    #[test]
    fn test_disabled_optional_dependency_is_ignored() {
        let (orchestrator, result) = bootstrap(vec![
            ModuleDescriptor::new("Reports").optionally_requires("Charts"),
            ModuleDescriptor::new("Charts").disabled(),
            ModuleDescriptor::new("Core"),
        ]);

        result.unwrap();
        assert_eq!(orchestrator.module_order(), ["Reports", "Core"]);
    }

    #[test]
    fn test_disabled_required_dependency_names_both_modules() {
        let (orchestrator, result) = bootstrap(vec![
            ModuleDescriptor::new("Reports").requires("Charts"),
            ModuleDescriptor::new("Charts").disabled(),
        ]);

        let err = result.unwrap_err();
        assert!(matches!(
            &err,
            BootstrapError::Ordering(OrderingError::MissingDependency {
                module,
                dependency,
                reason: MissingReason::Disabled,
            }) if module == "Reports" && dependency == "Charts"
        ));
        let message = err.to_string();
        assert!(message.contains("Reports") && message.contains("Charts"));
        assert_eq!(orchestrator.state(), BootstrapState::Failed);
        assert!(orchestrator.started_modules().is_empty());
    }

    // =========================================================================
    // CONFIGURATION ERRORS
    // =========================================================================

    #[test]
    fn test_cycle_aborts_before_any_installer() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        let installer = InstallerDescriptor::new("seed")
            .phase(BootstrapPhase::BeforeContextBootstrap)
            .run_condition(RunCondition::AlwaysRun)
            .work(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });

        let mut orchestrator = Orchestrator::builder()
            .settings(crate::support::execute_all())
            .module(ModuleDescriptor::new("X").requires("Y").add_installer(installer))
            .module(ModuleDescriptor::new("Y").requires("X"))
            .build()
            .unwrap();

        let err = orchestrator.bootstrap().unwrap_err();
        match err {
            BootstrapError::Ordering(OrderingError::CyclicDependency { cycle }) => {
                assert!(cycle.contains(&"X".to_string()));
                assert!(cycle.contains(&"Y".to_string()));
            }
            other => panic!("expected cycle, got {other}"),
        }
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert!(orchestrator.module_order().is_empty());
    }

    #[test]
    fn test_duplicate_name_rejected_even_if_disabled() {
        let (_, result) = bootstrap(vec![
            ModuleDescriptor::new("One"),
            ModuleDescriptor::new("One").disabled(),
        ]);
        assert!(matches!(
            result,
            Err(BootstrapError::Ordering(OrderingError::DuplicateModule { ref name })) if name == "One"
        ));
    }
}
