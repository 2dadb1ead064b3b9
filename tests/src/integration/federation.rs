//! # Service Federation Through the Orchestrator
//!
//! Exposed services become visible to later modules and the root as the
//! same instance; internal services stay private to their module.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bootstrap_runtime::{BootstrapError, Orchestrator};
    use mb_04_service_federation::{ExposureError, LookupScope, ServiceRegistry};
    use shared_types::{
        ExposureRules, LookupError, ModuleDescriptor, ServiceDefinition, ServiceHandle,
        ServiceLookup,
    };

    struct NumberService(u32);

    /// Built from the module's own view of the world.
    struct Adder {
        base: Arc<NumberService>,
    }

    fn number_one() -> ModuleDescriptor {
        ModuleDescriptor::new("One")
            .add_service(ServiceDefinition::instance("numberOne", NumberService(1)).exposed())
            .add_service(ServiceDefinition::instance("internalBean", NumberService(99)))
    }

    fn bootstrap(modules: Vec<ModuleDescriptor>) -> Orchestrator {
        let mut orchestrator = Orchestrator::builder().modules(modules).build().unwrap();
        orchestrator.bootstrap().unwrap();
        orchestrator
    }

    fn registry<'a>(orchestrator: &'a Orchestrator, module: &str) -> &'a ServiceRegistry {
        orchestrator.registry(module).unwrap()
    }

    // =========================================================================
    // VISIBILITY
    // =========================================================================

    #[test]
    fn test_exposed_service_is_shared_instance() {
        let orchestrator = bootstrap(vec![number_one(), ModuleDescriptor::new("Two")]);

        let one = registry(&orchestrator, "One");
        let two = registry(&orchestrator, "Two");

        let seen_by_two = two.get("numberOne", LookupScope::Federated).unwrap();
        let seen_by_root = orchestrator
            .root()
            .get("numberOne", LookupScope::Federated)
            .unwrap();
        let local = one.get("numberOne", LookupScope::Local).unwrap();

        assert!(seen_by_two.same_instance(&seen_by_root));
        assert!(seen_by_two.same_instance(&local));
        assert_eq!(
            two.get_as::<NumberService>("numberOne", LookupScope::Federated)
                .unwrap()
                .0,
            1
        );
    }

    #[test]
    fn test_internal_service_stays_local() {
        let orchestrator = bootstrap(vec![number_one(), ModuleDescriptor::new("Two")]);

        let one = registry(&orchestrator, "One");
        let two = registry(&orchestrator, "Two");

        assert!(one.get("internalBean", LookupScope::Local).is_some());
        assert!(two.get("internalBean", LookupScope::Federated).is_none());
        assert!(orchestrator
            .root()
            .get("internalBean", LookupScope::Federated)
            .is_none());
        assert!(matches!(
            two.get_as::<NumberService>("internalBean", LookupScope::All),
            Err(LookupError::NotFound { .. })
        ));
    }

    #[test]
    fn test_exposure_keeps_local_visibility() {
        let orchestrator = bootstrap(vec![number_one()]);
        let one = registry(&orchestrator, "One");

        assert!(one.is_sealed());
        assert_eq!(one.local_entries().len(), 2);
        assert!(one.get("numberOne", LookupScope::Local).is_some());
        assert!(one.get("numberOne", LookupScope::Federated).is_none());
        assert_eq!(orchestrator.report().exposed_by("One"), ["numberOne"]);
    }

    #[test]
    fn test_earlier_module_does_not_see_later_exports() {
        let orchestrator = bootstrap(vec![
            ModuleDescriptor::new("Early"),
            ModuleDescriptor::new("Late")
                .add_service(ServiceDefinition::instance("late", NumberService(7)).exposed()),
        ]);

        let early = registry(&orchestrator, "Early");
        assert!(early.get("late", LookupScope::Federated).is_none());
        assert!(orchestrator.root().get("late", LookupScope::Federated).is_some());
    }

    // =========================================================================
    // WIRING
    // =========================================================================

    #[test]
    fn test_factory_wires_against_earlier_exports() {
        let two = ModuleDescriptor::new("Two").requires("One").add_service(
            ServiceDefinition::new("adder", |lookup: &dyn ServiceLookup| {
                let base = lookup
                    .lookup("numberOne")
                    .and_then(|h| h.downcast::<NumberService>())
                    .ok_or_else(|| anyhow::anyhow!("numberOne not visible"))?;
                Ok(ServiceHandle::new(Adder { base }))
            }),
        );

        let orchestrator = bootstrap(vec![two, number_one()]);
        let adder = registry(&orchestrator, "Two")
            .get_as::<Adder>("adder", LookupScope::Local)
            .unwrap();
        let exposed = orchestrator
            .root()
            .get_as::<NumberService>("numberOne", LookupScope::Federated)
            .unwrap();
        assert!(Arc::ptr_eq(&adder.base, &exposed));
    }

    #[test]
    fn test_capability_lookup_spans_modules_in_order() {
        let orchestrator = bootstrap(vec![
            ModuleDescriptor::new("A").add_service(
                ServiceDefinition::instance("a.check", NumberService(1))
                    .capability("health")
                    .exposed(),
            ),
            ModuleDescriptor::new("B").add_service(
                ServiceDefinition::instance("b.check", NumberService(2))
                    .capability("health")
                    .exposed(),
            ),
            ModuleDescriptor::new("C").add_service(
                ServiceDefinition::instance("c.check", NumberService(3)).capability("health"),
            ),
        ]);

        let c = registry(&orchestrator, "C");
        let values: Vec<u32> = c
            .all_of_capability("health", LookupScope::All)
            .iter()
            .filter_map(|h| h.downcast::<NumberService>())
            .map(|n| n.0)
            .collect();
        assert_eq!(values, [1, 2, 3]);
        assert!(matches!(
            c.get_of_capability("health"),
            Err(LookupError::Ambiguous { .. })
        ));
    }

    // =========================================================================
    // CONFLICTS
    // =========================================================================

    #[test]
    fn test_name_collision_fails_bootstrap() {
        let mut orchestrator = Orchestrator::builder()
            .module(number_one())
            .module(
                ModuleDescriptor::new("Impostor")
                    .add_service(ServiceDefinition::instance("numberOne", NumberService(2)).exposed()),
            )
            .build()
            .unwrap();

        let err = orchestrator.bootstrap().unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::Exposure(ExposureError::Conflict { .. })
        ));
        assert_eq!(err.module(), Some("Impostor"));

        let shared = orchestrator
            .root()
            .get_as::<NumberService>("numberOne", LookupScope::Federated)
            .unwrap();
        assert_eq!(shared.0, 1);
    }

    #[test]
    fn test_primary_export_shadows_by_name() {
        let orchestrator = bootstrap(vec![
            number_one(),
            ModuleDescriptor::new("Override")
                .add_service(ServiceDefinition::instance("numberOne", NumberService(100)))
                .expose(ExposureRules::all().primary("numberOne")),
            ModuleDescriptor::new("Reader"),
        ]);

        let reader = registry(&orchestrator, "Reader");
        let winner = reader
            .get_as::<NumberService>("numberOne", LookupScope::Federated)
            .unwrap();
        assert_eq!(winner.0, 100);

        let original = reader.get_from_module("One", "numberOne").unwrap();
        assert_eq!(original.downcast::<NumberService>().unwrap().0, 1);
    }

    #[test]
    fn test_shutdown_withdraws_exports() {
        let mut orchestrator = bootstrap(vec![number_one(), ModuleDescriptor::new("Two")]);
        assert!(!orchestrator.federation().is_empty());

        orchestrator.shutdown().unwrap();
        assert!(orchestrator.federation().is_empty());
        assert!(orchestrator
            .root()
            .get("numberOne", LookupScope::Federated)
            .is_none());
    }
}
