//! # Orchestrator
//!
//! Drives one bootstrap run over a set of module descriptors, strictly
//! sequentially. Any fatal error stops the run where it happened: modules
//! already started stay started and the orchestrator reports
//! [`BootstrapState::Failed`]. The caller decides whether to call
//! [`Orchestrator::shutdown`] on that partial state.

use std::fmt;
use std::sync::Arc;

use mb_01_module_ordering::ModuleOrderResolver;
use mb_02_version_ledger::{BootstrapLock, LockBackend, TimeSource, VersionLedgerStore};
use mb_03_installer_engine::{InstallerEngine, ParameterResolver, PhaseModule};
use mb_04_service_federation::{ExposureFederator, Federation, ServiceRegistry};
use shared_types::{BootstrapPhase, ModuleDescriptor, ServiceEntry, SettingsSource};
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::adapters::definition_provider::DefinitionModuleProvider;
use crate::config::BootstrapConfig;
use crate::errors::{BootstrapError, TeardownFailure};
use crate::ports::ModuleProvider;
use crate::state::{BootstrapReport, BootstrapState};

/// Top-level bootstrap driver.
pub struct Orchestrator {
    config: BootstrapConfig,
    /// Descriptors as declared, consumed by `bootstrap`
    declared: Vec<ModuleDescriptor>,
    /// Enabled modules in bootstrap order
    modules: Vec<ModuleDescriptor>,
    /// Registries of started modules; `registries[i]` belongs to `modules[i]`
    registries: Vec<ServiceRegistry>,
    root: ServiceRegistry,
    federation: Federation,
    resolver: ModuleOrderResolver,
    engine: InstallerEngine,
    federator: ExposureFederator,
    provider: Arc<dyn ModuleProvider>,
    lock: Arc<BootstrapLock>,
    state: BootstrapState,
    report: BootstrapReport,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    // =========================================================================
    // BOOTSTRAP
    // =========================================================================

    /// Run the whole bootstrap sequence once.
    ///
    /// The bootstrap lock is fully released before this returns, whether
    /// the run succeeded or not.
    pub fn bootstrap(&mut self) -> Result<&BootstrapReport, BootstrapError> {
        if self.state != BootstrapState::NotStarted {
            return Err(BootstrapError::AlreadyStarted { state: self.state });
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("bootstrap", %run_id);
        let _entered = span.enter();

        self.state = BootstrapState::Bootstrapping;
        self.report = BootstrapReport::begin(run_id);
        info!(modules = self.declared.len(), "[Orchestrator] Bootstrap starting");

        let result = self.run();
        let released = self.lock.release_all();
        self.report.finish();

        match (result, released) {
            (Ok(()), Ok(())) => {
                self.state = BootstrapState::Running;
                info!(
                    modules = self.registries.len(),
                    executed = self.report.executed(),
                    "[Orchestrator] Bootstrap complete"
                );
                Ok(&self.report)
            }
            (Ok(()), Err(e)) => {
                self.state = BootstrapState::Failed;
                error!(error = %e, "[Orchestrator] Failed to release bootstrap lock");
                Err(e.into())
            }
            (Err(e), released) => {
                if let Err(lock_error) = released {
                    warn!(error = %lock_error, "[Orchestrator] Failed to release bootstrap lock after error");
                }
                self.state = BootstrapState::Failed;
                error!(
                    module = e.module().unwrap_or("-"),
                    started = self.registries.len(),
                    error = %e,
                    "[Orchestrator] Bootstrap failed"
                );
                Err(e)
            }
        }
    }

    fn run(&mut self) -> Result<(), BootstrapError> {
        // 1. Order. Nothing has run if this fails.
        let mut declared = std::mem::take(&mut self.declared);
        self.apply_module_overrides(&mut declared);
        self.modules = self.resolver.order(declared)?;
        self.report.order = self.modules.iter().map(|m| m.name().to_string()).collect();
        info!(order = ?self.report.order, "[Orchestrator] Module order resolved");

        // 2. Context-wide setup, before any module exists
        let before_context: Vec<PhaseModule<'_>> = self
            .modules
            .iter()
            .map(|descriptor| PhaseModule {
                descriptor,
                services: &self.root,
            })
            .collect();
        let phase = self
            .engine
            .run_phase(&before_context, BootstrapPhase::BeforeContextBootstrap)?;
        self.report
            .record(BootstrapPhase::BeforeContextBootstrap, phase.outcomes);

        // 3. Modules, one at a time
        for index in 0..self.modules.len() {
            let descriptor = &self.modules[index];
            let name = descriptor.name();
            info!(module = %name, index, role = %descriptor.module_role(), "[Orchestrator] Starting module");

            let outcomes = self.engine.run_module(
                descriptor,
                BootstrapPhase::BeforeModuleBootstrap,
                &self.root,
            )?;
            self.report
                .record(BootstrapPhase::BeforeModuleBootstrap, outcomes);

            self.registries
                .push(ServiceRegistry::new(name, index, self.federation.clone()));
            let registry = &mut self.registries[index];

            self.provider
                .construct(descriptor, registry)
                .map_err(|source| BootstrapError::ModuleConstruction {
                    module: name.to_string(),
                    source,
                })?;

            let outcomes = self.engine.run_module(
                descriptor,
                BootstrapPhase::AfterModuleBootstrap,
                &*registry,
            )?;
            self.report
                .record(BootstrapPhase::AfterModuleBootstrap, outcomes);

            let exposed = self
                .federator
                .expose(registry, descriptor.exposure_rules())?;
            self.report.exposed.push((name.to_string(), exposed));
        }

        // 4. Context-wide finalisation, every module live
        let after_context: Vec<PhaseModule<'_>> = self
            .modules
            .iter()
            .zip(&self.registries)
            .map(|(descriptor, registry)| PhaseModule {
                descriptor,
                services: registry,
            })
            .collect();
        let phase = self
            .engine
            .run_phase(&after_context, BootstrapPhase::AfterContextBootstrap)?;
        self.report
            .record(BootstrapPhase::AfterContextBootstrap, phase.outcomes);

        Ok(())
    }

    fn apply_module_overrides(&self, declared: &mut [ModuleDescriptor]) {
        for (name, &enabled) in &self.config.modules {
            match declared.iter_mut().find(|d| d.name() == name) {
                Some(descriptor) => {
                    if descriptor.is_enabled() != enabled {
                        info!(module = %name, enabled, "[Orchestrator] Module enable flag overridden");
                    }
                    descriptor.set_enabled(enabled);
                }
                None => {
                    warn!(module = %name, "[Orchestrator] Enable override for undeclared module ignored");
                }
            }
        }
    }

    // =========================================================================
    // TEARDOWN
    // =========================================================================

    /// Tear started modules down in reverse bootstrap order.
    ///
    /// Every module is torn down even if an earlier one fails; failures are
    /// collected into [`BootstrapError::Teardown`].
    pub fn shutdown(&mut self) -> Result<(), BootstrapError> {
        if matches!(
            self.state,
            BootstrapState::NotStarted | BootstrapState::ShutDown
        ) {
            self.state = BootstrapState::ShutDown;
            return Ok(());
        }

        info!(modules = self.registries.len(), "[Orchestrator] Shutting down");
        let mut failures = Vec::new();

        while let Some(mut registry) = self.registries.pop() {
            let descriptor = &self.modules[self.registries.len()];
            info!(module = %descriptor.name(), "[Orchestrator] Stopping module");

            if let Err(cause) = self.provider.destroy(descriptor, &registry) {
                warn!(module = %descriptor.name(), error = %cause, "[Orchestrator] Module teardown failed");
                failures.push(TeardownFailure {
                    module: descriptor.name().to_string(),
                    cause,
                });
            }

            let removed = self.federation.remove_module(descriptor.name());
            let cleared = registry.clear().len();
            debug!(module = %descriptor.name(), removed, cleared, "[Orchestrator] Module services released");
        }
        self.root.clear();
        self.state = BootstrapState::ShutDown;

        if failures.is_empty() {
            info!("[Orchestrator] Shutdown complete");
            Ok(())
        } else {
            Err(BootstrapError::Teardown { failures })
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == BootstrapState::Running
    }

    /// Resolved module order. Empty before bootstrap or after an ordering
    /// failure.
    pub fn module_order(&self) -> Vec<&str> {
        self.modules.iter().map(ModuleDescriptor::name).collect()
    }

    /// Modules that were constructed (or began construction), in order.
    pub fn started_modules(&self) -> Vec<&str> {
        self.registries.iter().map(ServiceRegistry::module).collect()
    }

    /// Registry of a started module.
    pub fn registry(&self, module: &str) -> Option<&ServiceRegistry> {
        self.registries.iter().find(|r| r.module() == module)
    }

    /// Root registry: root services plus everything exposed.
    pub fn root(&self) -> &ServiceRegistry {
        &self.root
    }

    pub fn federation(&self) -> &Federation {
        &self.federation
    }

    pub fn report(&self) -> &BootstrapReport {
        &self.report
    }

    pub fn lock(&self) -> &Arc<BootstrapLock> {
        &self.lock
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("state", &self.state)
            .field("declared", &self.declared.len())
            .field("order", &self.module_order())
            .field("started", &self.registries.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Assembles an [`Orchestrator`]. Anything not supplied comes from the
/// configuration.
#[derive(Default)]
pub struct OrchestratorBuilder {
    config: BootstrapConfig,
    ledger: Option<Arc<dyn VersionLedgerStore>>,
    lock_backend: Option<Arc<dyn LockBackend>>,
    settings: Option<Arc<dyn SettingsSource>>,
    provider: Option<Arc<dyn ModuleProvider>>,
    time: Option<Arc<dyn TimeSource>>,
    parameters: Option<Arc<dyn ParameterResolver>>,
    root_services: Vec<ServiceEntry>,
    modules: Vec<ModuleDescriptor>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(mut self, config: BootstrapConfig) -> Self {
        self.config = config;
        self
    }

    /// Shared version ledger (overrides `config.ledger`).
    #[must_use]
    pub fn ledger(mut self, ledger: Arc<dyn VersionLedgerStore>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Shared lock backend (overrides `config.lock`).
    #[must_use]
    pub fn lock_backend(mut self, backend: Arc<dyn LockBackend>) -> Self {
        self.lock_backend = Some(backend);
        self
    }

    /// Context-wide installer settings (overrides `config.installers`).
    #[must_use]
    pub fn settings(mut self, settings: Arc<dyn SettingsSource>) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Module construction provider. Defaults to [`DefinitionModuleProvider`].
    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn ModuleProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn time_source(mut self, time: Arc<dyn TimeSource>) -> Self {
        self.time = Some(time);
        self
    }

    #[must_use]
    pub fn parameter_resolver(mut self, parameters: Arc<dyn ParameterResolver>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// A service owned by the root, visible to early-phase installers.
    #[must_use]
    pub fn root_service(mut self, entry: ServiceEntry) -> Self {
        self.root_services.push(entry);
        self
    }

    #[must_use]
    pub fn module(mut self, descriptor: ModuleDescriptor) -> Self {
        self.modules.push(descriptor);
        self
    }

    #[must_use]
    pub fn modules(mut self, descriptors: impl IntoIterator<Item = ModuleDescriptor>) -> Self {
        self.modules.extend(descriptors);
        self
    }

    pub fn build(self) -> Result<Orchestrator, BootstrapError> {
        self.config.validate()?;

        let ledger = self.ledger.unwrap_or_else(|| self.config.ledger_store());
        let backend = self
            .lock_backend
            .unwrap_or_else(|| self.config.lock_backend());
        let lock = Arc::new(BootstrapLock::new(backend));
        let settings = self
            .settings
            .unwrap_or_else(|| Arc::new(self.config.installers.clone()));

        let mut engine = InstallerEngine::new(ledger, Arc::clone(&lock), settings);
        if let Some(time) = self.time {
            engine = engine.with_time_source(time);
        }
        if let Some(parameters) = self.parameters {
            engine = engine.with_parameter_resolver(parameters);
        }

        let federation = Federation::new();
        let mut root = ServiceRegistry::root(federation.clone());
        for entry in self.root_services {
            root.register(entry)?;
        }

        Ok(Orchestrator {
            config: self.config,
            declared: self.modules,
            modules: Vec::new(),
            registries: Vec::new(),
            root,
            federation,
            resolver: ModuleOrderResolver::new(),
            engine,
            federator: ExposureFederator::new(),
            provider: self
                .provider
                .unwrap_or_else(|| Arc::new(DefinitionModuleProvider::new())),
            lock,
            state: BootstrapState::NotStarted,
            report: BootstrapReport::default(),
        })
    }
}
