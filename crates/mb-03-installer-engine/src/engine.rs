//! # Installer Engine
//!
//! Runs the installers of ordered modules for one bootstrap phase and
//! records what ran in the version ledger.

use std::sync::Arc;

use mb_02_version_ledger::{
    BootstrapLock, LedgerEntry, LedgerError, LockError, SystemTimeSource, TimeSource,
    VersionLedgerStore,
};
use shared_types::{
    ActionContext, BootstrapPhase, InstallerAction, InstallerDescriptor, InstallerOutcome,
    InstallerStatus, InstallerStep, ModuleDescriptor, ResolvedParameters, RunCondition,
    ServiceLookup, SettingsSource, SkipReason,
};
use tracing::{debug, error, info};

use crate::adapters::parameters::NameParameterResolver;
use crate::domain::actions::resolve_action;
use crate::domain::errors::{InstallerError, InstallerExecutionError};
use crate::domain::report::PhaseReport;
use crate::ports::outbound::ParameterResolver;

/// A module paired with the services its installers resolve parameters from.
#[derive(Clone, Copy)]
pub struct PhaseModule<'a> {
    pub descriptor: &'a ModuleDescriptor,
    pub services: &'a dyn ServiceLookup,
}

/// Decides and executes installers.
pub struct InstallerEngine {
    ledger: Arc<dyn VersionLedgerStore>,
    lock: Arc<BootstrapLock>,
    settings: Arc<dyn SettingsSource>,
    time: Arc<dyn TimeSource>,
    parameters: Arc<dyn ParameterResolver>,
}

impl InstallerEngine {
    /// Engine with the system clock and by-name parameter resolution.
    pub fn new(
        ledger: Arc<dyn VersionLedgerStore>,
        lock: Arc<BootstrapLock>,
        settings: Arc<dyn SettingsSource>,
    ) -> Self {
        Self {
            ledger,
            lock,
            settings,
            time: Arc::new(SystemTimeSource),
            parameters: Arc::new(NameParameterResolver),
        }
    }

    #[must_use]
    pub fn with_time_source(mut self, time: Arc<dyn TimeSource>) -> Self {
        self.time = time;
        self
    }

    #[must_use]
    pub fn with_parameter_resolver(mut self, parameters: Arc<dyn ParameterResolver>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn lock(&self) -> &Arc<BootstrapLock> {
        &self.lock
    }

    // =========================================================================
    // PHASE EXECUTION
    // =========================================================================

    /// Run `phase` installers of every module, in module order.
    ///
    /// Stops at the first error; modules already processed are not rolled
    /// back.
    pub fn run_phase(
        &self,
        modules: &[PhaseModule<'_>],
        phase: BootstrapPhase,
    ) -> Result<PhaseReport, InstallerError> {
        let mut report = PhaseReport::new(phase);
        for module in modules {
            report.extend(self.run_module(module.descriptor, phase, module.services)?);
        }
        Ok(report)
    }

    /// Run `phase` installers of one module.
    ///
    /// Installers run by ascending priority; equal priorities keep
    /// declaration order.
    pub fn run_module(
        &self,
        module: &ModuleDescriptor,
        phase: BootstrapPhase,
        services: &dyn ServiceLookup,
    ) -> Result<Vec<InstallerOutcome>, InstallerError> {
        let mut installers: Vec<&InstallerDescriptor> = module
            .installers()
            .iter()
            .filter(|i| i.bootstrap_phase() == phase)
            .collect();
        installers.sort_by_key(|i| i.priority());

        let mut outcomes = Vec::with_capacity(installers.len());
        for installer in installers {
            let status = self
                .run_installer(module, installer, phase, services)
                .inspect_err(|e| {
                    error!(
                        module = %module.name(),
                        installer = %installer.id(),
                        phase = %phase,
                        error = %e,
                        "[Installer] Installer failed"
                    );
                })?;

            outcomes.push(InstallerOutcome {
                module: module.name().to_string(),
                installer_id: installer.id().to_string(),
                phase,
                status,
            });
        }
        Ok(outcomes)
    }

    /// Action for `installer` after settings and the installer's own hook.
    pub fn effective_action(
        &self,
        module: &ModuleDescriptor,
        installer: &InstallerDescriptor,
        phase: BootstrapPhase,
    ) -> InstallerAction {
        let action = resolve_action(self.settings.as_ref(), module.module_settings(), installer);

        match (action, installer.resolver()) {
            (InstallerAction::Execute, Some(hook)) => hook(&ActionContext {
                module: module.name(),
                installer_id: installer.id(),
                phase,
                resolved: action,
            }),
            _ => action,
        }
    }

    // =========================================================================
    // SINGLE INSTALLER
    // =========================================================================

    fn run_installer(
        &self,
        module: &ModuleDescriptor,
        installer: &InstallerDescriptor,
        phase: BootstrapPhase,
        services: &dyn ServiceLookup,
    ) -> Result<InstallerStatus, InstallerError> {
        let action = self.effective_action(module, installer, phase);

        match action {
            InstallerAction::Disabled => {
                debug!(module = %module.name(), installer = %installer.id(), "[Installer] Disabled");
                Ok(InstallerStatus::Disabled)
            }
            InstallerAction::Skip => {
                debug!(module = %module.name(), installer = %installer.id(), "[Installer] Skipped by settings");
                Ok(InstallerStatus::Skipped(SkipReason::Action))
            }
            InstallerAction::Register => {
                self.record(module, installer)?;
                info!(
                    module = %module.name(),
                    installer = %installer.id(),
                    version = installer.installer_version(),
                    "[Installer] Registered without running"
                );
                Ok(InstallerStatus::Registered)
            }
            InstallerAction::Force => self.execute_and_record(module, installer, services),
            InstallerAction::Execute => match installer.condition() {
                RunCondition::AlwaysRun => self.execute_and_record(module, installer, services),
                RunCondition::VersionDifferent => self.run_if_newer(module, installer, services),
            },
        }
    }

    fn execute_and_record(
        &self,
        module: &ModuleDescriptor,
        installer: &InstallerDescriptor,
        services: &dyn ServiceLookup,
    ) -> Result<InstallerStatus, InstallerError> {
        self.execute(module, installer, services)?;
        self.record(module, installer)?;
        info!(
            module = %module.name(),
            installer = %installer.id(),
            version = installer.installer_version(),
            "[Installer] Executed"
        );
        Ok(InstallerStatus::Executed)
    }

    /// Version-gated execution.
    ///
    /// An unlocked read skips installers that are already current. Otherwise
    /// the version is read again under the lock, which then spans work and
    /// write and is released before returning on every path.
    fn run_if_newer(
        &self,
        module: &ModuleDescriptor,
        installer: &InstallerDescriptor,
        services: &dyn ServiceLookup,
    ) -> Result<InstallerStatus, InstallerError> {
        if let Some(installed) = self.installed_at_least(module, installer)? {
            return Ok(up_to_date(module, installer, installed));
        }

        let guard = self
            .lock
            .acquire()
            .map_err(|e| lock_error(module, installer, e))?;

        if let Some(installed) = self.installed_at_least(module, installer)? {
            guard
                .release()
                .map_err(|e| lock_error(module, installer, e))?;
            return Ok(up_to_date(module, installer, installed));
        }

        let status = self.execute_and_record(module, installer, services)?;
        guard
            .release()
            .map_err(|e| lock_error(module, installer, e))?;
        Ok(status)
    }

    /// Ledger version when it already covers the declared one.
    fn installed_at_least(
        &self,
        module: &ModuleDescriptor,
        installer: &InstallerDescriptor,
    ) -> Result<Option<u32>, InstallerError> {
        let installed = self
            .ledger
            .read_version(module.name(), installer.id())
            .map_err(|e| ledger_error(module, installer, e))?;
        Ok(installed.filter(|&v| installer.installer_version() <= v))
    }

    fn execute(
        &self,
        module: &ModuleDescriptor,
        installer: &InstallerDescriptor,
        services: &dyn ServiceLookup,
    ) -> Result<(), InstallerError> {
        let mut steps: Vec<&InstallerStep> = installer.steps().iter().collect();
        steps.sort_by_key(|s| s.priority());

        for step in steps {
            let fail = |cause: anyhow::Error| {
                InstallerError::from(Box::new(InstallerExecutionError {
                    module: module.name().to_string(),
                    installer_id: installer.id().to_string(),
                    step: step.name().to_string(),
                    cause,
                }))
            };

            let params = self.resolve_parameters(step, services).map_err(fail)?;
            step.run(&params).map_err(fail)?;
        }
        Ok(())
    }

    fn resolve_parameters(
        &self,
        step: &InstallerStep,
        services: &dyn ServiceLookup,
    ) -> anyhow::Result<ResolvedParameters> {
        let mut params = ResolvedParameters::new();
        for spec in step.parameters() {
            let value = self.parameters.resolve(spec, services);
            if value.is_none() && spec.required {
                anyhow::bail!("required parameter '{}' is unavailable", spec.name);
            }
            params.push(spec.name.clone(), value);
        }
        Ok(params)
    }

    /// Upsert the ledger entry under the bootstrap lock.
    fn record(
        &self,
        module: &ModuleDescriptor,
        installer: &InstallerDescriptor,
    ) -> Result<(), InstallerError> {
        let guard = self
            .lock
            .acquire()
            .map_err(|e| lock_error(module, installer, e))?;

        self.ledger
            .upsert(LedgerEntry::new(
                module.name(),
                installer.id(),
                installer.installer_version(),
                installer.describe(),
                self.time.now(),
            ))
            .map_err(|e| ledger_error(module, installer, e))?;

        guard
            .release()
            .map_err(|e| lock_error(module, installer, e))
    }
}

fn up_to_date(module: &ModuleDescriptor, installer: &InstallerDescriptor, installed: u32) -> InstallerStatus {
    debug!(
        module = %module.name(),
        installer = %installer.id(),
        installed,
        declared = installer.installer_version(),
        "[Installer] Up to date"
    );
    InstallerStatus::Skipped(SkipReason::UpToDate { installed })
}

fn lock_error(module: &ModuleDescriptor, installer: &InstallerDescriptor, source: LockError) -> InstallerError {
    InstallerError::Lock {
        module: module.name().to_string(),
        installer_id: installer.id().to_string(),
        source,
    }
}

fn ledger_error(
    module: &ModuleDescriptor,
    installer: &InstallerDescriptor,
    source: LedgerError,
) -> InstallerError {
    InstallerError::Ledger {
        module: module.name().to_string(),
        installer_id: installer.id().to_string(),
        source,
    }
}
