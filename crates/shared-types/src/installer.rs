//! # Installer Descriptors
//!
//! Versioned, idempotent setup steps scoped to one module and one
//! bootstrap phase.
//!
//! ## Lifecycle per bootstrap run
//!
//! ```text
//! Pending ──► Disabled | Skipped | Registered | Executed | Failed
//! ```
//!
//! All outcomes are terminal for the run. `Failed` is not a status value:
//! it is the `Err` branch of the engine's result.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::ParseValueError;
use crate::service::ServiceHandle;

// =============================================================================
// PHASES, CONDITIONS, ACTIONS
// =============================================================================

/// Checkpoints at which installers run, in bootstrap order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BootstrapPhase {
    /// Before any module is constructed.
    BeforeContextBootstrap,
    /// Before the owning module is constructed.
    BeforeModuleBootstrap,
    /// After the owning module is constructed, before exposure.
    AfterModuleBootstrap,
    /// After every module has bootstrapped.
    AfterContextBootstrap,
}

impl BootstrapPhase {
    /// All phases in execution order.
    pub const ALL: [BootstrapPhase; 4] = [
        Self::BeforeContextBootstrap,
        Self::BeforeModuleBootstrap,
        Self::AfterModuleBootstrap,
        Self::AfterContextBootstrap,
    ];
}

impl fmt::Display for BootstrapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BeforeContextBootstrap => "BeforeContextBootstrap",
            Self::BeforeModuleBootstrap => "BeforeModuleBootstrap",
            Self::AfterModuleBootstrap => "AfterModuleBootstrap",
            Self::AfterContextBootstrap => "AfterContextBootstrap",
        };
        f.write_str(name)
    }
}

/// When an `Execute` action actually performs work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunCondition {
    /// Every bootstrap.
    AlwaysRun,
    /// Only if the declared version is higher than the ledger's.
    #[default]
    VersionDifferent,
}

/// Effective decision for an installer, resolved from settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstallerAction {
    /// Run according to the run condition.
    Execute,
    /// Run regardless of the ledger.
    Force,
    /// Record the version without running.
    Register,
    /// Do nothing this run.
    Skip,
    /// Installer is switched off.
    Disabled,
}

impl InstallerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Execute => "EXECUTE",
            Self::Force => "FORCE",
            Self::Register => "REGISTER",
            Self::Skip => "SKIP",
            Self::Disabled => "DISABLED",
        }
    }
}

impl fmt::Display for InstallerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstallerAction {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EXECUTE" => Ok(Self::Execute),
            "FORCE" => Ok(Self::Force),
            "REGISTER" => Ok(Self::Register),
            "SKIP" => Ok(Self::Skip),
            "DISABLED" => Ok(Self::Disabled),
            _ => Err(ParseValueError {
                kind: "installer action",
                value: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// WORK STEPS
// =============================================================================

/// A declared parameter of an installer step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Service name to resolve.
    pub name: String,
    /// Missing required parameters fail the installer.
    pub required: bool,
}

impl ParameterSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }
}

/// Parameter values handed to a step, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedParameters {
    values: Vec<(String, Option<ServiceHandle>)>,
}

impl ResolvedParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: Option<ServiceHandle>) {
        self.values.push((name.into(), value));
    }

    /// Resolved handle, or `None` if absent or undeclared.
    pub fn get(&self, name: &str) -> Option<&ServiceHandle> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_ref())
    }

    /// Typed access to an optional parameter.
    pub fn get_as<T: std::any::Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.get(name).and_then(ServiceHandle::downcast::<T>)
    }

    /// Typed access to a parameter the step cannot do without.
    pub fn require<T: std::any::Any + Send + Sync>(&self, name: &str) -> anyhow::Result<Arc<T>> {
        self.get_as::<T>(name).ok_or_else(|| {
            anyhow::anyhow!(
                "parameter '{name}' is not available as {}",
                std::any::type_name::<T>()
            )
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The body of an installer step.
pub type InstallerWork = Arc<dyn Fn(&ResolvedParameters) -> anyhow::Result<()> + Send + Sync>;

/// One unit of installer work. Steps run in ascending `order`.
#[derive(Clone)]
pub struct InstallerStep {
    name: String,
    order: i32,
    parameters: Vec<ParameterSpec>,
    work: InstallerWork,
}

impl InstallerStep {
    pub fn new<F>(name: impl Into<String>, work: F) -> Self
    where
        F: Fn(&ResolvedParameters) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            order: 0,
            parameters: Vec::new(),
            work: Arc::new(work),
        }
    }

    #[must_use]
    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.order
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn run(&self, params: &ResolvedParameters) -> anyhow::Result<()> {
        (self.work)(params)
    }
}

impl fmt::Debug for InstallerStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallerStep")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// DYNAMIC ACTION HOOK
// =============================================================================

/// What an installer's action hook gets to see.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub module: &'a str,
    pub installer_id: &'a str,
    pub phase: BootstrapPhase,
    /// The statically resolved action (always `Execute` when the hook runs).
    pub resolved: InstallerAction,
}

/// Optional capability letting an installer override `Execute` at runtime.
pub type ActionResolver = Arc<dyn Fn(&ActionContext<'_>) -> InstallerAction + Send + Sync>;

// =============================================================================
// DESCRIPTOR
// =============================================================================

/// Priority given to installers that declare none.
pub const DEFAULT_INSTALLER_ORDER: i32 = i32::MAX;

/// Static metadata of one installer.
#[derive(Clone)]
pub struct InstallerDescriptor {
    id: String,
    version: u32,
    phase: BootstrapPhase,
    run_condition: RunCondition,
    group: Option<String>,
    description: String,
    order: Option<i32>,
    steps: Vec<InstallerStep>,
    action_resolver: Option<ActionResolver>,
}

impl InstallerDescriptor {
    /// New installer with version 1, `AfterModuleBootstrap`, `VersionDifferent`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: 1,
            phase: BootstrapPhase::AfterModuleBootstrap,
            run_condition: RunCondition::default(),
            group: None,
            description: String::new(),
            order: None,
            steps: Vec::new(),
            action_resolver: None,
        }
    }

    /// Installer identified by the fully-qualified name of `T`.
    pub fn of<T: ?Sized>() -> Self {
        Self::new(std::any::type_name::<T>())
    }

    #[must_use]
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn phase(mut self, phase: BootstrapPhase) -> Self {
        self.phase = phase;
        self
    }

    #[must_use]
    pub fn run_condition(mut self, condition: RunCondition) -> Self {
        self.run_condition = condition;
        self
    }

    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Explicit priority among the module's installers of one phase.
    #[must_use]
    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    #[must_use]
    pub fn step(mut self, step: InstallerStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Shorthand for a single parameterless step named `run`.
    #[must_use]
    pub fn work<F>(self, work: F) -> Self
    where
        F: Fn(&ResolvedParameters) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.step(InstallerStep::new("run", work))
    }

    #[must_use]
    pub fn action_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&ActionContext<'_>) -> InstallerAction + Send + Sync + 'static,
    {
        self.action_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn installer_version(&self) -> u32 {
        self.version
    }

    pub fn bootstrap_phase(&self) -> BootstrapPhase {
        self.phase
    }

    pub fn condition(&self) -> RunCondition {
        self.run_condition
    }

    pub fn group_name(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn describe(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> i32 {
        self.order.unwrap_or(DEFAULT_INSTALLER_ORDER)
    }

    pub fn steps(&self) -> &[InstallerStep] {
        &self.steps
    }

    pub fn resolver(&self) -> Option<&ActionResolver> {
        self.action_resolver.as_ref()
    }
}

impl fmt::Debug for InstallerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallerDescriptor")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("phase", &self.phase)
            .field("run_condition", &self.run_condition)
            .field("group", &self.group)
            .field("order", &self.order)
            .field("steps", &self.steps)
            .field("action_resolver", &self.action_resolver.is_some())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Why an installer did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Settings or the action hook said SKIP.
    Action,
    /// Ledger already holds this version or a newer one.
    UpToDate { installed: u32 },
}

/// Terminal state of an installer for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallerStatus {
    Disabled,
    Skipped(SkipReason),
    Registered,
    Executed,
}

/// Per-installer record kept in phase reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerOutcome {
    pub module: String,
    pub installer_id: String,
    pub phase: BootstrapPhase,
    pub status: InstallerStatus,
}
