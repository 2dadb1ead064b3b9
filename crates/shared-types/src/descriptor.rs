//! # Module Descriptors
//!
//! Static metadata per module, built once before ordering and not mutated
//! during a bootstrap run.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::ParseValueError;
use crate::exposure::ExposureRules;
use crate::installer::InstallerDescriptor;
use crate::service::ServiceDefinition;
use crate::settings::SettingsSource;

/// Placement bias applied after the dependency-respecting sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModuleRole {
    #[default]
    Application,
    /// Pulled forward to right after its last dependency.
    Infrastructure,
    /// No bias; relies on the dependency graph only.
    Postprocessor,
}

impl fmt::Display for ModuleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Application => "APPLICATION",
            Self::Infrastructure => "INFRASTRUCTURE",
            Self::Postprocessor => "POSTPROCESSOR",
        };
        f.write_str(name)
    }
}

impl FromStr for ModuleRole {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "APPLICATION" => Ok(Self::Application),
            "INFRASTRUCTURE" => Ok(Self::Infrastructure),
            "POSTPROCESSOR" => Ok(Self::Postprocessor),
            _ => Err(ParseValueError {
                kind: "module role",
                value: s.to_string(),
            }),
        }
    }
}

/// Everything the orchestrator needs to know about one module.
#[derive(Clone)]
pub struct ModuleDescriptor {
    name: String,
    role: ModuleRole,
    required: Vec<String>,
    optional: Vec<String>,
    enabled: bool,
    installers: Vec<InstallerDescriptor>,
    services: Vec<ServiceDefinition>,
    exposure: ExposureRules,
    settings: Option<Arc<dyn SettingsSource>>,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: ModuleRole::Application,
            required: Vec::new(),
            optional: Vec::new(),
            enabled: true,
            installers: Vec::new(),
            services: Vec::new(),
            exposure: ExposureRules::default(),
            settings: None,
        }
    }

    #[must_use]
    pub fn role(mut self, role: ModuleRole) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn requires(mut self, module: impl Into<String>) -> Self {
        push_unique(&mut self.required, module.into());
        self
    }

    #[must_use]
    pub fn optionally_requires(mut self, module: impl Into<String>) -> Self {
        push_unique(&mut self.optional, module.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn disabled(self) -> Self {
        self.enabled(false)
    }

    #[must_use]
    pub fn add_installer(mut self, installer: InstallerDescriptor) -> Self {
        self.installers.push(installer);
        self
    }

    #[must_use]
    pub fn add_service(mut self, service: ServiceDefinition) -> Self {
        self.services.push(service);
        self
    }

    #[must_use]
    pub fn expose(mut self, rules: ExposureRules) -> Self {
        self.exposure = rules;
        self
    }

    /// Module-level installer settings.
    #[must_use]
    pub fn settings(mut self, settings: Arc<dyn SettingsSource>) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Override the enabled flag after construction (configuration layer).
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module_role(&self) -> ModuleRole {
        self.role
    }

    pub fn required_dependencies(&self) -> &[String] {
        &self.required
    }

    pub fn optional_dependencies(&self) -> &[String] {
        &self.optional
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn installers(&self) -> &[InstallerDescriptor] {
        &self.installers
    }

    pub fn services(&self) -> &[ServiceDefinition] {
        &self.services
    }

    pub fn exposure_rules(&self) -> &ExposureRules {
        &self.exposure
    }

    pub fn module_settings(&self) -> Option<&dyn SettingsSource> {
        self.settings.as_deref()
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("enabled", &self.enabled)
            .field("installers", &self.installers.len())
            .field("services", &self.services.len())
            .field("exposure", &self.exposure)
            .field("settings", &self.settings)
            .finish()
    }
}
