//! # Bootstrap Configuration
//!
//! All runtime knobs in one serde-friendly structure. Every section has
//! defaults, so an empty JSON object or an empty environment is valid.
//!
//! ## Environment Variables
//!
//! - `MB_LEDGER_PATH`: file-backed version ledger at this path (default: in-memory)
//! - `MB_LOCK_DIR`: file lock in this directory (default: process-local lock)
//! - `MB_LOCK_TIMEOUT_SECS`: lock acquisition timeout (default: 30)
//! - `MB_INSTALLER_DEFAULT_ACTION`: context-wide default installer action
//! - `MB_INSTALLER_ACTIONS`: `key=ACTION,...` overrides by installer id or group
//! - `MB_MODULES`: `name=true|false,...` module enable overrides
//! - `MB_LOG_LEVEL`: log filter when `RUST_LOG` is unset (default: info)
//! - `MB_JSON_LOGS`: JSON formatted logs (default: false)

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mb_02_version_ledger::{
    FileLock, FileVersionLedger, InMemoryVersionLedger, LockBackend, ProcessLock,
    VersionLedgerStore, BOOTSTRAP_LOCK_NAME,
};
use serde::{Deserialize, Serialize};
use shared_types::{ParseValueError, SettingsTable};
use thiserror::Error;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub ledger: LedgerConfig,
    pub lock: LockConfig,
    /// Context-wide installer settings.
    pub installers: SettingsTable,
    /// Module enable overrides, by module name.
    pub modules: BTreeMap<String, bool>,
    pub logging: LoggingConfig,
}

/// Version ledger storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// File-backed ledger when set, in-memory otherwise.
    pub path: Option<PathBuf>,
}

/// Bootstrap lock backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Directory holding `bootstrap.lock`. Process-local lock when unset.
    pub dir: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            dir: None,
            timeout_secs: 30,
        }
    }
}

/// Log output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },

    #[error(transparent)]
    Settings(#[from] ParseValueError),

    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Lock timeout must be greater than zero")]
    ZeroLockTimeout,

    #[error("Ledger path must not be empty")]
    EmptyLedgerPath,
}

impl BootstrapConfig {
    /// Parse from a JSON document. Missing sections take their defaults.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `MB_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("MB_LEDGER_PATH") {
            config.ledger.path = Some(PathBuf::from(path));
        }
        if let Ok(dir) = std::env::var("MB_LOCK_DIR") {
            config.lock.dir = Some(PathBuf::from(dir));
        }
        if let Ok(val) = std::env::var("MB_LOCK_TIMEOUT_SECS") {
            config.lock.timeout_secs =
                val.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        var: "MB_LOCK_TIMEOUT_SECS",
                        value: val.clone(),
                    })?;
        }

        config.installers = SettingsTable::from_env("MB_INSTALLER")?;

        if let Ok(val) = std::env::var("MB_MODULES") {
            config.modules = parse_module_flags(&val)?;
        }

        if let Ok(level) = std::env::var("MB_LOG_LEVEL") {
            config.logging.level = level;
        }
        config.logging.json = std::env::var("MB_JSON_LOGS")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        config.validate()?;
        Ok(config)
    }

    /// Reject values no backend can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock.timeout_secs == 0 {
            return Err(ConfigError::ZeroLockTimeout);
        }
        if self
            .ledger
            .path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(ConfigError::EmptyLedgerPath);
        }
        Ok(())
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock.timeout_secs)
    }

    /// Ledger selected by this configuration.
    pub fn ledger_store(&self) -> Arc<dyn VersionLedgerStore> {
        match &self.ledger.path {
            Some(path) => Arc::new(FileVersionLedger::new(path)),
            None => Arc::new(InMemoryVersionLedger::new()),
        }
    }

    /// Lock backend selected by this configuration.
    pub fn lock_backend(&self) -> Arc<dyn LockBackend> {
        match &self.lock.dir {
            Some(dir) => Arc::new(FileLock::with_timeout(dir, self.lock_timeout())),
            None => Arc::new(ProcessLock::with_timeout(
                BOOTSTRAP_LOCK_NAME,
                self.lock_timeout(),
            )),
        }
    }
}

fn parse_module_flags(input: &str) -> Result<BTreeMap<String, bool>, ConfigError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| -> Result<(String, bool), ConfigError> {
            let invalid = || ConfigError::InvalidValue {
                var: "MB_MODULES",
                value: item.to_string(),
            };
            let (name, flag) = item.split_once('=').ok_or_else(invalid)?;
            let enabled = match flag.trim().to_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(invalid()),
            };
            Ok((name.trim().to_string(), enabled))
        })
        .collect()
}
