//! # Installer Settings
//!
//! Key → action tables consulted when resolving an installer's action.
//! Keys are installer ids or group names; the table's default applies when
//! neither is present.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ParseValueError;
use crate::installer::InstallerAction;

/// A source of installer action overrides.
///
/// Implemented by [`SettingsTable`]; hosts may plug in their own (e.g. backed
/// by a configuration service).
pub trait SettingsSource: Send + Sync + fmt::Debug {
    /// Action configured for an installer id or group name.
    fn action_for(&self, key: &str) -> Option<InstallerAction>;

    /// Fallback when no key matches.
    fn default_action(&self) -> Option<InstallerAction>;
}

/// In-memory settings table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsTable {
    pub default_action: Option<InstallerAction>,
    pub actions: BTreeMap<String, InstallerAction>,
}

impl SettingsTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_default(mut self, action: InstallerAction) -> Self {
        self.default_action = Some(action);
        self
    }

    #[must_use]
    pub fn set(mut self, key: impl Into<String>, action: InstallerAction) -> Self {
        self.actions.insert(key.into(), action);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, action: InstallerAction) {
        self.actions.insert(key.into(), action);
    }

    pub fn is_empty(&self) -> bool {
        self.default_action.is_none() && self.actions.is_empty()
    }

    /// Load from environment variables:
    ///
    /// - `{prefix}_DEFAULT_ACTION`: e.g. `EXECUTE`
    /// - `{prefix}_ACTIONS`: comma-separated `key=ACTION` pairs
    pub fn from_env(prefix: &str) -> Result<Self, ParseValueError> {
        let mut table = Self::default();

        if let Ok(val) = std::env::var(format!("{prefix}_DEFAULT_ACTION")) {
            if !val.trim().is_empty() {
                table.default_action = Some(val.parse()?);
            }
        }

        if let Ok(val) = std::env::var(format!("{prefix}_ACTIONS")) {
            table.actions.extend(parse_action_list(&val)?);
        }

        Ok(table)
    }
}

impl SettingsSource for SettingsTable {
    fn action_for(&self, key: &str) -> Option<InstallerAction> {
        self.actions.get(key).copied()
    }

    fn default_action(&self) -> Option<InstallerAction> {
        self.default_action
    }
}

/// Parse `key=ACTION,key=ACTION`. Empty items are ignored.
pub fn parse_action_list(input: &str) -> Result<Vec<(String, InstallerAction)>, ParseValueError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| -> Result<(String, InstallerAction), ParseValueError> {
            let (key, action) = item.split_once('=').ok_or_else(|| ParseValueError {
                kind: "installer setting",
                value: item.to_string(),
            })?;
            Ok((key.trim().to_string(), action.parse()?))
        })
        .collect()
}
