//! Ledger entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One installed installer version, keyed by `(module, installer_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub module: String,
    pub installer_id: String,
    pub version: u32,
    pub description: String,
    pub installed_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(
        module: impl Into<String>,
        installer_id: impl Into<String>,
        version: u32,
        description: impl Into<String>,
        installed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            module: module.into(),
            installer_id: installer_id.into(),
            version,
            description: description.into(),
            installed_at,
        }
    }

    pub fn key(&self) -> (String, String) {
        (self.module.clone(), self.installer_id.clone())
    }

    pub fn matches(&self, module: &str, installer_id: &str) -> bool {
        self.module == module && self.installer_id == installer_id
    }
}
