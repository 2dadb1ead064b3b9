//! # File Ledger
//!
//! All entries live in one bincode-encoded file. Every write rewrites the
//! file atomically via temp file + rename, and every read decodes the file
//! again, so instances in other processes observe each other's commits.
//! Cross-process writers must hold the bootstrap lock.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::domain::entities::LedgerEntry;
use crate::domain::errors::LedgerError;
use crate::ports::outbound::VersionLedgerStore;

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// File-backed ledger.
#[derive(Debug)]
pub struct FileVersionLedger {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_guard: Mutex<()>,
}

impl FileVersionLedger {
    /// Open (or lazily create) the ledger file at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), exists = path.exists(), "[Ledger] Opening file ledger");
        Self {
            path,
            write_guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(LedgerError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        bincode::deserialize(&bytes).map_err(|e| LedgerError::Corrupted {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn save(&self, entries: &[LedgerEntry]) -> Result<(), LedgerError> {
        use std::io::Write;

        let io_err = |source| LedgerError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let bytes = bincode::serialize(entries).map_err(|e| LedgerError::Encoding(e.to_string()))?;

        // Temp names are unique per process and per write
        let temp_path = self.path.with_extension(format!(
            "tmp.{}.{}",
            std::process::id(),
            TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        let written = std::fs::File::create(&temp_path).and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()?;
            std::fs::rename(&temp_path, &self.path)
        });

        if let Err(source) = written {
            if let Err(e) = std::fs::remove_file(&temp_path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %temp_path.display(), error = %e, "[Ledger] Failed to remove temp file");
                }
            }
            return Err(io_err(source));
        }
        Ok(())
    }
}

impl VersionLedgerStore for FileVersionLedger {
    fn read_version(&self, module: &str, installer_id: &str) -> Result<Option<u32>, LedgerError> {
        Ok(self
            .load()?
            .into_iter()
            .find(|e| e.matches(module, installer_id))
            .map(|e| e.version))
    }

    fn upsert(&self, entry: LedgerEntry) -> Result<(), LedgerError> {
        let _guard = self.write_guard.lock();

        let mut entries = self.load()?;
        match entries
            .iter_mut()
            .find(|e| e.matches(&entry.module, &entry.installer_id))
        {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        entries.sort_by(|a, b| {
            (a.module.as_str(), a.installer_id.as_str())
                .cmp(&(b.module.as_str(), b.installer_id.as_str()))
        });

        self.save(&entries)
    }

    fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.load()
    }
}
