//! # File Lock Backend
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on
//! Windows). The OS drops the lock when the holding process dies, so a
//! crashed bootstrap never leaves a stale lock behind. The lock file itself
//! is never deleted: unlinking it while another process waits on the old
//! inode would let two holders in at once.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{DEFAULT_LOCK_TIMEOUT, INITIAL_RETRY_DELAY, MAX_RETRY_DELAY};
use crate::domain::errors::LockError;
use crate::ports::outbound::LockBackend;

/// Cross-process lock backend.
#[derive(Debug)]
pub struct FileLock {
    name: String,
    path: PathBuf,
    timeout: Duration,
    /// Open handle while held
    file: Mutex<Option<File>>,
}

impl FileLock {
    /// Lock file name inside the lock directory
    pub const LOCK_FILE: &'static str = "bootstrap.lock";

    pub fn new(dir: &Path) -> Self {
        Self::with_timeout(dir, DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_timeout(dir: &Path, timeout: Duration) -> Self {
        Self {
            name: "bootstrap".to_string(),
            path: dir.join(Self::LOCK_FILE),
            timeout,
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> LockError {
        LockError::Io {
            name: self.name.clone(),
            source,
        }
    }

    fn open(&self) -> Result<File, LockError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))
    }

    /// Read PID from the lock file (for error messages)
    fn read_holder_pid(&self) -> Option<u32> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl LockBackend for FileLock {
    fn lock(&self) -> Result<(), LockError> {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut retry_delay = INITIAL_RETRY_DELAY;

        loop {
            let file = self.open()?;

            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => {
                    let mut locked = file;
                    locked.set_len(0).map_err(|e| self.io_error(e))?;
                    writeln!(locked, "{}", std::process::id()).map_err(|e| self.io_error(e))?;
                    locked.sync_all().map_err(|e| self.io_error(e))?;

                    debug!(path = %self.path.display(), "[Lock] Acquired file lock");
                    *self.file.lock() = Some(locked);
                    return Ok(());
                }
                Err(_) => {
                    drop(file);

                    if Instant::now() >= deadline {
                        return Err(LockError::Timeout {
                            name: self.name.clone(),
                            waited: started.elapsed(),
                            holder: self.read_holder_pid(),
                        });
                    }

                    // Retry with exponential backoff (capped at 500ms)
                    std::thread::sleep(retry_delay);
                    retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
                }
            }
        }
    }

    fn unlock(&self) -> Result<(), LockError> {
        let Some(file) = self.file.lock().take() else {
            return Err(LockError::NotHeld {
                name: self.name.clone(),
            });
        };
        FileExt::unlock(&file).map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), "[Lock] Released file lock");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.get_mut().take() {
            if let Err(e) = FileExt::unlock(&file) {
                warn!(path = %self.path.display(), error = %e, "[Lock] Failed to release file lock on drop");
            }
        }
    }
}
