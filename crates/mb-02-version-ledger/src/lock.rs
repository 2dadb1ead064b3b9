//! # Bootstrap Lock
//!
//! A single named lock with a hold count on top of a [`LockBackend`].
//! Nested acquisitions by one orchestration collapse into one backend lock;
//! the backend is unlocked when the count returns to zero.
//!
//! One `BootstrapLock` belongs to one orchestrator. Cooperating
//! orchestrators (threads or processes) share the *backend*, not this type.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::domain::errors::LockError;
use crate::ports::outbound::LockBackend;

/// Name of the bootstrap lock.
pub const BOOTSTRAP_LOCK_NAME: &str = "bootstrap";

/// Re-entrant, hold-counted bootstrap lock.
pub struct BootstrapLock {
    backend: Arc<dyn LockBackend>,
    holds: Mutex<usize>,
}

impl BootstrapLock {
    pub fn new(backend: Arc<dyn LockBackend>) -> Self {
        Self {
            backend,
            holds: Mutex::new(0),
        }
    }

    /// Take one hold, locking the backend on the first.
    pub fn acquire(&self) -> Result<BootstrapLockGuard<'_>, LockError> {
        let mut holds = self.holds.lock();
        if *holds == 0 {
            self.backend.lock()?;
            debug!(lock = %self.backend.name(), "[Lock] Acquired");
        }
        *holds += 1;
        Ok(BootstrapLockGuard {
            lock: self,
            released: false,
        })
    }

    /// Current hold count.
    pub fn hold_count(&self) -> usize {
        *self.holds.lock()
    }

    pub fn is_held(&self) -> bool {
        self.hold_count() > 0
    }

    /// Drop every hold and unlock the backend if it was locked.
    ///
    /// Called at the end of each bootstrap, successful or not.
    pub fn release_all(&self) -> Result<(), LockError> {
        let mut holds = self.holds.lock();
        if *holds == 0 {
            return Ok(());
        }
        warn!(holds = *holds, "[Lock] Releasing outstanding bootstrap lock holds");
        *holds = 0;
        self.backend.unlock()
    }

    fn release_one(&self) -> Result<(), LockError> {
        let mut holds = self.holds.lock();
        match *holds {
            0 => {
                warn!(lock = %self.backend.name(), "[Lock] Release without matching acquire");
                Ok(())
            }
            1 => {
                *holds = 0;
                self.backend.unlock()?;
                debug!(lock = %self.backend.name(), "[Lock] Released");
                Ok(())
            }
            _ => {
                *holds -= 1;
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for BootstrapLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapLock")
            .field("backend", &self.backend.name())
            .field("holds", &*self.holds.lock())
            .finish()
    }
}

/// One hold on a [`BootstrapLock`]. Released on drop.
#[must_use = "dropping the guard releases the lock immediately"]
pub struct BootstrapLockGuard<'a> {
    lock: &'a BootstrapLock,
    released: bool,
}

impl BootstrapLockGuard<'_> {
    /// Release now, surfacing backend errors.
    pub fn release(mut self) -> Result<(), LockError> {
        self.released = true;
        self.lock.release_one()
    }
}

impl Drop for BootstrapLockGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.lock.release_one() {
            warn!(error = %e, "[Lock] Failed to release bootstrap lock");
        }
    }
}
