use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::DEFAULT_LOCK_TIMEOUT;
use crate::domain::errors::LockError;
use crate::ports::outbound::LockBackend;

/// In-process lock backend.
#[derive(Debug)]
pub struct ProcessLock {
    name: String,
    held: Mutex<bool>,
    released: Condvar,
    timeout: Duration,
}

impl ProcessLock {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_timeout(name, DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_timeout(name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            held: Mutex::new(false),
            released: Condvar::new(),
            timeout,
        }
    }

    pub fn is_locked(&self) -> bool {
        *self.held.lock()
    }
}

impl LockBackend for ProcessLock {
    fn lock(&self) -> Result<(), LockError> {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut held = self.held.lock();

        while *held {
            if self.released.wait_until(&mut held, deadline).timed_out() && *held {
                return Err(LockError::Timeout {
                    name: self.name.clone(),
                    waited: started.elapsed(),
                    holder: None,
                });
            }
        }

        *held = true;
        Ok(())
    }

    fn unlock(&self) -> Result<(), LockError> {
        let mut held = self.held.lock();
        if !*held {
            return Err(LockError::NotHeld {
                name: self.name.clone(),
            });
        }
        *held = false;
        drop(held);
        self.released.notify_one();
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
