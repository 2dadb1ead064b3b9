//! # Lock Backends
//!
//! - [`ProcessLock`]: in-process mutual exclusion, shared via `Arc` by
//!   orchestrators running in one process.
//! - [`FileLock`]: `fs2` exclusive lock on `<dir>/bootstrap.lock`, shared by
//!   processes that see the same directory.
//!
//! Both wait with a timeout rather than blocking forever.

mod flock;
mod process;

use std::time::Duration;

pub use flock::FileLock;
pub use process::ProcessLock;

/// Default time to wait for the lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(30);

/// First retry delay for file lock polling.
pub const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Retry delay cap for file lock polling.
pub const MAX_RETRY_DELAY: Duration = Duration::from_millis(500);
