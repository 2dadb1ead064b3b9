//! Cross-subsystem integration tests.

pub mod concurrency;
pub mod federation;
pub mod lifecycle;
pub mod ordering;
