//! Adapters for the version ledger ports.

pub mod ledger;
pub mod lock;
pub mod time;
