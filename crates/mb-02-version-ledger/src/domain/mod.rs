//! Domain layer for the version ledger.

pub mod entities;
pub mod errors;
