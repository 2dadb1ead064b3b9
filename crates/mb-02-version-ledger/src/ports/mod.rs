//! Ports for the version ledger subsystem.

pub mod outbound;
