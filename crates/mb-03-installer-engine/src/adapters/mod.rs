//! Adapters for the installer engine ports.

pub mod parameters;
