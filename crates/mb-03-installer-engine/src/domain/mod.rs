//! Domain layer for the installer engine.

pub mod actions;
pub mod errors;
pub mod report;
