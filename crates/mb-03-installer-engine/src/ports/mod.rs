//! Ports for the installer engine.

pub mod outbound;
