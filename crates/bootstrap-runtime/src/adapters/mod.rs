//! Default implementations of the runtime ports.

pub mod definition_provider;
