//! Domain layer for service federation.

pub mod errors;
pub mod federation;
