//! # Shared Types Crate
//!
//! Vocabulary shared by every bootstrap subsystem: module and installer
//! descriptors, phases, actions, settings tables, exposure rules, and the
//! type-erased service handles modules contribute.
//!
//! ## Design Principles
//!
//! - **Descriptors are data**: built once by explicit builder calls, never
//!   discovered by scanning, and not mutated during a bootstrap run.
//! - **Opaque services**: the orchestrator moves [`ServiceHandle`]s around
//!   without knowing how they were constructed.

pub mod descriptor;
pub mod errors;
pub mod exposure;
pub mod installer;
pub mod service;
pub mod settings;

pub use descriptor::{ModuleDescriptor, ModuleRole};
pub use errors::*;
pub use exposure::{ExposedService, ExposureRules};
pub use installer::*;
pub use service::*;
pub use settings::{parse_action_list, SettingsSource, SettingsTable};
