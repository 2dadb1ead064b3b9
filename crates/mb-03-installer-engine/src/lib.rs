//! # MB-03: Installer Engine Subsystem
//!
//! Executes installers of ordered modules for one bootstrap phase.
//!
//! ## Per-installer decision
//!
//! ```text
//! settings ──► DISABLED / SKIP ─────────────────────────────► done (no lock)
//!          └─► EXECUTE ──► action hook ──► FORCE ──► run ──► record
//!                                      ├─► REGISTER ───────► record
//!                                      └─► EXECUTE
//!                                            ├─ AlwaysRun ─► run ──► record
//!                                            └─ VersionDifferent
//!                                                 lock ─► re-read ledger
//!                                                   ├─ not newer ─► unlock, skip
//!                                                   └─ newer ─► run ─► record ─► unlock
//! ```
//!
//! Every ledger write happens under the bootstrap lock. Errors from
//! installer work abort the phase and are never downgraded to a log line.

pub mod adapters;
pub mod domain;
pub mod engine;
pub mod ports;

pub use adapters::parameters::NameParameterResolver;
pub use domain::actions::resolve_action;
pub use domain::errors::{InstallerError, InstallerExecutionError};
pub use domain::report::PhaseReport;
pub use engine::{InstallerEngine, PhaseModule};
pub use ports::outbound::ParameterResolver;
