//! # Bootstrap Runtime
//!
//! Top-level driver for one bootstrap run.
//!
//! ## Startup Sequence
//!
//! 1. Apply configuration overrides (module enable flags) to the descriptors
//! 2. Order the enabled modules (fails before anything runs)
//! 3. Run `BeforeContextBootstrap` installers against the root registry
//! 4. For each module in order:
//!    - run `BeforeModuleBootstrap` installers
//!    - construct the module through the [`ModuleProvider`]
//!    - run `AfterModuleBootstrap` installers
//!    - expose services to the federation and seal the module registry
//! 5. Run `AfterContextBootstrap` installers
//! 6. Release the bootstrap lock
//!
//! Teardown runs the same modules in exact reverse order.
//!
//! ## Modules
//!
//! - `config`: [`BootstrapConfig`] from JSON or `MB_*` environment variables
//! - `logging`: `tracing-subscriber` setup
//! - `orchestrator`: [`Orchestrator`] and its builder
//! - `adapters`: [`DefinitionModuleProvider`], the default module provider

pub mod adapters;
pub mod config;
pub mod errors;
pub mod logging;
pub mod orchestrator;
pub mod ports;
pub mod state;

pub use adapters::definition_provider::DefinitionModuleProvider;
pub use config::{BootstrapConfig, ConfigError, LedgerConfig, LockConfig, LoggingConfig};
pub use errors::{BootstrapError, TeardownFailure};
pub use logging::{init_logging, LoggingError};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use ports::ModuleProvider;
pub use state::{BootstrapReport, BootstrapState};
