//! # Modular Bootstrap Test Suite
//!
//! Unified test crate for behaviour that spans several subsystems.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Spy settings, counting ledger, module fixtures
//! └── integration/
//!     ├── ordering.rs   # Resolver scenarios through the orchestrator
//!     ├── installers.rs # Ledger-gated installers, settings overrides
//!     ├── federation.rs # Exposure visibility across modules and root
//!     ├── concurrency.rs# Concurrent bootstraps sharing one ledger
//!     └── lifecycle.rs  # Restart against a file ledger, teardown order
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p mb-tests
//!
//! # By category
//! cargo test -p mb-tests integration::concurrency::
//! ```

pub mod integration;
pub mod support;
