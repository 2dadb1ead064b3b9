//! Ledger storage adapters.

mod file;
mod memory;

pub use file::FileVersionLedger;
pub use memory::InMemoryVersionLedger;
