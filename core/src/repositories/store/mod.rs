//! Entity store repository module.

mod r#trait;
pub use r#trait::{EntityStore, LedgerPersistence};

mod ledger_store;
pub use ledger_store::LedgerStore;

mod memory;
pub use memory::{InMemoryEntityStore, MemoryPersistence};
