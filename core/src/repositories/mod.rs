pub mod audit;
pub mod store;

pub use audit::{AuditTrail, MemoryAuditTrail, NoOpAuditTrail};
pub use store::{
    EntityStore, InMemoryEntityStore, LedgerPersistence, LedgerStore, MemoryPersistence,
};
