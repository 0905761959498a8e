//! Audit trail repository module.

mod r#trait;
pub use r#trait::AuditTrail;

mod noop;
pub use noop::NoOpAuditTrail;

mod memory;
pub use memory::MemoryAuditTrail;
