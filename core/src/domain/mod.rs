//! Domain layer containing business entities and the ledger that ties them together.

pub mod entities;
pub mod ledger;

// Re-export commonly used domain types
pub use entities::*;
pub use ledger::{BookingFilter, Change, Collection, Ledger, LedgerStats};
