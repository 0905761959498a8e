//! # HostelBook Core
//!
//! Core booking logic and domain layer for the HostelBook backend.
//! This crate contains the domain entities, the ledger that keeps room
//! availability consistent with bookings, repository interfaces, the
//! booking/hostel/review/user services and the offline sync queue.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
