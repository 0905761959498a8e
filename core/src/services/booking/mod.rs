//! Booking service: creation, state transitions and offline deferral.

pub mod cache;
pub mod config;
pub mod service;
pub mod types;

pub use cache::BookingCache;
pub use config::BookingServiceConfig;
pub(crate) use service::ordering_key;
pub use service::BookingService;
pub use types::{Actor, BookingReceipt, MutationOutcome, PriceQuote};

#[cfg(test)]
mod tests;
