//! Client reviews of completed stays.

pub mod service;

pub use service::{ReviewOutcome, ReviewService};
