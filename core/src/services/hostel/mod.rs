//! Hostel and room management for managers.

pub mod service;

pub use service::{HostelService, SuspensionReport};

#[cfg(test)]
mod tests;
