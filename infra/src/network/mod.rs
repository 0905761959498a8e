//! Connectivity tracking.

pub mod monitor;

pub use monitor::NetworkMonitor;
