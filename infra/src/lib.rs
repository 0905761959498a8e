//! # Infrastructure Layer
//!
//! Concrete implementations behind the HostelBook core traits:
//! - **Storage**: JSON documents per entity kind and an append-only audit log
//! - **Network**: connectivity monitor consulted by every service
//! - **Notifications**: log-backed notifier
//! - **Bootstrap**: tracing setup and the wiring used by the `hostel-node` binary

pub mod bootstrap;
pub mod errors;
pub mod network;
pub mod notifications;
pub mod storage;
pub mod telemetry;

pub use bootstrap::HostelNode;
pub use errors::InfrastructureError;
pub use network::NetworkMonitor;
pub use notifications::LogNotifier;
pub use storage::{open_file_store, FileAuditTrail, FileEntityStore, JsonDocuments};
pub use telemetry::init_tracing;
