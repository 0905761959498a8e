//! Durable storage: JSON documents per entity kind and the text audit log.

pub mod audit_log;
pub mod json_store;

pub use audit_log::FileAuditTrail;
pub use json_store::{open_file_store, FileEntityStore, JsonDocuments};
