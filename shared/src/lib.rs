//! Shared utilities and common types for the HostelBook server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Utility functions (credential and field validation)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, Environment, LogFormat, LoggingConfig,
    ReminderConfig, StorageConfig, SyncConfig,
};
pub use errors::{ErrorResponse, IntoErrorResponse, error_codes};
pub use utils::{phone, validation};
