//! Durable storage configuration module

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::env_or;

/// Configuration for the JSON-file entity store and its audit log
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding one JSON document per entity kind
    pub data_dir: PathBuf,

    /// Name of the append-only audit log inside `data_dir`
    #[serde(default = "default_audit_log_file")]
    pub audit_log_file: String,

    /// Flushes slower than this (in milliseconds) are logged as warnings
    #[serde(default = "default_slow_write_ms")]
    pub slow_write_warn_ms: u64,

    /// Pretty-print persisted documents
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("hostel_data"),
            audit_log_file: default_audit_log_file(),
            slow_write_warn_ms: default_slow_write_ms(),
            pretty: default_pretty(),
        }
    }
}

impl StorageConfig {
    /// Create a storage configuration rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: std::env::var("HOSTEL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            audit_log_file: std::env::var("HOSTEL_AUDIT_LOG")
                .unwrap_or(defaults.audit_log_file),
            slow_write_warn_ms: env_or("HOSTEL_SLOW_WRITE_MS", defaults.slow_write_warn_ms),
            pretty: env_or("HOSTEL_PRETTY_JSON", defaults.pretty),
        }
    }

    /// Full path of the audit log
    pub fn audit_log_path(&self) -> PathBuf {
        self.data_dir.join(&self.audit_log_file)
    }

    /// Full path of the document for an entity collection (e.g. `bookings`)
    pub fn document_path(&self, collection: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", collection))
    }
}

fn default_audit_log_file() -> String {
    String::from("server.log")
}

fn default_slow_write_ms() -> u64 {
    2000
}

fn default_pretty() -> bool {
    true
}
