//! Offline sync queue configuration module

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::env_or;

/// Configuration for the deferred-mutation sync queue
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Whether the periodic background drain runs
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// How often the background drain runs (in seconds)
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,

    /// Failed executions after which a task is dead-lettered
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_seconds: default_interval(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl SyncConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_or("SYNC_ENABLED", defaults.enabled),
            interval_seconds: env_or("SYNC_INTERVAL_SECONDS", defaults.interval_seconds),
            max_attempts: env_or("SYNC_MAX_ATTEMPTS", defaults.max_attempts),
        }
    }

    /// Drain interval as a `Duration`
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds.max(1))
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    5
}
