use std::time::Duration;

use hb_shared::SyncConfig;

/// Configuration for the sync queue
#[derive(Debug, Clone)]
pub struct SyncQueueConfig {
    /// How often the background task drains the queue
    pub interval: Duration,
    /// Failed attempts before a task is dead-lettered; 0 retries forever
    pub max_attempts: u32,
    /// Execution records kept for diagnostics
    pub history_limit: usize,
    /// Dead letters kept; the oldest are dropped first
    pub dead_letter_limit: usize,
    /// Whether the background task runs at all
    pub enabled: bool,
}

impl Default for SyncQueueConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            max_attempts: 5,
            history_limit: 256,
            dead_letter_limit: 256,
            enabled: true,
        }
    }
}

impl From<&SyncConfig> for SyncQueueConfig {
    fn from(config: &SyncConfig) -> Self {
        Self {
            interval: config.interval(),
            max_attempts: config.max_attempts,
            enabled: config.enabled,
            ..Self::default()
        }
    }
}
