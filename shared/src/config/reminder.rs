//! Booking reminder configuration module

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::env_or;

/// Configuration for the check-in reminder service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReminderConfig {
    /// Whether the reminder task runs
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// How often active bookings are scanned (in seconds)
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,

    /// Clients are reminded once check-in is this close (in minutes)
    #[serde(default = "default_lead_minutes")]
    pub lead_minutes: i64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_seconds: default_interval(),
            lead_minutes: default_lead_minutes(),
        }
    }
}

impl ReminderConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_or("REMINDERS_ENABLED", defaults.enabled),
            interval_seconds: env_or("REMINDERS_INTERVAL_SECONDS", defaults.interval_seconds),
            lead_minutes: env_or("REMINDERS_LEAD_MINUTES", defaults.lead_minutes),
        }
    }

    /// Scan interval as a `Duration`
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds.max(1))
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval() -> u64 {
    300 // 5 minutes
}

fn default_lead_minutes() -> i64 {
    60
}
