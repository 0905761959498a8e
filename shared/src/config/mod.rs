//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `environment` - Environment detection and logging configuration
//! - `storage` - Data directory, audit log and durability settings
//! - `sync` - Offline sync queue draining and dead-lettering
//! - `reminder` - Booking reminder scanning

pub mod environment;
pub mod reminder;
pub mod storage;
pub mod sync;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Re-export commonly used types
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use reminder::ReminderConfig;
pub use storage::StorageConfig;
pub use sync::SyncConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Durable storage configuration
    pub storage: StorageConfig,

    /// Offline sync queue configuration
    #[serde(default)]
    pub sync: SyncConfig,

    /// Reminder service configuration
    #[serde(default)]
    pub reminders: ReminderConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            storage: StorageConfig::default(),
            sync: SyncConfig::default(),
            reminders: ReminderConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for a given environment with default settings
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            logging: LoggingConfig::for_environment(environment),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env();
        let mut logging = LoggingConfig::for_environment(environment);
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            logging.level = level;
        }

        Self {
            environment,
            storage: StorageConfig::from_env(),
            sync: SyncConfig::from_env(),
            reminders: ReminderConfig::from_env(),
            logging,
        }
    }
}

/// Read an environment variable and parse it, falling back to `default`
/// when the variable is missing or malformed.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
