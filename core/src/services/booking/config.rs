use std::time::Duration;

use crate::domain::entities::DEFAULT_CANCELLATION_LEAD_HOURS;

/// Configuration for the booking service
#[derive(Debug, Clone)]
pub struct BookingServiceConfig {
    /// Minimum gap between a cancellation and check-in
    pub cancellation_lead: chrono::Duration,
    /// Creations slower than this are logged as warnings
    pub slow_operation_threshold: Duration,
}

impl Default for BookingServiceConfig {
    fn default() -> Self {
        Self {
            cancellation_lead: chrono::Duration::hours(DEFAULT_CANCELLATION_LEAD_HOURS),
            slow_operation_threshold: Duration::from_secs(5),
        }
    }
}
