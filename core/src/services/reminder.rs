//! Check-in reminders for upcoming stays.
//!
//! Each scan notifies the client of every active booking whose check-in
//! falls within the lead window. A booking is reminded at most once;
//! reminders are skipped while offline and picked up by a later
//! scan.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use hb_shared::ReminderConfig;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::domain::entities::BookingStatus;
use crate::domain::BookingFilter;
use crate::errors::DomainResult;
use crate::repositories::EntityStore;
use crate::services::background::{spawn_periodic, BackgroundHandle};
use crate::services::context::ServiceContext;

/// Configuration for the reminder service
#[derive(Debug, Clone)]
pub struct ReminderServiceConfig {
    /// How often bookings are scanned
    pub interval: Duration,
    /// How long before check-in the reminder goes out
    pub lead: ChronoDuration,
    pub enabled: bool,
}

impl Default for ReminderServiceConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            lead: ChronoDuration::minutes(60),
            enabled: true,
        }
    }
}

impl From<&ReminderConfig> for ReminderServiceConfig {
    fn from(config: &ReminderConfig) -> Self {
        Self {
            interval: config.interval(),
            lead: ChronoDuration::minutes(config.lead_minutes),
            enabled: config.enabled,
        }
    }
}

/// Summary of one scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderRun {
    pub sent: Vec<Uuid>,
    pub skipped_offline: bool,
}

pub struct ReminderService<S: EntityStore + 'static> {
    store: Arc<S>,
    ctx: ServiceContext,
    config: ReminderServiceConfig,
    /// Reminded bookings by check-in time; dropped once check-in passes
    reminded: Mutex<HashMap<Uuid, DateTime<Utc>>>,
}

impl<S: EntityStore + 'static> ReminderService<S> {
    pub fn new(store: Arc<S>, ctx: ServiceContext, config: ReminderServiceConfig) -> Self {
        Self {
            store,
            ctx,
            config,
            reminded: Mutex::new(HashMap::new()),
        }
    }

    /// Runs a single scan
    pub async fn run_once(&self) -> DomainResult<ReminderRun> {
        if !self.ctx.is_online() {
            debug!("Offline, reminders postponed");
            return Ok(ReminderRun {
                skipped_offline: true,
                ..ReminderRun::default()
            });
        }

        let now = self.ctx.clock.now();
        let horizon = now + self.config.lead;
        self.reminded().retain(|_, check_in| *check_in > now);
        let due: Vec<_> = self
            .store
            .query_bookings(BookingFilter::all().with_status(BookingStatus::Active))
            .await?
            .into_iter()
            .filter(|b| b.check_in > now && b.check_in <= horizon)
            .filter(|b| !self.reminded().contains_key(&b.id))
            .collect();

        let mut run = ReminderRun::default();
        for booking in due {
            let message = format!(
                "Reminder: check-in for booking {} is at {}",
                booking.id,
                booking.check_in.format("%Y-%m-%d %H:%M")
            );
            self.ctx
                .notifier
                .notify_client(booking.client_id, &message)
                .await;
            self.reminded().insert(booking.id, booking.check_in);
            run.sent.push(booking.id);
        }

        if !run.sent.is_empty() {
            info!(count = run.sent.len(), "Check-in reminders sent");
        }
        Ok(run)
    }

    /// Scans on every tick. Returns `None` when reminders are disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<BackgroundHandle> {
        if !self.config.enabled {
            info!("Check-in reminders are disabled");
            return None;
        }

        let interval = self.config.interval;
        Some(spawn_periodic("reminders", interval, move || {
            let service = Arc::clone(&self);
            async move {
                if let Err(e) = service.run_once().await {
                    error!(error = %e, "Reminder scan failed");
                }
            }
        }))
    }

    fn reminded(&self) -> MutexGuard<'_, HashMap<Uuid, DateTime<Utc>>> {
        self.reminded.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::BookingTransition;
    use crate::services::support::Recipient;
    use crate::services::testing::Harness;

    #[tokio::test]
    async fn test_reminds_bookings_inside_lead_window_once() {
        let h = Harness::new().await;
        // Harness clock is 2024-12-20 09:00
        let soon = h.book(h.at(20, 9, 30), h.at(20, 18, 0)).await;
        let later = h.book(h.at(21, 9, 0), h.at(21, 12, 0)).await;

        let service = h.reminder_service(ReminderServiceConfig::default());
        let run = service.run_once().await.unwrap();
        assert_eq!(run.sent, vec![soon.id]);
        assert!(!run.sent.contains(&later.id));

        let sent = h.notifier.sent_to(Recipient::Client(h.client.id));
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains(&soon.id.to_string()));

        let again = service.run_once().await.unwrap();
        assert!(again.sent.is_empty());
    }

    #[tokio::test]
    async fn test_forgets_reminders_once_check_in_passes() {
        let h = Harness::new().await;
        h.book(h.at(20, 9, 30), h.at(20, 18, 0)).await;
        let service = h.reminder_service(ReminderServiceConfig::default());
        assert_eq!(service.run_once().await.unwrap().sent.len(), 1);
        assert_eq!(service.reminded().len(), 1);

        h.clock.set(h.at(20, 10, 0));
        assert!(service.run_once().await.unwrap().sent.is_empty());
        assert!(service.reminded().is_empty());
    }

    #[tokio::test]
    async fn test_skips_cancelled_and_past_bookings() {
        let h = Harness::new().await;
        let cancelled = h.book(h.at(20, 9, 45), h.at(20, 12, 0)).await;
        h.store
            .update_booking(cancelled.id, BookingTransition::ForceCancel, h.now())
            .await
            .unwrap();

        let service = h.reminder_service(ReminderServiceConfig::default());
        assert!(service.run_once().await.unwrap().sent.is_empty());
        assert!(h.notifier.sent_to(Recipient::Client(h.client.id)).is_empty());
    }

    #[tokio::test]
    async fn test_offline_scan_is_postponed() {
        let h = Harness::new().await;
        h.book(h.at(20, 9, 30), h.at(20, 18, 0)).await;
        h.connectivity.set_available(false);

        let service = h.reminder_service(ReminderServiceConfig::default());
        let run = service.run_once().await.unwrap();
        assert!(run.skipped_offline);

        h.connectivity.set_available(true);
        assert_eq!(service.run_once().await.unwrap().sent.len(), 1);
    }

    #[test]
    fn test_config_from_shared() {
        let shared = ReminderConfig {
            enabled: false,
            interval_seconds: 120,
            lead_minutes: 30,
        };
        let config = ReminderServiceConfig::from(&shared);
        assert!(!config.enabled);
        assert_eq!(config.interval, Duration::from_secs(120));
        assert_eq!(config.lead, ChronoDuration::minutes(30));
    }

    #[tokio::test]
    async fn test_disabled_has_no_background_task() {
        let h = Harness::new().await;
        let service = Arc::new(h.reminder_service(ReminderServiceConfig {
            enabled: false,
            ..ReminderServiceConfig::default()
        }));
        assert!(service.start_background_task().is_none());
    }
}
