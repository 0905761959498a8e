//! Shared fixture for service tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::entities::{
    Booking, BookingRequest, Hostel, HostelDraft, Room, RoomDraft, RoomType, User,
};
use crate::domain::Ledger;
use crate::repositories::{
    EntityStore, InMemoryEntityStore, LedgerStore, MemoryPersistence, NoOpAuditTrail,
};
use crate::services::booking::{BookingCache, BookingService, BookingServiceConfig};
use crate::services::clock::{Clock, FixedClock};
use crate::services::context::ServiceContext;
use crate::services::hostel::HostelService;
use crate::services::reminder::{ReminderService, ReminderServiceConfig};
use crate::services::review::ReviewService;
use crate::services::support::{RecordingNotifier, SwitchableConnectivity};
use crate::services::sync::{SyncQueue, SyncQueueConfig};
use crate::services::user::UserService;

/// Store with one manager, one client, one hostel and one room.
/// The clock starts at 2024-12-20 09:00 UTC.
pub(crate) struct Harness {
    pub store: Arc<InMemoryEntityStore>,
    pub persistence: MemoryPersistence,
    pub queue: Arc<SyncQueue>,
    pub cache: Arc<BookingCache>,
    pub connectivity: Arc<SwitchableConnectivity>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<FixedClock>,
    pub manager: User,
    pub client: User,
    pub hostel: Hostel,
    pub room: Room,
}

impl Harness {
    pub async fn new() -> Self {
        let persistence = MemoryPersistence::new();
        let store = Arc::new(LedgerStore::new(
            Ledger::new(),
            persistence.clone(),
            Arc::new(NoOpAuditTrail::new()),
        ));
        let connectivity = Arc::new(SwitchableConnectivity::online());
        let queue = Arc::new(SyncQueue::new(
            connectivity.clone(),
            SyncQueueConfig {
                interval: Duration::from_secs(30),
                max_attempts: 3,
                ..SyncQueueConfig::default()
            },
        ));
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 12, 20, 9, 0, 0).unwrap(),
        ));
        let now = clock.now();

        let manager = store
            .put_user(User::new_manager("manager@hostel.ua", "+380501112233", "secret1", now))
            .await
            .unwrap();
        let client = store
            .put_user(User::new_client(
                "olena@example.com",
                "+380671234567",
                "secret2",
                "Olena",
                "Shevchenko",
                now,
            ))
            .await
            .unwrap();
        let hostel = store
            .put_hostel(
                Hostel::new(
                    HostelDraft::new("Sunny Hostel", "Khreshchatyk 1", "Kyiv"),
                    manager.id,
                    now,
                )
                .unwrap(),
            )
            .await
            .unwrap();
        let room = store
            .put_room(
                Room::new(hostel.id, RoomDraft::new(RoomType::Private, 2, 150.0), now).unwrap(),
            )
            .await
            .unwrap();

        Self {
            store,
            persistence,
            queue,
            cache: Arc::new(BookingCache::new()),
            connectivity,
            notifier: Arc::new(RecordingNotifier::new()),
            clock,
            manager,
            client,
            hostel,
            room,
        }
    }

    pub fn ctx(&self) -> ServiceContext {
        ServiceContext::new(
            self.connectivity.clone(),
            self.notifier.clone(),
            self.clock.clone(),
        )
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// December 2024
    pub fn at(&self, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, day, hour, minute, 0).unwrap()
    }

    pub fn request(&self, check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> BookingRequest {
        BookingRequest::for_client(&self.client, self.hostel.id, self.room.id, check_in, check_out)
    }

    /// Reserves a fresh room of the fixture hostel directly in the store
    pub async fn book(&self, check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> Booking {
        let room = self.add_room(100.0).await;
        let request =
            BookingRequest::for_client(&self.client, self.hostel.id, room.id, check_in, check_out);
        let booking = Booking::pending(request, self.now()).unwrap();
        self.store.reserve_room(booking).await.unwrap()
    }

    pub async fn add_room(&self, price_per_hour: f64) -> Room {
        self.store
            .put_room(
                Room::new(
                    self.hostel.id,
                    RoomDraft::new(RoomType::Shared, 4, price_per_hour),
                    self.now(),
                )
                .unwrap(),
            )
            .await
            .unwrap()
    }

    pub fn booking_service(&self) -> BookingService<InMemoryEntityStore> {
        BookingService::new(
            self.store.clone(),
            self.queue.clone(),
            self.cache.clone(),
            self.ctx(),
            BookingServiceConfig::default(),
        )
    }

    pub fn hostel_service(&self) -> HostelService<InMemoryEntityStore> {
        HostelService::new(self.store.clone(), self.ctx())
    }

    pub fn review_service(&self) -> ReviewService<InMemoryEntityStore> {
        ReviewService::new(
            self.store.clone(),
            self.queue.clone(),
            self.cache.clone(),
            self.ctx(),
        )
    }

    pub fn user_service(&self) -> UserService<InMemoryEntityStore> {
        UserService::new(self.store.clone(), self.ctx())
    }

    pub fn reminder_service(
        &self,
        config: ReminderServiceConfig,
    ) -> ReminderService<InMemoryEntityStore> {
        ReminderService::new(self.store.clone(), self.ctx(), config)
    }
}
