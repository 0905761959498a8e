//! Wires the file store, services and background tasks into a running node.

use std::sync::Arc;

use tracing::{error, info, warn};

use hb_core::repositories::EntityStore;
use hb_core::services::{
    BackgroundHandle, BookingCache, BookingService, BookingServiceConfig, HostelService,
    ReminderService, ReminderServiceConfig, ReviewService, ServiceContext, SyncQueue,
    SyncQueueConfig, SystemClock, UserService,
};
use hb_shared::AppConfig;

use crate::errors::InfrastructureError;
use crate::network::NetworkMonitor;
use crate::notifications::LogNotifier;
use crate::storage::{open_file_store, FileAuditTrail, FileEntityStore};

pub struct HostelNode {
    pub config: AppConfig,
    pub store: Arc<FileEntityStore>,
    pub audit: Arc<FileAuditTrail>,
    pub network: Arc<NetworkMonitor>,
    pub queue: Arc<SyncQueue>,
    pub cache: Arc<BookingCache>,
    pub users: UserService<FileEntityStore>,
    pub hostels: HostelService<FileEntityStore>,
    pub bookings: BookingService<FileEntityStore>,
    pub reviews: ReviewService<FileEntityStore>,
    pub reminders: Arc<ReminderService<FileEntityStore>>,
    handles: Vec<BackgroundHandle>,
}

impl HostelNode {
    /// Loads the data directory and builds every service
    pub async fn initialize(config: AppConfig) -> Result<Self, InfrastructureError> {
        info!(
            environment = %config.environment,
            data_dir = %config.storage.data_dir.display(),
            "Initializing hostel node"
        );

        let (store, audit) = open_file_store(&config.storage).await?;
        let network = Arc::new(NetworkMonitor::default());
        let ctx = ServiceContext::new(
            network.clone(),
            Arc::new(LogNotifier::new()),
            Arc::new(SystemClock),
        );
        let queue = Arc::new(SyncQueue::new(
            network.clone(),
            SyncQueueConfig::from(&config.sync),
        ));
        let cache = Arc::new(BookingCache::new());

        let node = Self {
            users: UserService::new(store.clone(), ctx.clone()),
            hostels: HostelService::new(store.clone(), ctx.clone()),
            bookings: BookingService::new(
                store.clone(),
                queue.clone(),
                cache.clone(),
                ctx.clone(),
                BookingServiceConfig::default(),
            ),
            reviews: ReviewService::new(store.clone(), queue.clone(), cache.clone(), ctx.clone()),
            reminders: Arc::new(ReminderService::new(
                store.clone(),
                ctx,
                ReminderServiceConfig::from(&config.reminders),
            )),
            config,
            store,
            audit,
            network,
            queue,
            cache,
            handles: Vec::new(),
        };

        info!("Hostel node initialized");
        Ok(node)
    }

    /// Starts the sync drain and reminder scans; disabled tasks are skipped
    pub fn start_background_tasks(&mut self) {
        if let Some(handle) = self.queue.clone().start_background_task() {
            self.handles.push(handle);
        }
        if let Some(handle) = self.reminders.clone().start_background_task() {
            self.handles.push(handle);
        }
        info!(tasks = self.handles.len(), "Background tasks started");
    }

    pub fn running_tasks(&self) -> Vec<&'static str> {
        self.handles
            .iter()
            .filter(|h| !h.is_finished())
            .map(|h| h.name())
            .collect()
    }

    /// Stops background work and makes a last attempt to sync queued changes
    pub async fn shutdown(self) {
        info!("Shutting down hostel node");
        for handle in self.handles {
            handle.stop().await;
        }

        if !self.queue.is_empty() {
            let report = self.queue.force_sync().await;
            if report.remaining > 0 {
                warn!(
                    remaining = report.remaining,
                    "Queued changes were not synced and will be lost"
                );
            }
        }
        let dead = self.queue.dead_letters();
        if !dead.is_empty() {
            error!(count = dead.len(), "Changes abandoned after repeated failures");
        }

        match self.store.stats().await {
            Ok(stats) => info!(
                users = stats.users,
                hostels = stats.hostels,
                rooms = stats.rooms,
                bookings = stats.bookings,
                reviews = stats.reviews,
                operations = stats.operations,
                "Hostel node stopped"
            ),
            Err(e) => warn!(error = %e, "Failed to read final statistics"),
        }
    }
}
