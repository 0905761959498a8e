//! Node bootstrap and shutdown

use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};

use hb_core::domain::entities::{BookingRequest, HostelDraft, RoomDraft, RoomType};
use hb_core::repositories::EntityStore;
use hb_core::services::{ConnectivityProbe, Registration};
use hb_infra::HostelNode;
use hb_shared::{AppConfig, StorageConfig};

fn config_in(dir: &std::path::Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage = StorageConfig::new(dir);
    config.sync.interval_seconds = 1;
    config
}

#[tokio::test]
async fn test_background_tasks_start_and_stop() {
    let dir = tempfile::tempdir().unwrap();
    let mut node = HostelNode::initialize(config_in(dir.path())).await.unwrap();
    node.start_background_tasks();

    let mut running = node.running_tasks();
    running.sort();
    assert_eq!(running, vec!["reminders", "sync-queue"]);
    node.shutdown().await;
}

#[tokio::test]
async fn test_disabled_tasks_are_not_started() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.sync.enabled = false;
    config.reminders.enabled = false;

    let mut node = HostelNode::initialize(config).await.unwrap();
    node.start_background_tasks();
    assert!(node.running_tasks().is_empty());
    node.shutdown().await;
}

#[tokio::test]
async fn test_offline_booking_syncs_after_outage() {
    let dir = tempfile::tempdir().unwrap();
    let node = HostelNode::initialize(config_in(dir.path())).await.unwrap();

    let manager = node
        .users
        .register(Registration::manager("host@sunny.ua", "+380501112233", "secret1"))
        .await
        .unwrap();
    let client = node
        .users
        .register(Registration::client(
            "olena@example.com",
            "+380671234567",
            "secret2",
            "Olena",
            "Shevchenko",
        ))
        .await
        .unwrap();
    let hostel = node
        .hostels
        .create_hostel(manager.id, HostelDraft::new("Sunny Hostel", "Khreshchatyk 1", "Kyiv"))
        .await
        .unwrap();
    let room = node
        .hostels
        .add_room(hostel.id, manager.id, RoomDraft::new(RoomType::Shared, 4, 20.0))
        .await
        .unwrap();

    let restore = node.network.simulate_outage(Duration::from_millis(50));
    assert!(!node.network.is_available());

    let check_in = Utc::now() + ChronoDuration::days(3);
    let receipt = node
        .bookings
        .create_booking(BookingRequest::for_client(
            &client,
            hostel.id,
            room.id,
            check_in,
            check_in + ChronoDuration::hours(5),
        ))
        .await
        .unwrap();
    assert!(receipt.is_deferred());

    restore.await.unwrap();
    let report = node.queue.force_sync().await;
    assert_eq!(report.processed, 1);

    let stored = node
        .store
        .find_booking(receipt.booking().id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total_price, 100.0);
    node.shutdown().await;
}
