use uuid::Uuid;

use crate::domain::entities::{BookingStatus, HostelDraft, RoomDraft, RoomType};
use crate::errors::{BookingError, DomainError, ValidationError};
use crate::repositories::EntityStore;
use crate::services::booking::Actor;
use crate::services::support::Recipient;
use crate::services::testing::Harness;

#[tokio::test]
async fn test_create_and_search_hostels() {
    let h = Harness::new().await;
    let service = h.hostel_service();
    let created = service
        .create_hostel(
            h.manager.id,
            HostelDraft::new("  River View ", "Podil 12", "Kyiv"),
        )
        .await
        .unwrap();
    assert_eq!(created.name, "River View");
    assert!(created.active);

    let in_kyiv = service.search_hostels("kyiv", "").await.unwrap();
    assert_eq!(in_kyiv.len(), 2);
    let by_name = service.search_hostels("Kyiv", "river").await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert!(service.search_hostels("Lviv", "").await.unwrap().is_empty());

    assert_eq!(service.hostels_by_manager(h.manager.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_client_cannot_own_hostel() {
    let h = Harness::new().await;
    let err = h
        .hostel_service()
        .create_hostel(h.client.id, HostelDraft::new("Nope Hostel", "Somewhere 1", "Kyiv"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BusinessRule { .. }));
}

#[tokio::test]
async fn test_invalid_draft_is_rejected() {
    let h = Harness::new().await;
    let err = h
        .hostel_service()
        .create_hostel(h.manager.id, HostelDraft::new("AB", "Somewhere 1", "Kyiv"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::ValidationErr(ValidationError::InvalidLength { .. })
    ));
}

#[tokio::test]
async fn test_only_owner_may_update() {
    let h = Harness::new().await;
    let service = h.hostel_service();
    let err = service
        .update_hostel(
            h.hostel.id,
            Uuid::new_v4(),
            HostelDraft::new("Stolen Hostel", "Khreshchatyk 1", "Kyiv"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BusinessRule { .. }));

    let updated = service
        .update_hostel(
            h.hostel.id,
            h.manager.id,
            HostelDraft::new("Sunny Hostel Centre", "Khreshchatyk 1", "Kyiv"),
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Sunny Hostel Centre");
}

#[tokio::test]
async fn test_suspension_cancels_active_bookings_only() {
    let h = Harness::new().await;
    let active = h.book(h.at(25, 14, 0), h.at(27, 12, 0)).await;
    let staying = h.book(h.at(20, 8, 0), h.at(21, 12, 0)).await;
    h.booking_service().mark_in_service(staying.id).await.unwrap();

    let report = h
        .hostel_service()
        .suspend_hostel(h.hostel.id, h.manager.id)
        .await
        .unwrap();
    assert!(!report.hostel.active);
    assert_eq!(report.cancelled, vec![active.id]);

    let stored = h.store.find_booking(active.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Cancelled);
    let stored = h.store.find_booking(staying.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::InService);

    assert_eq!(h.notifier.sent_to(Recipient::Client(h.client.id)).len(), 1);
    assert!(h.hostel_service().search_hostels("Kyiv", "").await.unwrap().is_empty());

    let reactivated = h
        .hostel_service()
        .activate_hostel(h.hostel.id, h.manager.id)
        .await
        .unwrap();
    assert!(reactivated.active);
}

#[tokio::test]
async fn test_delete_requires_no_active_bookings() {
    let h = Harness::new().await;
    let service = h.hostel_service();
    let booking = h.book(h.at(25, 14, 0), h.at(27, 12, 0)).await;

    let err = service
        .delete_hostel(h.hostel.id, h.manager.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Booking(BookingError::HostelHasActiveBookings { count: 1 })
    ));

    h.booking_service()
        .cancel_booking(booking.id, Actor::Manager(h.manager.id))
        .await
        .unwrap();
    let deleted = service.delete_hostel(h.hostel.id, h.manager.id).await.unwrap();
    assert_eq!(deleted.id, h.hostel.id);
    assert!(service.find_hostel(h.hostel.id).await.unwrap().is_none());
    assert!(h.store.find_room(h.room.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_rooms_are_added_and_updated() {
    let h = Harness::new().await;
    let service = h.hostel_service();
    let room = service
        .add_room(h.hostel.id, h.manager.id, RoomDraft::new(RoomType::Shared, 6, 40.0))
        .await
        .unwrap();
    assert!(room.available);

    let err = service
        .add_room(h.hostel.id, h.manager.id, RoomDraft::new(RoomType::Shared, 21, 40.0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::ValidationErr(ValidationError::OutOfRange { .. })
    ));

    let updated = service
        .update_room(room.id, h.manager.id, RoomDraft::new(RoomType::Private, 2, 90.0))
        .await
        .unwrap();
    assert_eq!(updated.room_type, RoomType::Private);
    assert_eq!(updated.price_per_hour, 90.0);

    h.book(h.at(25, 14, 0), h.at(27, 12, 0)).await;
    let all = service.rooms_by_hostel(h.hostel.id, false).await.unwrap();
    let free = service.rooms_by_hostel(h.hostel.id, true).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(free.len(), 2);
}

#[tokio::test]
async fn test_updating_held_room_keeps_it_unavailable() {
    let h = Harness::new().await;
    let service = h.booking_service();
    let booking = service
        .create_booking(h.request(h.at(25, 14, 0), h.at(27, 12, 0)))
        .await
        .unwrap()
        .into_booking();

    let room = h
        .hostel_service()
        .update_room(h.room.id, h.manager.id, RoomDraft::new(RoomType::Private, 2, 200.0))
        .await
        .unwrap();
    assert!(!room.available);

    let stored = h.store.find_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.total_price, 6900.0);
}
