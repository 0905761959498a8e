//! Online booking flows

use crate::domain::entities::{BookingStatus, PaymentStatus};
use crate::domain::BookingFilter;
use crate::errors::{BookingError, DomainError};
use crate::repositories::EntityStore;
use crate::services::booking::{Actor, BookingReceipt, MutationOutcome};
use crate::services::support::Recipient;
use crate::services::testing::Harness;

#[tokio::test]
async fn test_create_booking_confirms_and_prices_stay() {
    let h = Harness::new().await;
    let service = h.booking_service();

    let receipt = service
        .create_booking(h.request(h.at(25, 14, 0), h.at(27, 12, 0)))
        .await
        .unwrap();

    let booking = match receipt {
        BookingReceipt::Confirmed(booking) => booking,
        other => panic!("expected confirmation, got {:?}", other),
    };
    assert_eq!(booking.total_price, 6900.0);
    assert_eq!(booking.status, BookingStatus::Active);
    assert_eq!(booking.payment_status, PaymentStatus::Unpaid);

    let room = h.store.find_room(h.room.id).await.unwrap().unwrap();
    assert!(!room.available);

    let to_manager = h.notifier.sent_to(Recipient::Manager(h.manager.id));
    assert_eq!(to_manager.len(), 1);
    assert!(to_manager[0].contains("Sunny Hostel"));
    assert!(to_manager[0].contains("Olena Shevchenko"));

    assert_eq!(service.cache().get_booking(booking.id).await, Some(booking));
}

#[tokio::test]
async fn test_second_booking_of_held_room_is_rejected() {
    let h = Harness::new().await;
    let service = h.booking_service();
    service
        .create_booking(h.request(h.at(25, 14, 0), h.at(27, 12, 0)))
        .await
        .unwrap();

    let err = service
        .create_booking(h.request(h.at(28, 14, 0), h.at(29, 12, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Booking(BookingError::RoomUnavailable)));
    assert!(h.queue.is_empty());
}

#[tokio::test]
async fn test_invalid_range_is_rejected_before_store() {
    let h = Harness::new().await;
    let err = h
        .booking_service()
        .create_booking(h.request(h.at(27, 12, 0), h.at(25, 14, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Booking(BookingError::InvalidDateRange)));
    let stored = h.store.query_bookings(BookingFilter::all()).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_suspended_hostel_rejects_bookings() {
    let h = Harness::new().await;
    h.hostel_service()
        .suspend_hostel(h.hostel.id, h.manager.id)
        .await
        .unwrap();

    let err = h
        .booking_service()
        .create_booking(h.request(h.at(25, 14, 0), h.at(27, 12, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Booking(BookingError::HostelSuspended)));
}

#[tokio::test]
async fn test_quote_matches_booking_price() {
    let h = Harness::new().await;
    let quote = h
        .booking_service()
        .quote(h.room.id, h.at(25, 14, 0), h.at(27, 12, 0))
        .await
        .unwrap();
    assert_eq!(quote.hours, 46);
    assert_eq!(quote.price_per_hour, 150.0);
    assert_eq!(quote.total, 6900.0);
}

#[tokio::test]
async fn test_client_cancels_and_room_is_released() {
    let h = Harness::new().await;
    let service = h.booking_service();
    let booking = service
        .create_booking(h.request(h.at(25, 14, 0), h.at(27, 12, 0)))
        .await
        .unwrap()
        .into_booking();

    let outcome = service
        .cancel_booking(booking.id, Actor::Client(h.client.id))
        .await
        .unwrap();
    let cancelled = outcome.applied().unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);

    let room = h.store.find_room(h.room.id).await.unwrap().unwrap();
    assert!(room.available);
    assert!(h.notifier.sent_to(Recipient::Client(h.client.id)).is_empty());
    assert_eq!(
        service.cache().get_booking(booking.id).await.unwrap().status,
        BookingStatus::Cancelled
    );
}

#[tokio::test]
async fn test_manager_cancellation_notifies_client() {
    let h = Harness::new().await;
    let service = h.booking_service();
    let booking = service
        .create_booking(h.request(h.at(25, 14, 0), h.at(27, 12, 0)))
        .await
        .unwrap()
        .into_booking();

    service
        .cancel_booking(booking.id, Actor::Manager(h.manager.id))
        .await
        .unwrap();

    let to_client = h.notifier.sent_to(Recipient::Client(h.client.id));
    assert_eq!(to_client.len(), 1);
    assert!(to_client[0].contains("cancelled by the hostel"));
}

#[tokio::test]
async fn test_cancellation_window_closes_two_hours_before_check_in() {
    let h = Harness::new().await;
    let service = h.booking_service();
    let booking = service
        .create_booking(h.request(h.at(25, 14, 0), h.at(27, 12, 0)))
        .await
        .unwrap()
        .into_booking();

    h.clock.set(h.at(25, 13, 0));
    let err = service
        .cancel_booking(booking.id, Actor::Client(h.client.id))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Booking(BookingError::CancellationWindowClosed { lead_hours: 2 })
    ));

    let stored = h.store.find_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Active);
}

#[tokio::test]
async fn test_other_client_cannot_cancel() {
    let h = Harness::new().await;
    let service = h.booking_service();
    let booking = service
        .create_booking(h.request(h.at(25, 14, 0), h.at(27, 12, 0)))
        .await
        .unwrap()
        .into_booking();

    let err = service
        .cancel_booking(booking.id, Actor::Client(uuid::Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Booking(BookingError::NotBookingOwner { .. })));
}

#[tokio::test]
async fn test_service_lifecycle_marks_paid_and_frees_room() {
    let h = Harness::new().await;
    let service = h.booking_service();
    let booking = service
        .create_booking(h.request(h.at(25, 14, 0), h.at(27, 12, 0)))
        .await
        .unwrap()
        .into_booking();

    let in_service = service.mark_in_service(booking.id).await.unwrap();
    let in_service = in_service.applied().unwrap();
    assert_eq!(in_service.status, BookingStatus::InService);
    assert_eq!(in_service.payment_status, PaymentStatus::Paid);
    assert!(!h.store.find_room(h.room.id).await.unwrap().unwrap().available);

    let done = service.mark_completed(booking.id).await.unwrap();
    assert_eq!(done.applied().unwrap().status, BookingStatus::Completed);
    assert!(h.store.find_room(h.room.id).await.unwrap().unwrap().available);

    let err = service
        .cancel_booking(booking.id, Actor::Client(h.client.id))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Booking(BookingError::InvalidTransition { .. })));
}

#[tokio::test]
async fn test_payment_status_update() {
    let h = Harness::new().await;
    let service = h.booking_service();
    let booking = service
        .create_booking(h.request(h.at(25, 14, 0), h.at(27, 12, 0)))
        .await
        .unwrap()
        .into_booking();

    let outcome = service
        .update_payment_status(booking.id, PaymentStatus::PartiallyPaid)
        .await
        .unwrap();
    assert_eq!(
        outcome.applied().unwrap().payment_status,
        PaymentStatus::PartiallyPaid
    );
}

#[tokio::test]
async fn test_persistence_failure_defers_creation() {
    let h = Harness::new().await;
    let service = h.booking_service();
    h.persistence.set_should_fail(true);

    let receipt = service
        .create_booking(h.request(h.at(25, 14, 0), h.at(27, 12, 0)))
        .await
        .unwrap();
    assert!(receipt.is_deferred());
    assert_eq!(h.queue.len(), 1);
    let id = receipt.booking().id;
    assert!(h.store.find_booking(id).await.unwrap().is_none());

    h.persistence.set_should_fail(false);
    let report = h.queue.drain().await;
    assert_eq!(report.processed, 1);

    let stored = h.store.find_booking(id).await.unwrap().unwrap();
    assert_eq!(stored.total_price, 6900.0);
    assert_eq!(service.cache().get_booking(id).await.unwrap().total_price, 6900.0);
}

#[tokio::test]
async fn test_persistence_failure_defers_transition() {
    let h = Harness::new().await;
    let service = h.booking_service();
    let booking = service
        .create_booking(h.request(h.at(25, 14, 0), h.at(27, 12, 0)))
        .await
        .unwrap()
        .into_booking();

    h.persistence.set_should_fail(true);
    let outcome = service.mark_in_service(booking.id).await.unwrap();
    assert!(matches!(outcome, MutationOutcome::Deferred { .. }));

    h.persistence.set_should_fail(false);
    h.queue.drain().await;
    let stored = h.store.find_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::InService);
}

#[tokio::test]
async fn test_user_and_hostel_listings() {
    let h = Harness::new().await;
    let service = h.booking_service();
    let first = h.book(h.at(22, 10, 0), h.at(22, 18, 0)).await;
    let second = service
        .create_booking(h.request(h.at(25, 14, 0), h.at(27, 12, 0)))
        .await
        .unwrap()
        .into_booking();
    service.mark_completed(first.id).await.unwrap();

    let mine = service.user_bookings(h.client.id).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(service.cache().is_loaded(h.client.id).await);

    let all = service.hostel_bookings(h.hostel.id).await.unwrap();
    assert_eq!(all.len(), 2);
    let active = service.active_hostel_bookings(h.hostel.id).await.unwrap();
    assert_eq!(active.iter().map(|b| b.id).collect::<Vec<_>>(), vec![second.id]);
}
