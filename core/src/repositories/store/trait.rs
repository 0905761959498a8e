//! Entity store trait defining the interface every component reads and writes through.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{Booking, BookingTransition, Hostel, Review, Room, User};
use crate::domain::{BookingFilter, Collection, Ledger, LedgerStats};
use crate::errors::DomainError;

/// Keyed storage for users, hostels, rooms, bookings and reviews
///
/// Lookups return `Ok(None)` for missing ids. Every write is atomic with
/// respect to its own durability flush: either the change is persisted and
/// visible, or the call fails and nothing changed. Booking writes re-derive
/// room availability inside the same unit.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Insert or replace a user; email and phone must stay unique
    async fn put_user(&self, user: User) -> Result<User, DomainError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a user whose email or phone equals `key`
    async fn find_user_by_credential(&self, key: &str) -> Result<Option<User>, DomainError>;

    /// Insert or replace a hostel owned by an existing manager
    async fn put_hostel(&self, hostel: Hostel) -> Result<Hostel, DomainError>;

    async fn find_hostel(&self, id: Uuid) -> Result<Option<Hostel>, DomainError>;

    async fn hostels_by_manager(&self, manager_id: Uuid) -> Result<Vec<Hostel>, DomainError>;

    /// Active hostels in `city` whose name or address contains `query`
    async fn search_hostels(&self, city: &str, query: &str) -> Result<Vec<Hostel>, DomainError>;

    /// Remove a hostel with no active bookings, together with its rooms
    async fn delete_hostel(&self, id: Uuid) -> Result<Hostel, DomainError>;

    async fn put_room(&self, room: Room) -> Result<Room, DomainError>;

    async fn find_room(&self, id: Uuid) -> Result<Option<Room>, DomainError>;

    async fn rooms_by_hostel(
        &self,
        hostel_id: Uuid,
        only_available: bool,
    ) -> Result<Vec<Room>, DomainError>;

    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, DomainError>;

    /// Matching bookings ordered by creation time
    async fn query_bookings(&self, filter: BookingFilter) -> Result<Vec<Booking>, DomainError>;

    /// Check the room is free and insert the booking in one atomic step
    async fn reserve_room(&self, booking: Booking) -> Result<Booking, DomainError>;

    /// Insert or fully replace a booking
    async fn put_booking(&self, booking: Booking) -> Result<Booking, DomainError>;

    /// Apply a state-machine transition to a stored booking
    async fn update_booking(
        &self,
        id: Uuid,
        transition: BookingTransition,
        at: DateTime<Utc>,
    ) -> Result<Booking, DomainError>;

    /// Store a review and copy its rating onto the booking
    async fn put_review(&self, review: Review) -> Result<Review, DomainError>;

    /// Reviews for a hostel, newest first
    async fn reviews_for_hostel(&self, hostel_id: Uuid) -> Result<Vec<Review>, DomainError>;

    async fn review_for_booking(&self, booking_id: Uuid) -> Result<Option<Review>, DomainError>;

    async fn stats(&self) -> Result<LedgerStats, DomainError>;
}

/// Durability backend for [`LedgerStore`](super::LedgerStore)
///
/// `flush` receives the staged ledger and the collections the mutation
/// rewrote. An error must leave every persisted document as it was; only a
/// crash partway through replacing already written documents may leave them
/// mixed.
#[async_trait]
pub trait LedgerPersistence: Send + Sync {
    async fn flush(&self, ledger: &Ledger, touched: &BTreeSet<Collection>) -> Result<(), DomainError>;
}
