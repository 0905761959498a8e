//! In-memory ledger of every entity and the invariants that tie them together.
//!
//! The ledger is a plain value: five id-keyed maps and the rules that keep
//! them consistent. Every mutating method either fails without touching
//! `self` or returns a [`Change`] naming the collections it rewrote and the
//! audit entries it produced. Room availability is never written by callers;
//! it is recomputed from the booking set whenever a booking or room changes.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entities::{
    AuditEntry, AuditEvent, Booking, BookingStatus, BookingTransition, Hostel, HostelDraft,
    Review, Room, User,
};
use crate::errors::{BookingError, DomainError, DomainResult, ValidationError};

/// One persisted document per entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Users,
    Hostels,
    Rooms,
    Bookings,
    Reviews,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Users,
        Collection::Hostels,
        Collection::Rooms,
        Collection::Bookings,
        Collection::Reviews,
    ];

    /// Document name, also used as the file stem by file-backed stores
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Hostels => "hostels",
            Collection::Rooms => "rooms",
            Collection::Bookings => "bookings",
            Collection::Reviews => "reviews",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a successful ledger mutation
#[derive(Debug, Clone)]
pub struct Change<T> {
    pub value: T,
    pub touched: BTreeSet<Collection>,
    pub events: Vec<AuditEntry>,
}

impl<T> Change<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            touched: BTreeSet::new(),
            events: Vec::new(),
        }
    }

    fn touch(mut self, collection: Collection) -> Self {
        self.touched.insert(collection);
        self
    }

    fn record(mut self, entry: AuditEntry) -> Self {
        self.events.push(entry);
        self
    }

    fn record_all(mut self, entries: impl IntoIterator<Item = AuditEntry>) -> Self {
        self.events.extend(entries);
        self
    }

    /// True when nothing needs to be flushed
    pub fn is_noop(&self) -> bool {
        self.touched.is_empty()
    }
}

/// Criteria for booking queries; unset fields match everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingFilter {
    pub client_id: Option<Uuid>,
    pub hostel_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_client(client_id: Uuid) -> Self {
        Self {
            client_id: Some(client_id),
            ..Self::default()
        }
    }

    pub fn for_hostel(hostel_id: Uuid) -> Self {
        Self {
            hostel_id: Some(hostel_id),
            ..Self::default()
        }
    }

    pub fn for_room(room_id: Uuid) -> Self {
        Self {
            room_id: Some(room_id),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: BookingStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        self.client_id.map_or(true, |id| booking.client_id == id)
            && self.hostel_id.map_or(true, |id| booking.hostel_id == id)
            && self.room_id.map_or(true, |id| booking.room_id == id)
            && self.status.map_or(true, |status| booking.status == status)
    }
}

/// Entity counts plus the number of committed mutations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    pub users: usize,
    pub hostels: usize,
    pub rooms: usize,
    pub available_rooms: usize,
    pub bookings: usize,
    pub active_bookings: usize,
    pub reviews: usize,
    pub operations: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    users: BTreeMap<Uuid, User>,
    hostels: BTreeMap<Uuid, Hostel>,
    rooms: BTreeMap<Uuid, Room>,
    bookings: BTreeMap<Uuid, Booking>,
    reviews: BTreeMap<Uuid, Review>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from loaded documents and repairs room availability
    pub fn from_parts(
        users: BTreeMap<Uuid, User>,
        hostels: BTreeMap<Uuid, Hostel>,
        rooms: BTreeMap<Uuid, Room>,
        bookings: BTreeMap<Uuid, Booking>,
        reviews: BTreeMap<Uuid, Review>,
    ) -> (Self, Vec<AuditEntry>) {
        let mut ledger = Self {
            users,
            hostels,
            rooms,
            bookings,
            reviews,
        };
        let repaired = ledger.reconcile_availability();
        (ledger, repaired)
    }

    /// Serializes one collection as an `id -> record` JSON object
    pub fn to_document(&self, collection: Collection) -> Result<serde_json::Value, serde_json::Error> {
        match collection {
            Collection::Users => serde_json::to_value(&self.users),
            Collection::Hostels => serde_json::to_value(&self.hostels),
            Collection::Rooms => serde_json::to_value(&self.rooms),
            Collection::Bookings => serde_json::to_value(&self.bookings),
            Collection::Reviews => serde_json::to_value(&self.reviews),
        }
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            users: self.users.len(),
            hostels: self.hostels.len(),
            rooms: self.rooms.len(),
            available_rooms: self.rooms.values().filter(|r| r.available).count(),
            bookings: self.bookings.len(),
            active_bookings: self.bookings.values().filter(|b| b.holds_room()).count(),
            reviews: self.reviews.len(),
            operations: 0,
        }
    }

    // Users

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.get(&id)
    }

    /// Matches email (case-insensitive) or phone
    pub fn find_user_by_credential(&self, key: &str) -> Option<&User> {
        self.users.values().find(|u| u.matches_credential(key))
    }

    pub fn put_user(&mut self, user: User) -> DomainResult<Change<User>> {
        for other in self.users.values().filter(|u| u.id != user.id) {
            if other.email.eq_ignore_ascii_case(&user.email) {
                return Err(duplicate("email"));
            }
            if other.phone == user.phone {
                return Err(duplicate("phone"));
            }
        }

        let entry = AuditEntry::new(
            AuditEvent::UserSaved,
            user.id,
            format!("{} {}", user.user_type(), user.email),
        );
        self.users.insert(user.id, user.clone());
        Ok(Change::new(user).touch(Collection::Users).record(entry))
    }

    // Hostels

    pub fn hostel(&self, id: Uuid) -> Option<&Hostel> {
        self.hostels.get(&id)
    }

    pub fn hostels_by_manager(&self, manager_id: Uuid) -> Vec<Hostel> {
        sorted(
            self.hostels.values().filter(|h| h.manager_id == manager_id),
            |h| (h.created_at, h.id),
        )
    }

    /// Active hostels in `city` whose name or address contains `query`
    pub fn search_hostels(&self, city: &str, query: &str) -> Vec<Hostel> {
        sorted(
            self.hostels
                .values()
                .filter(|h| h.active && h.matches(city, query)),
            |h| (h.created_at, h.id),
        )
    }

    pub fn put_hostel(&mut self, hostel: Hostel) -> DomainResult<Change<Hostel>> {
        HostelDraft::new(&hostel.name, &hostel.address, &hostel.city).validated()?;
        match self.users.get(&hostel.manager_id) {
            None => return Err(DomainError::not_found("Manager", hostel.manager_id)),
            Some(user) if !user.is_manager() => {
                return Err(DomainError::BusinessRule {
                    message: format!("User {} is not a manager", user.id),
                })
            }
            Some(_) => {}
        }

        let entry = AuditEntry::new(
            AuditEvent::HostelSaved,
            hostel.id,
            format!(
                "{} ({}){}",
                hostel.name,
                hostel.city,
                if hostel.active { "" } else { " suspended" }
            ),
        );
        self.hostels.insert(hostel.id, hostel.clone());
        Ok(Change::new(hostel).touch(Collection::Hostels).record(entry))
    }

    /// Removes a hostel and its rooms; bookings stay as history
    pub fn delete_hostel(&mut self, id: Uuid) -> DomainResult<Change<Hostel>> {
        if !self.hostels.contains_key(&id) {
            return Err(DomainError::not_found("Hostel", id));
        }
        let active = self
            .bookings
            .values()
            .filter(|b| b.hostel_id == id && b.holds_room())
            .count();
        if active > 0 {
            return Err(BookingError::HostelHasActiveBookings { count: active }.into());
        }

        let room_ids: Vec<Uuid> = self
            .rooms
            .values()
            .filter(|r| r.hostel_id == id)
            .map(|r| r.id)
            .collect();
        let hostel = self
            .hostels
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("Hostel", id))?;

        let mut change = Change::new(hostel.clone()).touch(Collection::Hostels);
        for room_id in room_ids {
            self.rooms.remove(&room_id);
            change = change.touch(Collection::Rooms).record(AuditEntry::new(
                AuditEvent::RoomRemoved,
                room_id,
                format!("removed with hostel {}", id),
            ));
        }
        Ok(change.record(AuditEntry::new(
            AuditEvent::HostelDeleted,
            id,
            hostel.name,
        )))
    }

    // Rooms

    pub fn room(&self, id: Uuid) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn rooms_by_hostel(&self, hostel_id: Uuid, only_available: bool) -> Vec<Room> {
        sorted(
            self.rooms
                .values()
                .filter(|r| r.hostel_id == hostel_id && (!only_available || r.available)),
            |r| (r.created_at, r.id),
        )
    }

    /// Inserts or replaces a room; the stored availability flag is derived
    pub fn put_room(&mut self, mut room: Room) -> DomainResult<Change<Room>> {
        room.validate()?;
        if !self.hostels.contains_key(&room.hostel_id) {
            return Err(DomainError::not_found("Hostel", room.hostel_id));
        }
        room.available = !self.room_is_held(room.id, None);

        let entry = AuditEntry::new(
            AuditEvent::RoomSaved,
            room.id,
            format!(
                "{} room, capacity {}, {:.2}/h",
                room.room_type, room.capacity, room.price_per_hour
            ),
        );
        self.rooms.insert(room.id, room.clone());
        Ok(Change::new(room).touch(Collection::Rooms).record(entry))
    }

    // Bookings

    pub fn booking(&self, id: Uuid) -> Option<&Booking> {
        self.bookings.get(&id)
    }

    /// Matching bookings ordered by creation time, id as tie breaker
    pub fn query_bookings(&self, filter: &BookingFilter) -> Vec<Booking> {
        sorted(
            self.bookings.values().filter(|b| filter.matches(b)),
            |b| (b.created_at, b.id),
        )
    }

    /// Checks the room is free and inserts the booking in one step.
    ///
    /// The booking is priced from the room's hourly rate. Re-submitting a
    /// booking id that already exists for the same room and client is a
    /// no-op, which lets deferred reservations be replayed safely.
    pub fn reserve_room(&mut self, mut booking: Booking) -> DomainResult<Change<Booking>> {
        if let Some(existing) = self.bookings.get(&booking.id) {
            if existing.room_id == booking.room_id && existing.client_id == booking.client_id {
                return Ok(Change::new(existing.clone()));
            }
            return Err(DomainError::BusinessRule {
                message: format!("Booking id {} is already in use", booking.id),
            });
        }
        if booking.status != BookingStatus::Active {
            return Err(BookingError::InvalidTransition {
                from: booking.status,
                action: "reserve",
            }
            .into());
        }

        let room = self.resolve_room(&booking)?;
        let hostel = self
            .hostels
            .get(&booking.hostel_id)
            .ok_or_else(|| DomainError::not_found("Hostel", booking.hostel_id))?;
        if !hostel.active {
            return Err(BookingError::HostelSuspended.into());
        }
        if !self.users.contains_key(&booking.client_id) {
            return Err(DomainError::not_found("User", booking.client_id));
        }
        if !room.available || self.room_is_held(room.id, None) {
            return Err(BookingError::RoomUnavailable.into());
        }

        booking.reprice(room.price_per_hour)?;
        let entry = AuditEntry::new(
            AuditEvent::BookingCreated,
            booking.id,
            format!(
                "room {} for {} ({:.2})",
                booking.room_id,
                booking.client.full_name(),
                booking.total_price
            ),
        );
        let room_id = booking.room_id;
        self.bookings.insert(booking.id, booking.clone());

        let change = Change::new(booking)
            .touch(Collection::Bookings)
            .record(entry);
        Ok(self.with_availability(change, [room_id]))
    }

    /// Inserts or fully replaces a booking and re-derives room availability
    pub fn put_booking(&mut self, mut booking: Booking) -> DomainResult<Change<Booking>> {
        let room = self.resolve_room(&booking)?;
        if !self.users.contains_key(&booking.client_id) {
            return Err(DomainError::not_found("User", booking.client_id));
        }
        if let Some(rating) = booking.rating {
            super::entities::validate_rating(rating)?;
            if booking.status != BookingStatus::Completed {
                return Err(BookingError::NotRateable.into());
            }
        }
        if booking.holds_room() && self.room_is_held(room.id, Some(booking.id)) {
            return Err(BookingError::RoomUnavailable.into());
        }
        booking.reprice(room.price_per_hour)?;

        let previous_room = self.bookings.get(&booking.id).map(|b| b.room_id);
        let event = if previous_room.is_some() {
            AuditEvent::BookingUpdated
        } else {
            AuditEvent::BookingCreated
        };
        let entry = AuditEntry::new(
            event,
            booking.id,
            format!("{} / {}", booking.status, booking.payment_status),
        );
        let room_id = booking.room_id;
        self.bookings.insert(booking.id, booking.clone());

        let change = Change::new(booking)
            .touch(Collection::Bookings)
            .record(entry);
        let mut affected = vec![room_id];
        affected.extend(previous_room.filter(|id| *id != room_id));
        Ok(self.with_availability(change, affected))
    }

    /// Applies a state-machine transition to a stored booking
    pub fn update_booking(
        &mut self,
        id: Uuid,
        transition: &BookingTransition,
        now: DateTime<Utc>,
    ) -> DomainResult<Change<Booking>> {
        let mut booking = self
            .bookings
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Booking", id))?;
        let before = booking.status;
        booking.apply(transition, now)?;

        let (event, description) = if before != booking.status {
            (
                AuditEvent::BookingStatusChanged,
                format!("{} -> {}", before, booking.status),
            )
        } else {
            (
                AuditEvent::BookingUpdated,
                format!("{} ({})", transition.name(), booking.payment_status),
            )
        };
        let mut change = Change::new(booking.clone())
            .touch(Collection::Bookings)
            .record(AuditEntry::new(event, id, description));

        if matches!(transition, BookingTransition::ClearReview) {
            let before = self.reviews.len();
            self.reviews.retain(|_, r| r.booking_id != id);
            if self.reviews.len() != before {
                change = change.touch(Collection::Reviews);
            }
        }

        let room_id = booking.room_id;
        self.bookings.insert(id, booking);
        Ok(self.with_availability(change, [room_id]))
    }

    // Reviews

    pub fn review_for_booking(&self, booking_id: Uuid) -> Option<&Review> {
        self.reviews.values().find(|r| r.booking_id == booking_id)
    }

    /// Reviews for a hostel, newest first
    pub fn reviews_for_hostel(&self, hostel_id: Uuid) -> Vec<Review> {
        let mut reviews = sorted(
            self.reviews.values().filter(|r| r.hostel_id == hostel_id),
            |r| (r.created_at, r.id),
        );
        reviews.reverse();
        reviews
    }

    /// Stores a review and copies its rating and comment onto the booking.
    /// A booking accepts a single review.
    pub fn put_review(&mut self, review: Review) -> DomainResult<Change<Review>> {
        review.validate()?;
        let mut booking = self
            .bookings
            .get(&review.booking_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Booking", review.booking_id))?;
        if booking.client_id != review.client_id {
            return Err(BookingError::NotBookingOwner {
                client_id: review.client_id.to_string(),
            }
            .into());
        }
        if booking.hostel_id != review.hostel_id {
            return Err(DomainError::BusinessRule {
                message: format!(
                    "Review hostel {} does not match booking hostel {}",
                    review.hostel_id, booking.hostel_id
                ),
            });
        }
        if self.review_for_booking(booking.id).is_some() {
            return Err(BookingError::AlreadyReviewed.into());
        }
        booking.attach_review(review.rating, &review.comment, review.created_at)?;

        let events = [
            AuditEntry::new(
                AuditEvent::ReviewSaved,
                review.id,
                format!("rating {} for booking {}", review.rating, booking.id),
            ),
            AuditEntry::new(
                AuditEvent::BookingUpdated,
                booking.id,
                format!("rated {}", review.rating),
            ),
        ];
        self.bookings.insert(booking.id, booking);
        self.reviews.insert(review.id, review.clone());
        Ok(Change::new(review)
            .touch(Collection::Reviews)
            .touch(Collection::Bookings)
            .record_all(events))
    }

    // Invariants

    /// Re-derives every room's availability flag from the booking set
    pub fn reconcile_availability(&mut self) -> Vec<AuditEntry> {
        let room_ids: Vec<Uuid> = self.rooms.keys().copied().collect();
        room_ids
            .into_iter()
            .filter_map(|id| self.sync_room(id))
            .collect()
    }

    /// Human-readable descriptions of every broken invariant; empty when consistent
    pub fn check_invariants(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for room in self.rooms.values() {
            let held = self.room_is_held(room.id, None);
            if room.available == held {
                problems.push(format!(
                    "room {} available={} but held={}",
                    room.id, room.available, held
                ));
            }
            let holders = self
                .bookings
                .values()
                .filter(|b| b.room_id == room.id && b.holds_room())
                .count();
            if holders > 1 {
                problems.push(format!("room {} held by {} bookings", room.id, holders));
            }
        }

        for booking in self.bookings.values() {
            if booking.check_out <= booking.check_in {
                problems.push(format!("booking {} has an empty stay", booking.id));
            }
            if booking.rating.is_some() && booking.status != BookingStatus::Completed {
                problems.push(format!("booking {} rated before completion", booking.id));
            }
            if let (Some(room), Ok(hours)) =
                (self.rooms.get(&booking.room_id), booking.billable_hours())
            {
                let expected = room.price_for(hours);
                if (booking.total_price - expected).abs() > 1e-6 {
                    problems.push(format!(
                        "booking {} priced {} but expected {}",
                        booking.id, booking.total_price, expected
                    ));
                }
            }
        }

        problems
    }

    fn resolve_room(&self, booking: &Booking) -> DomainResult<Room> {
        let room = self
            .rooms
            .get(&booking.room_id)
            .ok_or_else(|| DomainError::not_found("Room", booking.room_id))?;
        if room.hostel_id != booking.hostel_id {
            return Err(BookingError::RoomNotInHostel {
                room_id: room.id.to_string(),
                hostel_id: booking.hostel_id.to_string(),
            }
            .into());
        }
        Ok(room.clone())
    }

    fn room_is_held(&self, room_id: Uuid, except: Option<Uuid>) -> bool {
        self.bookings
            .values()
            .any(|b| b.room_id == room_id && b.holds_room() && Some(b.id) != except)
    }

    /// Flips the room flag if it disagrees with the booking set
    fn sync_room(&mut self, room_id: Uuid) -> Option<AuditEntry> {
        let available = !self.room_is_held(room_id, None);
        let room = self.rooms.get_mut(&room_id)?;
        if room.available == available {
            return None;
        }
        room.available = available;
        Some(AuditEntry::new(
            AuditEvent::RoomAvailabilityChanged,
            room_id,
            if available { "available" } else { "unavailable" },
        ))
    }

    fn with_availability<T>(
        &mut self,
        change: Change<T>,
        rooms: impl IntoIterator<Item = Uuid>,
    ) -> Change<T> {
        let toggled: Vec<AuditEntry> = rooms
            .into_iter()
            .filter_map(|id| self.sync_room(id))
            .collect();
        if toggled.is_empty() {
            change
        } else {
            change.touch(Collection::Rooms).record_all(toggled)
        }
    }
}

fn duplicate(field: &str) -> DomainError {
    ValidationError::DuplicateValue {
        field: field.to_string(),
    }
    .into()
}

fn sorted<'a, T, K, I, F>(items: I, key: F) -> Vec<T>
where
    T: Clone + 'a,
    K: Ord,
    I: Iterator<Item = &'a T>,
    F: Fn(&T) -> K,
{
    let mut items: Vec<T> = items.cloned().collect();
    items.sort_by_key(|item| key(item));
    items
}
