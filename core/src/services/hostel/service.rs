use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::{BookingStatus, BookingTransition, Hostel, HostelDraft, Room, RoomDraft};
use crate::domain::BookingFilter;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::EntityStore;
use crate::services::context::ServiceContext;

/// Outcome of suspending a hostel
#[derive(Debug, Clone, PartialEq)]
pub struct SuspensionReport {
    pub hostel: Hostel,
    /// Active bookings cancelled by the suspension
    pub cancelled: Vec<Uuid>,
}

pub struct HostelService<S: EntityStore + 'static> {
    store: Arc<S>,
    ctx: ServiceContext,
}

impl<S: EntityStore + 'static> HostelService<S> {
    pub fn new(store: Arc<S>, ctx: ServiceContext) -> Self {
        Self { store, ctx }
    }

    pub async fn create_hostel(&self, manager_id: Uuid, draft: HostelDraft) -> DomainResult<Hostel> {
        let hostel = Hostel::new(draft, manager_id, self.ctx.clock.now())?;
        let hostel = self.store.put_hostel(hostel).await?;
        info!(hostel_id = %hostel.id, manager_id = %manager_id, "Hostel created: {}", hostel.name);
        Ok(hostel)
    }

    pub async fn update_hostel(
        &self,
        hostel_id: Uuid,
        manager_id: Uuid,
        draft: HostelDraft,
    ) -> DomainResult<Hostel> {
        let mut hostel = self.owned_hostel(hostel_id, manager_id).await?;
        hostel.apply(draft, self.ctx.clock.now())?;
        self.store.put_hostel(hostel).await
    }

    pub async fn find_hostel(&self, id: Uuid) -> DomainResult<Option<Hostel>> {
        self.store.find_hostel(id).await
    }

    pub async fn hostels_by_manager(&self, manager_id: Uuid) -> DomainResult<Vec<Hostel>> {
        self.store.hostels_by_manager(manager_id).await
    }

    /// Active hostels in a city, optionally narrowed by a name/address fragment
    pub async fn search_hostels(&self, city: &str, query: &str) -> DomainResult<Vec<Hostel>> {
        self.store.search_hostels(city, query).await
    }

    /// Stops new bookings, cancels active ones and notifies their clients.
    /// Guests already in service keep their stay.
    pub async fn suspend_hostel(&self, hostel_id: Uuid, manager_id: Uuid) -> DomainResult<SuspensionReport> {
        let mut hostel = self.owned_hostel(hostel_id, manager_id).await?;
        let now = self.ctx.clock.now();
        hostel.suspend(now);
        let hostel = self.store.put_hostel(hostel).await?;

        let active = self
            .store
            .query_bookings(BookingFilter::for_hostel(hostel_id).with_status(BookingStatus::Active))
            .await?;

        let mut cancelled = Vec::with_capacity(active.len());
        for booking in active {
            match self
                .store
                .update_booking(booking.id, BookingTransition::ForceCancel, now)
                .await
            {
                Ok(booking) => {
                    self.ctx
                        .notifier
                        .notify_client(
                            booking.client_id,
                            &format!(
                                "Your booking {} was cancelled because {} is temporarily closed",
                                booking.id, hostel.name
                            ),
                        )
                        .await;
                    cancelled.push(booking.id);
                }
                Err(e) => {
                    warn!(booking_id = %booking.id, error = %e, "Failed to cancel booking of suspended hostel");
                }
            }
        }

        info!(
            hostel_id = %hostel_id,
            cancelled = cancelled.len(),
            "Hostel suspended"
        );
        Ok(SuspensionReport { hostel, cancelled })
    }

    pub async fn activate_hostel(&self, hostel_id: Uuid, manager_id: Uuid) -> DomainResult<Hostel> {
        let mut hostel = self.owned_hostel(hostel_id, manager_id).await?;
        hostel.activate(self.ctx.clock.now());
        let hostel = self.store.put_hostel(hostel).await?;
        info!(hostel_id = %hostel_id, "Hostel activated");
        Ok(hostel)
    }

    /// Deletes a hostel with no active bookings, together with its rooms
    pub async fn delete_hostel(&self, hostel_id: Uuid, manager_id: Uuid) -> DomainResult<Hostel> {
        self.owned_hostel(hostel_id, manager_id).await?;
        let hostel = self.store.delete_hostel(hostel_id).await?;
        info!(hostel_id = %hostel_id, "Hostel deleted: {}", hostel.name);
        Ok(hostel)
    }

    pub async fn add_room(&self, hostel_id: Uuid, manager_id: Uuid, draft: RoomDraft) -> DomainResult<Room> {
        self.owned_hostel(hostel_id, manager_id).await?;
        let room = Room::new(hostel_id, draft, self.ctx.clock.now())?;
        self.store.put_room(room).await
    }

    /// Changes type, capacity or price; existing bookings keep their price
    pub async fn update_room(&self, room_id: Uuid, manager_id: Uuid, draft: RoomDraft) -> DomainResult<Room> {
        let mut room = self
            .store
            .find_room(room_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Room", room_id))?;
        self.owned_hostel(room.hostel_id, manager_id).await?;
        room.apply(draft)?;
        self.store.put_room(room).await
    }

    pub async fn rooms_by_hostel(&self, hostel_id: Uuid, only_available: bool) -> DomainResult<Vec<Room>> {
        self.store.rooms_by_hostel(hostel_id, only_available).await
    }

    async fn owned_hostel(&self, hostel_id: Uuid, manager_id: Uuid) -> DomainResult<Hostel> {
        let hostel = self
            .store
            .find_hostel(hostel_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Hostel", hostel_id))?;
        if hostel.manager_id != manager_id {
            return Err(DomainError::BusinessRule {
                message: format!("Manager {} does not own hostel {}", manager_id, hostel_id),
            });
        }
        Ok(hostel)
    }
}
