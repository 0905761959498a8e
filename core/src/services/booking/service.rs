//! Booking service.
//!
//! Online, every operation goes straight to the entity store. Offline, the
//! mutation is queued on the sync queue and a local result is returned:
//! creations get a final id and an optimistic cache entry, transitions are
//! checked against the cached copy when one exists. Queued work replays the
//! exact online path, so guards and notifications run once it applies.
//! Every queued task for a booking shares one ordering key, so a change never
//! overtakes the creation it depends on.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::cache::BookingCache;
use super::config::BookingServiceConfig;
use super::types::{Actor, BookingReceipt, MutationOutcome, PriceQuote};
use crate::domain::entities::{
    billable_hours, Booking, BookingRequest, BookingStatus, BookingTransition, PaymentStatus,
};
use crate::domain::BookingFilter;
use crate::errors::{BookingError, DomainError, DomainResult};
use crate::repositories::EntityStore;
use crate::services::context::ServiceContext;
use crate::services::sync::SyncQueue;
use crate::services::traits::Notifier;

pub struct BookingService<S: EntityStore + 'static> {
    store: Arc<S>,
    queue: Arc<SyncQueue>,
    cache: Arc<BookingCache>,
    ctx: ServiceContext,
    config: BookingServiceConfig,
}

impl<S: EntityStore + 'static> BookingService<S> {
    pub fn new(
        store: Arc<S>,
        queue: Arc<SyncQueue>,
        cache: Arc<BookingCache>,
        ctx: ServiceContext,
        config: BookingServiceConfig,
    ) -> Self {
        Self {
            store,
            queue,
            cache,
            ctx,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<BookingCache> {
        &self.cache
    }

    pub fn queue(&self) -> &Arc<SyncQueue> {
        &self.queue
    }

    /// Price for a stay in a room
    pub async fn quote(
        &self,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> DomainResult<PriceQuote> {
        let hours = billable_hours(check_in, check_out)?;
        if !self.ctx.is_online() {
            return Err(DomainError::offline("quote"));
        }
        let room = self
            .store
            .find_room(room_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Room", room_id))?;
        Ok(PriceQuote {
            hours,
            price_per_hour: room.price_per_hour,
            total: room.price_for(hours),
        })
    }

    /// Books a room, or queues the booking when offline
    pub async fn create_booking(&self, request: BookingRequest) -> DomainResult<BookingReceipt> {
        let started = Instant::now();
        let booking = Booking::pending(request, self.ctx.clock.now())?;

        if !self.ctx.is_online() {
            warn!(
                booking_id = %booking.id,
                room_id = %booking.room_id,
                "Offline: booking accepted locally and queued"
            );
            return Ok(self.defer_creation(booking).await);
        }

        let receipt = match reserve(&*self.store, &self.cache, &*self.ctx.notifier, booking.clone()).await {
            Ok(saved) => {
                self.cache.push(saved.client_id, saved.clone()).await;
                info!(
                    booking_id = %saved.id,
                    room_id = %saved.room_id,
                    total = saved.total_price,
                    "Booking created"
                );
                BookingReceipt::Confirmed(saved)
            }
            Err(e) if e.is_persistence() => {
                warn!(booking_id = %booking.id, error = %e, "Booking not saved, queued for retry");
                self.defer_creation(booking).await
            }
            Err(e) => return Err(e),
        };

        let elapsed = started.elapsed();
        if elapsed > self.config.slow_operation_threshold {
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                "Booking creation exceeded {:?}",
                self.config.slow_operation_threshold
            );
        }
        Ok(receipt)
    }

    /// Cancels an active booking at least the lead time before check-in.
    /// The client is notified when a manager cancels.
    pub async fn cancel_booking(&self, id: Uuid, actor: Actor) -> DomainResult<MutationOutcome> {
        let transition = BookingTransition::Cancel {
            requested_at: self.ctx.clock.now(),
            lead: self.config.cancellation_lead,
        };
        self.transition(id, transition, actor).await
    }

    /// Guest checked in; payment becomes `Paid`
    pub async fn mark_in_service(&self, id: Uuid) -> DomainResult<MutationOutcome> {
        self.transition(id, BookingTransition::StartService, Actor::System)
            .await
    }

    pub async fn mark_completed(&self, id: Uuid) -> DomainResult<MutationOutcome> {
        self.transition(id, BookingTransition::Complete, Actor::System)
            .await
    }

    pub async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> DomainResult<MutationOutcome> {
        self.transition(id, BookingTransition::SetPayment(status), Actor::System)
            .await
    }

    /// Bookings of a client; served from the cache while offline
    pub async fn user_bookings(&self, user_id: Uuid) -> DomainResult<Vec<Booking>> {
        if !self.ctx.is_online() {
            return Ok(self.cache.get(user_id).await);
        }
        let bookings = self
            .store
            .query_bookings(BookingFilter::for_client(user_id))
            .await?;
        self.cache.cache(user_id, bookings.clone()).await;
        Ok(bookings)
    }

    pub async fn find_booking(&self, id: Uuid) -> DomainResult<Option<Booking>> {
        if !self.ctx.is_online() {
            return Ok(self.cache.get_booking(id).await);
        }
        self.store.find_booking(id).await
    }

    pub async fn hostel_bookings(&self, hostel_id: Uuid) -> DomainResult<Vec<Booking>> {
        if !self.ctx.is_online() {
            return Err(DomainError::offline("hostel bookings"));
        }
        self.store
            .query_bookings(BookingFilter::for_hostel(hostel_id))
            .await
    }

    /// Bookings of a hostel that still hold their room
    pub async fn active_hostel_bookings(&self, hostel_id: Uuid) -> DomainResult<Vec<Booking>> {
        let mut bookings = self.hostel_bookings(hostel_id).await?;
        bookings.retain(|b| b.status.holds_room());
        Ok(bookings)
    }

    async fn transition(
        &self,
        id: Uuid,
        transition: BookingTransition,
        actor: Actor,
    ) -> DomainResult<MutationOutcome> {
        let now = self.ctx.clock.now();

        if self.ctx.is_online() {
            let applied = apply_transition(
                &*self.store,
                &self.cache,
                &*self.ctx.notifier,
                id,
                &transition,
                actor,
                now,
            )
            .await;
            return match applied {
                Ok(booking) => Ok(MutationOutcome::Applied(booking)),
                Err(e) if e.is_persistence() => {
                    warn!(booking_id = %id, error = %e, "Booking change not saved, queued for retry");
                    Ok(self.defer_transition(id, transition, actor, now))
                }
                Err(e) => Err(e),
            };
        }

        // Reject early what the cached copy already shows to be illegal
        if let Some(mut cached) = self.cache.get_booking(id).await {
            authorize_client(&cached, actor)?;
            cached.apply(&transition, now)?;
            self.cache.refresh_booking(&cached).await;
        }
        warn!(booking_id = %id, action = transition.name(), "Offline: booking change queued");
        Ok(self.defer_transition(id, transition, actor, now))
    }

    async fn defer_creation(&self, booking: Booking) -> BookingReceipt {
        self.cache.push(booking.client_id, booking.clone()).await;

        let store = Arc::clone(&self.store);
        let cache = Arc::clone(&self.cache);
        let notifier = Arc::clone(&self.ctx.notifier);
        let pending = booking.clone();
        let description = format!("create booking {} for room {}", booking.id, booking.room_id);

        let task_id = self.queue.enqueue_keyed_fn(ordering_key(booking.id), description, move || {
            let store = Arc::clone(&store);
            let cache = Arc::clone(&cache);
            let notifier = Arc::clone(&notifier);
            let booking = pending.clone();
            async move {
                match reserve(&*store, &cache, &*notifier, booking.clone()).await {
                    Ok(_) => Ok(()),
                    Err(e) if !e.is_retryable() => {
                        cache.remove_booking(booking.client_id, booking.id).await;
                        notifier
                            .notify_client(
                                booking.client_id,
                                &format!("Your booking {} could not be confirmed: {}", booking.id, e),
                            )
                            .await;
                        Err(e)
                    }
                    Err(e) => Err(e),
                }
            }
        });

        BookingReceipt::Deferred { booking, task_id }
    }

    fn defer_transition(
        &self,
        id: Uuid,
        transition: BookingTransition,
        actor: Actor,
        requested_at: DateTime<Utc>,
    ) -> MutationOutcome {
        let store = Arc::clone(&self.store);
        let cache = Arc::clone(&self.cache);
        let notifier = Arc::clone(&self.ctx.notifier);
        let description = format!("{} booking {}", transition.name(), id);

        let task_id = self
            .queue
            .enqueue_keyed_fn(ordering_key(id), description.clone(), move || {
                let store = Arc::clone(&store);
                let cache = Arc::clone(&cache);
                let notifier = Arc::clone(&notifier);
                let transition = transition.clone();
                async move {
                    let applied = apply_transition(
                        &*store,
                        &cache,
                        &*notifier,
                        id,
                        &transition,
                        actor,
                        requested_at,
                    )
                    .await;
                    match applied {
                        Ok(_) => Ok(()),
                        Err(e) if !e.is_retryable() => {
                            abandon_change(&*store, &cache, &*notifier, id, &transition, actor, &e)
                                .await;
                            Err(e)
                        }
                        Err(e) => Err(e),
                    }
                }
            });

        MutationOutcome::Deferred {
            task_id,
            description,
        }
    }
}

/// Queue key shared by every deferred task touching one booking
pub(crate) fn ordering_key(booking_id: Uuid) -> String {
    format!("booking:{}", booking_id)
}

/// Resets the optimistic cache copy of a change that will never apply and
/// tells the client, and the manager who asked for it if any
async fn abandon_change<S: EntityStore + ?Sized>(
    store: &S,
    cache: &BookingCache,
    notifier: &dyn Notifier,
    id: Uuid,
    transition: &BookingTransition,
    actor: Actor,
    error: &DomainError,
) {
    let client_id = match store.find_booking(id).await {
        Ok(Some(current)) => {
            cache.refresh_booking(&current).await;
            Some(current.client_id)
        }
        Ok(None) => {
            let cached = cache.get_booking(id).await;
            if let Some(stale) = &cached {
                cache.remove_booking(stale.client_id, id).await;
            }
            cached.map(|b| b.client_id)
        }
        Err(e) => {
            warn!(booking_id = %id, error = %e, "Could not reload booking after a dropped change");
            cache.get_booking(id).await.map(|b| b.client_id)
        }
    };

    let message = format!("Could not {} booking {}: {}", transition.name(), id, error);
    if let Some(client_id) = client_id {
        notifier.notify_client(client_id, &message).await;
    }
    if let Actor::Manager(manager_id) = actor {
        notifier.notify_manager(manager_id, &message).await;
    }
}

/// Reserves the room, refreshes any cached copy and tells the manager
async fn reserve<S: EntityStore + ?Sized>(
    store: &S,
    cache: &BookingCache,
    notifier: &dyn Notifier,
    booking: Booking,
) -> DomainResult<Booking> {
    let saved = store.reserve_room(booking).await?;
    cache.refresh_booking(&saved).await;

    if let Some(hostel) = store.find_hostel(saved.hostel_id).await? {
        let message = format!(
            "New booking {} at {}: {} from {} to {}, total {:.2}",
            saved.id,
            hostel.name,
            saved.client.full_name(),
            saved.check_in.format("%Y-%m-%d %H:%M"),
            saved.check_out.format("%Y-%m-%d %H:%M"),
            saved.total_price
        );
        notifier.notify_manager(hostel.manager_id, &message).await;
    }
    Ok(saved)
}

async fn apply_transition<S: EntityStore + ?Sized>(
    store: &S,
    cache: &BookingCache,
    notifier: &dyn Notifier,
    id: Uuid,
    transition: &BookingTransition,
    actor: Actor,
    at: DateTime<Utc>,
) -> DomainResult<Booking> {
    let booking = store
        .find_booking(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Booking", id))?;
    authorize_client(&booking, actor)?;
    if let Actor::Manager(manager_id) = actor {
        let manages = store
            .find_hostel(booking.hostel_id)
            .await?
            .map_or(false, |h| h.manager_id == manager_id);
        if !manages {
            return Err(DomainError::BusinessRule {
                message: format!("Manager {} does not manage this hostel", manager_id),
            });
        }
    }

    let updated = store.update_booking(id, transition.clone(), at).await?;
    cache.refresh_booking(&updated).await;
    info!(
        booking_id = %id,
        action = transition.name(),
        status = %updated.status,
        payment = %updated.payment_status,
        "Booking updated"
    );

    if matches!(actor, Actor::Manager(_)) && updated.status == BookingStatus::Cancelled {
        notifier
            .notify_client(
                updated.client_id,
                &format!(
                    "Your booking {} for {} has been cancelled by the hostel",
                    updated.id,
                    updated.check_in.format("%Y-%m-%d %H:%M")
                ),
            )
            .await;
    }
    Ok(updated)
}

/// Clients may only cancel their own bookings
fn authorize_client(booking: &Booking, actor: Actor) -> DomainResult<()> {
    if let Actor::Client(client_id) = actor {
        if booking.client_id != client_id {
            return Err(BookingError::NotBookingOwner {
                client_id: client_id.to_string(),
            }
            .into());
        }
    }
    Ok(())
}
