//! Ledger-backed entity store with write-ahead durability.
//!
//! Every mutation runs against a staged copy of the ledger while the store
//! lock is held. The touched documents are flushed from the staged copy and
//! the copy replaces the live ledger only after the flush succeeds, so a
//! failed write leaves memory and disk exactly as they were.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::{EntityStore, LedgerPersistence};
use crate::domain::entities::{Booking, BookingTransition, Hostel, Review, Room, User};
use crate::domain::{BookingFilter, Change, Ledger, LedgerStats};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::audit::AuditTrail;

const DEFAULT_SLOW_WRITE: Duration = Duration::from_secs(2);

pub struct LedgerStore<P: LedgerPersistence> {
    ledger: Mutex<Ledger>,
    persistence: P,
    audit: Arc<dyn AuditTrail>,
    operations: AtomicU64,
    slow_write: Duration,
}

impl<P: LedgerPersistence> LedgerStore<P> {
    pub fn new(ledger: Ledger, persistence: P, audit: Arc<dyn AuditTrail>) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            persistence,
            audit,
            operations: AtomicU64::new(0),
            slow_write: DEFAULT_SLOW_WRITE,
        }
    }

    /// Flushes slower than `threshold` are logged as warnings
    pub fn with_slow_write_threshold(mut self, threshold: Duration) -> Self {
        self.slow_write = threshold;
        self
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Copy of the current ledger
    pub async fn snapshot(&self) -> Ledger {
        self.ledger.lock().await.clone()
    }

    /// Number of committed mutations since the store was opened
    pub fn operations(&self) -> u64 {
        self.operations.load(Ordering::Relaxed)
    }

    async fn read<T>(&self, f: impl FnOnce(&Ledger) -> T) -> DomainResult<T> {
        let ledger = self.ledger.lock().await;
        Ok(f(&ledger))
    }

    async fn mutate<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut Ledger) -> DomainResult<Change<T>>,
    ) -> DomainResult<T> {
        let mut live = self.ledger.lock().await;
        let mut staged = live.clone();

        let change = match f(&mut staged) {
            Ok(change) => change,
            Err(e) => {
                debug!(operation, error = %e, "Store mutation rejected");
                return Err(e);
            }
        };
        if change.is_noop() {
            return Ok(change.value);
        }

        let started = Instant::now();
        if let Err(e) = self.persistence.flush(&staged, &change.touched).await {
            error!(
                operation,
                error = %e,
                event = "flush_failed",
                "Failed to persist store mutation; in-memory state unchanged"
            );
            return Err(e);
        }
        let elapsed = started.elapsed();
        if elapsed > self.slow_write {
            warn!(
                operation,
                elapsed_ms = elapsed.as_millis() as u64,
                "Slow store write"
            );
        }

        *live = staged;
        self.operations.fetch_add(1, Ordering::Relaxed);

        // Appended under the lock so the trail keeps commit order
        if let Err(e) = self.audit.append(&change.events).await {
            warn!(operation, error = %e, "Failed to append audit entries");
        }
        Ok(change.value)
    }
}

#[async_trait]
impl<P: LedgerPersistence> EntityStore for LedgerStore<P> {
    async fn put_user(&self, user: User) -> Result<User, DomainError> {
        self.mutate("put_user", |l| l.put_user(user)).await
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.read(|l| l.user(id).cloned()).await
    }

    async fn find_user_by_credential(&self, key: &str) -> Result<Option<User>, DomainError> {
        self.read(|l| l.find_user_by_credential(key).cloned()).await
    }

    async fn put_hostel(&self, hostel: Hostel) -> Result<Hostel, DomainError> {
        self.mutate("put_hostel", |l| l.put_hostel(hostel)).await
    }

    async fn find_hostel(&self, id: Uuid) -> Result<Option<Hostel>, DomainError> {
        self.read(|l| l.hostel(id).cloned()).await
    }

    async fn hostels_by_manager(&self, manager_id: Uuid) -> Result<Vec<Hostel>, DomainError> {
        self.read(|l| l.hostels_by_manager(manager_id)).await
    }

    async fn search_hostels(&self, city: &str, query: &str) -> Result<Vec<Hostel>, DomainError> {
        self.read(|l| l.search_hostels(city, query)).await
    }

    async fn delete_hostel(&self, id: Uuid) -> Result<Hostel, DomainError> {
        self.mutate("delete_hostel", |l| l.delete_hostel(id)).await
    }

    async fn put_room(&self, room: Room) -> Result<Room, DomainError> {
        self.mutate("put_room", |l| l.put_room(room)).await
    }

    async fn find_room(&self, id: Uuid) -> Result<Option<Room>, DomainError> {
        self.read(|l| l.room(id).cloned()).await
    }

    async fn rooms_by_hostel(
        &self,
        hostel_id: Uuid,
        only_available: bool,
    ) -> Result<Vec<Room>, DomainError> {
        self.read(|l| l.rooms_by_hostel(hostel_id, only_available))
            .await
    }

    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, DomainError> {
        self.read(|l| l.booking(id).cloned()).await
    }

    async fn query_bookings(&self, filter: BookingFilter) -> Result<Vec<Booking>, DomainError> {
        self.read(|l| l.query_bookings(&filter)).await
    }

    async fn reserve_room(&self, booking: Booking) -> Result<Booking, DomainError> {
        self.mutate("reserve_room", |l| l.reserve_room(booking)).await
    }

    async fn put_booking(&self, booking: Booking) -> Result<Booking, DomainError> {
        self.mutate("put_booking", |l| l.put_booking(booking)).await
    }

    async fn update_booking(
        &self,
        id: Uuid,
        transition: BookingTransition,
        at: DateTime<Utc>,
    ) -> Result<Booking, DomainError> {
        self.mutate("update_booking", |l| l.update_booking(id, &transition, at))
            .await
    }

    async fn put_review(&self, review: Review) -> Result<Review, DomainError> {
        self.mutate("put_review", |l| l.put_review(review)).await
    }

    async fn reviews_for_hostel(&self, hostel_id: Uuid) -> Result<Vec<Review>, DomainError> {
        self.read(|l| l.reviews_for_hostel(hostel_id)).await
    }

    async fn review_for_booking(&self, booking_id: Uuid) -> Result<Option<Review>, DomainError> {
        self.read(|l| l.review_for_booking(booking_id).cloned())
            .await
    }

    async fn stats(&self) -> Result<LedgerStats, DomainError> {
        let mut stats = self.read(|l| l.stats()).await?;
        stats.operations = self.operations();
        Ok(stats)
    }
}
