use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::{validate_rating, Review};
use crate::errors::{BookingError, DomainError, DomainResult};
use crate::repositories::EntityStore;
use crate::services::booking::{ordering_key, BookingCache};
use crate::services::context::ServiceContext;
use crate::services::sync::SyncQueue;
use crate::services::traits::Notifier;

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    Saved(Review),
    /// Offline; the review is stored once the queue drains
    Deferred { review_id: Uuid, task_id: u64 },
}

impl ReviewOutcome {
    pub fn review_id(&self) -> Uuid {
        match self {
            Self::Saved(review) => review.id,
            Self::Deferred { review_id, .. } => *review_id,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred { .. })
    }
}

pub struct ReviewService<S: EntityStore + 'static> {
    store: Arc<S>,
    queue: Arc<SyncQueue>,
    cache: Arc<BookingCache>,
    ctx: ServiceContext,
}

impl<S: EntityStore + 'static> ReviewService<S> {
    pub fn new(
        store: Arc<S>,
        queue: Arc<SyncQueue>,
        cache: Arc<BookingCache>,
        ctx: ServiceContext,
    ) -> Self {
        Self {
            store,
            queue,
            cache,
            ctx,
        }
    }

    /// Rates a completed booking. One review per booking.
    pub async fn submit_review(
        &self,
        booking_id: Uuid,
        client_id: Uuid,
        rating: u8,
        comment: &str,
    ) -> DomainResult<ReviewOutcome> {
        let now = self.ctx.clock.now();
        let review_id = Uuid::new_v4();

        if self.ctx.is_online() {
            return match save_review(
                &*self.store,
                &self.cache,
                &*self.ctx.notifier,
                review_id,
                booking_id,
                client_id,
                rating,
                comment,
                now,
            )
            .await
            {
                Ok(review) => Ok(ReviewOutcome::Saved(review)),
                Err(e) if e.is_persistence() => {
                    warn!(booking_id = %booking_id, error = %e, "Review not saved, queued for retry");
                    Ok(self.defer(review_id, booking_id, client_id, rating, comment, now))
                }
                Err(e) => Err(e),
            };
        }

        // Check what can be checked locally before accepting it
        if let Some(mut cached) = self.cache.get_booking(booking_id).await {
            let review = Review::new(booking_id, client_id, cached.hostel_id, rating, comment, now)?;
            if cached.client_id != client_id {
                return Err(BookingError::NotBookingOwner {
                    client_id: client_id.to_string(),
                }
                .into());
            }
            cached.attach_review(review.rating, &review.comment, now)?;
            self.cache.refresh_booking(&cached).await;
        } else {
            validate_rating(rating)?;
        }

        warn!(booking_id = %booking_id, "Offline: review queued");
        Ok(self.defer(review_id, booking_id, client_id, rating, comment, now))
    }

    pub async fn reviews_for_hostel(&self, hostel_id: Uuid) -> DomainResult<Vec<Review>> {
        self.store.reviews_for_hostel(hostel_id).await
    }

    /// Mean rating of a hostel, 0.0 when it has no reviews
    pub async fn average_rating(&self, hostel_id: Uuid) -> DomainResult<f64> {
        let reviews = self.store.reviews_for_hostel(hostel_id).await?;
        if reviews.is_empty() {
            return Ok(0.0);
        }
        let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
        Ok(f64::from(total) / reviews.len() as f64)
    }

    fn defer(
        &self,
        review_id: Uuid,
        booking_id: Uuid,
        client_id: Uuid,
        rating: u8,
        comment: &str,
        requested_at: DateTime<Utc>,
    ) -> ReviewOutcome {
        let store = Arc::clone(&self.store);
        let cache = Arc::clone(&self.cache);
        let notifier = Arc::clone(&self.ctx.notifier);
        let comment = comment.to_string();

        // Keyed with the booking so a queued completion lands first
        let task_id = self.queue.enqueue_keyed_fn(
            ordering_key(booking_id),
            format!("review booking {}", booking_id),
            move || {
                let store = Arc::clone(&store);
                let cache = Arc::clone(&cache);
                let notifier = Arc::clone(&notifier);
                let comment = comment.clone();
                async move {
                    let saved = save_review(
                        &*store,
                        &cache,
                        &*notifier,
                        review_id,
                        booking_id,
                        client_id,
                        rating,
                        &comment,
                        requested_at,
                    )
                    .await;
                    match saved {
                        Ok(_) => Ok(()),
                        Err(e) if !e.is_retryable() => {
                            if let Ok(Some(current)) = store.find_booking(booking_id).await {
                                cache.refresh_booking(&current).await;
                            }
                            notifier
                                .notify_client(
                                    client_id,
                                    &format!("Your review of booking {} was not saved: {}", booking_id, e),
                                )
                                .await;
                            Err(e)
                        }
                        Err(e) => Err(e),
                    }
                }
            },
        );

        ReviewOutcome::Deferred { review_id, task_id }
    }
}

#[allow(clippy::too_many_arguments)]
async fn save_review<S: EntityStore + ?Sized>(
    store: &S,
    cache: &BookingCache,
    notifier: &dyn Notifier,
    review_id: Uuid,
    booking_id: Uuid,
    client_id: Uuid,
    rating: u8,
    comment: &str,
    at: DateTime<Utc>,
) -> DomainResult<Review> {
    // Replay of a review that already went through
    if let Some(existing) = store.review_for_booking(booking_id).await? {
        if existing.id == review_id {
            return Ok(existing);
        }
    }

    let booking = store
        .find_booking(booking_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Booking", booking_id))?;
    let mut review = Review::new(booking_id, client_id, booking.hostel_id, rating, comment, at)?;
    review.id = review_id;

    let review = store.put_review(review).await?;
    if let Some(updated) = store.find_booking(booking_id).await? {
        cache.refresh_booking(&updated).await;
    }
    info!(review_id = %review.id, booking_id = %booking_id, rating = review.rating, "Review saved");

    if let Some(hostel) = store.find_hostel(booking.hostel_id).await? {
        notifier
            .notify_manager(
                hostel.manager_id,
                &format!("New {}-star review for {}", review.rating, hostel.name),
            )
            .await;
    }
    Ok(review)
}
