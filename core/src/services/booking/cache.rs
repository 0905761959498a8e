//! Per-user booking cache serving reads while offline.
//!
//! Holds read copies only; the entity store stays the record of truth.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::Booking;

#[derive(Debug, Default)]
struct CacheState {
    by_user: HashMap<Uuid, Vec<Booking>>,
    by_id: HashMap<Uuid, Booking>,
}

impl CacheState {
    fn unindex(&mut self, user_id: Uuid) {
        if let Some(previous) = self.by_user.get(&user_id) {
            for booking in previous {
                self.by_id.remove(&booking.id);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct BookingCache {
    state: RwLock<CacheState>,
}

impl BookingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the user's list and re-indexes every booking by id
    pub async fn cache(&self, user_id: Uuid, bookings: Vec<Booking>) {
        let mut state = self.state.write().await;
        state.unindex(user_id);
        for booking in &bookings {
            state.by_id.insert(booking.id, booking.clone());
        }
        state.by_user.insert(user_id, bookings);
    }

    /// Last cached list, empty if never cached
    pub async fn get(&self, user_id: Uuid) -> Vec<Booking> {
        self.state
            .read()
            .await
            .by_user
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> Option<Booking> {
        self.state.read().await.by_id.get(&booking_id).cloned()
    }

    /// Appends an optimistic entry, replacing one with the same id
    pub async fn push(&self, user_id: Uuid, booking: Booking) {
        let mut state = self.state.write().await;
        state.by_id.insert(booking.id, booking.clone());
        let list = state.by_user.entry(user_id).or_default();
        match list.iter_mut().find(|b| b.id == booking.id) {
            Some(existing) => *existing = booking,
            None => list.push(booking),
        }
    }

    /// Updates a booking wherever it is cached; unknown ids are ignored
    pub async fn refresh_booking(&self, booking: &Booking) {
        let mut state = self.state.write().await;
        if !state.by_id.contains_key(&booking.id) {
            return;
        }
        state.by_id.insert(booking.id, booking.clone());
        if let Some(list) = state.by_user.get_mut(&booking.client_id) {
            if let Some(existing) = list.iter_mut().find(|b| b.id == booking.id) {
                *existing = booking.clone();
            }
        }
    }

    /// Drops one booking from a user's list
    pub async fn remove_booking(&self, user_id: Uuid, booking_id: Uuid) {
        let mut state = self.state.write().await;
        state.by_id.remove(&booking_id);
        if let Some(list) = state.by_user.get_mut(&user_id) {
            list.retain(|b| b.id != booking_id);
        }
    }

    pub async fn invalidate(&self, user_id: Uuid) {
        let mut state = self.state.write().await;
        state.unindex(user_id);
        state.by_user.remove(&user_id);
    }

    pub async fn invalidate_all(&self) {
        let mut state = self.state.write().await;
        state.by_user.clear();
        state.by_id.clear();
    }

    /// Whether a list has been cached for the user
    pub async fn is_loaded(&self, user_id: Uuid) -> bool {
        self.state.read().await.by_user.contains_key(&user_id)
    }

    /// Number of indexed bookings
    pub async fn len(&self) -> usize {
        self.state.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{BookingRequest, ClientContact};
    use chrono::{Duration, Utc};

    fn booking(client_id: Uuid) -> Booking {
        let now = Utc::now();
        Booking::pending(
            BookingRequest {
                client_id,
                contact: ClientContact {
                    first_name: "Olena".into(),
                    last_name: "Koval".into(),
                    phone: "+380501234567".into(),
                    email: "olena@example.com".into(),
                },
                hostel_id: Uuid::new_v4(),
                room_id: Uuid::new_v4(),
                check_in: now + Duration::days(1),
                check_out: now + Duration::days(2),
            },
            now,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_cache_replaces_previous_list() {
        let cache = BookingCache::new();
        let user = Uuid::new_v4();
        let old = booking(user);
        let new = booking(user);

        cache.cache(user, vec![old.clone()]).await;
        cache.cache(user, vec![new.clone()]).await;

        assert_eq!(cache.get(user).await, vec![new.clone()]);
        assert!(cache.get_booking(old.id).await.is_none());
        assert_eq!(cache.get_booking(new.id).await, Some(new));
    }

    #[tokio::test]
    async fn test_unknown_user_is_empty() {
        let cache = BookingCache::new();
        let user = Uuid::new_v4();
        assert!(cache.get(user).await.is_empty());
        assert!(!cache.is_loaded(user).await);
    }

    #[tokio::test]
    async fn test_push_and_refresh() {
        let cache = BookingCache::new();
        let user = Uuid::new_v4();
        let mut pending = booking(user);
        cache.push(user, pending.clone()).await;
        assert!(cache.is_loaded(user).await);

        pending.total_price = 6900.0;
        cache.refresh_booking(&pending).await;
        assert_eq!(cache.get(user).await[0].total_price, 6900.0);
        assert_eq!(cache.get_booking(pending.id).await.unwrap().total_price, 6900.0);

        // refreshing something never cached is ignored
        cache.refresh_booking(&booking(user)).await;
        assert_eq!(cache.len().await, 1);

        cache.remove_booking(user, pending.id).await;
        assert!(cache.get(user).await.is_empty());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = BookingCache::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        cache.cache(alice, vec![booking(alice)]).await;
        cache.cache(bob, vec![booking(bob), booking(bob)]).await;
        assert_eq!(cache.len().await, 3);

        cache.invalidate(alice).await;
        assert!(!cache.is_loaded(alice).await);
        assert_eq!(cache.len().await, 2);

        cache.invalidate_all().await;
        assert!(cache.is_empty().await);
        assert!(!cache.is_loaded(bob).await);
    }
}
