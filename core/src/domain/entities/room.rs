//! Room entity belonging to a hostel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

pub const MIN_CAPACITY: u32 = 1;
pub const MAX_CAPACITY: u32 = 20;
pub const MIN_PRICE_PER_HOUR: f64 = 1.0;
pub const MAX_PRICE_PER_HOUR: f64 = 1000.0;

/// Kind of room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Private,
    Shared,
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomType::Private => write!(f, "private"),
            RoomType::Shared => write!(f, "shared"),
        }
    }
}

/// Editable room fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomDraft {
    pub room_type: RoomType,
    pub capacity: u32,
    pub price_per_hour: f64,
}

impl RoomDraft {
    pub fn new(room_type: RoomType, capacity: u32, price_per_hour: f64) -> Self {
        Self {
            room_type,
            capacity,
            price_per_hour,
        }
    }

    /// Checks capacity and price ranges
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&self.capacity) {
            return Err(ValidationError::out_of_range(
                "capacity",
                MIN_CAPACITY,
                MAX_CAPACITY,
            ));
        }
        if !self.price_per_hour.is_finite()
            || !(MIN_PRICE_PER_HOUR..=MAX_PRICE_PER_HOUR).contains(&self.price_per_hour)
        {
            return Err(ValidationError::out_of_range(
                "price_per_hour",
                MIN_PRICE_PER_HOUR,
                MAX_PRICE_PER_HOUR,
            ));
        }
        Ok(())
    }
}

/// Room entity
///
/// `available` is derived from the booking set and maintained by the store;
/// callers never set it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub hostel_id: Uuid,
    pub room_type: RoomType,
    pub capacity: u32,
    pub price_per_hour: f64,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(
        hostel_id: Uuid,
        draft: RoomDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            hostel_id,
            room_type: draft.room_type,
            capacity: draft.capacity,
            price_per_hour: draft.price_per_hour,
            available: true,
            created_at: now,
        })
    }

    /// Replaces type, capacity and price; availability is untouched
    pub fn apply(&mut self, draft: RoomDraft) -> Result<(), ValidationError> {
        draft.validate()?;
        self.room_type = draft.room_type;
        self.capacity = draft.capacity;
        self.price_per_hour = draft.price_per_hour;
        Ok(())
    }

    /// Re-checks the stored ranges, used when a room is written
    pub fn validate(&self) -> Result<(), ValidationError> {
        RoomDraft::new(self.room_type, self.capacity, self.price_per_hour).validate()
    }

    pub fn price_for(&self, hours: i64) -> f64 {
        self.price_per_hour * hours as f64
    }
}
