//! Review entity left by a client for a completed booking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const MAX_COMMENT_LENGTH: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub client_id: Uuid,
    pub hostel_id: Uuid,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        booking_id: Uuid,
        client_id: Uuid,
        hostel_id: Uuid,
        rating: u8,
        comment: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let review = Self {
            id: Uuid::new_v4(),
            booking_id,
            client_id,
            hostel_id,
            rating,
            comment: comment.into().trim().to_string(),
            created_at: now,
        };
        review.validate()?;
        Ok(review)
    }

    /// Rating range and comment length
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_rating(self.rating)?;
        if self.comment.chars().count() > MAX_COMMENT_LENGTH {
            return Err(ValidationError::length("comment", 0, MAX_COMMENT_LENGTH));
        }
        Ok(())
    }
}

pub fn validate_rating(rating: u8) -> Result<(), ValidationError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::out_of_range("rating", MIN_RATING, MAX_RATING))
    }
}
