//! Booking and validation error types
//!
//! `BookingError` names every guard of the booking state machine and of room
//! reservation; `ValidationError` covers malformed input rejected at the
//! boundary that constructs or mutates an entity.

use thiserror::Error;

use crate::domain::entities::booking::BookingStatus;

/// Booking guard and state-machine violations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookingError {
    #[error("Check-out must be after check-in")]
    InvalidDateRange,

    #[error("Room is not available")]
    RoomUnavailable,

    #[error("Room {room_id} does not belong to hostel {hostel_id}")]
    RoomNotInHostel { room_id: String, hostel_id: String },

    #[error("Hostel is suspended and does not accept bookings")]
    HostelSuspended,

    #[error("Cancellation window closed: check-in is less than {lead_hours} hours away")]
    CancellationWindowClosed { lead_hours: i64 },

    #[error("Cannot {action} a booking in status {from}")]
    InvalidTransition {
        from: BookingStatus,
        action: &'static str,
    },

    #[error("Booking cannot be rated until it is completed")]
    NotRateable,

    #[error("Booking has already been reviewed")]
    AlreadyReviewed,

    #[error("Booking does not belong to client {client_id}")]
    NotBookingOwner { client_id: String },

    #[error("Hostel still has {count} active booking(s)")]
    HostelHasActiveBookings { count: usize },
}

/// Validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Out of range: {field} (min: {min}, max: {max})")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    #[error("Invalid length: {field} (expected {min}..={max} characters)")]
    InvalidLength { field: String, min: usize, max: usize },

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Invalid phone number")]
    InvalidPhone,

    #[error("Password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("Duplicate value: {field}")]
    DuplicateValue { field: String },
}

impl ValidationError {
    pub(crate) fn out_of_range(field: &str, min: impl ToString, max: impl ToString) -> Self {
        Self::OutOfRange {
            field: field.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    pub(crate) fn length(field: &str, min: usize, max: usize) -> Self {
        Self::InvalidLength {
            field: field.to_string(),
            min,
            max,
        }
    }

    pub(crate) fn required(field: &str) -> Self {
        Self::RequiredField {
            field: field.to_string(),
        }
    }
}
