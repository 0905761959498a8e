use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{Booking, User, UserType};

/// Result of a booking request
#[derive(Debug, Clone, PartialEq)]
pub enum BookingReceipt {
    /// Reserved in the store
    Confirmed(Booking),
    /// Accepted locally and queued; the id is final, the price is not yet known
    Deferred { booking: Booking, task_id: u64 },
}

impl BookingReceipt {
    pub fn booking(&self) -> &Booking {
        match self {
            Self::Confirmed(booking) | Self::Deferred { booking, .. } => booking,
        }
    }

    pub fn into_booking(self) -> Booking {
        match self {
            Self::Confirmed(booking) | Self::Deferred { booking, .. } => booking,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred { .. })
    }
}

/// Result of a status or payment change
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Applied(Booking),
    Deferred { task_id: u64, description: String },
}

impl MutationOutcome {
    pub fn applied(&self) -> Option<&Booking> {
        match self {
            Self::Applied(booking) => Some(booking),
            Self::Deferred { .. } => None,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred { .. })
    }
}

/// Who asked for a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Client(Uuid),
    Manager(Uuid),
    /// Background jobs and administrative cascades
    System,
}

impl Actor {
    pub fn from_user(user: &User) -> Self {
        match user.user_type() {
            UserType::Client => Self::Client(user.id),
            UserType::Manager => Self::Manager(user.id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceQuote {
    pub hours: i64,
    pub price_per_hour: f64,
    pub total: f64,
}
