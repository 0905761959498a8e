//! Booking aggregate and its state machine.
//!
//! Status and payment status are orthogonal attributes. Every legal move is a
//! [`BookingTransition`] applied through [`Booking::apply`]; a guard violation
//! leaves the booking untouched and reports a [`BookingError`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{Role, User};
use crate::errors::BookingError;

/// Minimum gap before check-in required for a client cancellation
pub const DEFAULT_CANCELLATION_LEAD_HOURS: i64 = 2;

/// Every booking is charged for at least this many hours
pub const MIN_BILLABLE_HOURS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Active,
    InService,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Whether a booking in this status reserves its room
    pub fn holds_room(&self) -> bool {
        matches!(self, Self::Active | Self::InService)
    }

    /// No status transition leaves a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::InService => "in_service",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unpaid => write!(f, "unpaid"),
            Self::PartiallyPaid => write!(f, "partially_paid"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

/// Client contact details copied into the booking at creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContact {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

impl ClientContact {
    pub fn from_user(user: &User) -> Self {
        let (first_name, last_name) = match &user.role {
            Role::Client {
                first_name,
                last_name,
            } => (first_name.clone(), last_name.clone()),
            Role::Manager => (String::new(), String::new()),
        };
        Self {
            first_name,
            last_name,
            phone: user.phone.clone(),
            email: user.email.clone(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Everything a client supplies to book a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub client_id: Uuid,
    pub contact: ClientContact,
    pub hostel_id: Uuid,
    pub room_id: Uuid,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
}

impl BookingRequest {
    pub fn for_client(
        client: &User,
        hostel_id: Uuid,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> Self {
        Self {
            client_id: client.id,
            contact: ClientContact::from_user(client),
            hostel_id,
            room_id,
            check_in,
            check_out,
        }
    }
}

/// Number of hours charged for a stay: partial hours round up, minimum one hour
pub fn billable_hours(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
) -> Result<i64, BookingError> {
    if check_out <= check_in {
        return Err(BookingError::InvalidDateRange);
    }
    let seconds = (check_out - check_in).num_seconds();
    let hours = (seconds + 3599) / 3600;
    Ok(hours.max(MIN_BILLABLE_HOURS))
}

/// A status or payment move on an existing booking
#[derive(Debug, Clone, PartialEq)]
pub enum BookingTransition {
    /// Client or manager cancellation, subject to the lead-time window
    Cancel {
        requested_at: DateTime<Utc>,
        lead: Duration,
    },
    /// Administrative cancellation (hostel suspension) with no lead-time guard
    ForceCancel,
    /// Guest checked in; payment is forced to `Paid`
    StartService,
    Complete,
    SetPayment(PaymentStatus),
    /// Removes an attached rating so the booking can be reviewed again
    ClearReview,
}

impl BookingTransition {
    pub fn cancel(requested_at: DateTime<Utc>) -> Self {
        Self::Cancel {
            requested_at,
            lead: Duration::hours(DEFAULT_CANCELLATION_LEAD_HOURS),
        }
    }

    /// Short name used in logs and audit descriptions
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cancel { .. } => "cancel",
            Self::ForceCancel => "force-cancel",
            Self::StartService => "start service for",
            Self::Complete => "complete",
            Self::SetPayment(_) => "update payment of",
            Self::ClearReview => "clear review of",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub hostel_id: Uuid,
    pub room_id: Uuid,
    pub client_id: Uuid,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub total_price: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub client: ClientContact,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub review: Option<String>,
}

impl Booking {
    /// Creates an `Active`/`Unpaid` booking priced at `price_per_hour`
    pub fn new(
        request: BookingRequest,
        price_per_hour: f64,
        now: DateTime<Utc>,
    ) -> Result<Self, BookingError> {
        let mut booking = Self::pending(request, now)?;
        booking.reprice(price_per_hour)?;
        Ok(booking)
    }

    /// Creates an unpriced booking with a locally assigned id; the store
    /// prices it when the reservation is applied
    pub fn pending(request: BookingRequest, now: DateTime<Utc>) -> Result<Self, BookingError> {
        billable_hours(request.check_in, request.check_out)?;
        Ok(Self {
            id: Uuid::new_v4(),
            hostel_id: request.hostel_id,
            room_id: request.room_id,
            client_id: request.client_id,
            check_in: request.check_in,
            check_out: request.check_out,
            total_price: 0.0,
            status: BookingStatus::Active,
            payment_status: PaymentStatus::Unpaid,
            client: request.contact,
            created_at: now,
            updated_at: now,
            rating: None,
            review: None,
        })
    }

    pub fn billable_hours(&self) -> Result<i64, BookingError> {
        billable_hours(self.check_in, self.check_out)
    }

    /// Sets `total_price` from the room's hourly price
    pub fn reprice(&mut self, price_per_hour: f64) -> Result<(), BookingError> {
        self.total_price = price_per_hour * self.billable_hours()? as f64;
        Ok(())
    }

    pub fn holds_room(&self) -> bool {
        self.status.holds_room()
    }

    pub fn can_be_cancelled(&self, now: DateTime<Utc>, lead: Duration) -> bool {
        self.status == BookingStatus::Active && now + lead < self.check_in
    }

    pub fn can_be_rated(&self) -> bool {
        self.status == BookingStatus::Completed && self.rating.is_none()
    }

    /// Applies a transition, leaving the booking unchanged on a guard failure
    pub fn apply(
        &mut self,
        transition: &BookingTransition,
        now: DateTime<Utc>,
    ) -> Result<(), BookingError> {
        let illegal = BookingError::InvalidTransition {
            from: self.status,
            action: transition.name(),
        };

        match transition {
            BookingTransition::Cancel { requested_at, lead } => {
                if self.status != BookingStatus::Active {
                    return Err(illegal);
                }
                if !self.can_be_cancelled(*requested_at, *lead) {
                    return Err(BookingError::CancellationWindowClosed {
                        lead_hours: lead.num_hours(),
                    });
                }
                self.status = BookingStatus::Cancelled;
            }
            BookingTransition::ForceCancel => {
                if self.status != BookingStatus::Active {
                    return Err(illegal);
                }
                self.status = BookingStatus::Cancelled;
            }
            BookingTransition::StartService => {
                if self.status != BookingStatus::Active {
                    return Err(illegal);
                }
                self.status = BookingStatus::InService;
                self.payment_status = PaymentStatus::Paid;
            }
            BookingTransition::Complete => {
                if !self.status.holds_room() {
                    return Err(illegal);
                }
                self.status = BookingStatus::Completed;
            }
            BookingTransition::SetPayment(payment) => {
                if self.status == BookingStatus::Cancelled {
                    return Err(illegal);
                }
                self.payment_status = *payment;
            }
            BookingTransition::ClearReview => {
                self.rating = None;
                self.review = None;
            }
        }

        self.updated_at = now;
        Ok(())
    }

    /// Attaches an already validated rating and comment
    pub fn attach_review(
        &mut self,
        rating: u8,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<(), BookingError> {
        if self.status != BookingStatus::Completed {
            return Err(BookingError::NotRateable);
        }
        if self.rating.is_some() {
            return Err(BookingError::AlreadyReviewed);
        }
        self.rating = Some(rating);
        self.review = Some(comment.to_string());
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, day, hour, 0, 0).unwrap()
    }

    fn request(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> BookingRequest {
        BookingRequest {
            client_id: Uuid::new_v4(),
            contact: ClientContact {
                first_name: "Olena".into(),
                last_name: "Koval".into(),
                phone: "+380501234567".into(),
                email: "olena@example.com".into(),
            },
            hostel_id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            check_in,
            check_out,
        }
    }

    fn booking() -> Booking {
        Booking::new(request(at(25, 14), at(27, 12)), 150.0, at(20, 9)).unwrap()
    }

    #[test]
    fn test_billable_hours() {
        assert_eq!(billable_hours(at(25, 14), at(27, 12)), Ok(46));
        assert_eq!(
            billable_hours(at(25, 14), at(25, 14) + Duration::minutes(61)),
            Ok(2)
        );
        assert_eq!(
            billable_hours(at(25, 14), at(25, 14) + Duration::minutes(10)),
            Ok(1)
        );
        assert_eq!(
            billable_hours(at(25, 14), at(25, 14)),
            Err(BookingError::InvalidDateRange)
        );
        assert_eq!(
            billable_hours(at(25, 14), at(24, 14)),
            Err(BookingError::InvalidDateRange)
        );
    }

    #[test]
    fn test_new_booking_is_active_unpaid_and_priced() {
        let booking = booking();
        assert_eq!(booking.status, BookingStatus::Active);
        assert_eq!(booking.payment_status, PaymentStatus::Unpaid);
        assert_eq!(booking.total_price, 6900.0);
        assert!(booking.holds_room());
    }

    #[test]
    fn test_pending_booking_is_unpriced() {
        let booking = Booking::pending(request(at(25, 14), at(27, 12)), at(20, 9)).unwrap();
        assert_eq!(booking.total_price, 0.0);
        assert!(Booking::pending(request(at(25, 14), at(25, 13)), at(20, 9)).is_err());
    }

    #[test]
    fn test_cancellation_window() {
        let mut booking = booking();

        let inside = BookingTransition::cancel(at(25, 13));
        assert_eq!(
            booking.apply(&inside, at(25, 13)),
            Err(BookingError::CancellationWindowClosed { lead_hours: 2 })
        );
        assert_eq!(booking.status, BookingStatus::Active);

        // exactly two hours ahead is still inside the window
        let boundary = BookingTransition::cancel(at(25, 12));
        assert!(booking.apply(&boundary, at(25, 12)).is_err());

        let outside = BookingTransition::cancel(at(25, 11));
        assert!(booking.apply(&outside, at(25, 11)).is_ok());
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert!(!booking.holds_room());
    }

    #[test]
    fn test_start_service_forces_paid() {
        let mut booking = booking();
        booking
            .apply(&BookingTransition::StartService, at(25, 14))
            .unwrap();
        assert_eq!(booking.status, BookingStatus::InService);
        assert_eq!(booking.payment_status, PaymentStatus::Paid);
        assert!(booking.holds_room());

        let err = booking
            .apply(&BookingTransition::cancel(at(20, 9)), at(20, 9))
            .unwrap_err();
        assert_eq!(
            err,
            BookingError::InvalidTransition {
                from: BookingStatus::InService,
                action: "cancel"
            }
        );
    }

    #[test]
    fn test_terminal_states_reject_status_moves() {
        let mut booking = booking();
        booking.apply(&BookingTransition::Complete, at(27, 12)).unwrap();
        assert!(booking.status.is_terminal());

        assert!(booking.apply(&BookingTransition::Complete, at(27, 13)).is_err());
        assert!(booking.apply(&BookingTransition::StartService, at(27, 13)).is_err());
        assert!(booking.apply(&BookingTransition::ForceCancel, at(27, 13)).is_err());

        // payment may still be adjusted on a completed booking
        booking
            .apply(&BookingTransition::SetPayment(PaymentStatus::Paid), at(27, 13))
            .unwrap();
        assert_eq!(booking.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_payment_locked_after_cancellation() {
        let mut booking = booking();
        booking.apply(&BookingTransition::ForceCancel, at(25, 13)).unwrap();
        assert!(booking
            .apply(
                &BookingTransition::SetPayment(PaymentStatus::PartiallyPaid),
                at(25, 13)
            )
            .is_err());
        assert_eq!(booking.payment_status, PaymentStatus::Unpaid);
    }

    #[test]
    fn test_review_once_until_cleared() {
        let mut booking = booking();
        assert_eq!(
            booking.attach_review(5, "great", at(27, 12)),
            Err(BookingError::NotRateable)
        );

        booking.apply(&BookingTransition::Complete, at(27, 12)).unwrap();
        assert!(booking.can_be_rated());
        booking.attach_review(5, "great", at(27, 13)).unwrap();
        assert_eq!(booking.rating, Some(5));
        assert_eq!(
            booking.attach_review(4, "again", at(27, 14)),
            Err(BookingError::AlreadyReviewed)
        );

        booking.apply(&BookingTransition::ClearReview, at(27, 15)).unwrap();
        assert!(booking.can_be_rated());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&BookingStatus::InService).unwrap();
        assert_eq!(json, "\"in_service\"");
        let json = serde_json::to_string(&PaymentStatus::PartiallyPaid).unwrap();
        assert_eq!(json, "\"partially_paid\"");
    }
}
