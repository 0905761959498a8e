pub mod audit;
pub mod booking;
pub mod hostel;
pub mod review;
pub mod room;
pub mod user;

pub use audit::{AuditEntry, AuditEvent};
pub use booking::{
    billable_hours, Booking, BookingRequest, BookingStatus, BookingTransition, ClientContact,
    PaymentStatus, DEFAULT_CANCELLATION_LEAD_HOURS, MIN_BILLABLE_HOURS,
};
pub use hostel::{Hostel, HostelDraft};
pub use review::{validate_rating, Review, MAX_COMMENT_LENGTH, MAX_RATING, MIN_RATING};
pub use room::{Room, RoomDraft, RoomType, MAX_CAPACITY, MAX_PRICE_PER_HOUR, MIN_CAPACITY};
pub use user::{Role, User, UserType};
