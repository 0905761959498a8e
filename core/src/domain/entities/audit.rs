//! Audit entry entity recording every successful store mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event types written to the audit trail
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEvent {
    // User events
    UserSaved,

    // Hostel events
    HostelSaved,
    HostelDeleted,

    // Room events
    RoomSaved,
    RoomRemoved,
    RoomAvailabilityChanged,

    // Booking events
    BookingCreated,
    BookingUpdated,
    BookingStatusChanged,

    // Review events
    ReviewSaved,
}

impl AuditEvent {
    /// String representation used in the audit log
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserSaved => "USER_SAVED",
            Self::HostelSaved => "HOSTEL_SAVED",
            Self::HostelDeleted => "HOSTEL_DELETED",
            Self::RoomSaved => "ROOM_SAVED",
            Self::RoomRemoved => "ROOM_REMOVED",
            Self::RoomAvailabilityChanged => "ROOM_AVAILABILITY_CHANGED",
            Self::BookingCreated => "BOOKING_CREATED",
            Self::BookingUpdated => "BOOKING_UPDATED",
            Self::BookingStatusChanged => "BOOKING_STATUS_CHANGED",
            Self::ReviewSaved => "REVIEW_SAVED",
        }
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "USER_SAVED" => Some(Self::UserSaved),
            "HOSTEL_SAVED" => Some(Self::HostelSaved),
            "HOSTEL_DELETED" => Some(Self::HostelDeleted),
            "ROOM_SAVED" => Some(Self::RoomSaved),
            "ROOM_REMOVED" => Some(Self::RoomRemoved),
            "ROOM_AVAILABILITY_CHANGED" => Some(Self::RoomAvailabilityChanged),
            "BOOKING_CREATED" => Some(Self::BookingCreated),
            "BOOKING_UPDATED" => Some(Self::BookingUpdated),
            "BOOKING_STATUS_CHANGED" => Some(Self::BookingStatusChanged),
            "REVIEW_SAVED" => Some(Self::ReviewSaved),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the append-only audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the mutation was committed
    pub at: DateTime<Utc>,
    pub event: AuditEvent,
    /// Id of the entity the mutation touched
    pub entity_id: Uuid,
    pub description: String,
}

impl AuditEntry {
    pub fn new(event: AuditEvent, entity_id: Uuid, description: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            event,
            entity_id,
            description: description.into(),
        }
    }

    /// Overrides the entry timestamp
    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = at;
        self
    }

    /// Renders the entry as `<timestamp> - <EVENT> <id>: <description>`
    pub fn to_line(&self) -> String {
        format!(
            "{} - {} {}: {}",
            self.at.to_rfc3339(),
            self.event,
            self.entity_id,
            self.description
        )
    }

    /// Parses a line produced by [`AuditEntry::to_line`]
    pub fn parse_line(line: &str) -> Option<Self> {
        let (timestamp, rest) = line.split_once(" - ")?;
        let at = DateTime::parse_from_rfc3339(timestamp.trim())
            .ok()?
            .with_timezone(&Utc);
        let (event, rest) = rest.split_once(' ')?;
        let (id, description) = rest.split_once(": ")?;

        Some(Self {
            at,
            event: AuditEvent::parse(event)?,
            entity_id: Uuid::parse_str(id).ok()?,
            description: description.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_string_conversion() {
        for event in [
            AuditEvent::UserSaved,
            AuditEvent::HostelDeleted,
            AuditEvent::RoomAvailabilityChanged,
            AuditEvent::BookingStatusChanged,
            AuditEvent::ReviewSaved,
        ] {
            assert_eq!(AuditEvent::parse(event.as_str()), Some(event));
        }
        assert_eq!(AuditEvent::parse("LOGIN_SUCCESS"), None);
    }

    #[test]
    fn test_line_format() {
        let id = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2024, 12, 25, 14, 0, 0).unwrap();
        let entry = AuditEntry::new(AuditEvent::BookingCreated, id, "room reserved: 6900.00").at(at);

        let line = entry.to_line();
        assert!(line.starts_with("2024-12-25T14:00:00+00:00 - BOOKING_CREATED "));
        assert_eq!(AuditEntry::parse_line(&line), Some(entry));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(AuditEntry::parse_line("").is_none());
        assert!(AuditEntry::parse_line("not a timestamp - BOOKING_CREATED x: y").is_none());
    }
}
