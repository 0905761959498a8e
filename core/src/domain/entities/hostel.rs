//! Hostel entity owned by a manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

pub const NAME_LENGTH: (usize, usize) = (3, 100);
pub const ADDRESS_LENGTH: (usize, usize) = (5, 200);
pub const CITY_LENGTH: (usize, usize) = (2, 50);

/// Editable hostel fields, validated before they reach an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostelDraft {
    pub name: String,
    pub address: String,
    pub city: String,
}

impl HostelDraft {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            city: city.into(),
        }
    }

    /// Trims every field and checks the length rules
    pub fn validated(self) -> Result<Self, ValidationError> {
        let name = checked("name", &self.name, NAME_LENGTH)?;
        let address = checked("address", &self.address, ADDRESS_LENGTH)?;
        let city = checked("city", &self.city, CITY_LENGTH)?;
        Ok(Self {
            name,
            address,
            city,
        })
    }
}

fn checked(field: &str, value: &str, (min, max): (usize, usize)) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    if !hb_shared::validation::validators::length_between(value, min, max) {
        return Err(ValidationError::length(field, min, max));
    }
    Ok(value.to_string())
}

/// Hostel entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hostel {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    /// Suspended hostels keep their history but accept no new bookings
    pub active: bool,
    pub manager_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hostel {
    /// Creates an active hostel from a draft
    pub fn new(
        draft: HostelDraft,
        manager_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let draft = draft.validated()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: draft.name,
            address: draft.address,
            city: draft.city,
            active: true,
            manager_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the editable fields
    pub fn apply(&mut self, draft: HostelDraft, now: DateTime<Utc>) -> Result<(), ValidationError> {
        let draft = draft.validated()?;
        self.name = draft.name;
        self.address = draft.address;
        self.city = draft.city;
        self.updated_at = now;
        Ok(())
    }

    pub fn suspend(&mut self, now: DateTime<Utc>) {
        self.active = false;
        self.updated_at = now;
    }

    pub fn activate(&mut self, now: DateTime<Utc>) {
        self.active = true;
        self.updated_at = now;
    }

    /// Case-insensitive city match plus a name/address substring match.
    /// An empty query matches every hostel in the city.
    pub fn matches(&self, city: &str, query: &str) -> bool {
        if !self.city.eq_ignore_ascii_case(city.trim()) {
            return false;
        }
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.address.to_lowercase().contains(&query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> HostelDraft {
        HostelDraft::new("Sunny Hostel", "12 Khreshchatyk St", "Kyiv")
    }

    #[test]
    fn test_new_hostel_is_active() {
        let hostel = Hostel::new(draft(), Uuid::new_v4(), Utc::now()).unwrap();
        assert!(hostel.active);
        assert_eq!(hostel.city, "Kyiv");
    }

    #[test]
    fn test_field_lengths_are_enforced() {
        let short_name = HostelDraft::new("Ab", "12 Khreshchatyk St", "Kyiv");
        assert_eq!(
            short_name.validated(),
            Err(ValidationError::length("name", 3, 100))
        );

        let no_city = HostelDraft::new("Sunny Hostel", "12 Khreshchatyk St", "  ");
        assert_eq!(no_city.validated(), Err(ValidationError::required("city")));

        let long_address = HostelDraft::new("Sunny Hostel", "x".repeat(201), "Kyiv");
        assert!(long_address.validated().is_err());
    }

    #[test]
    fn test_fields_are_trimmed() {
        let draft = HostelDraft::new("  Sunny Hostel ", "12 Khreshchatyk St", " Kyiv ");
        let hostel = Hostel::new(draft, Uuid::new_v4(), Utc::now()).unwrap();
        assert_eq!(hostel.name, "Sunny Hostel");
        assert_eq!(hostel.city, "Kyiv");
    }

    #[test]
    fn test_matches_city_and_query() {
        let hostel = Hostel::new(draft(), Uuid::new_v4(), Utc::now()).unwrap();
        assert!(hostel.matches("kyiv", ""));
        assert!(hostel.matches("KYIV", "sunny"));
        assert!(hostel.matches("Kyiv", "khreshchatyk"));
        assert!(!hostel.matches("Lviv", ""));
        assert!(!hostel.matches("Kyiv", "rainy"));
    }

    #[test]
    fn test_suspend_and_activate() {
        let mut hostel = Hostel::new(draft(), Uuid::new_v4(), Utc::now()).unwrap();
        hostel.suspend(Utc::now());
        assert!(!hostel.active);
        hostel.activate(Utc::now());
        assert!(hostel.active);
    }
}
