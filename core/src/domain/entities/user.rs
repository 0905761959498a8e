//! User entity representing a registered client or hostel manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the type of user in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// A guest who searches hostels and books rooms
    Client,
    /// A hostel owner who manages hostels, rooms and bookings
    Manager,
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserType::Client => write!(f, "client"),
            UserType::Manager => write!(f, "manager"),
        }
    }
}

/// Role of a user together with the fields only that role carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Role {
    Client { first_name: String, last_name: String },
    Manager,
}

impl Role {
    /// The role tag without its payload
    pub fn user_type(&self) -> UserType {
        match self {
            Role::Client { .. } => UserType::Client,
            Role::Manager => UserType::Manager,
        }
    }
}

/// User entity representing a registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Email address, unique across all users
    pub email: String,

    /// Phone number, unique across all users
    pub phone: String,

    /// Opaque credential, stored as provided
    pub password: String,

    /// Role and role-specific fields
    pub role: Role,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new client
    pub fn new_client(
        email: impl Into<String>,
        phone: impl Into<String>,
        password: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self::with_role(
            email,
            phone,
            password,
            Role::Client {
                first_name: first_name.into(),
                last_name: last_name.into(),
            },
            now,
        )
    }

    /// Creates a new manager
    pub fn new_manager(
        email: impl Into<String>,
        phone: impl Into<String>,
        password: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self::with_role(email, phone, password, Role::Manager, now)
    }

    fn with_role(
        email: impl Into<String>,
        phone: impl Into<String>,
        password: impl Into<String>,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            phone: phone.into(),
            password: password.into(),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    /// The role tag of this user
    pub fn user_type(&self) -> UserType {
        self.role.user_type()
    }

    /// Checks if the user is a client
    pub fn is_client(&self) -> bool {
        matches!(self.role, Role::Client { .. })
    }

    /// Checks if the user is a manager
    pub fn is_manager(&self) -> bool {
        matches!(self.role, Role::Manager)
    }

    /// Whether `key` is this user's email (case-insensitive) or phone
    pub fn matches_credential(&self, key: &str) -> bool {
        let key = key.trim();
        self.email.eq_ignore_ascii_case(key) || self.phone == key
    }

    /// Name shown in notifications: full name for clients, email for managers
    pub fn display_name(&self) -> String {
        match &self.role {
            Role::Client {
                first_name,
                last_name,
            } => format!("{} {}", first_name, last_name),
            Role::Manager => self.email.clone(),
        }
    }
}
