//! Registration and credential lookup.

use std::sync::Arc;

use hb_shared::utils::phone::{is_valid_international_phone, normalize_phone_number};
use hb_shared::utils::validation::{validators, MIN_PASSWORD_LENGTH};
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::{User, UserType};
use crate::errors::{DomainResult, ValidationError};
use crate::repositories::EntityStore;
use crate::services::context::ServiceContext;

/// Sign-up form
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_type: UserType,
    pub email: String,
    pub phone: String,
    pub password: String,
    /// Required for clients, ignored for managers
    pub first_name: String,
    pub last_name: String,
}

impl Registration {
    pub fn client(
        email: impl Into<String>,
        phone: impl Into<String>,
        password: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            user_type: UserType::Client,
            email: email.into(),
            phone: phone.into(),
            password: password.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn manager(
        email: impl Into<String>,
        phone: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            user_type: UserType::Manager,
            email: email.into(),
            phone: phone.into(),
            password: password.into(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }
}

pub struct UserService<S: EntityStore + 'static> {
    store: Arc<S>,
    ctx: ServiceContext,
}

impl<S: EntityStore + 'static> UserService<S> {
    pub fn new(store: Arc<S>, ctx: ServiceContext) -> Self {
        Self { store, ctx }
    }

    /// Validates and stores a new account.
    ///
    /// The phone number is stored normalized. Email and phone must be unique
    /// across all users.
    pub async fn register(&self, registration: Registration) -> DomainResult<User> {
        let email = registration.email.trim().to_string();
        if !validators::is_valid_email(&email) {
            return Err(ValidationError::InvalidEmail.into());
        }

        let phone = normalize_phone_number(&registration.phone);
        if !is_valid_international_phone(&phone) {
            return Err(ValidationError::InvalidPhone.into());
        }

        if !validators::is_acceptable_password(&registration.password) {
            return Err(ValidationError::WeakPassword {
                min: MIN_PASSWORD_LENGTH,
            }
            .into());
        }

        let now = self.ctx.clock.now();
        let user = match registration.user_type {
            UserType::Client => {
                for (field, value) in [
                    ("first_name", &registration.first_name),
                    ("last_name", &registration.last_name),
                ] {
                    if !validators::not_empty(value) {
                        return Err(ValidationError::required(field).into());
                    }
                }
                User::new_client(
                    email,
                    phone,
                    registration.password,
                    registration.first_name.trim(),
                    registration.last_name.trim(),
                    now,
                )
            }
            UserType::Manager => User::new_manager(email, phone, registration.password, now),
        };

        let user = self.store.put_user(user).await?;
        info!(user_id = %user.id, user_type = %user.user_type(), "User registered");
        Ok(user)
    }

    /// Looks a user up by email (any case) or phone
    pub async fn find_by_credential(&self, key: &str) -> DomainResult<Option<User>> {
        let key = key.trim();
        if let Some(user) = self.store.find_user_by_credential(key).await? {
            return Ok(Some(user));
        }
        let phone = normalize_phone_number(key);
        if phone != key && is_valid_international_phone(&phone) {
            return self.store.find_user_by_credential(&phone).await;
        }
        Ok(None)
    }

    pub async fn find_user(&self, id: Uuid) -> DomainResult<Option<User>> {
        self.store.find_user(id).await
    }
}
