//! Common validation utilities

/// Minimum accepted password length for registration
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Common validation functions
pub mod validators {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+$").unwrap()
    });

    /// Check if a string is not empty
    pub fn not_empty(value: &str) -> bool {
        !value.trim().is_empty()
    }

    /// Check if a string length (in characters) is within bounds
    pub fn length_between(value: &str, min: usize, max: usize) -> bool {
        let len = value.trim().chars().count();
        len >= min && len <= max
    }

    /// Check if an email address is valid
    pub fn is_valid_email(email: &str) -> bool {
        EMAIL_REGEX.is_match(email.trim())
    }

    /// Check if a password satisfies the minimum length rule
    pub fn is_acceptable_password(password: &str) -> bool {
        password.chars().count() >= super::MIN_PASSWORD_LENGTH
    }
}
