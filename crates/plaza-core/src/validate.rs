//! Input validation shared by the HTTP layer.
//!
//! Mirrors the request checks performed before any handler touches the
//! store: email shape, password length, post title/content length.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Minimum length for passwords, post titles, and post bodies.
pub const MIN_FIELD_LEN: usize = 5;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Deliberately loose: one `@` with a dot somewhere after it.
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex")
});

/// A request field failed validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Email does not look like an address.
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    /// Required field was empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),
    /// Field shorter than the minimum.
    #[error("{field} must be at least {min} characters")]
    TooShort {
        /// Which field.
        field: &'static str,
        /// Required minimum length.
        min: usize,
    },
}

/// Validate an email address.
pub fn email(value: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(value.to_owned()))
    }
}

/// Validate a display name (non-empty after trimming).
pub fn display_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Empty("name"))
    } else {
        Ok(())
    }
}

/// Validate a password (minimum length).
pub fn password(value: &str) -> Result<(), ValidationError> {
    min_len("password", value)
}

/// Validate a post title (minimum length).
pub fn post_title(value: &str) -> Result<(), ValidationError> {
    min_len("title", value)
}

/// Validate a post body (minimum length).
pub fn post_content(value: &str) -> Result<(), ValidationError> {
    min_len("content", value)
}

fn min_len(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().chars().count() < MIN_FIELD_LEN {
        Err(ValidationError::TooShort {
            field,
            min: MIN_FIELD_LEN,
        })
    } else {
        Ok(())
    }
}
