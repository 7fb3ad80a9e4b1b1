//! Auth error types.

/// Errors from credential and token handling.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Email/password pair didn't match a stored account.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Token creation or validation failed (bad signature, expired, garbled).
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_credentials_display() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "invalid email or password"
        );
    }
}
