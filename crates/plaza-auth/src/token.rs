//! JWT session tokens (HS256).

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use plaza_core::UserId;
use serde::{Deserialize, Serialize};

use crate::errors::AuthError;

/// How long an issued token stays valid, in seconds.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Claims carried by a session token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user's ID.
    pub user_id: String,
    /// The authenticated user's email.
    pub email: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl Claims {
    /// The user ID as its branded type.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::from_string(self.user_id.clone())
    }
}

/// Issue a signed token for a logged-in user.
pub fn issue_token(secret: &str, user_id: &UserId, email: &str) -> Result<String, AuthError> {
    let claims = Claims {
        user_id: user_id.as_str().to_owned(),
        email: email.to_owned(),
        exp: Utc::now().timestamp() + TOKEN_TTL_SECS,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Validate a token's signature and expiry, returning its claims.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SECRET: &str = "test-secret";

    #[test]
    fn issue_and_verify() {
        let user_id = UserId::from("user_1");
        let token = issue_token(SECRET, &user_id, "jack@example.com").unwrap();
        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.user_id, "user_1");
        assert_eq!(claims.email, "jack@example.com");
        assert_eq!(claims.user_id(), user_id);
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = issue_token(SECRET, &UserId::from("user_1"), "a@b.co").unwrap();
        let err = verify_token("other-secret", &token).unwrap_err();
        assert_matches!(err, AuthError::Token(_));
    }

    #[test]
    fn garbage_token_rejected() {
        assert_matches!(
            verify_token(SECRET, "not.a.token").unwrap_err(),
            AuthError::Token(_)
        );
    }

    #[test]
    fn expiry_is_in_the_future() {
        let token = issue_token(SECRET, &UserId::from("user_1"), "a@b.co").unwrap();
        let claims = verify_token(SECRET, &token).unwrap();
        assert!(claims.exp > Utc::now().timestamp());
        assert!(claims.exp <= Utc::now().timestamp() + TOKEN_TTL_SECS);
    }
}
