//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use plaza_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated user, resolved from the `Authorization` header.
///
/// Rejects with 401 when the header is missing, isn't a bearer token, or
/// the token fails signature/expiry checks.
pub struct AuthUser(pub UserId);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::unauthorized("token not found in Authorization header"))?;

        let claims = plaza_auth::verify_token(&state.settings.auth.token_secret, token)
            .map_err(|e| ApiError::unauthorized(e.to_string()))?;
        Ok(Self(claims.user_id()))
    }
}
