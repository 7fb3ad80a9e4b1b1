//! HTTP error mapping.
//!
//! Every handler error becomes a JSON body `{"message": ..., "error": ...}`
//! with an appropriate status code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use plaza_auth::AuthError;
use plaza_core::validate::ValidationError;
use plaza_store::StoreError;
use serde::Serialize;

/// A request failed; becomes a status code plus JSON error body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    error: String,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    error: String,
}

impl ApiError {
    /// Build an error with an explicit status.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error: error.into(),
        }
    }

    /// 401 with a reason.
    #[must_use]
    pub fn unauthorized(error: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Not authenticated", error)
    }

    /// 403: authenticated, but not allowed to touch this resource.
    #[must_use]
    pub fn forbidden(error: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "Not authorized", error)
    }

    /// 404 with a reason.
    #[must_use]
    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found", error)
    }

    /// The mapped status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.error, "request failed");
        }
        (
            self.status,
            Json(ErrorBody {
                message: self.message,
                error: self.error,
            }),
        )
            .into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation failed, entered data is incorrect",
            e.to_string(),
        )
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => Self::not_found(e.to_string()),
            StoreError::DuplicateEmail(_) => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation failed",
                e.to_string(),
            ),
            StoreError::Sqlite(_) | StoreError::Pool(_) | StoreError::Migration { .. } => {
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred",
                    e.to_string(),
                )
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::unauthorized(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_422() {
        let err: ApiError = ValidationError::Empty("name").into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn store_not_found_maps_to_404() {
        let err: ApiError = StoreError::NotFound {
            entity: "post",
            id: "post_1".into(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn duplicate_email_maps_to_422() {
        let err: ApiError = StoreError::DuplicateEmail("a@b.co".into()).into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn auth_maps_to_401() {
        let err: ApiError = AuthError::InvalidCredentials.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
