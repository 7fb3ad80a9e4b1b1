//! `/auth` routes: signup, login, user status.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use plaza_core::validate;
use plaza_store::NewUser;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::state::AppState;

#[derive(Deserialize)]
pub(crate) struct SignupInput {
    email: String,
    name: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignupResponse {
    message: String,
    user_id: String,
}

#[derive(Deserialize)]
pub(crate) struct LoginInput {
    email: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    token: String,
    user_id: String,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct StatusBody {
    status: String,
}

/// POST /auth/signup
pub(crate) async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupInput>,
) -> Result<Json<SignupResponse>, ApiError> {
    validate::email(&input.email)?;
    validate::display_name(&input.name)?;
    validate::password(&input.password)?;

    let password_hash = plaza_auth::hash_password(&input.password);
    let user = state.users.create(&NewUser {
        email: &input.email,
        name: &input.name,
        password_hash: &password_hash,
    })?;

    info!(user_id = %user.id, "user created");
    Ok(Json(SignupResponse {
        message: "User created successfully".into(),
        user_id: user.id.into_inner(),
    }))
}

/// POST /auth/login
pub(crate) async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<LoginResponse>, ApiError> {
    validate::email(&input.email)?;

    let Some(user) = state.users.find_by_email(&input.email)? else {
        return Err(ApiError::not_found(
            "No user found with the provided email",
        ));
    };
    if !plaza_auth::verify_password(&input.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token =
        plaza_auth::issue_token(&state.settings.auth.token_secret, &user.id, &user.email)
            .map_err(|e| {
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "could not login",
                    e.to_string(),
                )
            })?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user_id: user.id.into_inner(),
    }))
}

/// GET /auth/status
pub(crate) async fn get_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<StatusBody>, ApiError> {
    let user = state
        .users
        .find_by_id(&user_id)?
        .ok_or_else(|| ApiError::not_found("user no longer exists"))?;
    Ok(Json(StatusBody {
        status: user.status,
    }))
}

/// PUT /auth/status
pub(crate) async fn update_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(input): Json<StatusBody>,
) -> Result<Json<StatusBody>, ApiError> {
    state.users.update_status(&user_id, &input.status)?;
    Ok(Json(StatusBody {
        status: input.status,
    }))
}
