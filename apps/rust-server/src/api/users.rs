// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};

use super::extract::{ApiJson, ApiPath};
use super::{account_failure, store_failure};
use crate::{
    auth::{BearerToken, EmailClaim},
    error::{ApiError, ErrorBody},
    models::{NewUser, User, UserPreferences},
    state::AppState,
    storage::StoreError,
};

/// Numeric id of a `/users/{user_id}` segment; anything else names no user.
fn parse_user_id(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Display name for an account whose token carries no `name` claim.
fn fallback_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

/// Register the caller from the claims of their token.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Token lacks email claim", body = ErrorBody),
        (status = 401, description = "Missing authorization token", body = ErrorBody),
        (status = 409, description = "Account already exists", body = ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let email = state.auth.email_claim(&token)?;
    let name = state
        .auth
        .claim(&token, "name")
        .and_then(|value| value.as_str().map(str::to_owned))
        .unwrap_or_else(|| fallback_name(&email));

    let user = state
        .db
        .add_user(&NewUser { email, name })
        .map_err(store_failure)?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Public profile of any user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = u64, Path, description = "User id")),
    tag = "Users",
    responses(
        (status = 200, body = User),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn get_user(
    ApiPath(raw_id): ApiPath<String>,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    let not_found = || {
        ApiError::not_found(
            "User not found",
            format!("No user with the id {raw_id} exists"),
        )
    };
    let user_id = parse_user_id(&raw_id).ok_or_else(not_found)?;

    match state.db.get_user(user_id) {
        Ok(user) => Ok(Json(user.public_profile())),
        Err(StoreError::NotFound(_)) => Err(not_found()),
        Err(e) => Err(store_failure(e)),
    }
}

/// The caller's own profile, email included.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = User),
        (status = 404, description = "Account not registered", body = ErrorBody)
    )
)]
pub async fn get_self(
    State(state): State<AppState>,
    EmailClaim(email): EmailClaim,
) -> Result<Json<User>, ApiError> {
    let user = state
        .db
        .get_user_by_email(&email)
        .map_err(account_failure)?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me/preferences",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserPreferences),
        (status = 404, description = "Account not registered", body = ErrorBody)
    )
)]
pub async fn get_preferences(
    State(state): State<AppState>,
    EmailClaim(email): EmailClaim,
) -> Result<Json<UserPreferences>, ApiError> {
    let prefs = state
        .db
        .get_user_preferences(&email)
        .map_err(account_failure)?;
    Ok(Json(prefs))
}

/// Replace the caller's preferences.
#[utoipa::path(
    put,
    path = "/api/v1/users/me/preferences",
    request_body = UserPreferences,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Preferences updated"),
        (status = 404, description = "Account not registered", body = ErrorBody)
    )
)]
pub async fn update_preferences(
    State(state): State<AppState>,
    EmailClaim(email): EmailClaim,
    ApiJson(prefs): ApiJson<UserPreferences>,
) -> Result<StatusCode, ApiError> {
    state
        .db
        .update_user_preferences(&email, &prefs)
        .map_err(account_failure)?;
    Ok(StatusCode::OK)
}
