// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};

use super::account_failure;
use super::extract::ApiJson;
use crate::{
    auth::EmailClaim,
    error::{ApiError, ErrorBody},
    models::{NewRunLog, RunLog},
    state::AppState,
};

/// Record a run for the caller.
#[utoipa::path(
    post,
    path = "/api/v1/users/me/logs",
    request_body = NewRunLog,
    tag = "Logs",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Run recorded", body = RunLog),
        (status = 404, description = "Account not registered", body = ErrorBody),
        (status = 500, description = "Could not add run log", body = ErrorBody)
    )
)]
pub async fn add_run_log(
    State(state): State<AppState>,
    EmailClaim(email): EmailClaim,
    ApiJson(log): ApiJson<NewRunLog>,
) -> Result<(StatusCode, Json<RunLog>), ApiError> {
    let user = state
        .db
        .get_user_by_email(&email)
        .map_err(account_failure)?;

    // The account exists, so any failure here is on our side.
    let stored = state.db.add_run_log(user.id, &log).map_err(|e| {
        tracing::error!(user_id = user.id, error = %e, "Failed to add run log");
        ApiError::internal("Could not add run log")
    })?;
    Ok((StatusCode::CREATED, Json(stored)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me/logs",
    tag = "Logs",
    security(("bearer" = [])),
    responses(
        (status = 200, body = [RunLog]),
        (status = 404, description = "Account not registered", body = ErrorBody)
    )
)]
pub async fn list_run_logs(
    State(state): State<AppState>,
    EmailClaim(email): EmailClaim,
) -> Result<Json<Vec<RunLog>>, ApiError> {
    let logs = state.db.get_run_logs(&email).map_err(account_failure)?;
    Ok(Json(logs))
}
