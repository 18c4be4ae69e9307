// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Club endpoints.
//!
//! Routing, authentication and request parsing are in place; the store
//! answers every club operation with "not implemented", which surfaces as
//! HTTP 501.

use axum::{extract::State, http::StatusCode, Json};

use super::extract::{ApiJson, ApiPath};
use super::{account_failure, store_failure};
use crate::{
    auth::EmailClaim,
    error::{ApiError, ErrorBody},
    models::{Club, ClubMember, NewClub, NewClubMember},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/clubs",
    request_body = NewClub,
    tag = "Clubs",
    security(("bearer" = [])),
    responses(
        (status = 201, body = Club),
        (status = 501, description = "Not implemented", body = ErrorBody)
    )
)]
pub async fn create_club(
    State(state): State<AppState>,
    EmailClaim(email): EmailClaim,
    ApiJson(request): ApiJson<NewClub>,
) -> Result<(StatusCode, Json<Club>), ApiError> {
    let owner = state
        .db
        .get_user_by_email(&email)
        .map_err(account_failure)?;
    let club = state
        .db
        .add_club(owner.id, &request)
        .map_err(store_failure)?;
    Ok((StatusCode::CREATED, Json(club)))
}

#[utoipa::path(
    get,
    path = "/api/v1/clubs",
    tag = "Clubs",
    responses(
        (status = 200, body = [Club]),
        (status = 501, description = "Not implemented", body = ErrorBody)
    )
)]
pub async fn list_clubs(State(state): State<AppState>) -> Result<Json<Vec<Club>>, ApiError> {
    let clubs = state.db.get_clubs().map_err(store_failure)?;
    Ok(Json(clubs))
}

#[utoipa::path(
    get,
    path = "/api/v1/clubs/{club_id}",
    params(("club_id" = u64, Path, description = "Club id")),
    tag = "Clubs",
    responses(
        (status = 200, body = Club),
        (status = 501, description = "Not implemented", body = ErrorBody)
    )
)]
pub async fn get_club(
    ApiPath(club_id): ApiPath<u64>,
    State(state): State<AppState>,
) -> Result<Json<Club>, ApiError> {
    let club = state.db.get_club(club_id).map_err(store_failure)?;
    Ok(Json(club))
}

#[utoipa::path(
    delete,
    path = "/api/v1/clubs/{club_id}",
    params(("club_id" = u64, Path, description = "Club id")),
    tag = "Clubs",
    security(("bearer" = [])),
    responses(
        (status = 204),
        (status = 501, description = "Not implemented", body = ErrorBody)
    )
)]
pub async fn delete_club(
    ApiPath(club_id): ApiPath<u64>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_club(club_id).map_err(store_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/clubs/{club_id}/members",
    params(("club_id" = u64, Path, description = "Club id")),
    request_body = NewClubMember,
    tag = "Clubs",
    security(("bearer" = [])),
    responses(
        (status = 201),
        (status = 501, description = "Not implemented", body = ErrorBody)
    )
)]
pub async fn add_club_member(
    ApiPath(club_id): ApiPath<u64>,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewClubMember>,
) -> Result<StatusCode, ApiError> {
    state
        .db
        .add_club_member(club_id, request.user_id, &request.role)
        .map_err(store_failure)?;
    Ok(StatusCode::CREATED)
}

#[utoipa::path(
    get,
    path = "/api/v1/clubs/{club_id}/members",
    params(("club_id" = u64, Path, description = "Club id")),
    tag = "Clubs",
    security(("bearer" = [])),
    responses(
        (status = 200, body = [ClubMember]),
        (status = 501, description = "Not implemented", body = ErrorBody)
    )
)]
pub async fn list_club_members(
    ApiPath(club_id): ApiPath<u64>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ClubMember>>, ApiError> {
    let members = state
        .db
        .get_club_members(club_id)
        .map_err(store_failure)?;
    Ok(Json(members))
}

#[utoipa::path(
    delete,
    path = "/api/v1/clubs/{club_id}/members/{member_id}",
    params(
        ("club_id" = u64, Path, description = "Club id"),
        ("member_id" = u64, Path, description = "User id of the member")
    ),
    tag = "Clubs",
    security(("bearer" = [])),
    responses(
        (status = 204),
        (status = 501, description = "Not implemented", body = ErrorBody)
    )
)]
pub async fn remove_club_member(
    ApiPath((club_id, member_id)): ApiPath<(u64, u64)>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state
        .db
        .delete_club_member(club_id, member_id)
        .map_err(store_failure)?;
    Ok(StatusCode::NO_CONTENT)
}
