// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Friend requests, club memberships and blocks of the caller.
//!
//! Update and delete take the relation id only; whether the caller is a
//! party to that relation is not checked.

use axum::{extract::State, http::StatusCode, Json};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{account_failure, relation_failure};
use crate::{
    auth::EmailClaim,
    error::{ApiError, ErrorBody},
    models::{CreateRelationRequest, RelationContextQuery, UpdateRelationRequest},
    relations::{NewRelation, RelationService, UserRelation},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/users/me/relations",
    request_body = CreateRelationRequest,
    tag = "Relations",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Relation created", body = UserRelation),
        (status = 400, description = "Unknown relation context", body = ErrorBody),
        (status = 404, description = "Account not registered", body = ErrorBody)
    )
)]
pub async fn create_relation(
    State(state): State<AppState>,
    EmailClaim(email): EmailClaim,
    ApiJson(request): ApiJson<CreateRelationRequest>,
) -> Result<(StatusCode, Json<UserRelation>), ApiError> {
    let sender = state
        .db
        .get_user_by_email(&email)
        .map_err(account_failure)?;

    let relation = RelationService::new(state.db.as_ref())
        .create(&NewRelation {
            sender_id: sender.id,
            receiver_id: request.receiver_id,
            context: request.context,
        })
        .map_err(relation_failure)?;
    Ok((StatusCode::CREATED, Json(relation)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me/relations",
    tag = "Relations",
    security(("bearer" = [])),
    responses((status = 501, description = "Not implemented", body = ErrorBody))
)]
pub async fn list_relations(
    EmailClaim(_email): EmailClaim,
) -> Result<Json<Vec<UserRelation>>, ApiError> {
    Err(ApiError::not_implemented("Listing relations"))
}

/// Accept or reject a relation; rejecting deletes it.
#[utoipa::path(
    put,
    path = "/api/v1/users/me/relations/{relation_id}",
    params(("relation_id" = u64, Path, description = "Relation id")),
    request_body = UpdateRelationRequest,
    tag = "Relations",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Relation updated"),
        (status = 400, description = "Unknown relation context", body = ErrorBody),
        (status = 404, description = "Relation not found", body = ErrorBody),
        (status = 501, description = "Unblocking is not implemented", body = ErrorBody)
    )
)]
pub async fn update_relation(
    ApiPath(relation_id): ApiPath<u64>,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateRelationRequest>,
) -> Result<StatusCode, ApiError> {
    RelationService::new(state.db.as_ref())
        .update(&request.context, relation_id, request.accept)
        .map_err(relation_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/me/relations/{relation_id}",
    params(
        ("relation_id" = u64, Path, description = "Relation id"),
        RelationContextQuery
    ),
    tag = "Relations",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Relation deleted"),
        (status = 400, description = "Unknown relation context", body = ErrorBody)
    )
)]
pub async fn delete_relation(
    ApiPath(relation_id): ApiPath<u64>,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RelationContextQuery>,
) -> Result<StatusCode, ApiError> {
    RelationService::new(state.db.as_ref())
        .delete(&query.context, relation_id)
        .map_err(relation_failure)?;
    Ok(StatusCode::NO_CONTENT)
}
