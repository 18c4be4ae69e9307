// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for handlers behind the authentication gate.
//!
//! ```rust,ignore
//! async fn get_self(
//!     State(state): State<AppState>,
//!     EmailClaim(email): EmailClaim,
//! ) -> Result<Json<User>, ApiError> {
//!     // email comes from the token verified for this request
//! }
//! ```
//!
//! Both extractors only make sense on protected routes: elsewhere the claim
//! cache holds nothing for the request's token.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use super::{bearer_token, AuthError, AuthGate};

/// Raw bearer token of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(&parts.headers)
            .map(|token| BearerToken(token.to_owned()))
            .ok_or(AuthError::MissingToken)
    }
}

/// `email` claim of the verified token; rejects with 400 when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailClaim(pub String);

impl<S> FromRequestParts<S> for EmailClaim
where
    AuthGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        AuthGate::from_ref(state).email_claim(&token).map(EmailClaim)
    }
}
