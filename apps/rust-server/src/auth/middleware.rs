// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication gate for protected routes.
//!
//! [`authenticate`] is an Axum middleware function; [`protect`] layers it onto
//! a single [`MethodRouter`], turning a handler into a protected handler with
//! the same shape. Public and protected methods can then share a path:
//!
//! ```rust,ignore
//! Router::new().route(
//!     "/clubs",
//!     get(clubs::list_clubs).merge(protect(&gate, post(clubs::create_club))),
//! )
//! ```
//!
//! ## Per request
//!
//! 1. Read `Authorization: Bearer <token>` (401 when absent or garbled)
//! 2. Verify the token with the identity provider (500 when unreachable,
//!    400 when rejected)
//! 3. Check that `aud` is our client id (400 otherwise)
//! 4. Cache the claims for the duration of the handler, then evict them
//!
//! Tokens are re-verified on every request; nothing is reused across
//! requests.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use serde_json::Value;

use super::cache::ClaimCache;
use super::claims::Claims;
use super::error::AuthError;
use super::introspect::TokenIntrospector;

/// Verifies bearer tokens and owns the claim cache they populate.
#[derive(Clone)]
pub struct AuthGate {
    client_id: Arc<str>,
    introspector: TokenIntrospector,
    cache: ClaimCache,
}

impl AuthGate {
    pub fn new(
        client_id: impl Into<String>,
        introspector: TokenIntrospector,
        cache: ClaimCache,
    ) -> Self {
        Self {
            client_id: Arc::from(client_id.into()),
            introspector,
            cache,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn cache(&self) -> &ClaimCache {
        &self.cache
    }

    /// Verify `token` and check that it was issued for this application.
    ///
    /// The provider call runs on its own task and completes even if the
    /// request that triggered it is dropped mid-flight; its result is then
    /// discarded.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let introspector = self.introspector.clone();
        let owned = token.to_owned();
        let claims = tokio::spawn(async move { introspector.introspect(&owned).await })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Token verification task failed");
                AuthError::VerificationUnavailable
            })??;

        if claims.audience() != Some(self.client_id()) {
            tracing::debug!(audience = ?claims.audience(), "Token issued for another client");
            return Err(AuthError::ForeignToken);
        }

        Ok(claims)
    }

    /// Claim `key` of a token verified by the current request.
    ///
    /// `None` when the token is not (or no longer) cached or lacks the claim.
    pub fn claim(&self, token: &str, key: &str) -> Option<Value> {
        self.cache.lookup(token, key)
    }

    /// Claim `key` of the bearer token carried by `headers`.
    pub fn request_claim(&self, headers: &HeaderMap, key: &str) -> Option<Value> {
        bearer_token(headers).and_then(|token| self.claim(token, key))
    }

    /// The `email` claim of a verified token.
    pub fn email_claim(&self, token: &str) -> Result<String, AuthError> {
        self.claim(token, "email")
            .and_then(|value| value.as_str().map(str::to_owned))
            .ok_or(AuthError::MissingEmailClaim)
    }
}

/// Extract the token of an `Authorization: Bearer <token>` header.
///
/// The header must be exactly the scheme `Bearer`, one space and a non-empty
/// token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme != "Bearer" || token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}

/// Authentication middleware function.
pub async fn authenticate(
    State(gate): State<AuthGate>,
    request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()).map(str::to_owned) else {
        return AuthError::MissingToken.into_response();
    };

    let claims = match gate.verify(&token).await {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    // Held across the handler; dropping it evicts on every exit path.
    let _claims = gate.cache.admit(token, claims);
    next.run(request).await
}

/// Put `route` behind the authentication gate.
pub fn protect<S>(gate: &AuthGate, route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(middleware::from_fn_with_state(gate.clone(), authenticate))
}
