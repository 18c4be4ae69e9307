// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token verification against Google's `tokeninfo` endpoint.
//!
//! ## Protocol
//!
//! `GET <endpoint>?id_token=<token>`. A 200 answer carries the token's claims
//! as a flat JSON object; any other status means Google does not vouch for
//! the token. There is no retry: the caller fails the request instead.

use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

use super::claims::Claims;
use super::error::AuthError;

/// Upper bound for one verification round trip.
pub const VERIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the identity provider's introspection endpoint.
#[derive(Clone)]
pub struct TokenIntrospector {
    endpoint: Url,
    client: reqwest::Client,
}

impl TokenIntrospector {
    pub fn new(endpoint: Url) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, VERIFICATION_TIMEOUT)
    }

    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { endpoint, client })
    }

    fn request_url(&self, token: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("id_token", token);
        url
    }

    /// Ask the identity provider for the claims of `token`.
    pub async fn introspect(&self, token: &str) -> Result<Claims, AuthError> {
        let response = self
            .client
            .get(self.request_url(token))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    endpoint = %self.endpoint,
                    "Token verification channel unavailable"
                );
                AuthError::VerificationUnavailable
            })?;

        if response.status() != StatusCode::OK {
            tracing::debug!(status = %response.status(), "Identity provider rejected token");
            return Err(AuthError::InvalidToken);
        }

        response.json::<Claims>().await.map_err(|e| {
            tracing::debug!(error = %e, "Identity provider returned an unreadable claim set");
            AuthError::InvalidToken
        })
    }
}
