// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Failures raised by the authentication gate and the claim accessors.
///
/// The gate answers these itself; a rejected request never reaches a handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization: Bearer <token>` header, or a garbled one
    #[error("Missing authorization token")]
    MissingToken,
    /// The identity provider did not answer 200 for the token
    #[error("Invalid id token")]
    InvalidToken,
    /// The token was issued for another client id
    #[error("Token not meant for this application")]
    ForeignToken,
    /// The identity provider could not be reached
    #[error("Could not validate token")]
    VerificationUnavailable,
    /// The verified token has no `email` claim
    #[error("Token lacks email claim")]
    MissingEmailClaim,
}

impl AuthError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken | AuthError::ForeignToken | AuthError::MissingEmailClaim => {
                StatusCode::BAD_REQUEST
            }
            AuthError::VerificationUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> &'static str {
        match self {
            AuthError::MissingToken => {
                "This resource requires a Google ID token as a Bearer Authorization header"
            }
            AuthError::InvalidToken => "The integrity of the supplied id token cannot be verified",
            AuthError::ForeignToken => "The token is not meant for this application",
            AuthError::VerificationUnavailable => "Administrator should check logs",
            AuthError::MissingEmailClaim => "ID tokens must have an 'email' claim in them",
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::new(err.status_code(), err.to_string(), err.details())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_token_returns_401() {
        let response = AuthError::MissingToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["code"], 401);
        assert_eq!(body["message"], "Missing authorization token");
    }

    #[test]
    fn token_problems_are_client_errors() {
        assert_eq!(AuthError::InvalidToken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::ForeignToken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::MissingEmailClaim.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn channel_failure_is_a_server_error() {
        let err = ApiError::from(AuthError::VerificationUnavailable);
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Could not validate token");
    }
}
