// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::StorageError;

/// Authentication error type.
///
/// Every credential problem collapses to a 401; calling the required
/// convention on a public route is a 400. Audit-store failures are
/// infrastructure errors and surface as 500.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("Not authenticated")]
    MissingCredentials,
    /// Authorization header present but not a bearer credential
    #[error("Invalid authentication scheme. Expected 'Bearer'.")]
    InvalidScheme,
    /// Token failed verification; the string is the human-readable cause
    #[error("{0}")]
    TokenInvalid(String),
    /// Required authentication requested for a public route
    #[error("Authentication not required for this endpoint")]
    CallerMisuse,
    /// Writing the activity record failed
    #[error("Failed to record activity: {0}")]
    AuditStore(#[from] StorageError),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::InvalidScheme => "invalid_scheme",
            AuthError::TokenInvalid(_) => "token_invalid",
            AuthError::CallerMisuse => "caller_misuse",
            AuthError::AuditStore(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials | AuthError::InvalidScheme | AuthError::TokenInvalid(_) => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::CallerMisuse => StatusCode::BAD_REQUEST,
            AuthError::AuditStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_credentials_returns_401_with_challenge() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "missing_credentials");
    }

    #[tokio::test]
    async fn token_invalid_carries_cause() {
        let response = AuthError::TokenInvalid("Invalid token: ExpiredSignature".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error"], "Invalid token: ExpiredSignature");
    }

    #[tokio::test]
    async fn caller_misuse_returns_400_without_challenge() {
        let response = AuthError::CallerMisuse.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn audit_store_is_internal() {
        let err = AuthError::from(StorageError::NotFound("x".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "internal_error");
    }
}
