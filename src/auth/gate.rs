// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication gate.
//!
//! Decides, per request, whether a caller is authenticated:
//!
//! | Mode | Route | Credential | Result | Records |
//! |------|-------|------------|--------|---------|
//! | Optional | public | any | `Ok(None)` | 0 |
//! | Required | public | any | `CallerMisuse` | 0 |
//! | Optional | protected | none / not bearer | `Ok(None)` | 0 |
//! | Required | protected | none / not bearer | `MissingCredentials` / `InvalidScheme` | 1 failed |
//! | either | protected | valid bearer | `Ok(Some(identity))` | 1 success |
//! | Optional | protected | invalid bearer | `Ok(None)` | 1 failed |
//! | Required | protected | invalid bearer | `TokenInvalid` | 1 failed |

use std::sync::Arc;

use super::auditor::Auditor;
use super::routes::PublicRoutes;
use super::verifier::TokenVerifier;
use super::{AuthError, AuthenticatedIdentity};
use crate::storage::ActivityStore;

/// Calling convention chosen by the route handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Absent or invalid credentials yield "no identity".
    Optional,
    /// Absent or invalid credentials reject the request.
    Required,
}

/// The parts of an inbound request the gate looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub path: String,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    /// Raw `Authorization` header value
    pub authorization: Option<String>,
}

impl RequestContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// Shorthand for `Authorization: Bearer <token>`.
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_authorization(format!("Bearer {token}"))
    }

    /// The bearer token, if the header carries one.
    fn bearer_token(&self) -> Result<&str, AuthError> {
        let header = self
            .authorization
            .as_deref()
            .ok_or(AuthError::MissingCredentials)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidScheme)?
            .trim();
        if token.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        Ok(token)
    }
}

/// Per-request authentication: public-route check, token verification and
/// one audit record per outcome.
#[derive(Clone)]
pub struct AuthGate {
    verifier: TokenVerifier,
    routes: PublicRoutes,
    auditor: Auditor,
}

impl AuthGate {
    pub fn new(verifier: TokenVerifier, routes: PublicRoutes, activity: Arc<dyn ActivityStore>) -> Self {
        Self {
            verifier,
            routes,
            auditor: Auditor::new(activity),
        }
    }

    /// Evaluate one request under the given calling convention.
    ///
    /// # Errors
    ///
    /// - `CallerMisuse` when `Required` is used on a public route
    /// - `MissingCredentials` / `InvalidScheme` / `TokenInvalid` for
    ///   credential problems under `Required`
    /// - `AuditStore` when the activity record cannot be written
    pub async fn authenticate(
        &self,
        request: &RequestContext,
        mode: AuthMode,
    ) -> Result<Option<AuthenticatedIdentity>, AuthError> {
        if self.routes.is_public(&request.path) {
            return match mode {
                AuthMode::Optional => Ok(None),
                AuthMode::Required => Err(AuthError::CallerMisuse),
            };
        }

        let token = match (request.bearer_token(), mode) {
            (Ok(token), _) => token,
            (Err(_), AuthMode::Optional) => return Ok(None),
            (Err(err), AuthMode::Required) => return Err(self.reject(request, err)?),
        };

        match self.verifier.verify(token).await {
            Ok(identity) => {
                self.auditor.record_success(request, &identity)?;
                tracing::debug!(
                    user_id = %identity.user_id,
                    path = %request.path,
                    "Request authenticated"
                );
                Ok(Some(identity))
            }
            Err(err) => {
                let err = self.reject(request, err)?;
                match mode {
                    AuthMode::Optional => Ok(None),
                    AuthMode::Required => Err(err),
                }
            }
        }
    }

    /// `authenticate` under the required convention.
    pub async fn require(&self, request: &RequestContext) -> Result<AuthenticatedIdentity, AuthError> {
        self.authenticate(request, AuthMode::Required)
            .await?
            .ok_or(AuthError::MissingCredentials)
    }

    /// `authenticate` under the optional convention.
    pub async fn optional(&self, request: &RequestContext) -> Result<Option<AuthenticatedIdentity>, AuthError> {
        self.authenticate(request, AuthMode::Optional).await
    }

    /// Audit a rejection and hand the error back. A failed audit write
    /// replaces the rejection.
    fn reject(&self, request: &RequestContext, err: AuthError) -> Result<AuthError, AuthError> {
        let cause = err.to_string();
        tracing::warn!(
            path = %request.path,
            client_ip = request.client_ip.as_deref().unwrap_or("-"),
            cause = %cause,
            "Authentication failed"
        );
        self.auditor.record_failure(request, &cause)?;
        Ok(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwks::JwksResolver;
    use crate::storage::test_support::temp_db;
    use crate::storage::activity::NewActivity;
    use crate::storage::{
        ActivityReceipt, ActivityRecord, ActivityStatus, Database, StorageError, StorageResult,
    };
    use std::time::Duration;
    use tempfile::TempDir;
    use url::Url;

    /// Gate whose key endpoint is unreachable: every token fails verification.
    fn offline_gate() -> (AuthGate, Arc<Database>, TempDir) {
        let (db, dir) = temp_db();
        let db = Arc::new(db);
        let resolver = JwksResolver::new(
            Url::parse("http://127.0.0.1:9/.well-known/jwks.json").unwrap(),
            Duration::from_millis(500),
        )
        .unwrap();
        let verifier = TokenVerifier::new(resolver, "api", "https://tenant.example.com/");
        let gate = AuthGate::new(verifier, PublicRoutes::default(), db.clone());
        (gate, db, dir)
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(
            RequestContext::new("/x").with_bearer("abc").bearer_token().unwrap(),
            "abc"
        );
        assert!(matches!(
            RequestContext::new("/x").bearer_token(),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            RequestContext::new("/x").with_authorization("Basic Zm9vOmJhcg==").bearer_token(),
            Err(AuthError::InvalidScheme)
        ));
        assert!(matches!(
            RequestContext::new("/x").with_authorization("Bearer   ").bearer_token(),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn public_route_optional_is_noop() {
        let (gate, db, _dir) = offline_gate();
        let request = RequestContext::new("/profile").with_bearer("whatever");

        assert_eq!(gate.optional(&request).await.unwrap(), None);
        assert!(db.recent(10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn public_route_required_is_misuse() {
        let (gate, db, _dir) = offline_gate();
        let request = RequestContext::new("/static/logo.png");

        let err = gate.require(&request).await.unwrap_err();
        assert!(matches!(err, AuthError::CallerMisuse));
        assert!(db.recent(10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_credentials_optional_is_silent() {
        let (gate, db, _dir) = offline_gate();

        assert_eq!(gate.optional(&RequestContext::new("/health")).await.unwrap(), None);
        assert!(db.recent(10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_credentials_required_is_audited() {
        let (gate, db, _dir) = offline_gate();

        let err = gate.require(&RequestContext::new("/health")).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));

        let records = db.recent(10).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, ActivityStatus::Failed);
        assert_eq!(records[0].user_id, "unknown");
        assert_eq!(records[0].details.as_deref(), Some("Not authenticated"));
    }

    #[tokio::test]
    async fn malformed_token_required_fails_once() {
        let (gate, db, _dir) = offline_gate();
        let request = RequestContext::new("/signin")
            .with_bearer("definitely.not.jwt")
            .with_client_ip("198.51.100.7")
            .with_user_agent("test-agent");

        let err = gate.require(&request).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)));

        let records = db.recent(10).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, "API_ACCESS_FAILED");
        assert_eq!(records[0].endpoint, "/signin");
        assert_eq!(records[0].ip_address.as_deref(), Some("198.51.100.7"));
        assert_eq!(records[0].user_agent.as_deref(), Some("test-agent"));
    }

    #[tokio::test]
    async fn malformed_token_optional_returns_none_but_audits() {
        let (gate, db, _dir) = offline_gate();
        let request = RequestContext::new("/signin").with_bearer("garbage");

        assert_eq!(gate.optional(&request).await.unwrap(), None);
        assert_eq!(db.recent(10).unwrap().len(), 1);
    }

    /// Store whose writes always fail.
    struct BrokenStore;

    impl ActivityStore for BrokenStore {
        fn record(&self, _activity: NewActivity) -> StorageResult<ActivityReceipt> {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        }

        fn recent(&self, _limit: usize) -> StorageResult<Vec<ActivityRecord>> {
            Ok(Vec::new())
        }

        fn for_user(&self, _user_id: &str, _limit: usize) -> StorageResult<Vec<ActivityRecord>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn audit_store_failure_replaces_rejection() {
        let (gate, _db, _dir) = offline_gate();
        let gate = AuthGate::new(gate.verifier, gate.routes, Arc::new(BrokenStore));

        let err = gate.require(&RequestContext::new("/health")).await.unwrap_err();
        assert!(matches!(err, AuthError::AuditStore(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);

        let err = gate
            .optional(&RequestContext::new("/health").with_bearer("garbage"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AuditStore(_)));
    }

    #[tokio::test]
    async fn audit_store_not_touched_on_silent_paths() {
        let (gate, _db, _dir) = offline_gate();
        let gate = AuthGate::new(gate.verifier, gate.routes, Arc::new(BrokenStore));

        assert_eq!(gate.optional(&RequestContext::new("/health")).await.unwrap(), None);
        assert_eq!(gate.optional(&RequestContext::new("/profile")).await.unwrap(), None);
    }
}
