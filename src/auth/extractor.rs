// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated callers.
//!
//! Use `Auth` in handlers that require authentication and `OptionalAuth`
//! where an identity is welcome but not needed:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(identity): Auth) -> impl IntoResponse {
//!     // identity is AuthenticatedIdentity
//! }
//! ```

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts, OriginalUri},
    http::{
        header::{HeaderName, AUTHORIZATION, USER_AGENT},
        request::Parts,
    },
};

use super::gate::RequestContext;
use super::{AuthError, AuthenticatedIdentity};
use crate::state::AppState;

/// Build the gate's view of a request.
///
/// The client IP is only known when the server was started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn request_context(parts: &Parts) -> RequestContext {
    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let header = |name: HeaderName| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    RequestContext {
        path,
        client_ip: parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string()),
        user_agent: header(USER_AGENT),
        authorization: header(AUTHORIZATION),
    }
}

/// Extractor for authenticated callers (required convention).
///
/// Rejects with [`AuthError`]; the rejection renders as 401 with a
/// `WWW-Authenticate: Bearer` challenge, or 400 on public routes.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_activities(
///     Auth(identity): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<Vec<ActivityRecord>>, ApiError> {
///     // identity.user_id is the token subject
/// }
/// ```
pub struct Auth(pub AuthenticatedIdentity);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Already evaluated for this request; don't verify or audit twice
        if let Some(identity) = parts.extensions.get::<AuthenticatedIdentity>().cloned() {
            return Ok(Auth(identity));
        }

        let request = request_context(parts);
        let identity = state.gate.require(&request).await?;
        parts.extensions.insert(identity.clone());
        Ok(Auth(identity))
    }
}

/// Optional authentication extractor.
///
/// Yields `None` for public routes, absent credentials and invalid tokens.
/// Only an audit-store failure rejects.
pub struct OptionalAuth(pub Option<AuthenticatedIdentity>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<AuthenticatedIdentity>().cloned() {
            return Ok(OptionalAuth(Some(identity)));
        }

        let request = request_context(parts);
        let identity = state.gate.optional(&request).await?;
        if let Some(identity) = &identity {
            parts.extensions.insert(identity.clone());
        }
        Ok(OptionalAuth(identity))
    }
}
