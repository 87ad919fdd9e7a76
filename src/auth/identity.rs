// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated identity extracted from a verified token.

use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Who made the request, as established by a verified bearer token.
///
/// Lives for the duration of one request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AuthenticatedIdentity {
    /// Canonical user ID (`sub` claim), e.g. `auth0|123`
    pub user_id: String,

    /// `email` claim, when the provider includes it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Every claim in the verified token
    #[schema(value_type = Object)]
    pub raw_claims: Map<String, Value>,
}

impl AuthenticatedIdentity {
    /// Build an identity from verified claims.
    ///
    /// Returns `None` when `sub` is missing, not a string, or empty.
    pub fn from_claims(raw_claims: Map<String, Value>) -> Option<Self> {
        let user_id = raw_claims
            .get("sub")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())?
            .to_string();
        let email = raw_claims
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(Self {
            user_id,
            email,
            raw_claims,
        })
    }
}
