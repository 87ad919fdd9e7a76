// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! This module provides Auth0 bearer-token authentication for the user
//! activity API.
//!
//! ## Auth Flow
//!
//! 1. Client authenticates with Auth0 and obtains an RS256 access token
//! 2. Client sends `Authorization: Bearer <token>`
//! 3. Server:
//!    - Skips the check for public routes
//!    - Fetches the tenant JWKS and selects the key named by the token's `kid`
//!    - Verifies signature, audience, issuer and time claims
//!    - Extracts `sub` → `user_id` and the optional `email` claim
//!    - Writes one `API_ACCESS` or `API_ACCESS_FAILED` activity record
//!
//! ## Key Fetching
//!
//! The JWKS is fetched on every verification; nothing is cached. Each
//! authenticated request therefore pays one HTTPS round trip to the
//! identity provider, and authentication is unavailable whenever the
//! provider's key endpoint is. Key rotation takes effect immediately.
//!
//! ## Security
//!
//! - Only RS256 is accepted
//! - Clock skew tolerance is 60 seconds
//! - Failures reach the client as 401 with `WWW-Authenticate: Bearer`

pub mod auditor;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod identity;
pub mod jwks;
pub mod password;
pub mod routes;
pub mod verifier;

pub use auditor::Auditor;
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth};
pub use gate::{AuthGate, AuthMode, RequestContext};
pub use identity::AuthenticatedIdentity;
pub use jwks::{JwksResolver, KeyError};
pub use routes::PublicRoutes;
pub use verifier::TokenVerifier;
