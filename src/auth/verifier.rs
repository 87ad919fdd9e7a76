// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification against the provider's signing keys.
//!
//! Every failure (malformed token, wrong algorithm, unknown key, bad
//! signature, wrong audience or issuer, expired) collapses into
//! [`AuthError::TokenInvalid`] carrying a readable cause.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use super::jwks::{JwksResolver, KeyError};
use super::{AuthError, AuthenticatedIdentity};
use crate::config::{AuthSettings, ConfigError};

/// The only algorithm the provider signs with.
pub const ALLOWED_ALGORITHM: Algorithm = Algorithm::RS256;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Verifies RS256 bearer tokens issued by one provider for one API.
#[derive(Clone)]
pub struct TokenVerifier {
    resolver: JwksResolver,
    /// Expected `aud` claim
    audience: String,
    /// Expected `iss` claim, e.g. `https://tenant.auth0.com/`
    issuer: String,
}

impl TokenVerifier {
    pub fn new(resolver: JwksResolver, audience: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            resolver,
            audience: audience.into(),
            issuer: issuer.into(),
        }
    }

    /// Build a verifier for the configured provider.
    pub fn from_settings(settings: &AuthSettings) -> Result<Self, ConfigError> {
        let resolver = JwksResolver::new(settings.jwks_url()?, settings.jwks_timeout).map_err(|e| {
            ConfigError::Invalid {
                name: crate::config::JWKS_TIMEOUT_ENV,
                reason: e.to_string(),
            }
        })?;
        Ok(Self::new(resolver, settings.audience.clone(), settings.issuer()?))
    }

    pub fn resolver(&self) -> &JwksResolver {
        &self.resolver
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Verify `token` and return the identity it asserts.
    pub async fn verify(&self, token: &str) -> Result<AuthenticatedIdentity, AuthError> {
        // Unverified header: only used to pick the key and reject foreign algorithms.
        let header = decode_header(token).map_err(|e| invalid_token(e.kind()))?;

        if header.alg != ALLOWED_ALGORITHM {
            return Err(AuthError::TokenInvalid(format!(
                "Invalid token: algorithm {:?} is not allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AuthError::TokenInvalid("Invalid token: missing key id".to_string()))?;

        let key = self.resolver.resolve(&kid).await.map_err(verification_failed)?;

        let decoding_key = DecodingKey::from_rsa_components(&key.modulus, &key.exponent)
            .map_err(|e| invalid_token(e.kind()))?;

        let token_data = decode::<Map<String, Value>>(token, &decoding_key, &self.validation())
            .map_err(|e| invalid_token(e.kind()))?;

        AuthenticatedIdentity::from_claims(token_data.claims)
            .ok_or_else(|| AuthError::TokenInvalid("User ID not found in token".to_string()))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(ALLOWED_ALGORITHM);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        // exp/nbf are checked only when present; aud/iss must be present.
        validation.set_required_spec_claims(&["aud", "iss"]);
        validation
    }
}

fn verification_failed(err: KeyError) -> AuthError {
    AuthError::TokenInvalid(format!("Token verification failed: {err}"))
}

fn invalid_token(kind: &ErrorKind) -> AuthError {
    let reason = match kind {
        ErrorKind::InvalidToken => "malformed token".to_string(),
        ErrorKind::InvalidSignature => "signature verification failed".to_string(),
        ErrorKind::ExpiredSignature => "signature has expired".to_string(),
        ErrorKind::ImmatureSignature => "token is not yet valid".to_string(),
        ErrorKind::InvalidAudience => "invalid audience".to_string(),
        ErrorKind::InvalidIssuer => "invalid issuer".to_string(),
        ErrorKind::MissingRequiredClaim(claim) => format!("missing required claim '{claim}'"),
        ErrorKind::InvalidAlgorithm => "algorithm mismatch".to_string(),
        ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => "malformed token".to_string(),
        other => format!("{other:?}"),
    };
    AuthError::TokenInvalid(format!("Invalid token: {reason}"))
}
