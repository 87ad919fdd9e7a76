// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and key selection.
//!
//! ## Behaviour
//!
//! - The key set is fetched on every call to [`JwksResolver::resolve`]. There
//!   is no cache: each protected request costs one round-trip to the
//!   provider, and a provider outage rejects every token.
//! - Each fetch is bounded by the configured timeout.
//! - Failures are never retried.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// One entry of the provider's key set, as published.
///
/// Only `kty` is always present; the rest depends on the key type, so an
/// EC or symmetric key elsewhere in the set still parses.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PublishedKey {
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default)]
    pub kty: String,
    #[serde(rename = "use", default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub n: Option<String>,
    #[serde(default)]
    pub e: Option<String>,
}

/// An RSA public signing key selected from the key set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningKey {
    pub key_id: String,
    pub key_type: String,
    pub usage: Option<String>,
    /// Base64url-encoded RSA modulus.
    pub modulus: String,
    /// Base64url-encoded RSA public exponent.
    pub exponent: String,
}

impl SigningKey {
    /// The RSA signing key described by `key`, if it is one.
    fn from_published(key: &PublishedKey) -> Option<Self> {
        if key.kty != "RSA" {
            return None;
        }
        Some(Self {
            key_id: key.kid.clone()?,
            key_type: key.kty.clone(),
            usage: key.usage.clone(),
            modulus: key.n.clone()?,
            exponent: key.e.clone()?,
        })
    }
}

/// The provider's key set document.
#[derive(Debug, Clone, Deserialize)]
pub struct KeySet {
    pub keys: Vec<PublishedKey>,
}

impl KeySet {
    /// Select the key with the given identifier.
    pub fn find(&self, kid: &str) -> Option<&PublishedKey> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("Failed to fetch signing keys: {0}")]
    Fetch(String),

    #[error("Malformed key set: {0}")]
    MalformedKeySet(String),

    #[error("Unable to find a valid signing key")]
    KeyNotFound(String),
}

/// Fetches the provider's key set and selects keys by `kid`.
#[derive(Clone)]
pub struct JwksResolver {
    jwks_url: Url,
    client: reqwest::Client,
}

impl JwksResolver {
    /// Create a resolver for the given JWKS endpoint.
    ///
    /// # Arguments
    /// - `jwks_url`: e.g. `https://tenant.auth0.com/.well-known/jwks.json`
    /// - `timeout`: upper bound for each fetch
    pub fn new(jwks_url: Url, timeout: Duration) -> Result<Self, KeyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeyError::Fetch(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { jwks_url, client })
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &Url {
        &self.jwks_url
    }

    /// Fetch the current key set and return the RSA key matching `kid`.
    ///
    /// A matching entry that is not a complete RSA key counts as not found.
    pub async fn resolve(&self, kid: &str) -> Result<SigningKey, KeyError> {
        let key_set = self.fetch().await?;
        key_set
            .find(kid)
            .and_then(SigningKey::from_published)
            .ok_or_else(|| KeyError::KeyNotFound(kid.to_string()))
    }

    /// Fetch the key set from the endpoint.
    pub async fn fetch(&self) -> Result<KeySet, KeyError> {
        tracing::debug!(url = %self.jwks_url, "Fetching signing keys");

        let response = self
            .client
            .get(self.jwks_url.clone())
            .send()
            .await
            .map_err(|e| KeyError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(KeyError::Fetch(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| KeyError::Fetch(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| KeyError::MalformedKeySet(e.to_string()))
    }
}
