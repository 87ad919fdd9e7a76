// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for integration tests: a mock identity provider serving
//! a JWKS document, and RS256 tokens signed with fixed test keys.

#![allow(dead_code)]

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tempfile::TempDir;
use url::Url;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use user_activity_server::auth::{JwksResolver, PublicRoutes, TokenVerifier};
use user_activity_server::state::AppState;
use user_activity_server::storage::Database;

pub const AUDIENCE: &str = "https://api.example.com";
pub const ISSUER: &str = "https://tenant.example.com/";
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// Key id the provider publishes for [`SIGNING_KEY_PEM`].
pub const SIGNING_KID: &str = "test-key-1";
/// Key id the provider publishes for [`OTHER_KEY_PEM`] when rotated in.
pub const OTHER_KID: &str = "test-key-2";

pub const SIGNING_KEY_PEM: &[u8] = include_bytes!("../fixtures/signing.pem");
pub const OTHER_KEY_PEM: &[u8] = include_bytes!("../fixtures/other.pem");
const SIGNING_MODULUS: &str = include_str!("../fixtures/signing.n");
const OTHER_MODULUS: &str = include_str!("../fixtures/other.n");

/// Public JWK for the primary test key.
pub fn signing_jwk(kid: &str) -> Value {
    rsa_jwk(kid, SIGNING_MODULUS)
}

/// Public JWK for the secondary test key.
pub fn other_jwk(kid: &str) -> Value {
    rsa_jwk(kid, OTHER_MODULUS)
}

/// Public JWK for an EC P-256 key the tests never sign with.
pub fn ec_jwk(kid: &str) -> Value {
    json!({
        "kty": "EC",
        "kid": kid,
        "use": "sig",
        "alg": "ES256",
        "crv": "P-256",
        "x": "f83OJ3D2xF1Bg8vub9tLe1gHMzV76e8Tus9uPHvRVEU",
        "y": "x_FEzRu9m36HLN_tue659LNpXW6pCyStikYjKIWI5a0"
    })
}

fn rsa_jwk(kid: &str, modulus: &str) -> Value {
    json!({
        "kty": "RSA",
        "kid": kid,
        "use": "sig",
        "alg": "RS256",
        "n": modulus.trim(),
        "e": "AQAB"
    })
}

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Claims of a token that verifies against the test provider.
pub fn valid_claims() -> Value {
    let now = now();
    json!({
        "sub": "auth0|123",
        "email": "a@b.com",
        "aud": AUDIENCE,
        "iss": ISSUER,
        "iat": now,
        "exp": now + 3600
    })
}

/// Sign `claims` with RS256 under the given `kid`.
pub fn sign(claims: &Value, kid: &str, private_key_pem: &[u8]) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(private_key_pem).unwrap();
    encode(&header, claims, &key).unwrap()
}

/// A token the test provider accepts.
pub fn valid_token() -> String {
    sign(&valid_claims(), SIGNING_KID, SIGNING_KEY_PEM)
}

/// Mock identity provider.
pub struct MockProvider {
    pub server: MockServer,
}

impl MockProvider {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Start a provider publishing only the primary key.
    pub async fn with_signing_key() -> Self {
        let provider = Self::start().await;
        provider.mount_jwks(vec![signing_jwk(SIGNING_KID)], None).await;
        provider
    }

    pub fn jwks_url(&self) -> Url {
        Url::parse(&format!("{}{}", self.server.uri(), JWKS_PATH)).unwrap()
    }

    /// Serve `keys` at the JWKS path, optionally asserting the fetch count
    /// when the server is dropped.
    pub async fn mount_jwks(&self, keys: Vec<Value>, expected_fetches: Option<u64>) {
        let mut mock = Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": keys })));
        if let Some(n) = expected_fetches {
            mock = mock.expect(n);
        }
        mock.mount(&self.server).await;
    }

    pub async fn mount_status(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub fn verifier(&self) -> TokenVerifier {
        let resolver = JwksResolver::new(self.jwks_url(), Duration::from_secs(5)).unwrap();
        TokenVerifier::new(resolver, AUDIENCE, ISSUER)
    }

    /// Application state backed by a fresh database in a temp dir.
    pub fn app_state(&self) -> (AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("test.redb")).unwrap();
        (AppState::new(db, self.verifier(), PublicRoutes::default()), dir)
    }
}
