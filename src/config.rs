// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup into an
//! [`AppConfig`] and passed by reference to whatever needs it. Nothing reads
//! the environment after that.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding the redb database file | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8000` |
//! | `AUTH0_DOMAIN` | Identity provider domain (e.g. `tenant.auth0.com`) | Required |
//! | `AUTH0_API_AUDIENCE` | Expected JWT audience claim | Required |
//! | `JWKS_TIMEOUT_SECS` | Timeout for each JWKS fetch, whole seconds, at least 1 | `10` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Environment variable name for the data directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
/// Identity provider domain. The JWKS URL and expected issuer derive from it.
pub const AUTH0_DOMAIN_ENV: &str = "AUTH0_DOMAIN";
/// API identifier that tokens must carry in their `aud` claim.
pub const AUTH0_AUDIENCE_ENV: &str = "AUTH0_API_AUDIENCE";
pub const JWKS_TIMEOUT_ENV: &str = "JWKS_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_JWKS_TIMEOUT_SECS: u64 = 10;

/// Name of the database file inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "user_activity.redb";

/// Default `RUST_LOG` filter when none is set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Settings for the authentication gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    /// Provider domain, e.g. `tenant.auth0.com`.
    pub domain: String,
    /// Expected `aud` claim.
    pub audience: String,
    /// Upper bound for each outbound key-set request.
    pub jwks_timeout: Duration,
}

impl AuthSettings {
    pub fn new(domain: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            audience: audience.into(),
            jwks_timeout: Duration::from_secs(DEFAULT_JWKS_TIMEOUT_SECS),
        }
    }

    /// `https://{domain}/.well-known/jwks.json`
    pub fn jwks_url(&self) -> Result<Url, ConfigError> {
        self.base_url()?
            .join(".well-known/jwks.json")
            .map_err(|e| ConfigError::Invalid {
                name: AUTH0_DOMAIN_ENV,
                reason: e.to_string(),
            })
    }

    /// Expected `iss` claim: `https://{domain}/` (trailing slash included).
    pub fn issuer(&self) -> Result<String, ConfigError> {
        Ok(self.base_url()?.to_string())
    }

    fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&format!("https://{}/", self.domain)).map_err(|e| ConfigError::Invalid {
            name: AUTH0_DOMAIN_ENV,
            reason: e.to_string(),
        })
    }
}

/// Process-wide configuration, built once in `main`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub log_format: LogFormat,
    pub auth: AuthSettings,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    ///
    /// Empty values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let domain = get(AUTH0_DOMAIN_ENV).ok_or(ConfigError::Missing(AUTH0_DOMAIN_ENV))?;
        let audience = get(AUTH0_AUDIENCE_ENV).ok_or(ConfigError::Missing(AUTH0_AUDIENCE_ENV))?;

        let port = match get(PORT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                reason: format!("'{raw}' is not a port number"),
            })?,
            None => DEFAULT_PORT,
        };

        let jwks_timeout = match get(JWKS_TIMEOUT_ENV) {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    name: JWKS_TIMEOUT_ENV,
                    reason: format!("'{raw}' is not a whole number of seconds"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        name: JWKS_TIMEOUT_ENV,
                        reason: "must be at least 1 second".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_JWKS_TIMEOUT_SECS),
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let auth = AuthSettings {
            domain,
            audience,
            jwks_timeout,
        };
        // Reject domains that cannot form a URL at startup rather than per request.
        auth.jwks_url()?;

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            data_dir: PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())),
            log_format,
            auth,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn requires_domain_and_audience() {
        let err = AppConfig::from_lookup(lookup(&[(AUTH0_AUDIENCE_ENV, "api")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(AUTH0_DOMAIN_ENV));

        let err = AppConfig::from_lookup(lookup(&[(AUTH0_DOMAIN_ENV, "t.auth0.com")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(AUTH0_AUDIENCE_ENV));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let err = AppConfig::from_lookup(lookup(&[
            (AUTH0_DOMAIN_ENV, "  "),
            (AUTH0_AUDIENCE_ENV, "api"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing(AUTH0_DOMAIN_ENV));
    }

    #[test]
    fn defaults_applied() {
        let config = AppConfig::from_lookup(lookup(&[
            (AUTH0_DOMAIN_ENV, "tenant.auth0.com"),
            (AUTH0_AUDIENCE_ENV, "https://api.example.com"),
        ]))
        .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.auth.jwks_timeout, Duration::from_secs(10));
        assert_eq!(config.database_path(), PathBuf::from("./data/user_activity.redb"));
    }

    #[test]
    fn rejects_bad_port() {
        let err = AppConfig::from_lookup(lookup(&[
            (AUTH0_DOMAIN_ENV, "tenant.auth0.com"),
            (AUTH0_AUDIENCE_ENV, "api"),
            (PORT_ENV, "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: PORT_ENV, .. }));
    }

    #[test]
    fn zero_jwks_timeout_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[
            (AUTH0_DOMAIN_ENV, "tenant.auth0.com"),
            (AUTH0_AUDIENCE_ENV, "api"),
            (JWKS_TIMEOUT_ENV, "0"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: JWKS_TIMEOUT_ENV,
                reason: "must be at least 1 second".to_string(),
            }
        );

        let config = AppConfig::from_lookup(lookup(&[
            (AUTH0_DOMAIN_ENV, "tenant.auth0.com"),
            (AUTH0_AUDIENCE_ENV, "api"),
            (JWKS_TIMEOUT_ENV, "1"),
        ]))
        .unwrap();
        assert_eq!(config.auth.jwks_timeout, Duration::from_secs(1));
    }

    #[test]
    fn provider_urls_derive_from_domain() {
        let auth = AuthSettings::new("tenant.auth0.com", "api");
        assert_eq!(
            auth.jwks_url().unwrap().as_str(),
            "https://tenant.auth0.com/.well-known/jwks.json"
        );
        assert_eq!(auth.issuer().unwrap(), "https://tenant.auth0.com/");
    }

    #[test]
    fn json_log_format() {
        let config = AppConfig::from_lookup(lookup(&[
            (AUTH0_DOMAIN_ENV, "tenant.auth0.com"),
            (AUTH0_AUDIENCE_ENV, "api"),
            (LOG_FORMAT_ENV, "json"),
        ]))
        .unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
