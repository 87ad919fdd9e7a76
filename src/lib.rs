// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User Activity Server - Account Backend with Audited Bearer Authentication
//!
//! Accounts and profiles behind an Auth0 RS256 bearer-token gate. Every
//! authentication outcome on a protected route is written to an activity
//! trail in an embedded redb database.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Bearer-token authentication gate and access auditing
//! - `config` - Environment-driven configuration
//! - `storage` - Embedded database (redb)

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;

use auth::{PublicRoutes, TokenVerifier};
use config::{AppConfig, ConfigError, LogFormat, DEFAULT_LOG_FILTER};
use state::AppState;
use storage::{Database, StorageError};

/// Errors that stop the server from starting or keep it from running.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides [`DEFAULT_LOG_FILTER`]. Calling this twice is a no-op.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
}

/// Build the shared state from configuration: open the database and wire
/// the gate to the provider's key endpoint.
pub fn build_state(config: &AppConfig) -> Result<AppState, ServerError> {
    let db = Database::open(&config.database_path())?;
    let verifier = TokenVerifier::from_settings(&config.auth)?;
    tracing::info!(
        jwks_url = %verifier.resolver().jwks_url(),
        issuer = %verifier.issuer(),
        audience = %verifier.audience(),
        "Authentication configured"
    );
    Ok(AppState::new(db, verifier, PublicRoutes::default()))
}

/// Serve the API until Ctrl-C or SIGTERM.
pub async fn run(config: AppConfig) -> Result<(), ServerError> {
    let state = build_state(&config)?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        "User activity server listening (docs at /api/docs)"
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
