// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" when the response is 200.
    pub status: String,
    /// Database connectivity ("connected").
    pub database: String,
}

/// Health check endpoint handler.
///
/// Requires a valid bearer token. Returns 200 when the database answers and
/// 503 otherwise.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Service and database are up", body = HealthResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 503, description = "Database unreachable"),
    )
)]
pub async fn health(Auth(_identity): Auth, State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    state.db.ping().map_err(|e| {
        tracing::error!(error = %e, "Health check failed");
        ApiError::service_unavailable(format!("Database connection error: {e}"))
    })?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        database: "connected".to_string(),
    }))
}
