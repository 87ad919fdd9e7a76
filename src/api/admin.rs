// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Monitoring endpoints.
//!
//! Any valid bearer token may call these; there is no role model.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::Auth,
    error::ApiError,
    models::UserSummary,
    state::AppState,
    storage::{activity::DEFAULT_RECENT_LIMIT, ActivityRecord, ActivityStore},
};

/// Upper bound on any listing page.
pub const MAX_LIMIT: usize = 1000;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for activity listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityQueryParams {
    /// Maximum number of records (capped at 1000).
    pub limit: Option<usize>,
}

impl ActivityQueryParams {
    pub fn limit_or(&self, default: usize) -> usize {
        self.limit.unwrap_or(default).min(MAX_LIMIT)
    }
}

/// Response for activity listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityListResponse {
    /// Records, newest first.
    pub activities: Vec<ActivityRecord>,
    /// Number of records returned.
    pub total: usize,
}

impl From<Vec<ActivityRecord>> for ActivityListResponse {
    fn from(activities: Vec<ActivityRecord>) -> Self {
        let total = activities.len();
        Self { activities, total }
    }
}

/// Response for the user listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserSummary>,
    pub total: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// List recent activity across all users.
#[utoipa::path(
    get,
    path = "/admin/activities",
    tag = "Admin",
    params(ActivityQueryParams),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Recent activity, newest first", body = ActivityListResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_activities(
    Auth(caller): Auth,
    Query(params): Query<ActivityQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<ActivityListResponse>, ApiError> {
    let activities = state.db.recent(params.limit_or(DEFAULT_RECENT_LIMIT))?;
    tracing::debug!(user_id = %caller.user_id, count = activities.len(), "Listed activities");
    Ok(Json(activities.into()))
}

/// List every registered user, oldest first.
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Registered users", body = UserListResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_users(Auth(caller): Auth, State(state): State<AppState>) -> Result<Json<UserListResponse>, ApiError> {
    let users: Vec<UserSummary> = state.db.list_users()?.into_iter().map(Into::into).collect();
    let total = users.len();
    tracing::debug!(user_id = %caller.user_id, count = total, "Listed users");
    Ok(Json(UserListResponse { users, total }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_caps() {
        assert_eq!(ActivityQueryParams::default().limit_or(100), 100);
        assert_eq!(ActivityQueryParams { limit: Some(5) }.limit_or(100), 5);
        assert_eq!(ActivityQueryParams { limit: Some(50_000) }.limit_or(100), MAX_LIMIT);
    }
}
