// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account endpoints.
//!
//! Every endpoint except `POST /profile` requires a bearer token for the
//! API caller. The account being acted on is identified separately by the
//! email and password in the request body.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    api::admin::{ActivityListResponse, ActivityQueryParams},
    auth::{
        password::{hash_password, verify_password},
        Auth,
    },
    error::ApiError,
    models::{ChangePasswordRequest, CredentialsRequest, SignUpRequest, UpdateUserRequest, UserProfile},
    state::AppState,
    storage::{activity::DEFAULT_USER_LIMIT, ActivityStore, Database, StoredUser},
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Look up an account and check its password.
///
/// Unknown email and wrong password are indistinguishable to the caller.
fn authenticate_account(db: &Database, email: &str, password: &str) -> Result<StoredUser, ApiError> {
    match db.find_user_by_email(email)? {
        Some(user) if verify_password(password, &user.password_hash) => Ok(user),
        _ => Err(ApiError::unauthorized(INVALID_CREDENTIALS)),
    }
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/signup",
    tag = "Users",
    request_body = SignUpRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Account created", body = UserProfile),
        (status = 400, description = "Email already registered"),
        (status = 401, description = "Not authenticated"),
        (status = 422, description = "Invalid request body")
    )
)]
pub async fn signup(
    Auth(_caller): Auth,
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    request.validate().map_err(ApiError::unprocessable)?;

    let user = StoredUser {
        id: Uuid::new_v4().to_string(),
        name: request.name.trim().to_string(),
        email: request.email.trim().to_string(),
        password_hash: hash_password(&request.password)?,
        phone_number: request.phone_number,
        date_of_birth: request.date_of_birth,
        age: request.age,
        blood_group: request.blood_group,
        created_at: Utc::now(),
        updated_at: None,
    };
    state.db.create_user(&user)?;

    tracing::info!(user_id = %user.id, "User signed up");
    Ok(Json(user.into()))
}

/// Check an account's credentials and return its profile.
#[utoipa::path(
    post,
    path = "/signin",
    tag = "Users",
    request_body = CredentialsRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Credentials accepted", body = UserProfile),
        (status = 401, description = "Not authenticated, or invalid email or password"),
        (status = 422, description = "Invalid request body")
    )
)]
pub async fn signin(
    Auth(_caller): Auth,
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    request.validate().map_err(ApiError::unprocessable)?;
    let user = authenticate_account(&state.db, &request.email, &request.password)?;
    Ok(Json(user.into()))
}

/// Update profile fields of an account.
#[utoipa::path(
    post,
    path = "/update",
    tag = "Users",
    request_body = UpdateUserRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 401, description = "Not authenticated, or invalid email or password"),
        (status = 422, description = "Invalid request body")
    )
)]
pub async fn update_user(
    Auth(_caller): Auth,
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    request.validate().map_err(ApiError::unprocessable)?;
    let mut user = authenticate_account(&state.db, &request.email, &request.password)?;

    request.apply(&mut user);
    user.updated_at = Some(Utc::now());
    state.db.update_user(&user)?;

    tracing::info!(user_id = %user.id, "User profile updated");
    Ok(Json(user.into()))
}

/// Replace an account's password after checking the current one.
#[utoipa::path(
    post,
    path = "/change-password",
    tag = "Users",
    request_body = ChangePasswordRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Password changed", body = UserProfile),
        (status = 401, description = "Not authenticated, or invalid email or password"),
        (status = 422, description = "Invalid request body")
    )
)]
pub async fn change_password(
    Auth(_caller): Auth,
    State(state): State<AppState>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    request.validate().map_err(ApiError::unprocessable)?;
    let mut user = authenticate_account(&state.db, &request.email, &request.current_password)?;

    user.password_hash = hash_password(&request.new_password)?;
    user.updated_at = Some(Utc::now());
    state.db.update_user(&user)?;

    tracing::info!(user_id = %user.id, "User password changed");
    Ok(Json(user.into()))
}

/// View a profile by email and password. No bearer token needed.
#[utoipa::path(
    post,
    path = "/profile",
    tag = "Users",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Invalid email or password"),
        (status = 422, description = "Invalid request body")
    )
)]
pub async fn view_profile(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    request.validate().map_err(ApiError::unprocessable)?;
    let user = authenticate_account(&state.db, &request.email, &request.password)?;
    Ok(Json(user.into()))
}

/// Recent activity of the calling token subject.
#[utoipa::path(
    get,
    path = "/me/activities",
    tag = "Users",
    params(ActivityQueryParams),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller's activity, newest first", body = ActivityListResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_activities(
    Auth(caller): Auth,
    Query(params): Query<ActivityQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<ActivityListResponse>, ApiError> {
    let activities = state
        .db
        .for_user(&caller.user_id, params.limit_or(DEFAULT_USER_LIMIT))?;
    Ok(Json(activities.into()))
}
