// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the account endpoints. All types derive
//! `ToSchema` for the OpenAPI document.
//!
//! Account requests authenticate the account itself by email and password,
//! independently of the bearer token that authenticates the API caller.
//!
//! ## Validation
//!
//! Each request type has a `validate` method returning the first problem
//! found. Handlers turn that into a 422.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::StoredUser;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

// =============================================================================
// Field Validation
// =============================================================================

/// Basic syntactic email check: one `@`, non-empty local part, dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

fn check_email(email: &str) -> Result<(), String> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err("email: value is not a valid email address".to_string())
    }
}

fn check_password(field: &str, password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "{field}: must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    Ok(())
}

fn check_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name: must not be empty".to_string());
    }
    Ok(())
}

// =============================================================================
// Requests
// =============================================================================

/// Request body for `POST /signup`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignUpRequest {
    /// Display name; surrounding whitespace is stripped.
    pub name: String,
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub blood_group: Option<String>,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), String> {
        check_name(&self.name)?;
        check_email(&self.email)?;
        check_password("password", &self.password)
    }
}

/// Email and password pair. Used by `POST /signin` and `POST /profile`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    pub fn validate(&self) -> Result<(), String> {
        check_email(&self.email)?;
        check_password("password", &self.password)
    }
}

/// Request body for `POST /update`.
///
/// `email` and `password` identify the account; every other field that is
/// present replaces the stored value.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub blood_group: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), String> {
        check_email(&self.email)?;
        check_password("password", &self.password)?;
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        Ok(())
    }

    /// Apply the present fields to `user`.
    pub fn apply(&self, user: &mut StoredUser) {
        if let Some(name) = &self.name {
            user.name = name.trim().to_string();
        }
        if let Some(phone_number) = &self.phone_number {
            user.phone_number = Some(phone_number.clone());
        }
        if let Some(date_of_birth) = self.date_of_birth {
            user.date_of_birth = Some(date_of_birth);
        }
        if let Some(age) = self.age {
            user.age = Some(age);
        }
        if let Some(blood_group) = &self.blood_group {
            user.blood_group = Some(blood_group.clone());
        }
    }
}

/// Request body for `POST /change-password`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub email: String,
    pub current_password: String,
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), String> {
        check_email(&self.email)?;
        check_password("current_password", &self.current_password)?;
        check_password("new_password", &self.new_password)
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Public view of an account. The password hash is never included.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub age: Option<i32>,
    pub blood_group: Option<String>,
}

impl From<StoredUser> for UserProfile {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone_number: user.phone_number,
            date_of_birth: user.date_of_birth,
            age: user.age,
            blood_group: user.blood_group,
        }
    }
}

/// Admin listing entry: the profile plus its creation time.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSummary {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
}

impl From<StoredUser> for UserSummary {
    fn from(user: StoredUser) -> Self {
        let created_at = user.created_at;
        Self {
            profile: user.into(),
            created_at,
        }
    }
}
