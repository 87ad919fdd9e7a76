// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User account records.
//!
//! Emails are unique case-insensitively through the `users_by_email` index.

use chrono::{DateTime, NaiveDate, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use super::{Database, StorageError, StorageResult, USERS, USERS_BY_EMAIL};

/// A user account as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    /// Unique user identifier (UUID)
    pub id: String,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string. Never leaves the server.
    pub password_hash: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub blood_group: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Database {
    /// Insert a new user. Fails with `AlreadyExists` if the email is taken.
    pub fn create_user(&self, user: &StoredUser) -> StorageResult<()> {
        let json = serde_json::to_vec(user)?;
        let key = email_key(&user.email);

        let write_txn = self.inner().begin_write()?;
        {
            let mut by_email = write_txn.open_table(USERS_BY_EMAIL)?;
            if by_email.get(key.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!("User with email {}", user.email)));
            }
            by_email.insert(key.as_str(), user.id.as_str())?;

            let mut users = write_txn.open_table(USERS)?;
            users.insert(user.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Overwrite an existing user. The email is not allowed to change.
    pub fn update_user(&self, user: &StoredUser) -> StorageResult<()> {
        let json = serde_json::to_vec(user)?;

        let write_txn = self.inner().begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            if users.get(user.id.as_str())?.is_none() {
                return Err(StorageError::NotFound(format!("User {}", user.id)));
            }
            users.insert(user.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn find_user_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        let key = email_key(email);
        let read_txn = self.inner().begin_read()?;
        let by_email = read_txn.open_table(USERS_BY_EMAIL)?;
        let users = read_txn.open_table(USERS)?;

        let Some(user_id) = by_email.get(key.as_str())? else {
            return Ok(None);
        };
        match users.get(user_id.value())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All users, ordered by creation time.
    pub fn list_users(&self) -> StorageResult<Vec<StoredUser>> {
        let read_txn = self.inner().begin_read()?;
        let users = read_txn.open_table(USERS)?;

        let mut result = Vec::new();
        for entry in users.iter()? {
            let (_, value) = entry?;
            result.push(serde_json::from_slice::<StoredUser>(value.value())?);
        }
        result.sort_by_key(|u| u.created_at);
        Ok(result)
    }
}
