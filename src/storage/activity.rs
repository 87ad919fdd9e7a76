// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Activity trail for authentication attempts.
//!
//! Records are append-only: this crate never updates or deletes them. Each
//! record gets its id and timestamp at write time.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Database, StorageResult, ACTIVITIES, USER_ACTIVITIES};

/// Action tag for a successful authenticated access.
pub const API_ACCESS: &str = "API_ACCESS";
/// Action tag for a rejected access attempt.
pub const API_ACCESS_FAILED: &str = "API_ACCESS_FAILED";
/// User id recorded when no identity could be resolved.
pub const UNKNOWN_USER: &str = "unknown";

/// Default page size for the admin listing.
pub const DEFAULT_RECENT_LIMIT: usize = 100;
/// Default page size for a single user's listing.
pub const DEFAULT_USER_LIMIT: usize = 50;

/// Outcome recorded for an activity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
    Success,
    Failed,
}

/// An activity that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub user_id: String,
    pub user_email: Option<String>,
    pub action: String,
    pub endpoint: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub status: ActivityStatus,
    pub details: Option<String>,
}

impl NewActivity {
    /// A successful activity for `user_id`.
    pub fn new(user_id: impl Into<String>, action: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_email: None,
            action: action.into(),
            endpoint: endpoint.into(),
            ip_address: None,
            user_agent: None,
            status: ActivityStatus::Success,
            details: None,
        }
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.user_email = email;
        self
    }

    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip_address = ip;
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Mark as failed with a human-readable cause.
    pub fn failed(mut self, details: impl Into<String>) -> Self {
        self.status = ActivityStatus::Failed;
        self.details = Some(details.into());
        self
    }
}

/// A persisted activity record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ActivityRecord {
    /// Unique record ID (UUID v4).
    pub id: String,
    /// Subject of the token, or `unknown` for failed attempts.
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    /// Action tag, e.g. `API_ACCESS`.
    pub action: String,
    /// Request path.
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: ActivityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// What the store hands back after a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityReceipt {
    pub id: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only activity store.
pub trait ActivityStore: Send + Sync {
    /// Persist one activity and return its assigned id and timestamp.
    fn record(&self, activity: NewActivity) -> StorageResult<ActivityReceipt>;

    /// Most recent activities across all users, newest first.
    fn recent(&self, limit: usize) -> StorageResult<Vec<ActivityRecord>>;

    /// Most recent activities for one user, newest first.
    fn for_user(&self, user_id: &str, limit: usize) -> StorageResult<Vec<ActivityRecord>>;
}

// =============================================================================
// Key Helpers
// =============================================================================

/// `inverted_micros_be | uuid_bytes`: newer records sort first.
fn make_activity_key(timestamp: DateTime<Utc>, id: &Uuid) -> Vec<u8> {
    let mut key = Vec::with_capacity(8 + 16);
    key.extend_from_slice(&(!(timestamp.timestamp_micros() as u64)).to_be_bytes());
    key.extend_from_slice(id.as_bytes());
    key
}

/// Length-prefixed user id, so ids containing separators (`auth0|123`)
/// never share a prefix with another user.
fn make_user_prefix(user_id: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(4 + user_id.len());
    prefix.extend_from_slice(&(user_id.len() as u32).to_be_bytes());
    prefix.extend_from_slice(user_id.as_bytes());
    prefix
}

fn make_user_index_key(user_id: &str, activity_key: &[u8]) -> Vec<u8> {
    let mut key = make_user_prefix(user_id);
    key.extend_from_slice(activity_key);
    key
}

// =============================================================================
// redb implementation
// =============================================================================

impl ActivityStore for Database {
    fn record(&self, activity: NewActivity) -> StorageResult<ActivityReceipt> {
        let id = Uuid::new_v4();
        let timestamp = Utc::now();
        let record = ActivityRecord {
            id: id.to_string(),
            user_id: activity.user_id,
            user_email: activity.user_email,
            action: activity.action,
            endpoint: activity.endpoint,
            ip_address: activity.ip_address,
            user_agent: activity.user_agent,
            timestamp,
            status: activity.status,
            details: activity.details,
        };

        let json = serde_json::to_vec(&record)?;
        let key = make_activity_key(timestamp, &id);
        let index_key = make_user_index_key(&record.user_id, &key);

        let write_txn = self.inner().begin_write()?;
        {
            let mut table = write_txn.open_table(ACTIVITIES)?;
            table.insert(key.as_slice(), json.as_slice())?;

            let mut index = write_txn.open_table(USER_ACTIVITIES)?;
            index.insert(index_key.as_slice(), key.as_slice())?;
        }
        write_txn.commit()?;

        tracing::trace!(
            activity_id = %record.id,
            action = %record.action,
            status = ?record.status,
            "Activity recorded"
        );

        Ok(ActivityReceipt {
            id: record.id,
            timestamp,
        })
    }

    fn recent(&self, limit: usize) -> StorageResult<Vec<ActivityRecord>> {
        let read_txn = self.inner().begin_read()?;
        let table = read_txn.open_table(ACTIVITIES)?;

        let mut records = Vec::with_capacity(limit.min(256));
        for entry in table.iter()? {
            if records.len() >= limit {
                break;
            }
            let (_, value) = entry?;
            records.push(serde_json::from_slice(value.value())?);
        }
        Ok(records)
    }

    fn for_user(&self, user_id: &str, limit: usize) -> StorageResult<Vec<ActivityRecord>> {
        let read_txn = self.inner().begin_read()?;
        let index = read_txn.open_table(USER_ACTIVITIES)?;
        let table = read_txn.open_table(ACTIVITIES)?;

        let start = make_user_prefix(user_id);
        let mut end = start.clone();
        // Every index key for this user is the prefix plus exactly 24 bytes.
        end.extend_from_slice(&[0xFF; 24]);

        let mut records = Vec::with_capacity(limit.min(256));
        for entry in index.range(start.as_slice()..=end.as_slice())? {
            if records.len() >= limit {
                break;
            }
            let (_, activity_key) = entry?;
            if let Some(value) = table.get(activity_key.value())? {
                records.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(records)
    }
}
