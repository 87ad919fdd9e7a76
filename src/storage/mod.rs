// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Persistent Storage
//!
//! Embedded ACID database backed by redb (pure Rust). A single file under
//! `DATA_DIR` holds user accounts and the activity trail.
//!
//! ## Table Layout
//!
//! ```text
//! users             user_id             → serialized StoredUser (JSON)
//! users_by_email    lowercase email     → user_id
//! activities        !timestamp|id       → serialized ActivityRecord (JSON)
//! user_activities   user_id|!timestamp|id → activity key
//! ```
//!
//! Every operation opens its own read or write transaction, so there is no
//! long-lived session to leak across requests. redb serializes writers.

pub mod activity;
pub mod users;

use std::path::Path;

use redb::{Database as RedbDatabase, ReadableDatabase, TableDefinition};

pub use activity::{ActivityReceipt, ActivityRecord, ActivityStatus, ActivityStore};
pub use users::StoredUser;

// =============================================================================
// Table Definitions
// =============================================================================

pub(crate) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

pub(crate) const USERS_BY_EMAIL: TableDefinition<&str, &str> = TableDefinition::new("users_by_email");

/// Key format: `inverted_timestamp_be | record_id` for newest-first scans.
pub(crate) const ACTIVITIES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("activities");

/// Key format: `user_id | inverted_timestamp_be | record_id`; value is the
/// matching `ACTIVITIES` key.
pub(crate) const USER_ACTIVITIES: TableDefinition<&[u8], &[u8]> =
    TableDefinition::new("user_activities");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Database
// =============================================================================

/// Handle to the embedded database. Cheap to share behind an `Arc`.
pub struct Database {
    db: RedbDatabase,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = RedbDatabase::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERS_BY_EMAIL)?;
            let _ = write_txn.open_table(ACTIVITIES)?;
            let _ = write_txn.open_table(USER_ACTIVITIES)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Database opened");
        Ok(Self { db })
    }

    /// Cheap round-trip used by the health endpoint.
    pub fn ping(&self) -> StorageResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(USERS)?;
        Ok(())
    }

    pub(crate) fn inner(&self) -> &RedbDatabase {
        &self.db
    }
}
