// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access auditing.
//!
//! Writes one activity record per authentication outcome. Store failures are
//! returned to the caller untouched; nothing is retried.

use std::sync::Arc;

use super::gate::RequestContext;
use super::AuthenticatedIdentity;
use crate::storage::activity::{NewActivity, API_ACCESS, API_ACCESS_FAILED, UNKNOWN_USER};
use crate::storage::{ActivityReceipt, ActivityStore, StorageResult};

#[derive(Clone)]
pub struct Auditor {
    store: Arc<dyn ActivityStore>,
}

impl Auditor {
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self { store }
    }

    /// Record a successful access by `identity`.
    pub fn record_success(
        &self,
        request: &RequestContext,
        identity: &AuthenticatedIdentity,
    ) -> StorageResult<ActivityReceipt> {
        let activity = NewActivity::new(identity.user_id.clone(), API_ACCESS, request.path.clone())
            .with_email(identity.email.clone());
        self.store.record(with_request(activity, request))
    }

    /// Record a rejected access attempt with its cause.
    pub fn record_failure(&self, request: &RequestContext, cause: &str) -> StorageResult<ActivityReceipt> {
        let activity =
            NewActivity::new(UNKNOWN_USER, API_ACCESS_FAILED, request.path.clone()).failed(cause);
        self.store.record(with_request(activity, request))
    }
}

fn with_request(activity: NewActivity, request: &RequestContext) -> NewActivity {
    activity
        .with_ip(request.client_ip.clone())
        .with_user_agent(request.user_agent.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::temp_db;
    use crate::storage::ActivityStatus;

    fn request() -> RequestContext {
        RequestContext::new("/signin")
            .with_client_ip("203.0.113.9")
            .with_user_agent("curl/8.0")
    }

    #[test]
    fn success_record_carries_identity_and_request() {
        let (db, _dir) = temp_db();
        let db = Arc::new(db);
        let auditor = Auditor::new(db.clone());

        let identity = AuthenticatedIdentity {
            user_id: "auth0|123".to_string(),
            email: Some("a@b.com".to_string()),
            raw_claims: Default::default(),
        };
        let receipt = auditor.record_success(&request(), &identity).unwrap();

        let records = db.recent(10).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, receipt.id);
        assert_eq!(record.user_id, "auth0|123");
        assert_eq!(record.user_email.as_deref(), Some("a@b.com"));
        assert_eq!(record.action, API_ACCESS);
        assert_eq!(record.endpoint, "/signin");
        assert_eq!(record.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(record.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(record.status, ActivityStatus::Success);
        assert!(record.details.is_none());
    }

    #[test]
    fn failure_record_uses_unknown_user() {
        let (db, _dir) = temp_db();
        let db = Arc::new(db);
        let auditor = Auditor::new(db.clone());

        auditor.record_failure(&request(), "Invalid token: malformed token").unwrap();

        let record = db.recent(1).unwrap().remove(0);
        assert_eq!(record.user_id, UNKNOWN_USER);
        assert_eq!(record.action, API_ACCESS_FAILED);
        assert_eq!(record.status, ActivityStatus::Failed);
        assert_eq!(record.details.as_deref(), Some("Invalid token: malformed token"));
        assert!(record.user_email.is_none());
    }
}
