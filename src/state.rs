// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{AuthGate, PublicRoutes, TokenVerifier};
use crate::storage::Database;

/// Shared handler state. Cheap to clone; everything lives behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub gate: Arc<AuthGate>,
}

impl AppState {
    /// Wire the gate to record into the same database the handlers use.
    pub fn new(db: Database, verifier: TokenVerifier, routes: PublicRoutes) -> Self {
        let db = Arc::new(db);
        let gate = AuthGate::new(verifier, routes, db.clone());
        Self {
            db,
            gate: Arc::new(gate),
        }
    }
}
