// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Public route classification.
//!
//! Built once at startup and consulted read-only by the gate.

use std::collections::HashSet;

/// Paths that never require authentication.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &[
    "/api/docs",
    "/api/redoc",
    "/api/openapi.json",
    "/user/signup",
    "/user/signin",
    "/user/profile/view",
    "/user/profile/update",
    "/user/change-password",
    "/profile",
];

/// Prefix under which static assets are served.
pub const DEFAULT_STATIC_PREFIX: &str = "/static/";

#[derive(Debug, Clone)]
pub struct PublicRoutes {
    exact: HashSet<String>,
    static_prefix: String,
}

impl PublicRoutes {
    pub fn new<I, S>(paths: I, static_prefix: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exact: paths.into_iter().map(Into::into).collect(),
            static_prefix: static_prefix.into(),
        }
    }

    /// Exact match against the table, or anything under the static prefix.
    pub fn is_public(&self, path: &str) -> bool {
        self.exact.contains(path) || path.starts_with(&self.static_prefix)
    }
}

impl Default for PublicRoutes {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_PATHS.iter().copied(), DEFAULT_STATIC_PREFIX)
    }
}
