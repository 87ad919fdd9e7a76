// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{ChangePasswordRequest, CredentialsRequest, SignUpRequest, UpdateUserRequest, UserProfile, UserSummary},
    state::AppState,
    storage::{ActivityRecord, ActivityStatus},
};

pub mod admin;
pub mod health;
pub mod users;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/signup", post(users::signup))
        .route("/signin", post(users::signin))
        .route("/update", post(users::update_user))
        .route("/change-password", post(users::change_password))
        .route("/profile", post(users::view_profile))
        .route("/me/activities", get(users::my_activities))
        .route("/admin/activities", get(admin::list_activities))
        .route("/admin/users", get(admin::list_users))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Registers the bearer scheme referenced by `security(("bearer" = []))`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "User Activity API", description = "User accounts and activity auditing"),
    modifiers(&SecurityAddon),
    paths(
        health::health,
        users::signup,
        users::signin,
        users::update_user,
        users::change_password,
        users::view_profile,
        users::my_activities,
        admin::list_activities,
        admin::list_users
    ),
    components(
        schemas(
            ActivityRecord,
            ActivityStatus,
            SignUpRequest,
            CredentialsRequest,
            UpdateUserRequest,
            ChangePasswordRequest,
            UserProfile,
            UserSummary,
            health::HealthResponse,
            admin::ActivityListResponse,
            admin::UserListResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Users", description = "Account management"),
        (name = "Admin", description = "Activity and user monitoring")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::offline_state;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (state, _dir) = offline_state();
        let app = router(state);
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/signup",
            "/signin",
            "/update",
            "/change-password",
            "/profile",
            "/me/activities",
            "/admin/activities",
            "/admin/users",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing from OpenAPI");
        }
        let schemes = &doc.components.as_ref().unwrap().security_schemes;
        assert!(schemes.contains_key("bearer"));
    }
}
