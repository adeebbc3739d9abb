//! Application Router
//! Mission: Assemble every route with its auth and role layers in one
//! place, shared by the binary and the integration tests

use axum::{
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::directory::{self, DirectoryState};
use crate::auth::api as auth_api;
use crate::auth::jwt::TokenService;
use crate::auth::middleware::{auth_middleware, optional_auth_middleware, require_role};
use crate::auth::roles::{ADMIN_ROLES, PROFILE_VIEWER_ROLES};
use crate::auth::AuthState;
use crate::middleware::request_logging;

/// Build the full router. Layers wrap the routes added before them, so on
/// each protected router the auth layer (added last) runs first and the
/// role gate below it sees a populated request context.
pub fn build_router(
    auth_state: AuthState,
    directory_state: DirectoryState,
    tokens: Arc<TokenService>,
) -> Router {
    let public_routes = Router::new().route("/health", get(health_check));

    let session_routes = Router::new()
        .route("/api/auth/login", post(auth_api::login))
        .with_state(auth_state.clone());

    let me_routes = Router::new()
        .route("/api/auth/me", get(auth_api::get_current_user))
        .route_layer(middleware::from_fn_with_state(
            tokens.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .route(
            "/api/admin/users",
            get(auth_api::list_users).post(auth_api::create_user),
        )
        .route("/api/admin/users/:id", delete(auth_api::delete_user))
        .route_layer(middleware::from_fn(require_role(ADMIN_ROLES)))
        .route_layer(middleware::from_fn_with_state(
            tokens.clone(),
            auth_middleware,
        ))
        .with_state(auth_state);

    let directory_listing = Router::new()
        .route("/api/directory/creators", get(directory::list_creators))
        .route_layer(middleware::from_fn_with_state(
            tokens.clone(),
            optional_auth_middleware,
        ))
        .with_state(directory_state.clone());

    let directory_profiles = Router::new()
        .route(
            "/api/directory/creators/:id",
            get(directory::creator_profile),
        )
        .route_layer(middleware::from_fn(require_role(PROFILE_VIEWER_ROLES)))
        .route_layer(middleware::from_fn_with_state(tokens, auth_middleware))
        .with_state(directory_state);

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(me_routes)
        .merge(admin_routes)
        .merge(directory_listing)
        .merge(directory_profiles)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "collabmarket-auth",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
