//! Router assembly.
//!
//! Public, auth, and protected route groups are built separately and
//! merged; role gates are per-route layers under a single auth layer.

use axum::{
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    response::Json,
    routing::{get, post},
    Router,
};
use anyhow::{Context, Result};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    api::profile,
    auth::{api as auth_api, auth_middleware, models::Role, require_roles, AuthState},
    config::AppConfig,
    middleware::{content_length, logging},
};

/// Create the API router
pub fn create_router(state: AuthState, config: &AppConfig) -> Result<Router> {
    let origin = config
        .client_origin
        .parse::<HeaderValue>()
        .context("CLIENT_ORIGIN is not a valid header value")?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (health check only)
    let public_routes = Router::new().route("/health", get(health_check));

    // Credential endpoints (no token required)
    let auth_routes = Router::new()
        .route("/api/auth/register", post(auth_api::register))
        .route("/api/auth/login", post(auth_api::login))
        .with_state(state.clone());

    // Role-gated routes, one gate per required-role list
    let admin_routes = Router::new()
        .route("/api/UserProfile/ForAdmin", get(profile::get_for_admin))
        .route_layer(from_fn(require_roles(&[Role::Admin])));

    let customer_routes = Router::new()
        .route("/api/UserProfile/ForCustomer", get(profile::get_for_customer))
        .route_layer(from_fn(require_roles(&[Role::Customer])));

    let combined_routes = Router::new()
        .route(
            "/api/UserProfile/ForUsersOrCustomer",
            get(profile::get_for_admin_or_customer),
        )
        .route_layer(from_fn(require_roles(&[Role::Admin, Role::Customer])));

    // Protected routes: auth middleware wraps every route in this group,
    // running before the role gates above.
    let protected_routes = Router::new()
        .route("/api/UserProfile", get(profile::get_user_profile))
        .merge(admin_routes)
        .merge(customer_routes)
        .merge(combined_routes)
        .route_layer(from_fn_with_state(
            state.jwt_handler.clone(),
            auth_middleware,
        ))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(protected_routes)
        .layer(from_fn(content_length::normalize_no_content))
        .layer(from_fn(logging::request_logging))
        .layer(cors);

    Ok(app)
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
