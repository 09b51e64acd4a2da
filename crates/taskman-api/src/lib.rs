//! Taskman API - REST server for the task tracker
//!
//! Provides HTTP endpoints for tasks and comments, guarded by stateless JWT
//! authentication and ownership-aware access rules.
//!
//! Author: hephaex@gmail.com

pub mod audit;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;

use axum::{http::HeaderValue, Router};
use state::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Build the application router with the full middleware pipeline
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    middleware::apply_pipeline(routes::all_routes(), state).layer(cors)
}

/// Router over fresh in-memory state with cheap password hashing
pub fn create_router_for_testing() -> Router {
    create_router(Arc::new(AppState::for_testing()))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}
