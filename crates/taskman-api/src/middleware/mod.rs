//! HTTP middleware pipeline
//!
//! Author: hephaex@gmail.com

pub mod failure_report;
pub mod request_counter;
pub mod security_headers;

pub use failure_report::failure_report_middleware;
pub use request_counter::request_counter_middleware;
pub use security_headers::security_headers_middleware;

use crate::auth::authentication_gate;
use crate::state::AppState;
use axum::{middleware, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Wrap the routes in the request pipeline
///
/// Outermost first: trace, security headers, failure report, request
/// counter, authentication gate.
pub fn apply_pipeline(routes: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    routes
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(security_headers_middleware))
                .layer(middleware::from_fn(failure_report_middleware))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    request_counter_middleware,
                ))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    authentication_gate,
                )),
        )
        .with_state(state)
}
