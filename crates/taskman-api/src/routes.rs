//! API route definitions
//!
//! Every route passes through the authentication gate. Whether a request may
//! proceed without a principal is decided by the services, not by routing.
//!
//! Author: hephaex@gmail.com

use crate::handlers::{auth, comments, health, tasks};
use crate::openapi::openapi_json;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

/// Security, task and comment routes
pub fn api_routes() -> Router<Arc<AppState>> {
    let security_routes = Router::new()
        .route("/security/auth", post(auth::authenticate))
        .route("/security/register", post(auth::register));

    let task_routes = Router::new()
        .route("/tasks", post(tasks::create_task))
        .route(
            "/tasks/:id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/tasks/:id/status", put(tasks::update_task_status))
        .route("/tasks/author/:author_id", get(tasks::list_by_author))
        .route("/tasks/executor/:executor_id", get(tasks::list_by_executor));

    let comment_routes = Router::new()
        .route(
            "/comments/task/:task_id",
            get(comments::list_for_task).post(comments::add_comment),
        )
        .route(
            "/comments/:comment_id",
            put(comments::update_comment).delete(comments::delete_comment),
        );

    Router::new()
        .merge(security_routes)
        .merge(task_routes)
        .merge(comment_routes)
}

/// All routes, before middleware
pub fn all_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/rest/v1", api_routes())
}
