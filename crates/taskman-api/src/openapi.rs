//! OpenAPI document
//!
//! Author: hephaex@gmail.com

use crate::auth::{AuthRequest, AuthResponse};
use crate::error::ResponseMessage;
use crate::handlers::{self, comments::CommentDto, health::HealthResponse, tasks, UserDto};
use axum::Json;
use taskman_core::{Role, TaskPriority, TaskStatus};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taskman API",
        description = "Task tracker with JWT authentication and ownership-aware authorization"
    ),
    paths(
        handlers::auth::authenticate,
        handlers::auth::register,
        handlers::tasks::get_task,
        handlers::tasks::list_by_author,
        handlers::tasks::list_by_executor,
        handlers::tasks::create_task,
        handlers::tasks::update_task,
        handlers::tasks::update_task_status,
        handlers::tasks::delete_task,
        handlers::comments::list_for_task,
        handlers::comments::add_comment,
        handlers::comments::update_comment,
        handlers::comments::delete_comment,
        handlers::health::health_check,
    ),
    components(schemas(
        AuthRequest,
        AuthResponse,
        ResponseMessage,
        UserDto,
        tasks::TaskDto,
        tasks::TaskInput,
        CommentDto,
        HealthResponse,
        Role,
        TaskStatus,
        TaskPriority,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "security", description = "Authentication and registration"),
        (name = "tasks", description = "Task management"),
        (name = "comments", description = "Task comments"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serve the generated document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_security_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/rest/v1/security/auth"));
        assert!(doc.paths.paths.contains_key("/rest/v1/security/register"));
        assert!(doc.paths.paths.contains_key("/rest/v1/tasks/{id}/status"));
    }
}
