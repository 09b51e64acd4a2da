//! Comment API handlers
//!
//! Comment content is sent as the raw request body and must not be empty.
//!
//! Author: hephaex@gmail.com

use super::{paged_response, ApiPath, ApiQuery, ApiText, PageQuery, UserDto};
use crate::auth::SecurityContext;
use crate::error::AppError;
use crate::services::CommentService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taskman_core::Comment;
use utoipa::ToSchema;

/// Comment as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CommentDto {
    pub id: i64,
    pub content: String,
    #[serde(rename = "Commentator", skip_serializing_if = "Option::is_none")]
    pub commentator: Option<UserDto>,
    pub timestamp: DateTime<Utc>,
}

const CONTENT_REQUIRED: &str = "Comment content must be provided";

fn required_content(ApiText(content): ApiText) -> Result<String, AppError> {
    if content.is_empty() {
        return Err(AppError::BadRequest(CONTENT_REQUIRED.to_string()));
    }
    Ok(content)
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            commentator: comment.commentator.map(UserDto::from),
            timestamp: comment.timestamp,
        }
    }
}

/// Comments of a task, oldest first
#[utoipa::path(
    get,
    path = "/rest/v1/comments/task/{task_id}",
    tag = "comments",
    params(("task_id" = i64, Path, description = "Task id"), PageQuery),
    responses(
        (status = 200, description = "Comments have been got successfully", body = [CommentDto]),
        (status = 403, description = "Access is forbidden", body = crate::error::ResponseMessage),
        (status = 404, description = "There is nothing found", body = crate::error::ResponseMessage),
    )
)]
pub async fn list_for_task(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    ApiPath(task_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = CommentService::from_state(&state)
        .list_for_task(&ctx, task_id, query.into())
        .await?;
    Ok(paged_response(page, CommentDto::from))
}

/// Add a comment to a task
#[utoipa::path(
    post,
    path = "/rest/v1/comments/task/{task_id}",
    tag = "comments",
    params(("task_id" = i64, Path, description = "Task id")),
    request_body(content = String, content_type = "text/plain"),
    responses(
        (status = 201, description = "Comment has been added successfully", body = CommentDto),
        (status = 400, description = "Bad request", body = crate::error::ResponseMessage),
        (status = 403, description = "Access is forbidden", body = crate::error::ResponseMessage),
        (status = 404, description = "There is nothing found", body = crate::error::ResponseMessage),
    )
)]
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    ApiPath(task_id): ApiPath<i64>,
    content: ApiText,
) -> Result<impl IntoResponse, AppError> {
    let content = required_content(content)?;
    let comment = CommentService::from_state(&state)
        .add(&ctx, task_id, content)
        .await?;
    Ok((StatusCode::CREATED, Json(CommentDto::from(comment))))
}

/// Replace the content of a comment
#[utoipa::path(
    put,
    path = "/rest/v1/comments/{comment_id}",
    tag = "comments",
    params(("comment_id" = i64, Path, description = "Comment id")),
    request_body(content = String, content_type = "text/plain"),
    responses(
        (status = 200, description = "Comment has been updated successfully", body = CommentDto),
        (status = 400, description = "Bad request", body = crate::error::ResponseMessage),
        (status = 403, description = "Access is forbidden", body = crate::error::ResponseMessage),
        (status = 404, description = "There is nothing found", body = crate::error::ResponseMessage),
    )
)]
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    ApiPath(comment_id): ApiPath<i64>,
    content: ApiText,
) -> Result<impl IntoResponse, AppError> {
    let content = required_content(content)?;
    let comment = CommentService::from_state(&state)
        .update(&ctx, comment_id, content)
        .await?;
    Ok(Json(CommentDto::from(comment)))
}

/// Delete a comment
#[utoipa::path(
    delete,
    path = "/rest/v1/comments/{comment_id}",
    tag = "comments",
    params(("comment_id" = i64, Path, description = "Comment id")),
    responses(
        (status = 204, description = "Comment has just been deleted successfully"),
        (status = 403, description = "Access is forbidden", body = crate::error::ResponseMessage),
        (status = 404, description = "There is nothing found", body = crate::error::ResponseMessage),
    )
)]
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    ApiPath(comment_id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    CommentService::from_state(&state)
        .delete(&ctx, comment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
