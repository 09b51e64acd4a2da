//! Task API handlers
//!
//! Author: hephaex@gmail.com

use super::{paged_response, ApiJson, ApiPath, ApiQuery, PageQuery, UserDto};
use crate::auth::SecurityContext;
use crate::error::AppError;
use crate::services::{TaskDraft, TaskService};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taskman_core::{Task, TaskPriority, TaskStatus};
use utoipa::ToSchema;

/// Task as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskDto {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(rename = "Author", skip_serializing_if = "Option::is_none")]
    pub author: Option<UserDto>,
    #[serde(rename = "Executor", skip_serializing_if = "Option::is_none")]
    pub executor: Option<UserDto>,
    pub timestamp: DateTime<Utc>,
}

impl From<Task> for TaskDto {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            author: task.author.map(UserDto::from),
            executor: task.executor.map(UserDto::from),
            timestamp: task.timestamp,
        }
    }
}

/// Task creation or update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(rename = "executor's e-mail")]
    pub executor_email: Option<String>,
}

impl From<TaskInput> for TaskDraft {
    fn from(input: TaskInput) -> Self {
        Self {
            title: input.title,
            description: input.description,
            status: input.status,
            priority: input.priority,
            executor_email: input.executor_email,
        }
    }
}

/// Get task by id
#[utoipa::path(
    get,
    path = "/rest/v1/tasks/{id}",
    tag = "tasks",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task has been got successfully", body = TaskDto),
        (status = 403, description = "Access is forbidden", body = crate::error::ResponseMessage),
        (status = 404, description = "There is nothing found", body = crate::error::ResponseMessage),
    )
)]
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let task = TaskService::from_state(&state).get(&ctx, id).await?;
    Ok(Json(TaskDto::from(task)))
}

/// Tasks created by an author, oldest first
#[utoipa::path(
    get,
    path = "/rest/v1/tasks/author/{author_id}",
    tag = "tasks",
    params(("author_id" = i64, Path, description = "Author id"), PageQuery),
    responses(
        (status = 200, description = "Tasks have been got successfully", body = [TaskDto]),
        (status = 403, description = "Access is forbidden", body = crate::error::ResponseMessage),
        (status = 404, description = "There is nothing found", body = crate::error::ResponseMessage),
    )
)]
pub async fn list_by_author(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    ApiPath(author_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = TaskService::from_state(&state)
        .list_by_author(&ctx, author_id, query.into())
        .await?;
    Ok(paged_response(page, TaskDto::from))
}

/// Tasks assigned to an executor, oldest first
#[utoipa::path(
    get,
    path = "/rest/v1/tasks/executor/{executor_id}",
    tag = "tasks",
    params(("executor_id" = i64, Path, description = "Executor id"), PageQuery),
    responses(
        (status = 200, description = "Tasks have been got successfully", body = [TaskDto]),
        (status = 403, description = "Access is forbidden", body = crate::error::ResponseMessage),
        (status = 404, description = "There is nothing found", body = crate::error::ResponseMessage),
    )
)]
pub async fn list_by_executor(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    ApiPath(executor_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = TaskService::from_state(&state)
        .list_by_executor(&ctx, executor_id, query.into())
        .await?;
    Ok(paged_response(page, TaskDto::from))
}

/// Create a task
#[utoipa::path(
    post,
    path = "/rest/v1/tasks",
    tag = "tasks",
    request_body = TaskInput,
    responses(
        (status = 201, description = "Task has been added successfully", body = TaskDto),
        (status = 400, description = "Bad request", body = crate::error::ResponseMessage),
        (status = 403, description = "Access is forbidden", body = crate::error::ResponseMessage),
        (status = 404, description = "There is nothing found", body = crate::error::ResponseMessage),
    )
)]
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    ApiJson(input): ApiJson<TaskInput>,
) -> Result<impl IntoResponse, AppError> {
    let task = TaskService::from_state(&state)
        .create(&ctx, input.into())
        .await?;
    Ok((StatusCode::CREATED, Json(TaskDto::from(task))))
}

/// Update task fields
#[utoipa::path(
    put,
    path = "/rest/v1/tasks/{id}",
    tag = "tasks",
    params(("id" = i64, Path, description = "Task id")),
    request_body = TaskInput,
    responses(
        (status = 200, description = "Task has been updated successfully", body = TaskDto),
        (status = 400, description = "Bad request", body = crate::error::ResponseMessage),
        (status = 403, description = "Access is forbidden", body = crate::error::ResponseMessage),
        (status = 404, description = "There is nothing found", body = crate::error::ResponseMessage),
    )
)]
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<TaskInput>,
) -> Result<impl IntoResponse, AppError> {
    let task = TaskService::from_state(&state)
        .update(&ctx, id, input.into())
        .await?;
    Ok(Json(TaskDto::from(task)))
}

/// Update task status
#[utoipa::path(
    put,
    path = "/rest/v1/tasks/{id}/status",
    tag = "tasks",
    params(("id" = i64, Path, description = "Task id")),
    request_body = TaskStatus,
    responses(
        (status = 200, description = "Task status has been updated successfully", body = TaskDto),
        (status = 400, description = "Bad request", body = crate::error::ResponseMessage),
        (status = 403, description = "Access is forbidden", body = crate::error::ResponseMessage),
        (status = 404, description = "There is nothing found", body = crate::error::ResponseMessage),
    )
)]
pub async fn update_task_status(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    ApiPath(id): ApiPath<i64>,
    ApiJson(status): ApiJson<TaskStatus>,
) -> Result<impl IntoResponse, AppError> {
    let task = TaskService::from_state(&state)
        .update_status(&ctx, id, status)
        .await?;
    Ok(Json(TaskDto::from(task)))
}

/// Delete a task and its comments
#[utoipa::path(
    delete,
    path = "/rest/v1/tasks/{id}",
    tag = "tasks",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 204, description = "Task has just been deleted successfully"),
        (status = 403, description = "Access is forbidden", body = crate::error::ResponseMessage),
        (status = 404, description = "There is nothing found", body = crate::error::ResponseMessage),
    )
)]
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    TaskService::from_state(&state).delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
