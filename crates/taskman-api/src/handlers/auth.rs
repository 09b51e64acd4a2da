//! Authentication API handlers
//!
//! Author: hephaex@gmail.com

use super::ApiJson;
use crate::audit::AuditContext;
use crate::auth::{AuthRequest, AuthService};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// Login with e-mail and password
///
/// # Responses
///
/// * `200 OK` - Token issued
/// * `400 Bad Request` - Bad e-mail format or wrong password
/// * `404 Not Found` - No user with this e-mail
#[utoipa::path(
    post,
    path = "/rest/v1/security/auth",
    tag = "security",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "User has been authenticated", body = crate::auth::AuthResponse),
        (status = 400, description = "Invalid user data", body = crate::error::ResponseMessage),
        (status = 404, description = "User is not found", body = crate::error::ResponseMessage),
    )
)]
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<AuthRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = AuthService::from_state(&state)
        .with_audit_context(AuditContext::from_headers(&headers))
        .authenticate(&request.email, &request.password)
        .await?;

    Ok(Json(response))
}

/// Register a new user account
///
/// New accounts always get `ROLE_USER`.
///
/// # Responses
///
/// * `201 Created` - Account created, token issued
/// * `400 Bad Request` - E-mail taken, bad e-mail format or short password
#[utoipa::path(
    post,
    path = "/rest/v1/security/register",
    tag = "security",
    request_body = AuthRequest,
    responses(
        (status = 201, description = "User has been registered", body = crate::auth::AuthResponse),
        (status = 400, description = "Invalid user data", body = crate::error::ResponseMessage),
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<AuthRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = AuthService::from_state(&state)
        .with_audit_context(AuditContext::from_headers(&headers))
        .register(&request.email, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}
