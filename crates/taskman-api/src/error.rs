//! API error handling
//!
//! Handlers return [`AppError`]. Its response carries the status and a
//! [`FailureReport`] extension; the failure report middleware turns that into
//! the `{url, message}` body once the request path is known.
//!
//! Author: hephaex@gmail.com

use crate::auth::TokenError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection, StringRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use taskman_core::TaskmanError;
use thiserror::Error;
use utoipa::ToSchema;

/// Failure body returned by every endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResponseMessage {
    /// Request path that failed
    pub url: String,
    /// Human-readable reason
    pub message: String,
}

/// Message of a failed request, attached as a response extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub message: String,
}

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(detail) => {
                tracing::error!(status = %status, detail = %detail, "Request failed");
                "Internal server error".to_string()
            }
            other => {
                tracing::warn!(status = %status, message = %other, "Request rejected");
                other.to_string()
            }
        };

        let mut response = status.into_response();
        response.extensions_mut().insert(FailureReport { message });
        response
    }
}

impl From<TaskmanError> for AppError {
    fn from(err: TaskmanError) -> Self {
        match err {
            TaskmanError::NotFound(msg) => AppError::NotFound(msg),
            TaskmanError::AlreadyExists(msg)
            | TaskmanError::InvalidData(msg)
            | TaskmanError::InvalidCredentials(msg) => AppError::BadRequest(msg),
            TaskmanError::Forbidden(msg) | TaskmanError::Unauthenticated(msg) => {
                AppError::Forbidden(msg)
            }
            err @ (TaskmanError::Storage(_) | TaskmanError::Internal(_)) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(e) => AppError::Internal(format!("Failed to issue token: {e}")),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<StringRejection> for AppError {
    fn from(rejection: StringRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
