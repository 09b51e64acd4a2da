//! API handlers
//!
//! Author: hephaex@gmail.com

pub mod auth;
pub mod comments;
pub mod health;
pub mod tasks;

use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use taskman_core::{Page, PageRequest, Role, UserRef};
use utoipa::{IntoParams, ToSchema};

pub const TOTAL_ELEMENTS_HEADER: &str = "x-total-elements-count";
pub const TOTAL_PAGES_HEADER: &str = "x-total-pages";
pub const CURRENT_PAGE_HEADER: &str = "x-current-page";

/// JSON body whose rejection is reported like any other failure
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path parameters whose rejection is reported like any other failure
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Query string whose rejection is reported like any other failure
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Plain-text body whose rejection is reported like any other failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiText(pub String);

#[async_trait]
impl<S> FromRequest<S> for ApiText
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(String::from_request(req, state).await?))
    }
}

/// Paging query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Page number (0..N)
    #[param(default = 0)]
    pub page: Option<u32>,

    /// Elements per page
    #[param(default = 20, maximum = 100)]
    pub size: Option<u32>,
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        PageRequest::new(query.page, query.size)
    }
}

/// User as embedded in task and comment payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i64,
    #[serde(rename = "e-mail")]
    pub email: String,
    #[serde(rename = "user role")]
    pub role: Role,
}

impl From<UserRef> for UserDto {
    fn from(user: UserRef) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

/// Page content as a JSON array, paging data in headers
pub(crate) fn paged_response<T, D, F>(page: Page<T>, to_dto: F) -> Response
where
    D: Serialize,
    F: FnMut(T) -> D,
{
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(TOTAL_ELEMENTS_HEADER),
        HeaderValue::from(page.total_elements),
    );
    headers.insert(
        HeaderName::from_static(TOTAL_PAGES_HEADER),
        HeaderValue::from(page.total_pages),
    );
    headers.insert(
        HeaderName::from_static(CURRENT_PAGE_HEADER),
        HeaderValue::from(page.number),
    );

    let page = page.map(to_dto);
    (headers, Json(page.content)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_dto_wire_names() {
        let dto = UserDto::from(UserRef {
            id: 3,
            email: "u@test.io".to_string(),
            role: Role::User,
        });
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 3, "e-mail": "u@test.io", "user role": "ROLE_USER"})
        );
    }

    #[tokio::test]
    async fn test_api_text_rejects_invalid_utf8() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .body(axum::body::Body::from(vec![0xff, 0xfe, 0xfd]))
            .unwrap();

        let rejection = ApiText::from_request(request, &()).await.unwrap_err();
        assert!(matches!(rejection, AppError::BadRequest(_)));

        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .body(axum::body::Body::from("on it"))
            .unwrap();
        let ApiText(text) = ApiText::from_request(request, &()).await.unwrap();
        assert_eq!(text, "on it");
    }

    #[test]
    fn test_paged_response_headers() {
        let page = Page::slice(vec![1, 2, 3, 4, 5], PageRequest::new(Some(1), Some(2)));
        let response = paged_response(page, |n| n * 10);

        let headers = response.headers();
        assert_eq!(headers.get(TOTAL_ELEMENTS_HEADER).unwrap(), "5");
        assert_eq!(headers.get(TOTAL_PAGES_HEADER).unwrap(), "3");
        assert_eq!(headers.get(CURRENT_PAGE_HEADER).unwrap(), "1");
    }
}
