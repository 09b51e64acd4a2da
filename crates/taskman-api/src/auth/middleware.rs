//! Authentication gate
//!
//! Runs once per request. A valid bearer token installs a [`Principal`] in
//! the request extensions; a missing token or a bad signature leaves the
//! request anonymous. Expired, malformed and foreign-algorithm tokens are
//! rejected with 401.
//!
//! Author: hephaex@gmail.com

use super::principal::Principal;
use crate::audit::{audit_log, AuditContext, AuditEvent};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
}

/// Authentication middleware
///
/// # Errors
///
/// Returns `AppError::Unauthorized` when the token is expired, malformed or
/// signed with an unsupported algorithm.
pub async fn authentication_gate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = match bearer_token(request.headers()) {
        Some(token) => resolve_principal(&state, token, request.headers())?,
        None => None,
    };

    if let Some(principal) = principal {
        tracing::debug!(email = %principal.email(), role = %principal.role(), "Request authenticated");
        request.extensions_mut().insert(principal);
    }

    Ok(next.run(request).await)
}

fn resolve_principal(
    state: &AppState,
    token: &str,
    headers: &HeaderMap,
) -> Result<Option<Principal>, AppError> {
    let reject = |err: super::TokenError| {
        let ctx = AuditContext::from_headers(headers);
        audit_log(&AuditEvent::InvalidToken {
            ip_address: ctx.ip_address,
            user_agent: ctx.user_agent,
            reason: err.to_string(),
        });
        AppError::from(err)
    };

    match state.tokens.verify(token) {
        Ok(true) => {
            let claims = state.tokens.claims(token).map_err(reject)?;
            let principal = state.tokens.principal_from(claims).map_err(reject)?;
            Ok(Some(principal))
        }
        Ok(false) => {
            tracing::debug!("Token signature not accepted, continuing anonymously");
            Ok(None)
        }
        Err(err) => Err(reject(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::principal::SecurityContext;
    use axum::{
        body::Body,
        http::{HeaderValue, Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use taskman_core::{Role, User};
    use tower::ServiceExt;

    async fn whoami(ctx: SecurityContext) -> String {
        ctx.principal()
            .map(|p| format!("{} {}", p.email(), p.role()))
            .unwrap_or_else(|| "anonymous".to_string())
    }

    fn app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(state.clone(), authentication_gate))
            .with_state(state)
    }

    async fn call(app: Router, authorization: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn user(role: Role) -> User {
        User {
            id: 1,
            email: "u@test.io".to_string(),
            password_hash: "irrelevant".to_string(),
            role,
        }
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));
    }

    #[tokio::test]
    async fn test_no_token_is_anonymous() {
        let state = Arc::new(AppState::for_testing());
        let (status, body) = call(app(state), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_valid_token_installs_principal() {
        let state = Arc::new(AppState::for_testing());
        let token = state.tokens.issue(&user(Role::Admin)).unwrap();

        let (status, body) = call(app(state), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "u@test.io ROLE_ADMIN");
    }

    #[tokio::test]
    async fn test_other_scheme_is_anonymous() {
        let state = Arc::new(AppState::for_testing());
        let token = state.tokens.issue(&user(Role::User)).unwrap();

        let (status, body) = call(app(state), Some(&format!("Token {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_foreign_signature_is_anonymous() {
        let state = Arc::new(AppState::for_testing());
        let foreign = crate::auth::TokenService::new("another-secret", 3600)
            .issue(&user(Role::Admin))
            .unwrap();

        let (status, body) = call(app(state), Some(&format!("Bearer {foreign}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_malformed_token_is_rejected() {
        let state = Arc::new(AppState::for_testing());
        let (status, _) = call(app(state), Some("Bearer not.a.jwt")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
