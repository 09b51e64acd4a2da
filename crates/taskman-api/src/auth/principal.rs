//! Request-scoped identity
//!
//! The authentication gate stores a [`Principal`] in the request extensions.
//! Handlers receive it wrapped in a [`SecurityContext`], which is then passed
//! explicitly to every access decision.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use std::convert::Infallible;
use taskman_core::Role;

/// Authenticated identity attached to one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    email: String,
    role: Role,
    authenticated: bool,
}

impl Principal {
    /// A principal that is not yet marked authenticated
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
            authenticated: false,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Authorities derived from the role
    pub fn authorities(&self) -> Vec<&'static str> {
        vec![self.role.authority()]
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities().iter().any(|a| *a == authority)
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn set_authenticated(&mut self, authenticated: bool) {
        self.authenticated = authenticated;
    }
}

/// The principal of the current request, if any
///
/// Extracting never fails: anonymous requests get an empty context and the
/// access rules decide what they may do.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    principal: Option<Principal>,
}

impl SecurityContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    /// The principal, only when it was marked authenticated
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref().filter(|p| p.is_authenticated())
    }

    pub fn is_anonymous(&self) -> bool {
        self.principal().is_none()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SecurityContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            principal: parts.extensions.get::<Principal>().cloned(),
        })
    }
}
