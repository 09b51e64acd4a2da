//! Authentication and authorization module
//!
//! This module provides JWT-based authentication with the following components:
//! - Credential checks and Argon2id password hashing
//! - Token issuing, verification and claim decoding
//! - Request-scoped principal and its extractor
//! - Middleware installing the principal from a bearer token
//! - Access decisions for tasks and comments
//! - Login and registration service

pub mod access;
pub mod credentials;
pub mod middleware;
pub mod principal;
pub mod service;
pub mod token;

pub use credentials::{CredentialVerifier, PasswordConfig, PasswordError};
pub use middleware::{authentication_gate, bearer_token};
pub use principal::{Principal, SecurityContext};
pub use service::{AuthRequest, AuthResponse, AuthService};
pub use token::{Claims, TokenError, TokenService};
