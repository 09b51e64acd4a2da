//! Authentication service layer
//!
//! Login and registration flows on top of the credential verifier, the
//! token service and the user repository. Every outcome is written to the
//! audit log; passwords never appear in messages or logs.

use super::credentials::CredentialVerifier;
use super::token::TokenService;
use crate::audit::{audit_log, AuditContext, AuditEvent};
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taskman_core::{NewUser, Role, TaskmanError, User, UserRepository};
use utoipa::ToSchema;

/// Login and registration request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
}

/// Issued session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

/// Authentication service
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
    credentials: CredentialVerifier,
    audit: AuditContext,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<TokenService>,
        credentials: CredentialVerifier,
    ) -> Self {
        Self {
            users,
            tokens,
            credentials,
            audit: AuditContext::default(),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.users.clone(),
            state.tokens.clone(),
            state.credentials.clone(),
        )
    }

    /// Client metadata attached to the audit events of this call
    pub fn with_audit_context(mut self, audit: AuditContext) -> Self {
        self.audit = audit;
        self
    }

    /// Exchange credentials for a token
    ///
    /// # Errors
    ///
    /// * `InvalidCredentials` - bad e-mail format or wrong password
    /// * `NotFound` - no user with this e-mail
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AuthResponse, TaskmanError> {
        let result = self.try_authenticate(email, password).await;

        match &result {
            Ok((user, _)) => audit_log(&AuditEvent::LoginSuccess {
                user_id: user.id,
                email: user.email.clone(),
                ip_address: self.audit.ip_address.clone(),
                user_agent: self.audit.user_agent.clone(),
            }),
            Err(err) => audit_log(&AuditEvent::LoginFailure {
                email: email.to_string(),
                reason: err.to_string(),
                ip_address: self.audit.ip_address.clone(),
                user_agent: self.audit.user_agent.clone(),
            }),
        }

        result.map(|(_, response)| response)
    }

    async fn try_authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, AuthResponse), TaskmanError> {
        if !self.credentials.validate_email(email) {
            return Err(TaskmanError::InvalidCredentials(invalid_email(email)));
        }

        let user = self
            .users
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| TaskmanError::NotFound(format!("User with e-mail {email} is not found")))?;

        let matches = self
            .credentials
            .matches(password, &user.password_hash)
            .map_err(|e| TaskmanError::Internal(e.to_string()))?;
        if !matches {
            return Err(TaskmanError::InvalidCredentials(INVALID_PASSWORD.to_string()));
        }

        let response = self.issue(&user)?;
        Ok((user, response))
    }

    /// Create a `ROLE_USER` account and log it in
    ///
    /// # Errors
    ///
    /// * `AlreadyExists` - e-mail taken
    /// * `InvalidData` - bad e-mail format or password too short
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthResponse, TaskmanError> {
        let result = self.try_register(email, password).await;

        match &result {
            Ok((user, _)) => audit_log(&AuditEvent::RegistrationSuccess {
                user_id: user.id,
                email: user.email.clone(),
                role: user.role.to_string(),
                ip_address: self.audit.ip_address.clone(),
                user_agent: self.audit.user_agent.clone(),
            }),
            Err(err) => audit_log(&AuditEvent::RegistrationFailure {
                email: email.to_string(),
                reason: err.to_string(),
                ip_address: self.audit.ip_address.clone(),
                user_agent: self.audit.user_agent.clone(),
            }),
        }

        result.map(|(_, response)| response)
    }

    async fn try_register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, AuthResponse), TaskmanError> {
        if self.users.exists_by_email(email).await? {
            return Err(TaskmanError::AlreadyExists(format!(
                "User with e-mail {email} is already existent in the system. \
                 Try to use another e-mail to register or just try to authenticate with this e-mail."
            )));
        }
        if !self.credentials.validate_email(email) {
            return Err(TaskmanError::InvalidData(invalid_email(email)));
        }
        if !self.credentials.validate_password(password) {
            return Err(TaskmanError::InvalidData(INVALID_PASSWORD.to_string()));
        }

        let password_hash = self
            .credentials
            .hash(password)
            .map_err(|e| TaskmanError::Internal(e.to_string()))?;

        let user = self
            .users
            .insert_user(NewUser {
                email: email.to_string(),
                password_hash,
                role: Role::User,
            })
            .await?;

        let response = self.issue(&user)?;
        Ok((user, response))
    }

    fn issue(&self, user: &User) -> Result<AuthResponse, TaskmanError> {
        let token = self
            .tokens
            .issue(user)
            .map_err(|e| TaskmanError::Internal(e.to_string()))?;
        Ok(AuthResponse { token })
    }
}

const INVALID_PASSWORD: &str = "Invalid password has been provided";

fn invalid_email(email: &str) -> String {
    format!("Invalid e-mail {email} has been provided")
}
