//! Application state management
//!
//! Author: hephaex@gmail.com

use crate::auth::{CredentialVerifier, PasswordConfig, TokenService};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use taskman_core::{
    AppConfig, CommentRepository, InMemoryStore, NewUser, Role, TaskRepository, TaskmanError,
    User, UserRepository,
};

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Token issuing and verification, keyed once at startup
    pub tokens: Arc<TokenService>,
    /// E-mail/password checks and hashing
    pub credentials: CredentialVerifier,
    pub users: Arc<dyn UserRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub comments: Arc<dyn CommentRepository>,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create state backed by a fresh in-memory store
    pub fn new(config: AppConfig) -> Self {
        let credentials = CredentialVerifier::new(config.auth.password_min_length);
        Self::with_store(config, Arc::new(InMemoryStore::new()), credentials)
    }

    /// Create state over any store implementing all three repositories
    pub fn with_store<S>(config: AppConfig, store: Arc<S>, credentials: CredentialVerifier) -> Self
    where
        S: UserRepository + TaskRepository + CommentRepository + 'static,
    {
        Self {
            tokens: Arc::new(TokenService::from_config(&config.auth)),
            credentials,
            users: store.clone(),
            tasks: store.clone(),
            comments: store,
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        }
    }

    /// State with cheap password hashing for test suites
    pub fn for_testing() -> Self {
        let config = AppConfig::default();
        let credentials = CredentialVerifier::new(config.auth.password_min_length)
            .with_hashing(PasswordConfig::testing());
        Self::with_store(config, Arc::new(InMemoryStore::new()), credentials)
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Insert the configured administrator unless one with that e-mail exists
    ///
    /// Returns the created user, or `None` when nothing was configured or the
    /// account was already present.
    pub async fn bootstrap_admin(&self) -> Result<Option<User>, TaskmanError> {
        let bootstrap = &self.config.bootstrap;
        let (Some(email), Some(password)) = (&bootstrap.admin_email, &bootstrap.admin_password)
        else {
            return Ok(None);
        };

        if self.users.exists_by_email(email).await? {
            tracing::debug!(email = %email, "Bootstrap administrator already present");
            return Ok(None);
        }

        if !self.credentials.validate_email(email) {
            return Err(TaskmanError::InvalidData(format!(
                "Invalid e-mail {email} has been provided"
            )));
        }

        let password_hash = self
            .credentials
            .hash(password)
            .map_err(|e| TaskmanError::Internal(e.to_string()))?;

        let admin = self
            .users
            .insert_user(NewUser {
                email: email.clone(),
                password_hash,
                role: Role::Admin,
            })
            .await?;

        tracing::info!(user_id = admin.id, email = %admin.email, "Bootstrap administrator created");
        Ok(Some(admin))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
