//! Taskman Core - Domain models, persistence contracts, and shared types
//!
//! This crate defines the abstractions shared by the task tracker:
//! - Domain models (users, tasks, comments, roles)
//! - Common error types
//! - Repository traits consumed by the service layer
//! - An in-memory repository implementation
//! - Configuration management
//!
//! Author: hephaex@gmail.com

pub mod config;
pub mod memory;
pub mod model;
pub mod page;
pub mod store;

pub use config::{
    AppConfig, AuthConfig, BootstrapConfig, ConfigError, LoggingConfig, ServerConfig,
    MAX_TOKEN_TTL_SECS,
};
pub use memory::InMemoryStore;
pub use model::{
    Comment, NewComment, NewTask, NewUser, Role, Task, TaskPriority, TaskStatus, User, UserRef,
};
pub use page::{Page, PageRequest};
pub use store::{CommentRepository, TaskRepository, UserRepository};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for task tracker operations
///
/// Each variant maps to exactly one HTTP status at the API boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskmanError {
    /// Entity absent in the store (404)
    #[error("{0}")]
    NotFound(String),

    /// Unique key already taken (400)
    #[error("{0}")]
    AlreadyExists(String),

    /// Malformed input such as a bad e-mail or a short password (400)
    #[error("{0}")]
    InvalidData(String),

    /// Login with an unknown format or a wrong password (400)
    #[error("{0}")]
    InvalidCredentials(String),

    /// Authenticated but not allowed (403)
    #[error("{0}")]
    Forbidden(String),

    /// No principal where one is required.
    ///
    /// Reported as 403, not 401: every call site of the current e-mail lookup
    /// relies on that status.
    #[error("{0}")]
    Unauthenticated(String),

    /// Persistence failure (500)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Unexpected failure outside storage, e.g. password hashing (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, TaskmanError>;
