//! Domain models for users, tasks and comments
//!
//! Author: hephaex@gmail.com

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User role
///
/// Each role carries a canonical authority string, which is also its wire
/// and token representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    #[serde(rename = "ROLE_USER")]
    User,
}

impl Role {
    pub const ADMIN_AUTHORITY: &'static str = "ROLE_ADMIN";
    pub const USER_AUTHORITY: &'static str = "ROLE_USER";

    /// Canonical authority string of this role
    pub fn authority(&self) -> &'static str {
        match self {
            Role::Admin => Self::ADMIN_AUTHORITY,
            Role::User => Self::USER_AUTHORITY,
        }
    }

    /// Parse a role from its authority string (exact match)
    pub fn from_authority(authority: &str) -> Option<Self> {
        match authority {
            Self::ADMIN_AUTHORITY => Some(Role::Admin),
            Self::USER_AUTHORITY => Some(Role::User),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.authority())
    }
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Finished,
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// User account as stored by the persistence layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    /// Unique login e-mail
    pub email: String,
    /// Argon2id PHC string, never the plaintext
    pub password_hash: String,
    pub role: Role,
}

impl User {
    /// Projection embedded into tasks and comments
    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// User insert payload; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Reference to a user held by a task or a comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

/// A unit of work with an author and an executor
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub author: Option<UserRef>,
    pub executor: Option<UserRef>,
    pub timestamp: DateTime<Utc>,
}

/// Task insert payload
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub author: Option<UserRef>,
    pub executor: Option<UserRef>,
}

/// A comment left on a task
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub task_id: i64,
    pub content: String,
    pub commentator: Option<UserRef>,
    pub timestamp: DateTime<Utc>,
}

/// Comment insert payload
#[derive(Debug, Clone)]
pub struct NewComment {
    pub task_id: i64,
    pub content: String,
    pub commentator: Option<UserRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_authority_round_trip() {
        for role in [Role::Admin, Role::User] {
            assert_eq!(Role::from_authority(role.authority()), Some(role));
        }
        assert_eq!(Role::from_authority("ROLE_ROOT"), None);
        assert_eq!(Role::from_authority("role_admin"), None);
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ROLE_ADMIN\"");
        let role: Role = serde_json::from_str("\"ROLE_USER\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        let priority: TaskPriority = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(priority, TaskPriority::High);
    }
}
