//! Persistence contracts
//!
//! The service layer only talks to storage through these traits. Lookups
//! return `Ok(None)` for an absent entity; errors are reserved for storage
//! failures.
//!
//! Author: hephaex@gmail.com

use crate::model::{Comment, NewComment, NewTask, NewUser, Task, User};
use crate::page::{Page, PageRequest};
use crate::Result;
use async_trait::async_trait;

/// User storage
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn exists_by_email(&self, email: &str) -> Result<bool>;

    /// Insert a user; fails with `AlreadyExists` on a duplicate e-mail
    async fn insert_user(&self, user: NewUser) -> Result<User>;
}

/// Task storage
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn find_task_by_id(&self, id: i64) -> Result<Option<Task>>;

    /// Tasks authored by a user, oldest first
    async fn find_tasks_by_author(&self, author_id: i64, page: PageRequest) -> Result<Page<Task>>;

    /// Tasks assigned to a user, oldest first
    async fn find_tasks_by_executor(
        &self,
        executor_id: i64,
        page: PageRequest,
    ) -> Result<Page<Task>>;

    async fn insert_task(&self, task: NewTask) -> Result<Task>;

    async fn update_task(&self, task: Task) -> Result<Task>;

    /// Delete a task together with its comments
    async fn delete_task(&self, id: i64) -> Result<()>;
}

/// Comment storage
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_comment_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Comments of a task, oldest first
    async fn find_comments_by_task(&self, task_id: i64, page: PageRequest) -> Result<Page<Comment>>;

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment>;

    async fn update_comment(&self, comment: Comment) -> Result<Comment>;

    async fn delete_comment(&self, id: i64) -> Result<()>;
}
