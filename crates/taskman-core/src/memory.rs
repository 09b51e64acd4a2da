//! In-memory repository implementation
//!
//! Backs every repository trait with a single set of tables behind one
//! `tokio::sync::RwLock`, so a task delete and the removal of its comments
//! happen under the same write guard. Ids are allocated per table from 1,
//! like database sequences.
//!
//! Author: hephaex@gmail.com

use crate::model::{Comment, NewComment, NewTask, NewUser, Task, User};
use crate::page::{Page, PageRequest};
use crate::store::{CommentRepository, TaskRepository, UserRepository};
use crate::{Result, TaskmanError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, Task>,
    comments: BTreeMap<i64, Comment>,
    user_seq: i64,
    task_seq: i64,
    comment_seq: i64,
}

/// Thread-safe in-memory store for users, tasks and comments
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

fn next_id(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| u.email == email))
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(TaskmanError::AlreadyExists(format!(
                "User with e-mail {} already exists",
                user.email
            )));
        }

        let id = next_id(&mut tables.user_seq);
        let user = User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
        };
        tables.users.insert(id, user.clone());
        tracing::debug!(user_id = id, "User stored");
        Ok(user)
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn find_task_by_id(&self, id: i64) -> Result<Option<Task>> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn find_tasks_by_author(&self, author_id: i64, page: PageRequest) -> Result<Page<Task>> {
        let tables = self.tables.read().await;
        let matching = sorted_tasks(tables.tasks.values().filter(|t| {
            t.author.as_ref().map(|a| a.id) == Some(author_id)
        }));
        Ok(Page::slice(matching, page))
    }

    async fn find_tasks_by_executor(
        &self,
        executor_id: i64,
        page: PageRequest,
    ) -> Result<Page<Task>> {
        let tables = self.tables.read().await;
        let matching = sorted_tasks(tables.tasks.values().filter(|t| {
            t.executor.as_ref().map(|e| e.id) == Some(executor_id)
        }));
        Ok(Page::slice(matching, page))
    }

    async fn insert_task(&self, task: NewTask) -> Result<Task> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.task_seq);
        let task = Task {
            id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            author: task.author,
            executor: task.executor,
            timestamp: Utc::now(),
        };
        tables.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, task: Task) -> Result<Task> {
        let mut tables = self.tables.write().await;
        match tables.tasks.get_mut(&task.id) {
            Some(stored) => {
                *stored = task.clone();
                Ok(task)
            }
            None => Err(TaskmanError::NotFound(format!(
                "Task with id {} is not found",
                task.id
            ))),
        }
    }

    async fn delete_task(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.tasks.remove(&id);
        tables.comments.retain(|_, c| c.task_id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn find_comment_by_id(&self, id: i64) -> Result<Option<Comment>> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn find_comments_by_task(&self, task_id: i64, page: PageRequest) -> Result<Page<Comment>> {
        let tables = self.tables.read().await;
        let mut matching: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.task_id == task_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(Page::slice(matching, page))
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment> {
        let mut tables = self.tables.write().await;
        if !tables.tasks.contains_key(&comment.task_id) {
            return Err(TaskmanError::NotFound(format!(
                "Task with id {} is not found",
                comment.task_id
            )));
        }

        let id = next_id(&mut tables.comment_seq);
        let comment = Comment {
            id,
            task_id: comment.task_id,
            content: comment.content,
            commentator: comment.commentator,
            timestamp: Utc::now(),
        };
        tables.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn update_comment(&self, comment: Comment) -> Result<Comment> {
        let mut tables = self.tables.write().await;
        match tables.comments.get_mut(&comment.id) {
            Some(stored) => {
                *stored = comment.clone();
                Ok(comment)
            }
            None => Err(TaskmanError::NotFound(format!(
                "Comment with id {} is not found",
                comment.id
            ))),
        }
    }

    async fn delete_comment(&self, id: i64) -> Result<()> {
        self.tables.write().await.comments.remove(&id);
        Ok(())
    }
}

fn sorted_tasks<'a>(tasks: impl Iterator<Item = &'a Task>) -> Vec<Task> {
    let mut tasks: Vec<Task> = tasks.cloned().collect();
    tasks.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
    tasks
}
