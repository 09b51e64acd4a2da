//! Task operations
//!
//! Admin-only operations check the role before any lookup, so a missing
//! task is reported as 403 to non-admins. The others load the task first and
//! report 404 before deciding.
//!
//! Author: hephaex@gmail.com

use super::{authorize, UserService};
use crate::auth::{access, credentials::is_valid_email, SecurityContext};
use crate::state::AppState;
use std::sync::Arc;
use taskman_core::{
    NewTask, Page, PageRequest, Task, TaskPriority, TaskRepository, TaskStatus, TaskmanError,
    User,
};

const GET_DENIED: &str =
    "Access denied. User does not have the required permissions to get this task";
const LIST_BY_AUTHOR_DENIED: &str =
    "Access denied. User does not have the required permissions to get tasks page by author id";
const LIST_BY_EXECUTOR_DENIED: &str = "Access denied. User does not have the required permissions to get tasks page by this executor id";
const CREATE_DENIED: &str = "Access is denied. User does not have permission to create task.";
const UPDATE_DENIED: &str = "Access is denied. User does not have permission to update task.";
const DELETE_DENIED: &str =
    "Access denied. User does not have the required permissions to delete task";

/// Fields submitted for task creation or update
///
/// Creation needs title, description and executor e-mail. An update applies
/// whatever is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub executor_email: Option<String>,
}

impl TaskDraft {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.executor_email.is_none()
    }
}

#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    users: UserService,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>, users: UserService) -> Self {
        Self { tasks, users }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.tasks.clone(), UserService::from_state(state))
    }

    /// Load a task without any access check
    pub(crate) async fn find(&self, id: i64) -> Result<Task, TaskmanError> {
        self.tasks
            .find_task_by_id(id)
            .await?
            .ok_or_else(|| TaskmanError::NotFound(format!("Task with id {id} is not found")))
    }

    /// Admin or the task's executor
    pub async fn get(&self, ctx: &SecurityContext, id: i64) -> Result<Task, TaskmanError> {
        let task = self.find(id).await?;
        authorize(
            ctx,
            access::is_admin_or_task_executor(ctx, &task),
            &format!("task:{id}"),
            GET_DENIED,
        )?;
        Ok(task)
    }

    /// Admin only
    pub async fn list_by_author(
        &self,
        ctx: &SecurityContext,
        author_id: i64,
        page: PageRequest,
    ) -> Result<Page<Task>, TaskmanError> {
        authorize(
            ctx,
            access::is_admin(ctx),
            &format!("tasks:author:{author_id}"),
            LIST_BY_AUTHOR_DENIED,
        )?;
        let author = self.users.get_by_id(author_id).await?;
        self.tasks.find_tasks_by_author(author.id, page).await
    }

    /// Admin or the executor themself
    pub async fn list_by_executor(
        &self,
        ctx: &SecurityContext,
        executor_id: i64,
        page: PageRequest,
    ) -> Result<Page<Task>, TaskmanError> {
        let current = self.users.current_user(ctx).await?;
        authorize(
            ctx,
            access::is_admin(ctx) || current.id == executor_id,
            &format!("tasks:executor:{executor_id}"),
            LIST_BY_EXECUTOR_DENIED,
        )?;
        let executor = self.users.get_by_id(executor_id).await?;
        self.tasks.find_tasks_by_executor(executor.id, page).await
    }

    /// Admin only; the current user becomes the author
    pub async fn create(&self, ctx: &SecurityContext, draft: TaskDraft) -> Result<Task, TaskmanError> {
        authorize(ctx, access::is_admin(ctx), "tasks", CREATE_DENIED)?;

        let title = required(draft.title, "title")?;
        let description = required(draft.description, "description")?;
        let executor_email = required(draft.executor_email, "executor's e-mail")?;

        let executor = self.resolve_executor(&executor_email).await?;
        let author = self.users.current_user(ctx).await?;

        let task = self
            .tasks
            .insert_task(NewTask {
                title,
                description,
                status: draft.status.unwrap_or(TaskStatus::Pending),
                priority: draft.priority.unwrap_or(TaskPriority::Medium),
                author: Some(author.to_ref()),
                executor: Some(executor.to_ref()),
            })
            .await?;

        tracing::info!(task_id = task.id, author = %author.email, "Task created");
        Ok(task)
    }

    /// Admin only; absent fields keep their stored values
    pub async fn update(
        &self,
        ctx: &SecurityContext,
        id: i64,
        draft: TaskDraft,
    ) -> Result<Task, TaskmanError> {
        authorize(ctx, access::is_admin(ctx), &format!("task:{id}"), UPDATE_DENIED)?;
        let mut task = self.find(id).await?;
        if draft.is_empty() {
            return Ok(task);
        }

        if let Some(email) = draft.executor_email {
            let executor = self.resolve_executor(&email).await?;
            task.executor = Some(executor.to_ref());
        }
        if let Some(title) = draft.title {
            task.title = title;
        }
        if let Some(description) = draft.description {
            task.description = description;
        }
        if let Some(status) = draft.status {
            task.status = status;
        }
        if let Some(priority) = draft.priority {
            task.priority = priority;
        }

        self.tasks.update_task(task).await
    }

    /// Same rule as [`TaskService::get`]
    pub async fn update_status(
        &self,
        ctx: &SecurityContext,
        id: i64,
        status: TaskStatus,
    ) -> Result<Task, TaskmanError> {
        let mut task = self.get(ctx, id).await?;
        task.status = status;
        self.tasks.update_task(task).await
    }

    /// Admin only; comments of the task go with it
    pub async fn delete(&self, ctx: &SecurityContext, id: i64) -> Result<(), TaskmanError> {
        authorize(ctx, access::is_admin(ctx), &format!("task:{id}"), DELETE_DENIED)?;
        let task = self.find(id).await?;
        self.tasks.delete_task(task.id).await?;
        tracing::info!(task_id = id, "Task deleted");
        Ok(())
    }

    async fn resolve_executor(&self, email: &str) -> Result<User, TaskmanError> {
        if !is_valid_email(email) {
            return Err(TaskmanError::InvalidData(format!("Email {email} is not valid")));
        }
        self.users.get_by_email(email).await
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, TaskmanError> {
    value.ok_or_else(|| TaskmanError::InvalidData(format!("Task {field} must be provided")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Principal;
    use taskman_core::{InMemoryStore, NewUser, Role, UserRepository};

    struct Fixture {
        service: TaskService,
        admin: User,
        alice: User,
        bob: User,
    }

    async fn insert(store: &InMemoryStore, email: &str, role: Role) -> User {
        store
            .insert_user(NewUser {
                email: email.to_string(),
                password_hash: "hash".to_string(),
                role,
            })
            .await
            .unwrap()
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let admin = insert(&store, "admin@test.io", Role::Admin).await;
        let alice = insert(&store, "alice@test.io", Role::User).await;
        let bob = insert(&store, "bob@test.io", Role::User).await;

        let users = UserService::new(store.clone());
        Fixture {
            service: TaskService::new(store, users),
            admin,
            alice,
            bob,
        }
    }

    fn ctx(user: &User) -> SecurityContext {
        let mut principal = Principal::new(user.email.clone(), user.role);
        principal.set_authenticated(true);
        SecurityContext::authenticated(principal)
    }

    fn draft(executor: &str) -> TaskDraft {
        TaskDraft {
            title: Some("Task 1".to_string()),
            description: Some("Description 1".to_string()),
            executor_email: Some(executor.to_string()),
            ..TaskDraft::default()
        }
    }

    #[tokio::test]
    async fn test_create_defaults_and_author() {
        let f = fixture().await;
        let task = f
            .service
            .create(&ctx(&f.admin), draft("alice@test.io"))
            .await
            .unwrap();

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.author, Some(f.admin.to_ref()));
        assert_eq!(task.executor, Some(f.alice.to_ref()));
    }

    #[tokio::test]
    async fn test_create_requires_admin_and_fields() {
        let f = fixture().await;

        let err = f
            .service
            .create(&ctx(&f.alice), draft("alice@test.io"))
            .await
            .unwrap_err();
        assert_eq!(err, TaskmanError::Forbidden(CREATE_DENIED.to_string()));

        let mut missing = draft("alice@test.io");
        missing.title = None;
        let err = f.service.create(&ctx(&f.admin), missing).await.unwrap_err();
        assert!(matches!(err, TaskmanError::InvalidData(_)));

        let err = f
            .service
            .create(&ctx(&f.admin), draft("not-an-email"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TaskmanError::InvalidData("Email not-an-email is not valid".to_string())
        );

        let err = f
            .service
            .create(&ctx(&f.admin), draft("ghost@test.io"))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskmanError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_task_executor_or_admin() {
        let f = fixture().await;
        let task = f
            .service
            .create(&ctx(&f.admin), draft("alice@test.io"))
            .await
            .unwrap();

        assert!(f.service.get(&ctx(&f.alice), task.id).await.is_ok());
        assert!(f.service.get(&ctx(&f.admin), task.id).await.is_ok());
        assert_eq!(
            f.service.get(&ctx(&f.bob), task.id).await.unwrap_err(),
            TaskmanError::Forbidden(GET_DENIED.to_string())
        );
        assert!(matches!(
            f.service.get(&SecurityContext::anonymous(), task.id).await,
            Err(TaskmanError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_task_is_not_found_before_rule() {
        let f = fixture().await;
        assert_eq!(
            f.service.get(&ctx(&f.bob), 111).await.unwrap_err(),
            TaskmanError::NotFound("Task with id 111 is not found".to_string())
        );
    }

    #[tokio::test]
    async fn test_admin_only_checks_role_before_lookup() {
        let f = fixture().await;
        assert_eq!(
            f.service.delete(&ctx(&f.alice), 111).await.unwrap_err(),
            TaskmanError::Forbidden(DELETE_DENIED.to_string())
        );
        assert!(matches!(
            f.service.delete(&ctx(&f.admin), 111).await,
            Err(TaskmanError::NotFound(_))
        ));
        assert!(matches!(
            f.service
                .update(&ctx(&f.alice), 111, TaskDraft::default())
                .await,
            Err(TaskmanError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_update_applies_present_fields() {
        let f = fixture().await;
        let task = f
            .service
            .create(&ctx(&f.admin), draft("alice@test.io"))
            .await
            .unwrap();

        let updated = f
            .service
            .update(
                &ctx(&f.admin),
                task.id,
                TaskDraft {
                    priority: Some(TaskPriority::High),
                    executor_email: Some("bob@test.io".to_string()),
                    ..TaskDraft::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Task 1");
        assert_eq!(updated.priority, TaskPriority::High);
        assert_eq!(updated.executor, Some(f.bob.to_ref()));
    }

    #[tokio::test]
    async fn test_update_status_by_executor() {
        let f = fixture().await;
        let task = f
            .service
            .create(&ctx(&f.admin), draft("alice@test.io"))
            .await
            .unwrap();

        let updated = f
            .service
            .update_status(&ctx(&f.alice), task.id, TaskStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);

        assert!(matches!(
            f.service
                .update_status(&ctx(&f.bob), task.id, TaskStatus::Finished)
                .await,
            Err(TaskmanError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_list_by_author_admin_only() {
        let f = fixture().await;
        f.service
            .create(&ctx(&f.admin), draft("alice@test.io"))
            .await
            .unwrap();

        let page = f
            .service
            .list_by_author(&ctx(&f.admin), f.admin.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_elements, 1);

        assert_eq!(
            f.service
                .list_by_author(&ctx(&f.alice), f.admin.id, PageRequest::default())
                .await
                .unwrap_err(),
            TaskmanError::Forbidden(LIST_BY_AUTHOR_DENIED.to_string())
        );
        assert_eq!(
            f.service
                .list_by_author(&ctx(&f.admin), 31, PageRequest::default())
                .await
                .unwrap_err(),
            TaskmanError::NotFound("User with id 31 is not found".to_string())
        );
    }

    #[tokio::test]
    async fn test_list_by_executor_self_or_admin() {
        let f = fixture().await;
        f.service
            .create(&ctx(&f.admin), draft("alice@test.io"))
            .await
            .unwrap();

        let own = f
            .service
            .list_by_executor(&ctx(&f.alice), f.alice.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(own.content.len(), 1);

        let as_admin = f
            .service
            .list_by_executor(&ctx(&f.admin), f.alice.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(as_admin.total_elements, 1);

        assert_eq!(
            f.service
                .list_by_executor(&ctx(&f.bob), f.alice.id, PageRequest::default())
                .await
                .unwrap_err(),
            TaskmanError::Forbidden(LIST_BY_EXECUTOR_DENIED.to_string())
        );
    }

    #[tokio::test]
    async fn test_list_by_executor_without_principal_is_unauthenticated() {
        let f = fixture().await;
        let err = f
            .service
            .list_by_executor(&SecurityContext::anonymous(), f.alice.id, PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TaskmanError::Unauthenticated(_)));
    }
}
