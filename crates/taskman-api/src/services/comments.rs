//! Comment operations
//!
//! Reading and adding comments follow the task's own read rule. Editing and
//! deleting belong to the comment's author alone; the admin role does not
//! override that.

use super::{authorize, TaskService, UserService};
use crate::auth::{access, SecurityContext};
use crate::state::AppState;
use std::sync::Arc;
use taskman_core::{Comment, CommentRepository, NewComment, Page, PageRequest, TaskmanError};

const GET_DENIED: &str =
    "Access denied. User does not have the required permissions to get this comment";
const EDIT_DENIED: &str =
    "Access denied. User does not have the required permissions to edit comment.";
const DELETE_DENIED: &str = "Access denied. This user cannot delete this comment because he/she is not the comment author.";

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    tasks: TaskService,
    users: UserService,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, tasks: TaskService, users: UserService) -> Self {
        Self {
            comments,
            tasks,
            users,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.comments.clone(),
            TaskService::from_state(state),
            UserService::from_state(state),
        )
    }

    async fn find(&self, id: i64) -> Result<Comment, TaskmanError> {
        self.comments
            .find_comment_by_id(id)
            .await?
            .ok_or_else(|| TaskmanError::NotFound(format!("Comment with id {id} is not found")))
    }

    /// Comments of a task the caller may read
    pub async fn list_for_task(
        &self,
        ctx: &SecurityContext,
        task_id: i64,
        page: PageRequest,
    ) -> Result<Page<Comment>, TaskmanError> {
        let task = self.tasks.get(ctx, task_id).await?;
        self.comments.find_comments_by_task(task.id, page).await
    }

    /// Add a comment as the current user
    pub async fn add(
        &self,
        ctx: &SecurityContext,
        task_id: i64,
        content: String,
    ) -> Result<Comment, TaskmanError> {
        let task = self.tasks.get(ctx, task_id).await?;
        let commentator = self.users.current_user(ctx).await?;

        let comment = self
            .comments
            .insert_comment(NewComment {
                task_id: task.id,
                content,
                commentator: Some(commentator.to_ref()),
            })
            .await?;

        tracing::debug!(comment_id = comment.id, task_id, "Comment added");
        Ok(comment)
    }

    pub async fn update(
        &self,
        ctx: &SecurityContext,
        comment_id: i64,
        content: String,
    ) -> Result<Comment, TaskmanError> {
        let resource = format!("comment:{comment_id}");
        let mut comment = self.find(comment_id).await?;
        authorize(
            ctx,
            access::is_admin_or_commentator(ctx, &comment),
            &resource,
            GET_DENIED,
        )?;
        authorize(ctx, access::is_commentator(ctx, &comment), &resource, EDIT_DENIED)?;

        comment.content = content;
        self.comments.update_comment(comment).await
    }

    pub async fn delete(&self, ctx: &SecurityContext, comment_id: i64) -> Result<(), TaskmanError> {
        let comment = self.find(comment_id).await?;
        authorize(
            ctx,
            access::is_commentator(ctx, &comment),
            &format!("comment:{comment_id}"),
            DELETE_DENIED,
        )?;
        self.comments.delete_comment(comment.id).await
    }
}
