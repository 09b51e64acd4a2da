//! Access decisions for tasks and comments
//!
//! Pure predicates over the request's [`SecurityContext`] and a loaded
//! resource. An anonymous context fails every predicate. Services turn a
//! `false` into a typed denial with [`ensure`].

use super::principal::SecurityContext;
use taskman_core::{Comment, Role, Task, TaskmanError, UserRef};

const AUTHENTICATE_FIRST: &str = "Access denied. Please authenticate first.";

/// True iff the principal holds the admin authority
pub fn is_admin(ctx: &SecurityContext) -> bool {
    ctx.principal()
        .map(|p| p.has_authority(Role::ADMIN_AUTHORITY))
        .unwrap_or(false)
}

/// Admin, or the executor assigned to the task
pub fn is_admin_or_task_executor(ctx: &SecurityContext, task: &Task) -> bool {
    is_admin(ctx) || is_same_user(ctx, task.executor.as_ref())
}

/// Admin, or the author of the comment
pub fn is_admin_or_commentator(ctx: &SecurityContext, comment: &Comment) -> bool {
    is_admin(ctx) || is_commentator(ctx, comment)
}

/// The author of the comment, whatever the role
pub fn is_commentator(ctx: &SecurityContext, comment: &Comment) -> bool {
    is_same_user(ctx, comment.commentator.as_ref())
}

/// E-mail of the current principal
///
/// Fails with `Unauthenticated`, which the boundary reports as 403.
pub fn current_email(ctx: &SecurityContext) -> Result<&str, TaskmanError> {
    ctx.principal()
        .map(|p| p.email())
        .ok_or_else(|| TaskmanError::Unauthenticated(AUTHENTICATE_FIRST.to_string()))
}

/// Turn a negative decision into `Forbidden(reason)`
pub fn ensure(allowed: bool, reason: &str) -> Result<(), TaskmanError> {
    if allowed {
        Ok(())
    } else {
        Err(TaskmanError::Forbidden(reason.to_string()))
    }
}

fn is_same_user(ctx: &SecurityContext, user: Option<&UserRef>) -> bool {
    match (ctx.principal(), user) {
        (Some(principal), Some(user)) => user.email == principal.email(),
        _ => false,
    }
}
