//! Task, comment and user services
//!
//! Each operation receives the request's [`SecurityContext`], loads what it
//! needs and asks the access rules before touching storage.
//!
//! Author: hephaex@gmail.com

pub mod comments;
pub mod tasks;
pub mod users;

pub use comments::CommentService;
pub use tasks::{TaskDraft, TaskService};
pub use users::UserService;

use crate::audit::{audit_log, AuditEvent};
use crate::auth::{access, SecurityContext};
use taskman_core::TaskmanError;

/// Apply an access decision, auditing denials
pub(crate) fn authorize(
    ctx: &SecurityContext,
    allowed: bool,
    resource: &str,
    reason: &str,
) -> Result<(), TaskmanError> {
    if !allowed {
        let principal = ctx.principal();
        audit_log(&AuditEvent::AccessDenied {
            email: principal.map(|p| p.email().to_string()),
            role: principal.map(|p| p.role().to_string()),
            resource: resource.to_string(),
            reason: reason.to_string(),
        });
    }
    access::ensure(allowed, reason)
}
