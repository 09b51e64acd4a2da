//! User lookups with not-found reporting

use crate::auth::{access, SecurityContext};
use crate::state::AppState;
use std::sync::Arc;
use taskman_core::{TaskmanError, User, UserRepository};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.users.clone())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<User, TaskmanError> {
        self.users
            .find_user_by_id(id)
            .await?
            .ok_or_else(|| TaskmanError::NotFound(format!("User with id {id} is not found")))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User, TaskmanError> {
        self.users
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| TaskmanError::NotFound(format!("User with e-mail {email} is not found")))
    }

    /// The stored account of the request's principal
    pub async fn current_user(&self, ctx: &SecurityContext) -> Result<User, TaskmanError> {
        let email = access::current_email(ctx)?;
        self.get_by_email(email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Principal;
    use taskman_core::{InMemoryStore, NewUser, Role};

    async fn service_with_user() -> (UserService, User) {
        let store = Arc::new(InMemoryStore::new());
        let user = store
            .insert_user(NewUser {
                email: "u@test.io".to_string(),
                password_hash: "hash".to_string(),
                role: Role::User,
            })
            .await
            .unwrap();
        (UserService::new(store), user)
    }

    #[tokio::test]
    async fn test_lookups() {
        let (service, user) = service_with_user().await;

        assert_eq!(service.get_by_id(user.id).await.unwrap(), user);
        assert_eq!(service.get_by_email("u@test.io").await.unwrap(), user);

        assert_eq!(
            service.get_by_id(99).await.unwrap_err(),
            TaskmanError::NotFound("User with id 99 is not found".to_string())
        );
        assert_eq!(
            service.get_by_email("x@test.io").await.unwrap_err(),
            TaskmanError::NotFound("User with e-mail x@test.io is not found".to_string())
        );
    }

    #[tokio::test]
    async fn test_current_user() {
        let (service, user) = service_with_user().await;

        let mut principal = Principal::new("u@test.io", Role::User);
        principal.set_authenticated(true);
        let ctx = SecurityContext::authenticated(principal);
        assert_eq!(service.current_user(&ctx).await.unwrap(), user);

        let err = service
            .current_user(&SecurityContext::anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, TaskmanError::Unauthenticated(_)));
    }
}
