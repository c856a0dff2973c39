use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;

/// Repository trait for User persistence
///
/// The storage collaborator behind the consistency service. Implementations
/// must enforce email uniqueness themselves: the service's pre-check is a
/// fast path, not the authority.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user; rejects a duplicate normalized email
    async fn create(&self, user: User) -> UserResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Get a user by normalized email
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// List every live user
    async fn list(&self) -> UserResult<Vec<User>>;

    /// Persist a merged user record; rejects a duplicate normalized email
    async fn update(&self, user: User) -> UserResult<User>;

    /// Delete a user by ID; returns whether a record was removed
    async fn delete(&self, id: Uuid) -> UserResult<bool>;

    /// Check whether a normalized email is taken, optionally excluding one record
    async fn email_exists(&self, email: &str, exclude: Option<Uuid>) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
///
/// The write lock makes check-then-insert atomic, mirroring what the unique
/// index provides in PostgreSQL.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        let email_taken = users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email));
        if email_taken {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        let user = users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned();
        Ok(user)
    }

    async fn list(&self) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users.values().cloned().collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(result)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }

        let email_taken = users
            .values()
            .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email));
        if email_taken {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Updated user");
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let mut users = self.users.write().await;

        if users.remove(&id).is_some() {
            tracing::info!(user_id = %id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn email_exists(&self, email: &str, exclude: Option<Uuid>) -> UserResult<bool> {
        let users = self.users.read().await;
        let exists = users
            .values()
            .any(|u| Some(u.id) != exclude && u.email.eq_ignore_ascii_case(email));
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;

    fn user(email: &str) -> User {
        User::new(NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            age: 30,
        })
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = InMemoryUserRepository::new();

        let created = repo.create(user("test@example.com")).await.unwrap();
        assert_eq!(created.email, "test@example.com");

        let fetched = repo.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_get_by_email_is_case_insensitive() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("test@example.com")).await.unwrap();

        let fetched = repo.get_by_email("TEST@EXAMPLE.COM").await.unwrap();
        assert!(fetched.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_error() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("test@example.com")).await.unwrap();

        let result = repo.create(user("test@example.com")).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_email_of_other_record() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("first@example.com")).await.unwrap();
        let second = repo.create(user("second@example.com")).await.unwrap();

        let mut stolen = second.clone();
        stolen.email = "first@example.com".to_string();

        let result = repo.update(stolen).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_delete_reports_missing_record() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("gone@example.com")).await.unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_email_exists_excludes_own_record() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("ann@example.com")).await.unwrap();

        assert!(repo.email_exists("ann@example.com", None).await.unwrap());
        assert!(
            !repo
                .email_exists("ann@example.com", Some(created.id))
                .await
                .unwrap()
        );
    }
}
