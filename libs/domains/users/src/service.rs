use std::sync::Arc;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::events::{UserEvent, UserEventPublisher};
use crate::models::{CreateUser, UpdateUser, User};
use crate::repository::UserRepository;
use crate::validation;

/// Consistency service for User records
///
/// Owns the create/read/update/delete protocol against the repository,
/// enforces the email-uniqueness invariant under concurrent writers, merges
/// partial updates onto loaded records, and emits lifecycle events after
/// committed mutations. Holds no mutable state of its own; safe to share
/// across tasks.
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    publisher: Option<Arc<dyn UserEventPublisher>>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            publisher: None,
        }
    }

    /// Attach a notification collaborator for created/deleted facts
    pub fn with_publisher(mut self, publisher: Arc<dyn UserEventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Create a new user
    ///
    /// Validates and normalizes every field first, aggregating all failures.
    /// The duplicate pre-check is a fast path; a concurrent writer losing
    /// the race is caught by the storage-level unique constraint, which the
    /// repository translates to `DuplicateEmail`.
    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        let new_user = validation::validate_create(&input).map_err(UserError::Validation)?;

        if self.repository.get_by_email(&new_user.email).await?.is_some() {
            return Err(UserError::DuplicateEmail(new_user.email));
        }

        let user = self.repository.create(User::new(new_user)).await?;

        self.notify(UserEvent::created(&user));
        Ok(user)
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Get a user by email
    ///
    /// The input is normalized the same way create normalizes, so case or
    /// whitespace differences still match.
    pub async fn get_user_by_email(&self, email: &str) -> UserResult<User> {
        let normalized = validation::normalize_email(email);

        self.repository
            .get_by_email(&normalized)
            .await?
            .ok_or(UserError::EmailNotFound(normalized))
    }

    /// List every live user
    pub async fn list_users(&self) -> UserResult<Vec<User>> {
        self.repository.list().await
    }

    /// Apply a partial update to a user
    ///
    /// Provided fields are validated as optional, merged onto the loaded
    /// record and persisted; absent or blank fields stay unchanged. When
    /// the normalized email differs from the current one, the same
    /// duplicate-detection protocol as create runs, scoped to exclude this
    /// record's own row.
    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> UserResult<User> {
        let changes = validation::validate_update(&input).map_err(UserError::Validation)?;

        let mut user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        if let Some(ref new_email) = changes.email {
            if *new_email != user.email
                && self.repository.email_exists(new_email, Some(id)).await?
            {
                return Err(UserError::DuplicateEmail(new_email.clone()));
            }
        }

        user.apply_update(changes);

        self.repository.update(user).await
    }

    /// Delete a user
    ///
    /// Deleting a nonexistent id is `NotFound`, never a silent success, so
    /// callers can tell "already gone" from "just removed".
    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id));
        }

        self.notify(UserEvent::deleted(&user));
        Ok(())
    }

    /// Publish a lifecycle fact without blocking the committed mutation
    ///
    /// Runs on a detached task; a failed or slow publish is logged and
    /// swallowed, never surfaced to the caller.
    fn notify(&self, event: UserEvent) {
        let Some(publisher) = &self.publisher else {
            return;
        };

        let publisher = Arc::clone(publisher);
        tokio::spawn(async move {
            if let Err(e) = publisher.publish(event).await {
                tracing::warn!(error = %e, "Failed to publish user event");
            }
        });
    }
}
