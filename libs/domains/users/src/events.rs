//! User lifecycle event publication.
//!
//! Create and delete emit a fact to a notification collaborator. Delivery is
//! fire-and-forget: the mutation has already committed by the time the event
//! is published, and a failed publish never turns a committed mutation into
//! a reported failure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::User;

/// Kind of user lifecycle fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserEventKind {
    Created,
    Deleted,
}

impl std::fmt::Display for UserEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserEventKind::Created => write!(f, "created"),
            UserEventKind::Deleted => write!(f, "deleted"),
        }
    }
}

/// A user lifecycle fact published after a committed mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEvent {
    pub kind: UserEventKind,
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

impl UserEvent {
    pub fn created(user: &User) -> Self {
        Self::from_user(UserEventKind::Created, user)
    }

    pub fn deleted(user: &User) -> Self {
        Self::from_user(UserEventKind::Deleted, user)
    }

    fn from_user(kind: UserEventKind, user: &User) -> Self {
        Self {
            kind,
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            occurred_at: Utc::now(),
        }
    }
}

/// Errors a publisher implementation can report
///
/// The service logs and swallows these; they never reach callers.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<redis::RedisError> for PublishError {
    fn from(err: redis::RedisError) -> Self {
        PublishError::Queue(err.to_string())
    }
}

impl From<serde_json::Error> for PublishError {
    fn from(err: serde_json::Error) -> Self {
        PublishError::Serialization(err.to_string())
    }
}

pub type PublishResult<T> = Result<T, PublishError>;

/// Notification collaborator consumed by the consistency service
///
/// Implementations own their delivery guarantees; the service does not
/// inspect the outcome beyond logging a failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserEventPublisher: Send + Sync {
    async fn publish(&self, event: UserEvent) -> PublishResult<()>;
}

/// Configuration for the Redis Streams publisher
#[derive(Debug, Clone)]
pub struct UserEventsConfig {
    /// Redis stream name for user events
    pub stream_name: String,
    /// Maximum stream length (for auto-trimming)
    pub max_stream_length: i64,
}

impl Default for UserEventsConfig {
    fn default() -> Self {
        Self {
            stream_name: std::env::var("USER_EVENTS_STREAM_NAME")
                .unwrap_or_else(|_| "user:events".to_string()),
            max_stream_length: 100_000,
        }
    }
}

/// Publishes user events to a capped Redis stream
pub struct RedisStreamPublisher {
    redis: Arc<ConnectionManager>,
    config: UserEventsConfig,
}

impl RedisStreamPublisher {
    pub fn new(redis: ConnectionManager, config: UserEventsConfig) -> Self {
        Self {
            redis: Arc::new(redis),
            config,
        }
    }

    pub fn with_default_config(redis: ConnectionManager) -> Self {
        Self::new(redis, UserEventsConfig::default())
    }
}

#[async_trait]
impl UserEventPublisher for RedisStreamPublisher {
    async fn publish(&self, event: UserEvent) -> PublishResult<()> {
        let mut conn = (*self.redis).clone();

        let payload = serde_json::to_string(&event)?;

        // Add to stream with auto-trim
        let id: String = redis::cmd("XADD")
            .arg(&self.config.stream_name)
            .arg("MAXLEN")
            .arg("~")
            .arg(self.config.max_stream_length)
            .arg("*")
            .arg("event")
            .arg(&payload)
            .query_async(&mut conn)
            .await?;

        debug!(
            stream_id = %id,
            kind = %event.kind,
            user_id = %event.user_id,
            "Published user event"
        );

        Ok(())
    }
}
