//! Users Domain
//!
//! This module provides a complete domain implementation for managing user
//! records with a uniqueness guarantee on the normalized email address.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Service   │  ← Consistency protocol, validation, events
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! Validation runs before any storage access and aggregates every field
//! failure into one report. Email uniqueness is pre-checked on the fast
//! path but ultimately enforced by the storage layer's unique index; the
//! service is correct under concurrent writers either way.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{
//!     models::CreateUser,
//!     repository::InMemoryUserRepository,
//!     service::UserService,
//! };
//!
//! # async fn example() {
//! let repository = InMemoryUserRepository::new();
//! let service = UserService::new(repository);
//!
//! let user = service
//!     .create_user(CreateUser {
//!         name: Some("John Doe".to_string()),
//!         email: Some("john@example.com".to_string()),
//!         age: Some(25),
//!     })
//!     .await;
//! # }
//! ```

mod constraint;
pub mod entity;
pub mod error;
pub mod events;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use error::{FieldError, FieldErrors, UserError, UserResult};
pub use events::{
    PublishError, PublishResult, RedisStreamPublisher, UserEvent, UserEventKind,
    UserEventPublisher, UserEventsConfig,
};
pub use models::{CreateUser, NewUser, UpdateUser, User, UserChanges};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
