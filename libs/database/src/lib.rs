//! PostgreSQL connection management for the user store.
//!
//! Provides explicit, caller-owned database handles: configuration is read
//! once, a `DatabaseConnection` is built from it, and the handle is passed
//! into repositories at construction time. There is no process-global
//! session factory.
//!
//! # Examples
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let config = PostgresConfig::from_env();
//! let db = postgres::connect_from_config(config).await?;
//! postgres::run_migrations::<Migrator>(&db, "users").await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
