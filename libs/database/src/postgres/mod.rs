//! PostgreSQL connector and utilities
//!
//! Connection handle construction, migration running, and health checks.

mod config;
mod connector;
mod health;

pub use config::PostgresConfig;
pub use connector::{
    connect, connect_from_config, connect_with_options, connect_with_retry, run_migrations,
};
pub use health::check_health;
