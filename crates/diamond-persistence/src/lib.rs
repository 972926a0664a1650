//! Diamond Persistence - Database entities and schema management
//!
//! This crate provides:
//! - SeaORM entity definitions for every workflow and reference table
//! - Schema bootstrap for sqlite deployments and tests
//! - The database connection factory

pub mod entity;
pub mod schema;

// Re-export sea-orm for convenience
pub use sea_orm;

// Re-export entity prelude
pub use entity::prelude::*;

pub use schema::create_schema;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Connection pool parameters, resolved by the server configuration.
#[derive(Clone, Debug)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub sqlx_logging: bool,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 20,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
            sqlx_logging: false,
        }
    }
}

/// Open a connection pool against the configured database URL
/// (`sqlite:` or `postgres:`).
pub async fn connect(url: &str, pool: &PoolSettings) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(url);

    opt.max_connections(pool.max_connections)
        .min_connections(pool.min_connections)
        .connect_timeout(Duration::from_secs(pool.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(pool.idle_timeout_secs))
        .sqlx_logging(pool.sqlx_logging);

    tracing::info!(
        max_connections = pool.max_connections,
        min_connections = pool.min_connections,
        "Database connection pool configured"
    );

    Database::connect(opt).await
}
