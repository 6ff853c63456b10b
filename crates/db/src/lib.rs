//! Postgres persistence for Tally.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Query functions shared by the store and tooling
//! - [`PgStore`], the Postgres implementation of the core `Store`
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;
mod store;

pub use store::PgStore;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tally_shared::config::DatabaseConfig;
use tracing::info;

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!(
        max_connections = config.max_connections,
        "Connected to database"
    );
    Ok(db)
}
