//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - The budget line reconciler run inside expense mutations
//! - Database migrations and startup sentinel resolution

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod sentinels;

pub use repositories::{
    BudgetReconciler, BudgetRepository, CategoryRepository, ExpenseRepository,
};
pub use sentinels::{LedgerSentinels, SentinelError};

use std::time::Duration;

use pocketbook_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the database.
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

    Database::connect(options).await
}
