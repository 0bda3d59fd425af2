//! Database migration runner for Pocketbook.
//!
//! Reads `DATABASE_URL`. Usage:
//!   migrator up      - Create tables and seed budget types and the catch-all category
//!   migrator down    - Drop all tables
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop everything and re-run migrations

use sea_orm_migration::prelude::*;
use pocketbook_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The CLI sets up its own tracing
    cli::run_cli(Migrator).await;
}
