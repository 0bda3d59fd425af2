//! Pocketbook API Server
//!
//! Main entry point for the Pocketbook backend service.

use std::sync::Arc;

use anyhow::Context;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use pocketbook_api::{AppState, create_router};
use pocketbook_db::migration::Migrator;
use pocketbook_db::{LedgerSentinels, connect};
use pocketbook_shared::AppConfig;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pocketbook=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    if config.database.run_migrations {
        Migrator::up(&db, None)
            .await
            .context("Failed to run migrations")?;
        info!("Migrations applied");
    }

    let sentinels = LedgerSentinels::resolve(&db, &config.ledger)
        .await
        .context("Failed to resolve ledger sentinels")?;

    let state = AppState {
        db: Arc::new(db),
        sentinels,
        default_list_limit: config.ledger.default_list_limit,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
