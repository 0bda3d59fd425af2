//! HTTP API layer with Axum routes and extractors.
//!
//! This crate provides:
//! - REST API routes for expenses, categories and budgeting
//! - Request extractors with JSON rejections
//! - Error-to-response mapping

pub mod error;
pub mod extractors;
pub mod routes;

use axum::Router;
use pocketbook_db::LedgerSentinels;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Catch-all category and income budget type, resolved at startup.
    pub sentinels: LedgerSentinels,
    /// Row limit for list endpoints called without one.
    pub default_list_limit: u64,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
