//! API route definitions.

use axum::{Json, Router, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::AppState;

pub mod budgeting;
pub mod categories;
pub mod expenses;
pub mod health;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(expenses::routes())
        .merge(categories::routes())
        .merge(budgeting::routes())
}

/// Fallback for unmatched routes.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "NOT_FOUND",
            "message": "Route not found"
        })),
    )
}
