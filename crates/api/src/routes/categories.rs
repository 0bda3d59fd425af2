//! Category routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use pocketbook_db::CategoryRepository;
use pocketbook_db::entities::categories;
use pocketbook_db::repositories::{CreateCategoryInput, UpdateCategoryInput};

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::{JsonBody, PathParams, QueryParams};

/// Creates the category routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/category/all", get(list_categories))
        .route("/category/all/{limit}", get(list_categories_limited))
        .route("/category/id/{id}", get(get_category))
        .route("/category/add", post(create_category))
        .route(
            "/category/{id}",
            patch(update_category).delete(delete_category),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Query string for category listing.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryFilter {
    /// Only categories of this budget type.
    #[serde(rename = "type")]
    pub budget_type: Option<i32>,
}

/// Request body for creating a category.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    /// Unique title.
    pub title: String,
    /// CSS-like color.
    pub color: Option<String>,
    /// Whether the category may be deleted.
    pub removable: Option<bool>,
    /// Whether the category may be edited.
    pub editable: Option<bool>,
    /// Budget type ID.
    pub budget_type_id: Option<i32>,
}

/// Request body for updating a category.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    /// New title.
    pub title: Option<String>,
    /// New color.
    pub color: Option<String>,
    /// New budget type ID.
    pub budget_type_id: Option<i32>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/category/all?type=`
async fn list_categories(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<CategoryFilter>,
) -> ApiResult<Json<Vec<categories::Model>>> {
    let repo = CategoryRepository::new((*state.db).clone());
    Ok(Json(
        repo.list(state.default_list_limit, filter.budget_type)
            .await?,
    ))
}

/// GET `/category/all/{limit}?type=`
async fn list_categories_limited(
    State(state): State<AppState>,
    PathParams(limit): PathParams<u64>,
    QueryParams(filter): QueryParams<CategoryFilter>,
) -> ApiResult<Json<Vec<categories::Model>>> {
    let repo = CategoryRepository::new((*state.db).clone());
    Ok(Json(repo.list(limit, filter.budget_type).await?))
}

/// GET `/category/id/{id}`
async fn get_category(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> ApiResult<Json<categories::Model>> {
    let repo = CategoryRepository::new((*state.db).clone());
    Ok(Json(repo.get(id).await?))
}

/// POST `/category/add`
async fn create_category(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateCategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    let repo = CategoryRepository::new((*state.db).clone());
    let category = repo
        .create(CreateCategoryInput {
            title: payload.title,
            color: payload.color,
            removable: payload.removable,
            editable: payload.editable,
            budget_type_id: payload.budget_type_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// PATCH `/category/{id}`
async fn update_category(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
    JsonBody(payload): JsonBody<UpdateCategoryRequest>,
) -> ApiResult<Json<categories::Model>> {
    let repo = CategoryRepository::new((*state.db).clone());
    let category = repo
        .update(
            id,
            UpdateCategoryInput {
                title: payload.title,
                color: payload.color,
                budget_type_id: payload.budget_type_id,
            },
        )
        .await?;

    Ok(Json(category))
}

/// DELETE `/category/{id}` - Moves its expenses to the catch-all category.
async fn delete_category(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> ApiResult<impl IntoResponse> {
    let repo = CategoryRepository::new((*state.db).clone());
    let deletion = repo
        .delete(id, state.sentinels.catch_all_category_id)
        .await?;

    info!(
        category_id = id,
        title = %deletion.category.title,
        "Category removed via API"
    );

    Ok(Json(json!({
        "message": format!("Deleted category with id {id}"),
        "reassignedExpenses": deletion.reassigned_expenses,
        "removedBudgetLines": deletion.removed_budget_lines
    })))
}
