//! Expense routes.
//!
//! Every mutation reconciles the budget line of the month and category it
//! touches.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use pocketbook_core::BudgetPeriod;
use pocketbook_core::period::parse_expense_date;
use pocketbook_db::ExpenseRepository;
use pocketbook_db::entities::expenses;
use pocketbook_db::repositories::{CreateExpenseInput, ExpenseWithCategory, UpdateExpenseInput};

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::{JsonBody, PathParams};

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/expense/id/{id}",
            get(get_expense).patch(update_expense).delete(delete_expense),
        )
        .route("/expense/all", get(list_expenses))
        .route("/expense/all/{limit}", get(list_expenses_limited))
        .route("/expense/date/{year}", get(list_expenses_for_year))
        .route("/expense/date/{year}/{month}", get(list_expenses_for_month))
        .route("/expense/add", post(create_expense))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating an expense.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    /// Expense name.
    pub name: String,
    /// Signed amount.
    pub amount: Decimal,
    /// Date, optionally with a time part and trailing `Z`.
    pub date: String,
    /// Category ID.
    #[serde(alias = "category")]
    pub category_id: i32,
}

/// Request body for updating an expense.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseRequest {
    /// New name.
    pub name: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New date.
    pub date: Option<String>,
    /// New category ID.
    #[serde(alias = "category")]
    pub category_id: Option<i32>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/expense/id/{id}`
async fn get_expense(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> ApiResult<Json<expenses::Model>> {
    let repo = ExpenseRepository::new((*state.db).clone());
    Ok(Json(repo.get(id).await?))
}

/// GET `/expense/all` - List with the configured default limit.
async fn list_expenses(State(state): State<AppState>) -> ApiResult<Json<Vec<ExpenseWithCategory>>> {
    let limit = state.default_list_limit;
    let repo = ExpenseRepository::new((*state.db).clone());
    Ok(Json(repo.list(limit).await?))
}

/// GET `/expense/all/{limit}`
async fn list_expenses_limited(
    State(state): State<AppState>,
    PathParams(limit): PathParams<u64>,
) -> ApiResult<Json<Vec<ExpenseWithCategory>>> {
    let repo = ExpenseRepository::new((*state.db).clone());
    Ok(Json(repo.list(limit).await?))
}

/// GET `/expense/date/{year}`
async fn list_expenses_for_year(
    State(state): State<AppState>,
    PathParams(year): PathParams<String>,
) -> ApiResult<Json<Vec<ExpenseWithCategory>>> {
    let year = BudgetPeriod::parse_year(&year)?;
    let repo = ExpenseRepository::new((*state.db).clone());
    Ok(Json(repo.list_for_year(year).await?))
}

/// GET `/expense/date/{year}/{month}`
async fn list_expenses_for_month(
    State(state): State<AppState>,
    PathParams((year, month)): PathParams<(String, String)>,
) -> ApiResult<Json<Vec<ExpenseWithCategory>>> {
    let period = BudgetPeriod::parse(&year, &month)?;
    let repo = ExpenseRepository::new((*state.db).clone());
    Ok(Json(repo.list_for_period(period).await?))
}

/// POST `/expense/add`
async fn create_expense(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateExpenseRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = CreateExpenseInput {
        name: payload.name,
        amount: payload.amount,
        date: parse_expense_date(&payload.date)?,
        category_id: payload.category_id,
    };

    let repo = ExpenseRepository::new((*state.db).clone());
    let write = repo.create(input).await?;

    info!(
        expense_id = write.expense.id,
        reconciled_lines = write.reconciled_lines.len(),
        "Expense added"
    );

    Ok((StatusCode::CREATED, Json(json!({ "id": write.expense.id }))))
}

/// PATCH `/expense/id/{id}`
async fn update_expense(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
    JsonBody(payload): JsonBody<UpdateExpenseRequest>,
) -> ApiResult<Json<expenses::Model>> {
    let input = UpdateExpenseInput {
        name: payload.name,
        amount: payload.amount,
        date: payload
            .date
            .as_deref()
            .map(parse_expense_date)
            .transpose()?,
        category_id: payload.category_id,
    };

    let repo = ExpenseRepository::new((*state.db).clone());
    let write = repo.update(id, input).await?;

    Ok(Json(write.expense))
}

/// DELETE `/expense/id/{id}`
async fn delete_expense(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> ApiResult<impl IntoResponse> {
    let repo = ExpenseRepository::new((*state.db).clone());
    repo.delete(id).await?;

    Ok(Json(json!({
        "message": format!("Deleted expense with id {id}")
    })))
}
