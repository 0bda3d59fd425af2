//! Monthly budget routes.
//!
//! Year and month path segments are validated before any storage access.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use pocketbook_core::BudgetPeriod;
use pocketbook_db::BudgetRepository;
use pocketbook_db::entities::{budget_types, budgeting_expenses, budgets};
use pocketbook_db::repositories::{BudgetLineInput, BudgetLineView};
use pocketbook_shared::AppError;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::{JsonBody, PathParams};

/// Creates the budgeting routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budget-type/all", get(list_budget_types))
        .route("/budgeting/create/{year}/{month}", post(create_budget))
        .route(
            "/budgeting/category/{year}/{month}",
            post(add_line).patch(upsert_line).delete(delete_line),
        )
        .route("/budgeting/{year}/{month}", get(get_budget))
        .route("/budgeting/{year}/{month}/starting", get(get_starting_balance))
        .route("/budgeting/{year}/{month}/planned", get(get_planned_total))
        .route("/budgeting/{year}/{month}/actual", get(get_actual_total))
        .route("/budgeting/{year}/{month}/{budget_type}", get(list_lines_for_type))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a budget.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetRequest {
    /// Opening balance of the month; zero when omitted.
    #[serde(default)]
    pub starting_balance: Decimal,
}

/// Request body for adding or upserting a budget line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLineRequest {
    /// Category ID.
    #[serde(alias = "category")]
    pub category_id: i32,
    /// Budget type ID.
    #[serde(alias = "budgetType")]
    pub budget_type_id: i32,
    /// Planned amount.
    #[serde(alias = "planned")]
    pub planned_amount: Decimal,
}

/// Request body for deleting a budget line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLineRequest {
    /// Category whose line is removed.
    #[serde(alias = "category")]
    pub category_id: i32,
}

/// A single aggregated amount for a month.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodAmount {
    /// Four-digit year.
    pub year: i32,
    /// Two-digit month.
    pub month: String,
    /// The amount.
    pub amount: Decimal,
}

impl PeriodAmount {
    fn new(period: BudgetPeriod, amount: Decimal) -> Self {
        Self {
            year: period.year(),
            month: period.month_padded(),
            amount,
        }
    }
}

/// Result of an upsert.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResponse {
    /// The line after the write.
    pub line: budgeting_expenses::Model,
    /// Whether the line was created.
    pub created: bool,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/budget-type/all`
async fn list_budget_types(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<budget_types::Model>>> {
    let repo = BudgetRepository::new((*state.db).clone());
    Ok(Json(repo.list_budget_types().await?))
}

/// GET `/budgeting/{year}/{month}`
async fn get_budget(
    State(state): State<AppState>,
    PathParams((year, month)): PathParams<(String, String)>,
) -> ApiResult<Json<budgets::Model>> {
    let period = BudgetPeriod::parse(&year, &month)?;
    let repo = BudgetRepository::new((*state.db).clone());
    Ok(Json(repo.get_budget(period).await?))
}

/// GET `/budgeting/{year}/{month}/starting`
async fn get_starting_balance(
    State(state): State<AppState>,
    PathParams((year, month)): PathParams<(String, String)>,
) -> ApiResult<Json<PeriodAmount>> {
    let period = BudgetPeriod::parse(&year, &month)?;
    let repo = BudgetRepository::new((*state.db).clone());
    let balance = repo.starting_balance(period).await?;
    Ok(Json(PeriodAmount::new(period, balance)))
}

/// GET `/budgeting/{year}/{month}/planned` - Net of income lines.
async fn get_planned_total(
    State(state): State<AppState>,
    PathParams((year, month)): PathParams<(String, String)>,
) -> ApiResult<Json<PeriodAmount>> {
    let period = BudgetPeriod::parse(&year, &month)?;
    let repo = BudgetRepository::new((*state.db).clone());
    let total = repo
        .planned_total(period, state.sentinels.income_budget_type_id)
        .await?;
    Ok(Json(PeriodAmount::new(period, total)))
}

/// GET `/budgeting/{year}/{month}/actual` - Net of income lines.
async fn get_actual_total(
    State(state): State<AppState>,
    PathParams((year, month)): PathParams<(String, String)>,
) -> ApiResult<Json<PeriodAmount>> {
    let period = BudgetPeriod::parse(&year, &month)?;
    let repo = BudgetRepository::new((*state.db).clone());
    let total = repo
        .actual_total(period, state.sentinels.income_budget_type_id)
        .await?;
    Ok(Json(PeriodAmount::new(period, total)))
}

/// GET `/budgeting/{year}/{month}/{budget_type}`
async fn list_lines_for_type(
    State(state): State<AppState>,
    PathParams((year, month, budget_type)): PathParams<(String, String, String)>,
) -> ApiResult<Json<Vec<BudgetLineView>>> {
    let period = BudgetPeriod::parse(&year, &month)?;
    let type_id: i32 = budget_type.parse().map_err(|_| {
        AppError::Validation(format!("Invalid budget type '{budget_type}': expected an id"))
    })?;

    let repo = BudgetRepository::new((*state.db).clone());
    Ok(Json(repo.lines_for_type(period, type_id).await?))
}

/// POST `/budgeting/create/{year}/{month}`
async fn create_budget(
    State(state): State<AppState>,
    PathParams((year, month)): PathParams<(String, String)>,
    JsonBody(payload): JsonBody<CreateBudgetRequest>,
) -> ApiResult<impl IntoResponse> {
    let period = BudgetPeriod::parse(&year, &month)?;
    let repo = BudgetRepository::new((*state.db).clone());
    let budget = repo.create_budget(period, payload.starting_balance).await?;

    Ok((StatusCode::CREATED, Json(budget)))
}

/// POST `/budgeting/category/{year}/{month}` - Seeds the actual amount.
async fn add_line(
    State(state): State<AppState>,
    PathParams((year, month)): PathParams<(String, String)>,
    JsonBody(payload): JsonBody<BudgetLineRequest>,
) -> ApiResult<impl IntoResponse> {
    let period = BudgetPeriod::parse(&year, &month)?;
    let repo = BudgetRepository::new((*state.db).clone());
    let line = repo.add_line(period, payload.into()).await?;

    Ok((StatusCode::CREATED, Json(line)))
}

/// PATCH `/budgeting/category/{year}/{month}` - Creates the line when missing.
async fn upsert_line(
    State(state): State<AppState>,
    PathParams((year, month)): PathParams<(String, String)>,
    JsonBody(payload): JsonBody<BudgetLineRequest>,
) -> ApiResult<impl IntoResponse> {
    let period = BudgetPeriod::parse(&year, &month)?;
    let repo = BudgetRepository::new((*state.db).clone());
    let upsert = repo.upsert_line(period, payload.into()).await?;

    let status = if upsert.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(UpsertResponse {
            line: upsert.line,
            created: upsert.created,
        }),
    ))
}

/// DELETE `/budgeting/category/{year}/{month}`
async fn delete_line(
    State(state): State<AppState>,
    PathParams((year, month)): PathParams<(String, String)>,
    JsonBody(payload): JsonBody<DeleteLineRequest>,
) -> ApiResult<impl IntoResponse> {
    let period = BudgetPeriod::parse(&year, &month)?;
    let repo = BudgetRepository::new((*state.db).clone());
    repo.delete_line(period, payload.category_id).await?;

    info!(period = %period, category_id = payload.category_id, "Budget line removed via API");

    Ok(Json(json!({
        "message": format!(
            "Deleted budget line for category {} in {period}",
            payload.category_id
        )
    })))
}

impl From<BudgetLineRequest> for BudgetLineInput {
    fn from(request: BudgetLineRequest) -> Self {
        Self {
            category_id: request.category_id,
            budget_type_id: request.budget_type_id,
            planned_amount: request.planned_amount,
        }
    }
}
