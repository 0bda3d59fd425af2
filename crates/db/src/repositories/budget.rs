//! Budget repository for monthly budgets and their lines.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use serde::Serialize;
use tracing::info;

use pocketbook_core::budget::{BudgetAggregator, LineAmounts, NetTotals};
use pocketbook_core::{BudgetPeriod, ValidationError};
use pocketbook_shared::AppError;

use super::reconcile::{BudgetReconciler, ReconcileError};
use crate::entities::{budget_types, budgeting_expenses, budgets, categories};

/// Error types for budget operations.
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    /// No budget for the period.
    #[error("Budget does not exist")]
    NotFound(BudgetPeriod),

    /// A budget for the period already exists.
    #[error("Budget already exists")]
    AlreadyExists(BudgetPeriod),

    /// Category not found.
    #[error("Category with id {0} does not exist")]
    CategoryNotFound(i32),

    /// Budget type not found.
    #[error("Budget type with id {0} does not exist")]
    BudgetTypeNotFound(i32),

    /// The budget already has a line for the category.
    #[error("Budget line for category {0} already exists")]
    DuplicateLine(i32),

    /// The budget has no line for the category.
    #[error("Budget line for category {0} does not exist")]
    LineNotFound(i32),

    /// The category's lines cannot be removed.
    #[error("Category with id {0} cannot be removed")]
    CategoryNotRemovable(i32),

    /// An amount or total left the decimal range.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ReconcileError> for BudgetError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::Amount(e) => Self::Validation(e),
            ReconcileError::Database(e) => Self::Database(e),
        }
    }
}

impl From<BudgetError> for AppError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::NotFound(_)
            | BudgetError::CategoryNotFound(_)
            | BudgetError::BudgetTypeNotFound(_)
            | BudgetError::LineNotFound(_) => Self::NotFound(err.to_string()),
            BudgetError::AlreadyExists(_) | BudgetError::DuplicateLine(_) => {
                Self::Conflict(err.to_string())
            }
            BudgetError::CategoryNotRemovable(_) => Self::Rejected(err.to_string()),
            BudgetError::Validation(e) => e.into(),
            BudgetError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for adding or upserting a budget line.
#[derive(Debug, Clone)]
pub struct BudgetLineInput {
    /// Category the line budgets for.
    pub category_id: i32,
    /// Budget type of the line.
    pub budget_type_id: i32,
    /// Planned amount.
    pub planned_amount: Decimal,
}

/// Budget line joined with its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLineView {
    /// Line ID.
    pub id: i32,
    /// Budget ID.
    pub budget_id: i32,
    /// Category ID.
    pub category_id: i32,
    /// Category title.
    pub category_title: String,
    /// Category color.
    pub category_color: String,
    /// Budget type ID.
    pub budget_type_id: i32,
    /// Planned amount.
    pub planned_amount: Decimal,
    /// Actual amount.
    pub actual_amount: Decimal,
}

/// Result of an upsert.
#[derive(Debug, Clone)]
pub struct LineUpsert {
    /// The line after the write.
    pub line: budgeting_expenses::Model,
    /// Whether the line was created rather than updated.
    pub created: bool,
}

/// Budget repository.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Budgets
    // ========================================================================

    /// Creates the budget for a period; at most one per period.
    pub async fn create_budget(
        &self,
        period: BudgetPeriod,
        starting_balance: Decimal,
    ) -> Result<budgets::Model, BudgetError> {
        let txn = self.db.begin().await?;

        if BudgetReconciler::find_budget(&txn, period).await?.is_some() {
            return Err(BudgetError::AlreadyExists(period));
        }

        let budget = budgets::ActiveModel {
            year: Set(period.year()),
            month: Set(period.month_i32()),
            starting_balance: Set(starting_balance),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(budget_id = budget.id, period = %period, "Budget created");
        Ok(budget)
    }

    /// Gets the budget for a period.
    pub async fn get_budget(&self, period: BudgetPeriod) -> Result<budgets::Model, BudgetError> {
        require_budget(&self.db, period).await
    }

    /// Starting balance of a period's budget.
    pub async fn starting_balance(&self, period: BudgetPeriod) -> Result<Decimal, BudgetError> {
        Ok(self.get_budget(period).await?.starting_balance)
    }

    /// Net planned and actual totals of a period's budget.
    pub async fn totals(
        &self,
        period: BudgetPeriod,
        income_budget_type_id: i32,
    ) -> Result<NetTotals, BudgetError> {
        let budget = self.get_budget(period).await?;

        let lines: Vec<LineAmounts> = budgeting_expenses::Entity::find()
            .filter(budgeting_expenses::Column::BudgetId.eq(budget.id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|line| LineAmounts {
                budget_type_id: line.budget_type_id,
                planned: line.planned_amount,
                actual: line.actual_amount,
            })
            .collect();

        Ok(BudgetAggregator::new(income_budget_type_id).totals(&lines)?)
    }

    /// Net planned total of a period's budget.
    pub async fn planned_total(
        &self,
        period: BudgetPeriod,
        income_budget_type_id: i32,
    ) -> Result<Decimal, BudgetError> {
        Ok(self.totals(period, income_budget_type_id).await?.planned)
    }

    /// Net actual total of a period's budget.
    pub async fn actual_total(
        &self,
        period: BudgetPeriod,
        income_budget_type_id: i32,
    ) -> Result<Decimal, BudgetError> {
        Ok(self.totals(period, income_budget_type_id).await?.actual)
    }

    /// Lists all budget types.
    pub async fn list_budget_types(&self) -> Result<Vec<budget_types::Model>, BudgetError> {
        Ok(budget_types::Entity::find()
            .order_by_asc(budget_types::Column::Id)
            .all(&self.db)
            .await?)
    }

    // ========================================================================
    // Budget lines
    // ========================================================================

    /// Lists a period's lines of one budget type with their categories.
    pub async fn lines_for_type(
        &self,
        period: BudgetPeriod,
        budget_type_id: i32,
    ) -> Result<Vec<BudgetLineView>, BudgetError> {
        let budget = self.get_budget(period).await?;
        ensure_budget_type(&self.db, budget_type_id).await?;

        let rows = budgeting_expenses::Entity::find()
            .filter(budgeting_expenses::Column::BudgetId.eq(budget.id))
            .filter(budgeting_expenses::Column::BudgetTypeId.eq(budget_type_id))
            .find_also_related(categories::Entity)
            .order_by_asc(budgeting_expenses::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(line, category)| {
                let (category_title, category_color) = category
                    .map(|c| (c.title, c.color))
                    .unwrap_or_default();
                BudgetLineView {
                    id: line.id,
                    budget_id: line.budget_id,
                    category_id: line.category_id,
                    category_title,
                    category_color,
                    budget_type_id: line.budget_type_id,
                    planned_amount: line.planned_amount,
                    actual_amount: line.actual_amount,
                }
            })
            .collect())
    }

    /// Adds a line, seeding its actual amount from the expenses already
    /// recorded for the category in the period.
    pub async fn add_line(
        &self,
        period: BudgetPeriod,
        input: BudgetLineInput,
    ) -> Result<budgeting_expenses::Model, BudgetError> {
        let txn = self.db.begin().await?;

        let budget = require_budget(&txn, period).await?;
        ensure_category(&txn, input.category_id).await?;
        ensure_budget_type(&txn, input.budget_type_id).await?;

        if find_line(&txn, budget.id, input.category_id).await?.is_some() {
            return Err(BudgetError::DuplicateLine(input.category_id));
        }

        let line = insert_seeded_line(&txn, &budget, period, &input).await?;
        txn.commit().await?;

        info!(
            line_id = line.id,
            period = %period,
            category_id = line.category_id,
            actual_amount = %line.actual_amount,
            "Budget line added"
        );
        Ok(line)
    }

    /// Updates a line's planned amount and type, creating the line (seeded)
    /// when the update matched nothing.
    pub async fn upsert_line(
        &self,
        period: BudgetPeriod,
        input: BudgetLineInput,
    ) -> Result<LineUpsert, BudgetError> {
        let txn = self.db.begin().await?;

        let budget = require_budget(&txn, period).await?;
        ensure_category(&txn, input.category_id).await?;
        ensure_budget_type(&txn, input.budget_type_id).await?;

        let updated = budgeting_expenses::Entity::update_many()
            .col_expr(
                budgeting_expenses::Column::PlannedAmount,
                Expr::value(input.planned_amount),
            )
            .col_expr(
                budgeting_expenses::Column::BudgetTypeId,
                Expr::value(input.budget_type_id),
            )
            .filter(budgeting_expenses::Column::BudgetId.eq(budget.id))
            .filter(budgeting_expenses::Column::CategoryId.eq(input.category_id))
            .exec(&txn)
            .await?;

        let upsert = if updated.rows_affected == 0 {
            LineUpsert {
                line: insert_seeded_line(&txn, &budget, period, &input).await?,
                created: true,
            }
        } else {
            let line = find_line(&txn, budget.id, input.category_id)
                .await?
                .ok_or(BudgetError::LineNotFound(input.category_id))?;
            LineUpsert {
                line,
                created: false,
            }
        };

        txn.commit().await?;

        info!(
            line_id = upsert.line.id,
            period = %period,
            created = upsert.created,
            "Budget line upserted"
        );
        Ok(upsert)
    }

    /// Deletes the line of a removable category.
    pub async fn delete_line(
        &self,
        period: BudgetPeriod,
        category_id: i32,
    ) -> Result<(), BudgetError> {
        let txn = self.db.begin().await?;

        let budget = require_budget(&txn, period).await?;
        let category = categories::Entity::find_by_id(category_id)
            .one(&txn)
            .await?
            .ok_or(BudgetError::CategoryNotFound(category_id))?;
        if !category.removable {
            return Err(BudgetError::CategoryNotRemovable(category_id));
        }

        let deleted = budgeting_expenses::Entity::delete_many()
            .filter(budgeting_expenses::Column::BudgetId.eq(budget.id))
            .filter(budgeting_expenses::Column::CategoryId.eq(category_id))
            .exec(&txn)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(BudgetError::LineNotFound(category_id));
        }

        txn.commit().await?;

        info!(period = %period, category_id, "Budget line deleted");
        Ok(())
    }
}

async fn require_budget<C>(conn: &C, period: BudgetPeriod) -> Result<budgets::Model, BudgetError>
where
    C: ConnectionTrait,
{
    BudgetReconciler::find_budget(conn, period)
        .await?
        .ok_or(BudgetError::NotFound(period))
}

async fn find_line<C>(
    conn: &C,
    budget_id: i32,
    category_id: i32,
) -> Result<Option<budgeting_expenses::Model>, DbErr>
where
    C: ConnectionTrait,
{
    budgeting_expenses::Entity::find()
        .filter(budgeting_expenses::Column::BudgetId.eq(budget_id))
        .filter(budgeting_expenses::Column::CategoryId.eq(category_id))
        .one(conn)
        .await
}

async fn insert_seeded_line<C>(
    conn: &C,
    budget: &budgets::Model,
    period: BudgetPeriod,
    input: &BudgetLineInput,
) -> Result<budgeting_expenses::Model, BudgetError>
where
    C: ConnectionTrait,
{
    let actual = BudgetReconciler::expense_total(conn, period, input.category_id).await?;

    Ok(budgeting_expenses::ActiveModel {
        budget_id: Set(budget.id),
        category_id: Set(input.category_id),
        budget_type_id: Set(input.budget_type_id),
        planned_amount: Set(input.planned_amount),
        actual_amount: Set(actual),
        ..Default::default()
    }
    .insert(conn)
    .await?)
}

async fn ensure_category<C>(conn: &C, category_id: i32) -> Result<(), BudgetError>
where
    C: ConnectionTrait,
{
    categories::Entity::find_by_id(category_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or(BudgetError::CategoryNotFound(category_id))
}

async fn ensure_budget_type<C>(conn: &C, type_id: i32) -> Result<(), BudgetError>
where
    C: ConnectionTrait,
{
    budget_types::Entity::find_by_id(type_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or(BudgetError::BudgetTypeNotFound(type_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn period() -> BudgetPeriod {
        BudgetPeriod::parse("2024", "03").expect("valid period")
    }

    #[rstest]
    #[case(BudgetError::NotFound(period()), "NOT_FOUND", 400)]
    #[case(BudgetError::AlreadyExists(period()), "CONFLICT", 400)]
    #[case(BudgetError::DuplicateLine(4), "CONFLICT", 400)]
    #[case(BudgetError::LineNotFound(4), "NOT_FOUND", 400)]
    #[case(BudgetError::CategoryNotRemovable(1), "REJECTED", 400)]
    #[case(BudgetError::Validation(ValidationError::AmountOutOfRange), "VALIDATION_ERROR", 400)]
    #[case(BudgetError::Database(DbErr::Custom("boom".into())), "DATABASE_ERROR", 500)]
    fn test_error_mapping(#[case] err: BudgetError, #[case] code: &str, #[case] status: u16) {
        let app: AppError = err.into();
        assert_eq!(app.error_code(), code);
        assert_eq!(app.status_code(), status);
    }

    #[test]
    fn test_missing_budget_message() {
        let app: AppError = BudgetError::NotFound(period()).into();
        assert_eq!(app.message(), "Budget does not exist");
    }
}
