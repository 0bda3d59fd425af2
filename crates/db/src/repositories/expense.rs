//! Expense repository.
//!
//! Every mutation reconciles the affected budget lines on the same
//! transaction.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;

use pocketbook_core::budget::{ExpenseChange, LineSlot};
use pocketbook_core::period::year_bounds;
use pocketbook_core::{BudgetPeriod, ValidationError, check_list_limit};
use pocketbook_shared::AppError;

use super::reconcile::{BudgetReconciler, ReconcileError};
use crate::entities::{budgeting_expenses, categories, expenses};

/// Error types for expense operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    /// Expense not found.
    #[error("Expense with id {0} does not exist")]
    NotFound(i32),

    /// Referenced category not found.
    #[error("Category with id {0} does not exist")]
    CategoryNotFound(i32),

    /// Invalid input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ReconcileError> for ExpenseError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::Amount(e) => Self::Validation(e),
            ReconcileError::Database(e) => Self::Database(e),
        }
    }
}

impl From<ExpenseError> for AppError {
    fn from(err: ExpenseError) -> Self {
        match err {
            ExpenseError::NotFound(_) | ExpenseError::CategoryNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            ExpenseError::Validation(e) => e.into(),
            ExpenseError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Expense name.
    pub name: String,
    /// Signed amount.
    pub amount: Decimal,
    /// Calendar date.
    pub date: NaiveDate,
    /// Category ID.
    pub category_id: i32,
}

/// Input for updating an expense. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    /// New name.
    pub name: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New date.
    pub date: Option<NaiveDate>,
    /// New category.
    pub category_id: Option<i32>,
}

/// Expense joined with its category title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseWithCategory {
    /// Expense ID.
    pub id: i32,
    /// Expense name.
    pub name: String,
    /// Signed amount.
    pub amount: Decimal,
    /// Calendar date.
    pub date: NaiveDate,
    /// Category ID.
    pub category_id: i32,
    /// Category title.
    pub category_title: String,
}

/// Result of an expense mutation.
#[derive(Debug, Clone)]
pub struct ExpenseWrite {
    /// The expense as stored (or as it was, for deletes).
    pub expense: expenses::Model,
    /// Budget lines whose actual amount was recomputed.
    pub reconciled_lines: Vec<budgeting_expenses::Model>,
}

/// Expense repository.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets an expense by ID.
    pub async fn get(&self, id: i32) -> Result<expenses::Model, ExpenseError> {
        expenses::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ExpenseError::NotFound(id))
    }

    /// Lists expenses with their category, oldest id first.
    pub async fn list(&self, limit: u64) -> Result<Vec<ExpenseWithCategory>, ExpenseError> {
        let limit = check_list_limit(limit)?;
        let rows = expenses::Entity::find()
            .find_also_related(categories::Entity)
            .order_by_asc(expenses::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(with_category).collect())
    }

    /// Lists expenses dated within a calendar year.
    pub async fn list_for_year(
        &self,
        year: i32,
    ) -> Result<Vec<ExpenseWithCategory>, ExpenseError> {
        let (start, end) = year_bounds(year);
        self.list_between(start, end).await
    }

    /// Lists expenses dated within a budget period.
    pub async fn list_for_period(
        &self,
        period: BudgetPeriod,
    ) -> Result<Vec<ExpenseWithCategory>, ExpenseError> {
        self.list_between(period.first_day(), period.next_month_start())
            .await
    }

    async fn list_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExpenseWithCategory>, ExpenseError> {
        let rows = expenses::Entity::find()
            .filter(expenses::Column::Date.gte(start))
            .filter(expenses::Column::Date.lt(end))
            .find_also_related(categories::Entity)
            .order_by_asc(expenses::Column::Date)
            .order_by_asc(expenses::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(with_category).collect())
    }

    /// Creates an expense and adds its amount to the matching budget line.
    pub async fn create(&self, input: CreateExpenseInput) -> Result<ExpenseWrite, ExpenseError> {
        let name = validate_name(&input.name)?;

        let txn = self.db.begin().await?;

        ensure_category(&txn, input.category_id).await?;

        let expense = expenses::ActiveModel {
            name: Set(name),
            amount: Set(input.amount),
            date: Set(input.date),
            category_id: Set(input.category_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let change = ExpenseChange::Created {
            slot: LineSlot::for_expense(expense.date, expense.category_id),
            amount: expense.amount,
        };
        let reconciled_lines = BudgetReconciler::apply(&txn, &change).await?;

        txn.commit().await?;

        info!(
            expense_id = expense.id,
            category_id = expense.category_id,
            date = %expense.date,
            reconciled = reconciled_lines.len(),
            "Expense created"
        );

        Ok(ExpenseWrite {
            expense,
            reconciled_lines,
        })
    }

    /// Updates an expense and re-sums the lines it left and landed in.
    pub async fn update(
        &self,
        id: i32,
        input: UpdateExpenseInput,
    ) -> Result<ExpenseWrite, ExpenseError> {
        let name = input.name.as_deref().map(validate_name).transpose()?;

        let txn = self.db.begin().await?;

        let existing = expenses::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ExpenseError::NotFound(id))?;

        if let Some(category_id) = input.category_id {
            ensure_category(&txn, category_id).await?;
        }

        let before = LineSlot::for_expense(existing.date, existing.category_id);

        let mut active = existing.into_active_model();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(amount) = input.amount {
            active.amount = Set(amount);
        }
        if let Some(date) = input.date {
            active.date = Set(date);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }
        let expense = active.update(&txn).await?;

        let after = LineSlot::for_expense(expense.date, expense.category_id);
        let reconciled_lines =
            BudgetReconciler::apply(&txn, &ExpenseChange::Updated { before, after }).await?;

        txn.commit().await?;

        info!(
            expense_id = expense.id,
            reconciled = reconciled_lines.len(),
            "Expense updated"
        );

        Ok(ExpenseWrite {
            expense,
            reconciled_lines,
        })
    }

    /// Deletes an expense and re-sums the line it belonged to.
    pub async fn delete(&self, id: i32) -> Result<ExpenseWrite, ExpenseError> {
        let txn = self.db.begin().await?;

        let expense = expenses::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ExpenseError::NotFound(id))?;

        let slot = LineSlot::for_expense(expense.date, expense.category_id);
        expense.clone().delete(&txn).await?;

        let reconciled_lines =
            BudgetReconciler::apply(&txn, &ExpenseChange::Deleted { slot }).await?;

        txn.commit().await?;

        info!(
            expense_id = id,
            reconciled = reconciled_lines.len(),
            "Expense deleted"
        );

        Ok(ExpenseWrite {
            expense,
            reconciled_lines,
        })
    }
}

fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::Blank("name"));
    }
    Ok(name.to_string())
}

async fn ensure_category<C>(conn: &C, category_id: i32) -> Result<(), ExpenseError>
where
    C: ConnectionTrait,
{
    categories::Entity::find_by_id(category_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or(ExpenseError::CategoryNotFound(category_id))
}

fn with_category(
    (expense, category): (expenses::Model, Option<categories::Model>),
) -> ExpenseWithCategory {
    ExpenseWithCategory {
        id: expense.id,
        name: expense.name,
        amount: expense.amount,
        date: expense.date,
        category_id: expense.category_id,
        category_title: category.map(|c| c.title).unwrap_or_default(),
    }
}
