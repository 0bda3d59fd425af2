//! Budget line reconciliation.
//!
//! Keeps `budgeting_expenses.actual_amount` in step with the expenses of
//! the line's month and category. Callers run it on the same transaction
//! as the expense mutation so both commit or roll back together.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QuerySelect, Set,
};
use tracing::debug;

use pocketbook_core::budget::{ExpenseChange, LineSlot, ReconcileStep, ReconcileStrategy};
use pocketbook_core::{BudgetPeriod, ValidationError};

use crate::entities::{budgeting_expenses, budgets, expenses};

/// Failure while reconciling a budget line.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The new actual amount does not fit a decimal.
    #[error(transparent)]
    Amount(#[from] ValidationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Applies reconciliation plans to storage.
///
/// Missing budgets or lines make a step a no-op; the reconciler never
/// creates lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetReconciler;

impl BudgetReconciler {
    /// Reconciles the lines affected by an expense change.
    ///
    /// Returns the lines that were updated.
    pub async fn apply<C>(
        conn: &C,
        change: &ExpenseChange,
    ) -> Result<Vec<budgeting_expenses::Model>, ReconcileError>
    where
        C: ConnectionTrait,
    {
        Self::apply_steps(conn, &change.plan()).await
    }

    /// Executes reconciliation steps in order.
    pub async fn apply_steps<C>(
        conn: &C,
        steps: &[ReconcileStep],
    ) -> Result<Vec<budgeting_expenses::Model>, ReconcileError>
    where
        C: ConnectionTrait,
    {
        let mut touched = Vec::with_capacity(steps.len());
        for step in steps {
            if let Some(line) = Self::apply_step(conn, step).await? {
                touched.push(line);
            }
        }
        Ok(touched)
    }

    async fn apply_step<C>(
        conn: &C,
        step: &ReconcileStep,
    ) -> Result<Option<budgeting_expenses::Model>, ReconcileError>
    where
        C: ConnectionTrait,
    {
        let Some(line) = Self::find_line(conn, step.slot).await? else {
            debug!(
                period = %step.slot.period,
                category_id = step.slot.category_id,
                "No budget line to reconcile"
            );
            return Ok(None);
        };

        let resummed = match step.strategy {
            ReconcileStrategy::Resum => {
                Some(Self::expense_total(conn, step.slot.period, step.slot.category_id).await?)
            }
            ReconcileStrategy::Increment(_) => None,
        };
        let actual = step.strategy.next_actual(line.actual_amount, resummed)?;

        let line_id = line.id;
        let mut active = line.into_active_model();
        active.actual_amount = Set(actual);
        let updated = active.update(conn).await?;

        debug!(
            line_id,
            period = %step.slot.period,
            category_id = step.slot.category_id,
            actual_amount = %updated.actual_amount,
            "Budget line reconciled"
        );
        Ok(Some(updated))
    }

    /// Finds the budget for a period.
    pub async fn find_budget<C>(
        conn: &C,
        period: BudgetPeriod,
    ) -> Result<Option<budgets::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        budgets::Entity::find()
            .filter(budgets::Column::Year.eq(period.year()))
            .filter(budgets::Column::Month.eq(period.month_i32()))
            .one(conn)
            .await
    }

    /// Finds the line for a slot, locking it for the rest of the transaction
    /// where the backend supports row locks.
    pub async fn find_line<C>(
        conn: &C,
        slot: LineSlot,
    ) -> Result<Option<budgeting_expenses::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        let Some(budget) = Self::find_budget(conn, slot.period).await? else {
            return Ok(None);
        };

        budgeting_expenses::Entity::find()
            .filter(budgeting_expenses::Column::BudgetId.eq(budget.id))
            .filter(budgeting_expenses::Column::CategoryId.eq(slot.category_id))
            .lock_exclusive()
            .one(conn)
            .await
    }

    /// Sum of expense amounts for a category within a period; 0 when none.
    ///
    /// A sum the driver cannot decode as a decimal is out of range.
    pub async fn expense_total<C>(
        conn: &C,
        period: BudgetPeriod,
        category_id: i32,
    ) -> Result<Decimal, ReconcileError>
    where
        C: ConnectionTrait,
    {
        let total: Option<Option<Decimal>> = expenses::Entity::find()
            .filter(expenses::Column::CategoryId.eq(category_id))
            .filter(expenses::Column::Date.gte(period.first_day()))
            .filter(expenses::Column::Date.lt(period.next_month_start()))
            .select_only()
            .column_as(expenses::Column::Amount.sum(), "total")
            .into_tuple()
            .one(conn)
            .await
            .map_err(|err| match err {
                DbErr::TryIntoErr { .. } => {
                    ReconcileError::Amount(ValidationError::AmountOutOfRange)
                }
                other => ReconcileError::Database(other),
            })?;

        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }
}
