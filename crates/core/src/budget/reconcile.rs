//! Reconciliation planning for budget line actual amounts.
//!
//! An expense mutation is translated into the budget line slots whose
//! `actual_amount` must change and how. Executing the plan against storage
//! is the database layer's job.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::period::BudgetPeriod;

/// The budget line an expense counts towards: its month and its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineSlot {
    /// Month of the expense date.
    pub period: BudgetPeriod,
    /// Category of the expense.
    pub category_id: i32,
}

impl LineSlot {
    /// Slot for an expense dated `date` in `category_id`.
    #[must_use]
    pub fn for_expense(date: NaiveDate, category_id: i32) -> Self {
        Self {
            period: BudgetPeriod::of(date),
            category_id,
        }
    }
}

/// How a line's actual amount is brought up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStrategy {
    /// Add the amount to the stored actual.
    Increment(Decimal),
    /// Replace the stored actual with the sum of the slot's expenses.
    Resum,
}

impl ReconcileStrategy {
    /// New actual amount. `resummed` is the slot's expense total and is only
    /// consulted for [`ReconcileStrategy::Resum`]; a missing total counts as 0.
    ///
    /// # Errors
    ///
    /// [`ValidationError::AmountOutOfRange`] when an increment overflows.
    pub fn next_actual(
        self,
        current: Decimal,
        resummed: Option<Decimal>,
    ) -> Result<Decimal, ValidationError> {
        match self {
            Self::Increment(amount) => current
                .checked_add(amount)
                .ok_or(ValidationError::AmountOutOfRange),
            Self::Resum => Ok(resummed.unwrap_or(Decimal::ZERO)),
        }
    }
}

/// One line to reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStep {
    /// Target slot.
    pub slot: LineSlot,
    /// Update rule.
    pub strategy: ReconcileStrategy,
}

/// An expense mutation that has been (or is about to be) applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseChange {
    /// A new expense.
    Created {
        /// Where it landed.
        slot: LineSlot,
        /// Its amount.
        amount: Decimal,
    },
    /// An existing expense was edited.
    Updated {
        /// Slot before the edit.
        before: LineSlot,
        /// Slot after the edit.
        after: LineSlot,
    },
    /// An expense was removed.
    Deleted {
        /// Slot it was removed from.
        slot: LineSlot,
    },
}

impl ExpenseChange {
    /// Lines to reconcile, in execution order.
    ///
    /// Creates increment, edits and deletes re-sum. An edit that moves the
    /// expense to another month or category re-sums both slots.
    #[must_use]
    pub fn plan(&self) -> Vec<ReconcileStep> {
        match *self {
            Self::Created { slot, amount } => vec![ReconcileStep {
                slot,
                strategy: ReconcileStrategy::Increment(amount),
            }],
            Self::Updated { before, after } if before == after => vec![ReconcileStep {
                slot: after,
                strategy: ReconcileStrategy::Resum,
            }],
            Self::Updated { before, after } => vec![
                ReconcileStep {
                    slot: before,
                    strategy: ReconcileStrategy::Resum,
                },
                ReconcileStep {
                    slot: after,
                    strategy: ReconcileStrategy::Resum,
                },
            ],
            Self::Deleted { slot } => vec![ReconcileStep {
                slot,
                strategy: ReconcileStrategy::Resum,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn slot(y: i32, m: u32, d: u32, category_id: i32) -> LineSlot {
        LineSlot::for_expense(NaiveDate::from_ymd_opt(y, m, d).unwrap(), category_id)
    }

    #[test]
    fn test_create_increments() {
        let change = ExpenseChange::Created {
            slot: slot(2024, 3, 15, 7),
            amount: dec!(25),
        };
        let plan = change.plan();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].strategy, ReconcileStrategy::Increment(dec!(25)));
        assert_eq!(plan[0].slot.period.to_string(), "2024-03");
        assert_eq!(plan[0].strategy.next_actual(dec!(10), None), Ok(dec!(35)));
    }

    #[test]
    fn test_update_within_slot_resums_once() {
        let change = ExpenseChange::Updated {
            before: slot(2024, 3, 1, 7),
            after: slot(2024, 3, 28, 7),
        };
        let plan = change.plan();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].strategy, ReconcileStrategy::Resum);
    }

    #[test]
    fn test_update_across_slots_resums_both() {
        let before = slot(2024, 3, 31, 7);
        let after = slot(2024, 4, 1, 9);
        let plan = ExpenseChange::Updated { before, after }.plan();
        assert_eq!(
            plan.iter().map(|s| s.slot).collect::<Vec<_>>(),
            vec![before, after]
        );
        assert!(plan.iter().all(|s| s.strategy == ReconcileStrategy::Resum));
    }

    #[test]
    fn test_delete_resums_and_null_sum_is_zero() {
        let plan = ExpenseChange::Deleted {
            slot: slot(2024, 3, 15, 7),
        }
        .plan();
        assert_eq!(plan[0].strategy, ReconcileStrategy::Resum);
        assert_eq!(plan[0].strategy.next_actual(dec!(99), None), Ok(Decimal::ZERO));
        assert_eq!(
            plan[0].strategy.next_actual(dec!(99), Some(dec!(12.5))),
            Ok(dec!(12.5))
        );
    }

    #[test]
    fn test_increment_overflow_is_rejected() {
        let near_max = dec!(50000000000000000000000000000);
        assert_eq!(
            ReconcileStrategy::Increment(near_max).next_actual(near_max, None),
            Err(ValidationError::AmountOutOfRange)
        );
        assert_eq!(
            ReconcileStrategy::Increment(Decimal::MIN).next_actual(dec!(-1), None),
            Err(ValidationError::AmountOutOfRange)
        );
    }
}
