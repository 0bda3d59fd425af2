//! Budget line reconciliation and monthly aggregation.

pub mod aggregate;
pub mod reconcile;


pub use aggregate::{
    ACTUAL_INCOME_POLICY, BudgetAggregator, IncomeNetting, LineAmounts, NetTotals,
    PLANNED_INCOME_POLICY,
};
pub use reconcile::{ExpenseChange, LineSlot, ReconcileStep, ReconcileStrategy};
