//! Planned/actual monthly totals with income netting.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ValidationError;

/// How income-type lines combine with expense-type lines in a total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomeNetting {
    /// `expenses - income`
    Subtract,
    /// `expenses + income`
    Add,
}

impl IncomeNetting {
    /// Combines the two partition sums; `None` on overflow.
    #[must_use]
    pub fn combine(self, expense_side: Decimal, income_side: Decimal) -> Option<Decimal> {
        match self {
            Self::Subtract => expense_side.checked_sub(income_side),
            Self::Add => expense_side.checked_add(income_side),
        }
    }
}

/// Rule for the planned total.
pub const PLANNED_INCOME_POLICY: IncomeNetting = IncomeNetting::Subtract;

/// Rule for the actual total. Kept symmetric with the planned rule so both
/// totals read as "net outflow for the month".
pub const ACTUAL_INCOME_POLICY: IncomeNetting = IncomeNetting::Subtract;

/// The amounts of one budget line that matter for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmounts {
    /// Budget type of the line.
    pub budget_type_id: i32,
    /// Planned amount.
    pub planned: Decimal,
    /// Actual amount.
    pub actual: Decimal,
}

/// Net totals for one budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetTotals {
    /// Net planned total.
    pub planned: Decimal,
    /// Net actual total.
    pub actual: Decimal,
}

/// Sums of one partition of lines.
#[derive(Debug, Clone, Copy, Default)]
struct PartitionSums {
    planned: Decimal,
    actual: Decimal,
}

impl PartitionSums {
    fn add(&mut self, line: &LineAmounts) -> Option<()> {
        self.planned = self.planned.checked_add(line.planned)?;
        self.actual = self.actual.checked_add(line.actual)?;
        Some(())
    }
}

/// Aggregates budget lines, netting out the designated income type.
#[derive(Debug, Clone, Copy)]
pub struct BudgetAggregator {
    income_type_id: i32,
    planned_policy: IncomeNetting,
    actual_policy: IncomeNetting,
}

impl BudgetAggregator {
    /// Aggregator using the crate-wide netting policies.
    #[must_use]
    pub const fn new(income_type_id: i32) -> Self {
        Self {
            income_type_id,
            planned_policy: PLANNED_INCOME_POLICY,
            actual_policy: ACTUAL_INCOME_POLICY,
        }
    }

    /// Whether a line of this type is income.
    #[must_use]
    pub const fn is_income(&self, budget_type_id: i32) -> bool {
        budget_type_id == self.income_type_id
    }

    /// Computes net planned and actual totals. An empty partition counts as 0.
    ///
    /// # Errors
    ///
    /// [`ValidationError::AmountOutOfRange`] when a sum overflows.
    pub fn totals<'a, I>(&self, lines: I) -> Result<NetTotals, ValidationError>
    where
        I: IntoIterator<Item = &'a LineAmounts>,
    {
        let (mut expense, mut income) = (PartitionSums::default(), PartitionSums::default());

        for line in lines {
            let side = if self.is_income(line.budget_type_id) {
                &mut income
            } else {
                &mut expense
            };
            side.add(line).ok_or(ValidationError::AmountOutOfRange)?;
        }

        let planned = self.planned_policy.combine(expense.planned, income.planned);
        let actual = self.actual_policy.combine(expense.actual, income.actual);
        match (planned, actual) {
            (Some(planned), Some(actual)) => Ok(NetTotals { planned, actual }),
            _ => Err(ValidationError::AmountOutOfRange),
        }
    }
}
