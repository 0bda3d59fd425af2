//! `SeaORM` entity definitions, one module per table.

pub mod budget_types;
pub mod budgeting_expenses;
pub mod budgets;
pub mod categories;
pub mod expenses;

pub mod prelude {
    //! Entity aliases.

    pub use super::budget_types::Entity as BudgetTypes;
    pub use super::budgeting_expenses::Entity as BudgetingExpenses;
    pub use super::budgets::Entity as Budgets;
    pub use super::categories::Entity as Categories;
    pub use super::expenses::Entity as Expenses;
}
