//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod budget;
pub mod category;
pub mod expense;
pub mod reconcile;

pub use budget::{BudgetError, BudgetLineInput, BudgetLineView, BudgetRepository, LineUpsert};
pub use category::{
    CategoryDeletion, CategoryError, CategoryRepository, CreateCategoryInput, UpdateCategoryInput,
};
pub use expense::{
    CreateExpenseInput, ExpenseError, ExpenseRepository, ExpenseWithCategory, ExpenseWrite,
    UpdateExpenseInput,
};
pub use reconcile::{BudgetReconciler, ReconcileError};
