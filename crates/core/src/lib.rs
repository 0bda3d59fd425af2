//! Core business rules for Pocketbook.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//!
//! # Modules
//!
//! - `period` - Budget periods and expense date normalization
//! - `category` - Category color and title rules
//! - `budget` - Reconciliation planning and planned/actual aggregation

pub mod budget;
pub mod category;
pub mod error;
pub mod period;

pub use error::{MAX_LIST_LIMIT, ValidationError, check_list_limit};
pub use period::BudgetPeriod;
