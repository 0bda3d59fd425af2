//! Shared setup for database integration tests.
//!
//! Each test gets a private in-memory SQLite database migrated with the real
//! migrator, so seeded rows are: budget types Fixed (1), Variable (2),
//! Income (3) and the catch-all category Other (1).

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;

use pocketbook_core::BudgetPeriod;
use pocketbook_db::migration::Migrator;
use pocketbook_db::repositories::{
    BudgetLineInput, BudgetRepository, CategoryRepository, CreateCategoryInput,
    CreateExpenseInput, ExpenseRepository,
};
use pocketbook_shared::DatabaseConfig;

pub const FIXED: i32 = 1;
pub const VARIABLE: i32 = 2;
pub const INCOME: i32 = 3;
pub const OTHER: i32 = 1;

pub async fn setup() -> DatabaseConnection {
    let db = pocketbook_db::connect(&DatabaseConfig::in_memory())
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    db
}

pub fn period(year: &str, month: &str) -> BudgetPeriod {
    BudgetPeriod::parse(year, month).expect("valid period")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub async fn category(db: &DatabaseConnection, title: &str) -> i32 {
    CategoryRepository::new(db.clone())
        .create(CreateCategoryInput {
            title: title.to_string(),
            ..Default::default()
        })
        .await
        .expect("Failed to create category")
        .id
}

pub async fn expense(
    db: &DatabaseConnection,
    category_id: i32,
    amount: Decimal,
    on: NaiveDate,
) -> i32 {
    ExpenseRepository::new(db.clone())
        .create(CreateExpenseInput {
            name: format!("expense {amount}"),
            amount,
            date: on,
            category_id,
        })
        .await
        .expect("Failed to create expense")
        .expense
        .id
}

pub async fn budget_with_line(
    db: &DatabaseConnection,
    at: BudgetPeriod,
    category_id: i32,
    budget_type_id: i32,
    planned: Decimal,
) -> i32 {
    let repo = BudgetRepository::new(db.clone());
    if repo.get_budget(at).await.is_err() {
        repo.create_budget(at, Decimal::ZERO)
            .await
            .expect("Failed to create budget");
    }
    repo.add_line(
        at,
        BudgetLineInput {
            category_id,
            budget_type_id,
            planned_amount: planned,
        },
    )
    .await
    .expect("Failed to add budget line")
    .id
}

pub async fn actual_of(db: &DatabaseConnection, line_id: i32) -> Decimal {
    use pocketbook_db::entities::budgeting_expenses;
    use sea_orm::EntityTrait;

    budgeting_expenses::Entity::find_by_id(line_id)
        .one(db)
        .await
        .expect("query failed")
        .expect("line missing")
        .actual_amount
}
