//! Demo data seeder for Pocketbook development.
//!
//! Seeds a few categories, a budget for the current month with one line per
//! category, and expenses. Everything goes through the repositories so the
//! budget lines end up reconciled. Safe to run more than once.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

use pocketbook_core::BudgetPeriod;
use pocketbook_db::repositories::{
    BudgetError, BudgetLineInput, CategoryError, CreateCategoryInput, CreateExpenseInput,
};
use pocketbook_db::{
    BudgetRepository, CategoryRepository, ExpenseRepository, LedgerSentinels, connect,
};
use pocketbook_shared::AppConfig;

/// (title, color, budget type title, planned amount)
const CATEGORIES: [(&str, &str, &str, Decimal); 4] = [
    ("Rent", "#3f51b5", "Fixed", dec!(950)),
    ("Groceries", "#4caf50", "Variable", dec!(300)),
    ("Going out", "#ff9800", "Variable", dec!(120)),
    ("Salary", "#009688", "Income", dec!(2400)),
];

/// (name, amount, day of month, category title)
const EXPENSES: [(&str, Decimal, u32, &str); 6] = [
    ("Monthly rent", dec!(950), 1, "Rent"),
    ("Weekly shop", dec!(64.5), 3, "Groceries"),
    ("Farmers market", dec!(22), 9, "Groceries"),
    ("Cinema", dec!(18), 11, "Going out"),
    ("Payslip", dec!(2400), 25, "Salary"),
    ("Corner shop", dec!(7.25), 27, "Other"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pocketbook=info".into()),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    let sentinels = LedgerSentinels::resolve(&db, &config.ledger)
        .await
        .context("Database is not migrated")?;

    let categories = CategoryRepository::new(db.clone());
    let budgets = BudgetRepository::new(db.clone());
    let expenses = ExpenseRepository::new(db.clone());

    let today = Utc::now().date_naive();
    let period = BudgetPeriod::of(today);

    let budget_types = budgets.list_budget_types().await?;
    let type_id = |title: &str| {
        budget_types
            .iter()
            .find(|t| t.title == title)
            .map(|t| t.id)
            .with_context(|| format!("Budget type {title} missing"))
    };

    info!("Seeding categories...");
    let mut category_ids = Vec::new();
    for (title, color, type_title, _) in CATEGORIES {
        let id = match categories
            .create(CreateCategoryInput {
                title: title.to_string(),
                color: Some(color.to_string()),
                budget_type_id: Some(type_id(type_title)?),
                ..Default::default()
            })
            .await
        {
            Ok(category) => category.id,
            Err(CategoryError::DuplicateTitle { id, .. }) => {
                info!(title, "Category already exists, skipping");
                id
            }
            Err(e) => return Err(e.into()),
        };
        category_ids.push((title, id));
    }
    if let Some(other) = sentinels.catch_all_category_id {
        category_ids.push(("Other", other));
    }

    info!(period = %period, "Seeding budget...");
    match budgets.create_budget(period, dec!(500)).await {
        Ok(_) => {
            for ((_, id), (_, _, type_title, planned)) in category_ids.iter().zip(CATEGORIES) {
                budgets
                    .upsert_line(
                        period,
                        BudgetLineInput {
                            category_id: *id,
                            budget_type_id: type_id(type_title)?,
                            planned_amount: planned,
                        },
                    )
                    .await?;
            }
        }
        Err(BudgetError::AlreadyExists(_)) => {
            info!(period = %period, "Budget already exists, skipping lines and expenses");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    info!("Seeding expenses...");
    for (name, amount, day, category) in EXPENSES {
        let Some(&(_, category_id)) = category_ids.iter().find(|(title, _)| *title == category)
        else {
            continue;
        };
        let date = NaiveDate::from_ymd_opt(today.year(), today.month(), day)
            .unwrap_or(period.first_day());

        expenses
            .create(CreateExpenseInput {
                name: name.to_string(),
                amount,
                date,
                category_id,
            })
            .await?;
    }

    let totals = budgets
        .totals(period, sentinels.income_budget_type_id)
        .await?;
    info!(
        planned = %totals.planned,
        actual = %totals.actual,
        "Seeding complete"
    );

    Ok(())
}
