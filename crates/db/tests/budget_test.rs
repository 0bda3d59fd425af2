//! Integration tests for budgets, budget lines, totals and sentinels.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{
    FIXED, INCOME, OTHER, VARIABLE, actual_of, budget_with_line, category, date, expense, period,
    setup,
};
use pocketbook_core::ValidationError;
use pocketbook_db::repositories::{BudgetError, BudgetLineInput, BudgetRepository};
use pocketbook_db::{LedgerSentinels, SentinelError};
use pocketbook_shared::LedgerConfig;

fn line(category_id: i32, budget_type_id: i32, planned_amount: Decimal) -> BudgetLineInput {
    BudgetLineInput {
        category_id,
        budget_type_id,
        planned_amount,
    }
}

// ============================================================================
// Budgets
// ============================================================================
#[tokio::test]
async fn test_create_budget_once_per_period() {
    let db = setup().await;
    let repo = BudgetRepository::new(db.clone());
    let at = period("2024", "03");

    let budget = repo.create_budget(at, dec!(1500)).await.unwrap();
    assert_eq!(budget.year, 2024);
    assert_eq!(budget.month, 3);
    assert_eq!(repo.starting_balance(at).await.unwrap(), dec!(1500));

    let again = repo.create_budget(at, dec!(10)).await.unwrap_err();
    assert_eq!(again.to_string(), "Budget already exists");

    // Same month, different year is a different budget.
    assert!(repo.create_budget(period("2025", "3"), dec!(0)).await.is_ok());
}

#[tokio::test]
async fn test_missing_budget_reads() {
    let db = setup().await;
    let repo = BudgetRepository::new(db.clone());
    let at = period("2024", "07");

    for err in [
        repo.get_budget(at).await.unwrap_err(),
        repo.starting_balance(at).await.unwrap_err(),
        repo.planned_total(at, INCOME).await.unwrap_err(),
        repo.actual_total(at, INCOME).await.unwrap_err(),
        repo.lines_for_type(at, FIXED).await.unwrap_err(),
    ] {
        assert_eq!(err.to_string(), "Budget does not exist");
    }
}

#[tokio::test]
async fn test_list_budget_types_seeded() {
    let db = setup().await;

    let titles: Vec<String> = BudgetRepository::new(db.clone())
        .list_budget_types()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();

    assert_eq!(titles, ["Fixed", "Variable", "Income"]);
}

// ============================================================================
// Totals
// ============================================================================
#[tokio::test]
async fn test_totals_net_out_income() {
    let db = setup().await;
    let rent = category(&db, "Rent").await;
    let food = category(&db, "Food").await;
    let salary = category(&db, "Salary").await;
    let at = period("2024", "03");

    budget_with_line(&db, at, rent, FIXED, dec!(100)).await;
    budget_with_line(&db, at, food, VARIABLE, dec!(50)).await;
    budget_with_line(&db, at, salary, INCOME, dec!(30)).await;

    expense(&db, rent, dec!(40), date(2024, 3, 1)).await;
    expense(&db, food, dec!(10), date(2024, 3, 2)).await;
    expense(&db, salary, dec!(20), date(2024, 3, 25)).await;

    let repo = BudgetRepository::new(db.clone());
    assert_eq!(repo.planned_total(at, INCOME).await.unwrap(), dec!(120));
    assert_eq!(repo.actual_total(at, INCOME).await.unwrap(), dec!(30));
}

#[tokio::test]
async fn test_totals_of_empty_budget_are_zero() {
    let db = setup().await;
    let repo = BudgetRepository::new(db.clone());
    let at = period("2024", "01");
    repo.create_budget(at, dec!(0)).await.unwrap();

    let totals = repo.totals(at, INCOME).await.unwrap();
    assert_eq!(totals.planned, Decimal::ZERO);
    assert_eq!(totals.actual, Decimal::ZERO);
}

// ============================================================================
// Lines
// ============================================================================
#[tokio::test]
async fn test_add_line_seeds_actual_from_existing_expenses() {
    let db = setup().await;
    let food = category(&db, "Food").await;
    expense(&db, food, dec!(12.5), date(2024, 3, 1)).await;
    expense(&db, food, dec!(20), date(2024, 3, 31)).await;
    expense(&db, food, dec!(99), date(2024, 4, 1)).await;

    let id = budget_with_line(&db, period("2024", "03"), food, VARIABLE, dec!(80)).await;

    assert_eq!(actual_of(&db, id).await, dec!(32.5));
}

#[tokio::test]
async fn test_add_line_rejects_seed_past_decimal_range() {
    let db = setup().await;
    let savings = category(&db, "Savings").await;
    let near_max = dec!(50000000000000000000000000000);
    expense(&db, savings, near_max, date(2024, 3, 1)).await;
    expense(&db, savings, near_max, date(2024, 3, 2)).await;

    let repo = BudgetRepository::new(db.clone());
    let at = period("2024", "03");
    repo.create_budget(at, Decimal::ZERO).await.unwrap();

    let err = repo
        .add_line(at, line(savings, VARIABLE, dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BudgetError::Validation(ValidationError::AmountOutOfRange)
    ));
    assert!(repo.lines_for_type(at, VARIABLE).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_line_rejects_duplicates_and_unknown_refs() {
    let db = setup().await;
    let food = category(&db, "Food").await;
    let at = period("2024", "03");
    budget_with_line(&db, at, food, VARIABLE, dec!(80)).await;
    let repo = BudgetRepository::new(db.clone());

    let dup = repo.add_line(at, line(food, FIXED, dec!(1))).await;
    assert!(matches!(dup, Err(BudgetError::DuplicateLine(id)) if id == food));

    let no_category = repo.add_line(at, line(999, FIXED, dec!(1))).await;
    assert!(matches!(no_category, Err(BudgetError::CategoryNotFound(999))));

    let no_type = repo.add_line(at, line(OTHER, 42, dec!(1))).await;
    assert!(matches!(no_type, Err(BudgetError::BudgetTypeNotFound(42))));

    let no_budget = repo
        .add_line(period("2030", "01"), line(food, FIXED, dec!(1)))
        .await;
    assert!(matches!(no_budget, Err(BudgetError::NotFound(_))));
}

#[tokio::test]
async fn test_upsert_creates_then_updates() {
    let db = setup().await;
    let food = category(&db, "Food").await;
    let at = period("2024", "03");
    let repo = BudgetRepository::new(db.clone());
    repo.create_budget(at, dec!(0)).await.unwrap();
    expense(&db, food, dec!(10), date(2024, 3, 5)).await;

    let first = repo
        .upsert_line(at, line(food, VARIABLE, dec!(80)))
        .await
        .unwrap();
    assert!(first.created);
    assert_eq!(first.line.planned_amount, dec!(80));
    assert_eq!(first.line.actual_amount, dec!(10));

    let second = repo
        .upsert_line(at, line(food, FIXED, dec!(120)))
        .await
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.line.id, first.line.id);
    assert_eq!(second.line.planned_amount, dec!(120));
    assert_eq!(second.line.budget_type_id, FIXED);
    assert_eq!(second.line.actual_amount, dec!(10));
}

#[tokio::test]
async fn test_lines_for_type_joins_category() {
    let db = setup().await;
    let rent = category(&db, "Rent").await;
    let food = category(&db, "Food").await;
    let at = period("2024", "03");
    budget_with_line(&db, at, rent, FIXED, dec!(900)).await;
    budget_with_line(&db, at, food, VARIABLE, dec!(80)).await;

    let repo = BudgetRepository::new(db.clone());
    let fixed = repo.lines_for_type(at, FIXED).await.unwrap();
    assert_eq!(fixed.len(), 1);
    assert_eq!(fixed[0].category_id, rent);
    assert_eq!(fixed[0].category_title, "Rent");
    assert_eq!(fixed[0].category_color, "#9e9e9e");

    assert!(repo.lines_for_type(at, INCOME).await.unwrap().is_empty());
    assert!(matches!(
        repo.lines_for_type(at, 42).await,
        Err(BudgetError::BudgetTypeNotFound(42))
    ));
}

#[tokio::test]
async fn test_delete_line_rules() {
    let db = setup().await;
    let food = category(&db, "Food").await;
    let at = period("2024", "03");
    budget_with_line(&db, at, food, VARIABLE, dec!(80)).await;
    budget_with_line(&db, at, OTHER, VARIABLE, dec!(10)).await;
    let repo = BudgetRepository::new(db.clone());

    let locked = repo.delete_line(at, OTHER).await;
    assert!(matches!(locked, Err(BudgetError::CategoryNotRemovable(OTHER))));

    repo.delete_line(at, food).await.unwrap();
    assert_eq!(repo.lines_for_type(at, VARIABLE).await.unwrap().len(), 1);

    let gone = repo.delete_line(at, food).await;
    assert!(matches!(gone, Err(BudgetError::LineNotFound(id)) if id == food));
}

// ============================================================================
// Sentinels
// ============================================================================
#[tokio::test]
async fn test_sentinels_resolve_seeded_rows() {
    let db = setup().await;

    let sentinels = LedgerSentinels::resolve(&db, &LedgerConfig::default())
        .await
        .unwrap();

    assert_eq!(sentinels.income_budget_type_id, INCOME);
    assert_eq!(sentinels.catch_all_category_id, Some(OTHER));
}

#[tokio::test]
async fn test_sentinels_missing_rows() {
    let db = setup().await;

    let no_income = LedgerSentinels::resolve(
        &db,
        &LedgerConfig {
            income_budget_type: "Salary".to_string(),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(no_income, Err(SentinelError::IncomeTypeMissing(t)) if t == "Salary"));

    let no_catch_all = LedgerSentinels::resolve(
        &db,
        &LedgerConfig {
            catch_all_category: "Misc".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(no_catch_all.catch_all_category_id, None);
}
