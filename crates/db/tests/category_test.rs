//! Integration tests for category rules and the delete cascade.

mod common;

use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use common::{
    FIXED, INCOME, OTHER, VARIABLE, actual_of, budget_with_line, category, date, expense, period,
    setup,
};
use pocketbook_db::entities::{budgeting_expenses, categories, expenses};
use pocketbook_db::repositories::{
    CategoryError, CategoryRepository, CreateCategoryInput, UpdateCategoryInput,
};

async fn expense_count(db: &sea_orm::DatabaseConnection, category_id: i32) -> u64 {
    expenses::Entity::find()
        .filter(expenses::Column::CategoryId.eq(category_id))
        .count(db)
        .await
        .expect("count failed")
}

// ============================================================================
// Create / update
// ============================================================================
#[tokio::test]
async fn test_create_defaults() {
    let db = setup().await;

    let created = CategoryRepository::new(db.clone())
        .create(CreateCategoryInput {
            title: "  Travel ".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(created.title, "Travel");
    assert!(created.removable);
    assert!(created.editable);
    assert_eq!(created.color, "#9e9e9e");
    assert_eq!(created.budget_type_id, None);
}

#[tokio::test]
async fn test_create_rejects_duplicate_title() {
    let db = setup().await;
    let id = category(&db, "Travel").await;

    let err = CategoryRepository::new(db.clone())
        .create(CreateCategoryInput {
            title: "Travel".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        format!("Category with title Travel exists with id {id}")
    );
}

#[tokio::test]
async fn test_create_rejects_bad_color_and_unknown_type() {
    let db = setup().await;
    let repo = CategoryRepository::new(db.clone());

    let bad_color = repo
        .create(CreateCategoryInput {
            title: "Travel".to_string(),
            color: Some("#zzzzzz".to_string()),
            ..Default::default()
        })
        .await;
    assert!(matches!(bad_color, Err(CategoryError::Validation(_))));

    let bad_type = repo
        .create(CreateCategoryInput {
            title: "Travel".to_string(),
            budget_type_id: Some(99),
            ..Default::default()
        })
        .await;
    assert!(matches!(bad_type, Err(CategoryError::BudgetTypeNotFound(99))));
}

#[tokio::test]
async fn test_update_color_and_type() {
    let db = setup().await;
    let id = category(&db, "Travel").await;

    let updated = CategoryRepository::new(db.clone())
        .update(
            id,
            UpdateCategoryInput {
                color: Some("rgb(10, 20, 30)".to_string()),
                budget_type_id: Some(VARIABLE),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Travel");
    assert_eq!(updated.color, "rgb(10, 20, 30)");
    assert_eq!(updated.budget_type_id, Some(VARIABLE));
}

#[tokio::test]
async fn test_update_rejects_non_editable_and_duplicate_title() {
    let db = setup().await;
    let repo = CategoryRepository::new(db.clone());
    let travel = category(&db, "Travel").await;

    let locked = repo
        .update(
            OTHER,
            UpdateCategoryInput {
                color: Some("#000".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(locked, Err(CategoryError::NotEditable(OTHER))));

    let dup = repo
        .update(
            travel,
            UpdateCategoryInput {
                title: Some("Other".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(dup, Err(CategoryError::DuplicateTitle { id: OTHER, .. })));

    let same = repo
        .update(
            travel,
            UpdateCategoryInput {
                title: Some("Travel".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(same.is_ok());
}

#[tokio::test]
async fn test_list_filters_by_type_and_limit() {
    let db = setup().await;
    let repo = CategoryRepository::new(db.clone());
    for (title, type_id) in [("Rent", FIXED), ("Food", VARIABLE), ("Salary", INCOME)] {
        repo.create(CreateCategoryInput {
            title: title.to_string(),
            budget_type_id: Some(type_id),
            ..Default::default()
        })
        .await
        .unwrap();
    }

    assert_eq!(repo.list(50, None).await.unwrap().len(), 4);
    assert_eq!(repo.list(2, None).await.unwrap().len(), 2);

    let income = repo.list(50, Some(INCOME)).await.unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].title, "Salary");
}

// ============================================================================
// Delete cascade
// ============================================================================
#[tokio::test]
async fn test_delete_non_removable_leaves_everything() {
    let db = setup().await;
    let rent = CategoryRepository::new(db.clone())
        .create(CreateCategoryInput {
            title: "Rent".to_string(),
            removable: Some(false),
            ..Default::default()
        })
        .await
        .unwrap()
        .id;
    expense(&db, rent, dec!(900), date(2024, 3, 1)).await;
    expense(&db, rent, dec!(900), date(2024, 4, 1)).await;

    let result = CategoryRepository::new(db.clone())
        .delete(rent, Some(OTHER))
        .await;

    assert!(matches!(result, Err(CategoryError::NotRemovable(id)) if id == rent));
    assert!(CategoryRepository::new(db.clone()).get(rent).await.is_ok());
    assert_eq!(expense_count(&db, rent).await, 2);
}

#[tokio::test]
async fn test_delete_moves_expenses_to_catch_all_and_drops_lines() {
    let db = setup().await;
    let fun = category(&db, "Fun").await;
    let at = period("2024", "03");
    budget_with_line(&db, at, fun, VARIABLE, dec!(100)).await;
    let other_line = budget_with_line(&db, at, OTHER, VARIABLE, dec!(50)).await;

    expense(&db, fun, dec!(10), date(2024, 3, 1)).await;
    expense(&db, fun, dec!(15), date(2024, 3, 2)).await;
    expense(&db, fun, dec!(20), date(2024, 5, 2)).await;

    let deletion = CategoryRepository::new(db.clone())
        .delete(fun, Some(OTHER))
        .await
        .expect("delete should succeed");

    assert_eq!(deletion.reassigned_expenses, 3);
    assert_eq!(deletion.removed_budget_lines, 1);
    assert_eq!(expense_count(&db, OTHER).await, 3);
    assert_eq!(expense_count(&db, fun).await, 0);
    assert!(
        categories::Entity::find_by_id(fun)
            .one(&db)
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(
        budgeting_expenses::Entity::find()
            .filter(budgeting_expenses::Column::CategoryId.eq(fun))
            .count(&db)
            .await
            .unwrap(),
        0
    );
    // The catch-all line now carries the March expenses it received.
    assert_eq!(actual_of(&db, other_line).await, dec!(25));
}

#[tokio::test]
async fn test_delete_catch_all_itself_is_rejected() {
    let db = setup().await;

    let result = CategoryRepository::new(db.clone())
        .delete(OTHER, Some(OTHER))
        .await;

    assert!(matches!(result, Err(CategoryError::NotRemovable(OTHER))));
}

#[tokio::test]
async fn test_delete_without_catch_all_aborts() {
    let db = setup().await;
    let fun = category(&db, "Fun").await;
    expense(&db, fun, dec!(10), date(2024, 3, 1)).await;

    let missing = CategoryRepository::new(db.clone()).delete(fun, None).await;
    assert!(matches!(missing, Err(CategoryError::CatchAllMissing)));

    let dangling = CategoryRepository::new(db.clone())
        .delete(fun, Some(999))
        .await;
    assert!(matches!(dangling, Err(CategoryError::CatchAllMissing)));

    assert_eq!(expense_count(&db, fun).await, 1);
    assert!(CategoryRepository::new(db.clone()).get(fun).await.is_ok());
}
