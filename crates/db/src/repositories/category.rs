//! Category repository, including the delete cascade.

use std::collections::BTreeSet;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::Expr,
};
use tracing::info;

use pocketbook_core::budget::{LineSlot, ReconcileStep, ReconcileStrategy};
use pocketbook_core::category::{DEFAULT_CATEGORY_COLOR, normalize_title, validate_color};
use pocketbook_core::{BudgetPeriod, ValidationError, check_list_limit};
use pocketbook_shared::AppError;

use super::reconcile::{BudgetReconciler, ReconcileError};
use crate::entities::{budget_types, budgeting_expenses, categories, expenses};

/// Error types for category operations.
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    /// Category not found.
    #[error("Category with id {0} does not exist")]
    NotFound(i32),

    /// Title already taken.
    #[error("Category with title {title} exists with id {id}")]
    DuplicateTitle {
        /// Requested title.
        title: String,
        /// ID of the category holding it.
        id: i32,
    },

    /// Referenced budget type not found.
    #[error("Budget type with id {0} does not exist")]
    BudgetTypeNotFound(i32),

    /// Category is locked against edits.
    #[error("Category with id {0} is not editable")]
    NotEditable(i32),

    /// Category is locked against deletion.
    #[error("Category with id {0} cannot be removed")]
    NotRemovable(i32),

    /// No catch-all category to receive reassigned expenses.
    #[error("Catch-all category does not exist")]
    CatchAllMissing,

    /// Invalid input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ReconcileError> for CategoryError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::Amount(e) => Self::Validation(e),
            ReconcileError::Database(e) => Self::Database(e),
        }
    }
}

impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::NotFound(_) | CategoryError::BudgetTypeNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            CategoryError::DuplicateTitle { .. } => Self::Conflict(err.to_string()),
            CategoryError::NotEditable(_)
            | CategoryError::NotRemovable(_)
            | CategoryError::CatchAllMissing => Self::Rejected(err.to_string()),
            CategoryError::Validation(e) => e.into(),
            CategoryError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a category.
#[derive(Debug, Clone, Default)]
pub struct CreateCategoryInput {
    /// Unique title.
    pub title: String,
    /// CSS-like color; defaults to [`DEFAULT_CATEGORY_COLOR`].
    pub color: Option<String>,
    /// Defaults to `true`.
    pub removable: Option<bool>,
    /// Defaults to `true`.
    pub editable: Option<bool>,
    /// Optional budget type.
    pub budget_type_id: Option<i32>,
}

/// Input for updating a category. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    /// New title.
    pub title: Option<String>,
    /// New color.
    pub color: Option<String>,
    /// New budget type.
    pub budget_type_id: Option<i32>,
}

/// Outcome of a category delete.
#[derive(Debug, Clone)]
pub struct CategoryDeletion {
    /// The removed category.
    pub category: categories::Model,
    /// Expenses moved to the catch-all category.
    pub reassigned_expenses: u64,
    /// Budget lines removed with the category.
    pub removed_budget_lines: u64,
}

/// Category repository.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists categories, optionally only those of one budget type.
    pub async fn list(
        &self,
        limit: u64,
        budget_type_id: Option<i32>,
    ) -> Result<Vec<categories::Model>, CategoryError> {
        let limit = check_list_limit(limit)?;
        let mut query = categories::Entity::find();
        if let Some(type_id) = budget_type_id {
            query = query.filter(categories::Column::BudgetTypeId.eq(type_id));
        }

        Ok(query
            .order_by_asc(categories::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    /// Gets a category by ID.
    pub async fn get(&self, id: i32) -> Result<categories::Model, CategoryError> {
        categories::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CategoryError::NotFound(id))
    }

    /// Creates a category with a unique title.
    pub async fn create(
        &self,
        input: CreateCategoryInput,
    ) -> Result<categories::Model, CategoryError> {
        let title = normalize_title(&input.title)?;
        let color = match input.color.as_deref() {
            Some(raw) => validate_color(raw)?,
            None => DEFAULT_CATEGORY_COLOR.to_string(),
        };

        ensure_title_free(&self.db, &title, None).await?;
        if let Some(type_id) = input.budget_type_id {
            ensure_budget_type(&self.db, type_id).await?;
        }

        let category = categories::ActiveModel {
            title: Set(title),
            removable: Set(input.removable.unwrap_or(true)),
            editable: Set(input.editable.unwrap_or(true)),
            color: Set(color),
            budget_type_id: Set(input.budget_type_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(category_id = category.id, title = %category.title, "Category created");
        Ok(category)
    }

    /// Updates title, color or budget type of an editable category.
    pub async fn update(
        &self,
        id: i32,
        input: UpdateCategoryInput,
    ) -> Result<categories::Model, CategoryError> {
        let title = input.title.as_deref().map(normalize_title).transpose()?;
        let color = input.color.as_deref().map(validate_color).transpose()?;

        let existing = self.get(id).await?;
        if !existing.editable {
            return Err(CategoryError::NotEditable(id));
        }

        if let Some(title) = &title {
            ensure_title_free(&self.db, title, Some(id)).await?;
        }
        if let Some(type_id) = input.budget_type_id {
            ensure_budget_type(&self.db, type_id).await?;
        }

        let mut active = existing.into_active_model();
        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(color) = color {
            active.color = Set(color);
        }
        if let Some(type_id) = input.budget_type_id {
            active.budget_type_id = Set(Some(type_id));
        }
        let category = active.update(&self.db).await?;

        info!(category_id = category.id, "Category updated");
        Ok(category)
    }

    /// Deletes a removable category.
    ///
    /// Its expenses move to the catch-all category, whose budget lines are
    /// re-summed for every month that received expenses; its own budget
    /// lines are removed. All of it happens in one transaction.
    pub async fn delete(
        &self,
        id: i32,
        catch_all_id: Option<i32>,
    ) -> Result<CategoryDeletion, CategoryError> {
        let txn = self.db.begin().await?;

        let category = categories::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(CategoryError::NotFound(id))?;

        if !category.removable || Some(id) == catch_all_id {
            return Err(CategoryError::NotRemovable(id));
        }

        let catch_all_id = catch_all_id.ok_or(CategoryError::CatchAllMissing)?;
        categories::Entity::find_by_id(catch_all_id)
            .one(&txn)
            .await?
            .ok_or(CategoryError::CatchAllMissing)?;

        let moved_dates: Vec<chrono::NaiveDate> = expenses::Entity::find()
            .filter(expenses::Column::CategoryId.eq(id))
            .select_only()
            .column(expenses::Column::Date)
            .into_tuple()
            .all(&txn)
            .await?;

        let reassigned = expenses::Entity::update_many()
            .col_expr(expenses::Column::CategoryId, Expr::value(catch_all_id))
            .filter(expenses::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?;

        let removed_lines = budgeting_expenses::Entity::delete_many()
            .filter(budgeting_expenses::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?;

        let periods: BTreeSet<BudgetPeriod> = moved_dates.into_iter().map(BudgetPeriod::of).collect();
        let steps: Vec<ReconcileStep> = periods
            .into_iter()
            .map(|period| ReconcileStep {
                slot: LineSlot {
                    period,
                    category_id: catch_all_id,
                },
                strategy: ReconcileStrategy::Resum,
            })
            .collect();
        BudgetReconciler::apply_steps(&txn, &steps).await?;

        category.clone().delete(&txn).await?;

        txn.commit().await?;

        info!(
            category_id = id,
            reassigned_expenses = reassigned.rows_affected,
            removed_budget_lines = removed_lines.rows_affected,
            "Category deleted"
        );

        Ok(CategoryDeletion {
            category,
            reassigned_expenses: reassigned.rows_affected,
            removed_budget_lines: removed_lines.rows_affected,
        })
    }
}

async fn ensure_title_free<C>(
    conn: &C,
    title: &str,
    except_id: Option<i32>,
) -> Result<(), CategoryError>
where
    C: ConnectionTrait,
{
    let existing = categories::Entity::find()
        .filter(categories::Column::Title.eq(title))
        .one(conn)
        .await?;

    match existing {
        Some(found) if Some(found.id) != except_id => Err(CategoryError::DuplicateTitle {
            title: title.to_string(),
            id: found.id,
        }),
        _ => Ok(()),
    }
}

async fn ensure_budget_type<C>(conn: &C, type_id: i32) -> Result<(), CategoryError>
where
    C: ConnectionTrait,
{
    budget_types::Entity::find_by_id(type_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or(CategoryError::BudgetTypeNotFound(type_id))
}
