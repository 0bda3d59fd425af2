//! Initial database migration.
//!
//! Creates the expense, category and budgeting tables and seeds the default
//! budget types and the catch-all category.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Budget types seeded on a fresh database, in id order.
const SEED_BUDGET_TYPES: [&str; 3] = ["Fixed", "Variable", "Income"];

/// Catch-all category: title, color.
const SEED_CATCH_ALL: (&str, &str) = ("Other", "#9e9e9e");

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // PART 1: LOOKUP TABLES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(BudgetTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BudgetTypes::Title)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Categories::Title)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Categories::Removable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Categories::Editable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Categories::Color)
                            .string()
                            .not_null()
                            .default(SEED_CATCH_ALL.1),
                    )
                    .col(ColumnDef::new(Categories::BudgetTypeId).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_categories_budget_type")
                            .from(Categories::Table, Categories::BudgetTypeId)
                            .to(BudgetTypes::Table, BudgetTypes::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 2: EXPENSES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::Name).string().not_null())
                    .col(ColumnDef::new(Expenses::Amount).decimal().not_null())
                    .col(ColumnDef::new(Expenses::Date).date().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expenses_category")
                            .from(Expenses::Table, Expenses::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_expenses_category_date")
                    .table(Expenses::Table)
                    .col(Expenses::CategoryId)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 3: BUDGETS & BUDGET LINES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Budgets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Budgets::Year).integer().not_null())
                    .col(ColumnDef::new(Budgets::Month).integer().not_null())
                    .col(
                        ColumnDef::new(Budgets::StartingBalance)
                            .decimal()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_budgets_year_month")
                    .table(Budgets::Table)
                    .col(Budgets::Year)
                    .col(Budgets::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BudgetingExpenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetingExpenses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BudgetingExpenses::BudgetId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetingExpenses::CategoryId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetingExpenses::BudgetTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetingExpenses::PlannedAmount)
                            .decimal()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BudgetingExpenses::ActualAmount)
                            .decimal()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budgeting_expenses_budget")
                            .from(BudgetingExpenses::Table, BudgetingExpenses::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budgeting_expenses_category")
                            .from(BudgetingExpenses::Table, BudgetingExpenses::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budgeting_expenses_budget_type")
                            .from(BudgetingExpenses::Table, BudgetingExpenses::BudgetTypeId)
                            .to(BudgetTypes::Table, BudgetTypes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_budgeting_expenses_budget_category")
                    .table(BudgetingExpenses::Table)
                    .col(BudgetingExpenses::BudgetId)
                    .col(BudgetingExpenses::CategoryId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 4: SEED DATA
        // ============================================================
        let db = manager.get_connection();
        let backend = manager.get_database_backend();

        for title in SEED_BUDGET_TYPES {
            let insert = Query::insert()
                .into_table(BudgetTypes::Table)
                .columns([BudgetTypes::Title])
                .values_panic([title.into()])
                .to_owned();
            db.execute(backend.build(&insert)).await?;
        }

        let insert = Query::insert()
            .into_table(Categories::Table)
            .columns([
                Categories::Title,
                Categories::Removable,
                Categories::Editable,
                Categories::Color,
            ])
            .values_panic([
                SEED_CATCH_ALL.0.into(),
                false.into(),
                false.into(),
                SEED_CATCH_ALL.1.into(),
            ])
            .to_owned();
        db.execute(backend.build(&insert)).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BudgetingExpenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetTypes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BudgetTypes {
    Table,
    Id,
    Title,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Title,
    Removable,
    Editable,
    Color,
    BudgetTypeId,
}

#[derive(DeriveIden)]
enum Expenses {
    Table,
    Id,
    Name,
    Amount,
    Date,
    CategoryId,
}

#[derive(DeriveIden)]
enum Budgets {
    Table,
    Id,
    Year,
    Month,
    StartingBalance,
}

#[derive(DeriveIden)]
enum BudgetingExpenses {
    Table,
    Id,
    BudgetId,
    CategoryId,
    BudgetTypeId,
    PlannedAmount,
    ActualAmount,
}
