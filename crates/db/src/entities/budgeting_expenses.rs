//! `SeaORM` Entity for budgeting_expenses table (budget lines).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgeting_expenses")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub budget_id: i32,
    pub category_id: i32,
    pub budget_type_id: i32,
    pub planned_amount: Decimal,
    pub actual_amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id"
    )]
    Budgets,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Categories,
    #[sea_orm(
        belongs_to = "super::budget_types::Entity",
        from = "Column::BudgetTypeId",
        to = "super::budget_types::Column::Id"
    )]
    BudgetTypes,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::budget_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
