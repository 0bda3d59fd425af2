//! `SeaORM` Entity for categories table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub title: String,
    pub removable: bool,
    pub editable: bool,
    pub color: String,
    pub budget_type_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budget_types::Entity",
        from = "Column::BudgetTypeId",
        to = "super::budget_types::Column::Id"
    )]
    BudgetTypes,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(has_many = "super::budgeting_expenses::Entity")]
    BudgetingExpenses,
}

impl Related<super::budget_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetTypes.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::budgeting_expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetingExpenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
