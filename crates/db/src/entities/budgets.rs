//! `SeaORM` Entity for budgets table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub year: i32,
    pub month: i32,
    pub starting_balance: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::budgeting_expenses::Entity")]
    BudgetingExpenses,
}

impl Related<super::budgeting_expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetingExpenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
