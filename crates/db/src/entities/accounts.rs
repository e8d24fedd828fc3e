//! `SeaORM` Entity for accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AccountCategory, SystemAccountRole};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub business_id: Uuid,
    pub code: String,
    pub name: String,
    pub category: AccountCategory,
    pub is_active: bool,
    pub is_cash: bool,
    pub system_role: Option<SystemAccountRole>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_items::Entity")]
    JournalItems,
}

impl Related<super::journal_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
