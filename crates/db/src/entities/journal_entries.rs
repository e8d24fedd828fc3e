//! `SeaORM` Entity for journal_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{CashFlowCategory, EntryStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub business_id: Uuid,
    pub reference_number: String,
    pub financial_year_id: Uuid,
    pub entry_date: Date,
    pub narration: String,
    pub status: EntryStatus,
    pub cash_flow_category: Option<CashFlowCategory>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub posted_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(unique)]
    pub reverses_entry_id: Option<Uuid>,
    pub reversed_by_entry_id: Option<Uuid>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::financial_years::Entity",
        from = "Column::FinancialYearId",
        to = "super::financial_years::Column::Id"
    )]
    FinancialYears,
    #[sea_orm(has_many = "super::journal_items::Entity")]
    JournalItems,
}

impl Related<super::financial_years::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialYears.def()
    }
}

impl Related<super::journal_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
