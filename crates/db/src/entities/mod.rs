//! `SeaORM` entities for the ledger tables.

pub mod prelude;

pub mod accounts;
pub mod financial_years;
pub mod journal_entries;
pub mod journal_items;
pub mod reference_sequences;
pub mod sea_orm_active_enums;
