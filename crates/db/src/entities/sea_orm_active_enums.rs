//! `SeaORM` active enums stored as constrained text columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `accounts.category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AccountCategory {
    /// Asset.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liability.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Equity.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Revenue.
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Expense.
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// `accounts.system_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum SystemAccountRole {
    /// Accounts receivable.
    #[sea_orm(string_value = "receivable")]
    Receivable,
    /// Accounts payable.
    #[sea_orm(string_value = "payable")]
    Payable,
    /// Opening balance equity.
    #[sea_orm(string_value = "opening_balance_equity")]
    OpeningBalanceEquity,
    /// Tax collected.
    #[sea_orm(string_value = "tax_payable")]
    TaxPayable,
    /// Tax paid.
    #[sea_orm(string_value = "tax_receivable")]
    TaxReceivable,
}

/// `journal_entries.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum EntryStatus {
    /// Editable draft.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Posted.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Cancelled by a reversal.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// `journal_entries.cash_flow_category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CashFlowCategory {
    /// Operating activities.
    #[sea_orm(string_value = "operating")]
    Operating,
    /// Investing activities.
    #[sea_orm(string_value = "investing")]
    Investing,
    /// Financing activities.
    #[sea_orm(string_value = "financing")]
    Financing,
}

/// `journal_items.entry_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum EntryType {
    /// Debit.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Credit.
    #[sea_orm(string_value = "credit")]
    Credit,
}
