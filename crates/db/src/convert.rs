//! Conversions between `SeaORM` models and ledger domain types.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use tally_core::account::{self, Account};
use tally_core::fiscal::FinancialYear;
use tally_core::ledger::{self, JournalEntry, JournalItem};
use tally_shared::types::{
    AccountId, BusinessId, FinancialYearId, JournalEntryId, JournalItemId, UserId,
};

use crate::entities::sea_orm_active_enums::{
    AccountCategory, CashFlowCategory, EntryStatus, EntryType, SystemAccountRole,
};
use crate::entities::{accounts, financial_years, journal_entries, journal_items};

macro_rules! mirror_enum {
    ($db:ident <=> $module:ident :: $domain:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$db> for $module::$domain {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$module::$domain> for $db {
            fn from(value: $module::$domain) -> Self {
                match value {
                    $($module::$domain::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(AccountCategory <=> account::AccountCategory {
    Asset, Liability, Equity, Revenue, Expense
});
mirror_enum!(SystemAccountRole <=> account::SystemAccountRole {
    Receivable, Payable, OpeningBalanceEquity, TaxPayable, TaxReceivable
});
mirror_enum!(EntryStatus <=> ledger::EntryStatus { Draft, Posted, Cancelled });
mirror_enum!(CashFlowCategory <=> ledger::CashFlowCategory {
    Operating, Investing, Financing
});
mirror_enum!(EntryType <=> ledger::EntryType { Debit, Credit });

impl From<accounts::Model> for Account {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: AccountId::from_uuid(model.id),
            business_id: BusinessId::from_uuid(model.business_id),
            code: model.code,
            name: model.name,
            category: model.category.into(),
            is_active: model.is_active,
            is_cash: model.is_cash,
            system_role: model.system_role.map(Into::into),
        }
    }
}

/// New account row.
pub(crate) fn account_model(account: &Account) -> accounts::ActiveModel {
    let now = Utc::now().into();
    accounts::ActiveModel {
        id: Set(account.id.into_inner()),
        business_id: Set(account.business_id.into_inner()),
        code: Set(account.code.clone()),
        name: Set(account.name.clone()),
        category: Set(account.category.into()),
        is_active: Set(account.is_active),
        is_cash: Set(account.is_cash),
        system_role: Set(account.system_role.map(Into::into)),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

impl From<financial_years::Model> for FinancialYear {
    fn from(model: financial_years::Model) -> Self {
        Self {
            id: FinancialYearId::from_uuid(model.id),
            business_id: BusinessId::from_uuid(model.business_id),
            name: model.name,
            start_date: model.start_date,
            end_date: model.end_date,
            is_active: model.is_active,
        }
    }
}

/// New financial year row.
pub(crate) fn financial_year_model(year: &FinancialYear) -> financial_years::ActiveModel {
    financial_years::ActiveModel {
        id: Set(year.id.into_inner()),
        business_id: Set(year.business_id.into_inner()),
        name: Set(year.name.clone()),
        start_date: Set(year.start_date),
        end_date: Set(year.end_date),
        is_active: Set(year.is_active),
        created_at: Set(Utc::now().into()),
    }
}

impl From<journal_items::Model> for JournalItem {
    fn from(model: journal_items::Model) -> Self {
        Self {
            id: JournalItemId::from_uuid(model.id),
            entry_id: JournalEntryId::from_uuid(model.entry_id),
            account_id: AccountId::from_uuid(model.account_id),
            entry_type: model.entry_type.into(),
            amount: model.amount,
            description: model.description,
        }
    }
}

/// Joins a header with its items, ordered by item id.
pub(crate) fn journal_entry(
    header: journal_entries::Model,
    mut items: Vec<journal_items::Model>,
) -> JournalEntry {
    items.sort_by_key(|item| item.id);
    JournalEntry {
        id: JournalEntryId::from_uuid(header.id),
        business_id: BusinessId::from_uuid(header.business_id),
        reference_number: header.reference_number,
        financial_year_id: FinancialYearId::from_uuid(header.financial_year_id),
        entry_date: header.entry_date,
        narration: header.narration,
        status: header.status.into(),
        cash_flow_category: header.cash_flow_category.map(Into::into),
        created_by: UserId::from_uuid(header.created_by),
        created_at: header.created_at.with_timezone(&Utc),
        posted_at: header.posted_at.map(|at| at.with_timezone(&Utc)),
        reverses_entry_id: header.reverses_entry_id.map(JournalEntryId::from_uuid),
        reversed_by_entry_id: header.reversed_by_entry_id.map(JournalEntryId::from_uuid),
        items: items.into_iter().map(Into::into).collect(),
    }
}

/// Header row of an entry.
pub(crate) fn entry_model(entry: &JournalEntry) -> journal_entries::ActiveModel {
    journal_entries::ActiveModel {
        id: Set(entry.id.into_inner()),
        business_id: Set(entry.business_id.into_inner()),
        reference_number: Set(entry.reference_number.clone()),
        financial_year_id: Set(entry.financial_year_id.into_inner()),
        entry_date: Set(entry.entry_date),
        narration: Set(entry.narration.clone()),
        status: Set(entry.status.into()),
        cash_flow_category: Set(entry.cash_flow_category.map(Into::into)),
        created_by: Set(entry.created_by.into_inner()),
        created_at: Set(entry.created_at.into()),
        posted_at: Set(entry.posted_at.map(Into::into)),
        reverses_entry_id: Set(entry.reverses_entry_id.map(JournalEntryId::into_inner)),
        reversed_by_entry_id: Set(entry.reversed_by_entry_id.map(JournalEntryId::into_inner)),
        updated_at: Set(Utc::now().into()),
    }
}

/// Item rows of an entry.
pub(crate) fn item_models(entry: &JournalEntry) -> Vec<journal_items::ActiveModel> {
    entry
        .items
        .iter()
        .map(|item| journal_items::ActiveModel {
            id: Set(item.id.into_inner()),
            entry_id: Set(entry.id.into_inner()),
            account_id: Set(item.account_id.into_inner()),
            entry_type: Set(item.entry_type.into()),
            amount: Set(item.amount),
            description: Set(item.description.clone()),
        })
        .collect()
}
