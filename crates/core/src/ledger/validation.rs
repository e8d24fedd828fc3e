//! Business rule validation for ledger operations.
//!
//! Pure functions; the posting engine calls them inside store-level atomic
//! units so a check and the write it guards see the same state.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tally_shared::types::AccountId;

use super::error::LedgerError;
use super::types::{EntryStatus, EntryTotals, JournalEntry, JournalItemInput, Leg};
use crate::account::Account;
use crate::fiscal::FinancialYear;

/// Minimum number of items on a postable entry.
pub const MIN_ITEMS: usize = 2;

/// Checks every item amount is strictly positive.
pub fn validate_amounts(items: &[JournalItemInput]) -> Result<(), LedgerError> {
    match items
        .iter()
        .enumerate()
        .find(|(_, item)| item.amount <= Decimal::ZERO)
    {
        Some((index, item)) => Err(LedgerError::NonPositiveAmount {
            index,
            amount: item.amount,
        }),
        None => Ok(()),
    }
}

/// Checks debits equal credits and there are at least two legs.
pub fn validate_balanced<L: Leg>(legs: &[L]) -> Result<EntryTotals, LedgerError> {
    let totals = EntryTotals::of(legs);
    if legs.len() < MIN_ITEMS || !totals.is_balanced {
        return Err(LedgerError::Unbalanced {
            debit: totals.debit,
            credit: totals.credit,
            item_count: legs.len(),
        });
    }
    Ok(totals)
}

/// Checks the entry date lies inside the financial year.
pub fn validate_entry_date(
    year: &FinancialYear,
    date: chrono::NaiveDate,
) -> Result<(), LedgerError> {
    if year.contains_date(date) {
        Ok(())
    } else {
        Err(LedgerError::EntryDateOutsideFinancialYear {
            date,
            financial_year_id: year.id,
        })
    }
}

/// Checks every referenced account exists.
pub fn validate_accounts_exist<'a>(
    account_ids: impl IntoIterator<Item = &'a AccountId>,
    accounts: &HashMap<AccountId, Account>,
) -> Result<(), LedgerError> {
    for id in account_ids {
        if !accounts.contains_key(id) {
            return Err(LedgerError::AccountNotFound(*id));
        }
    }
    Ok(())
}

/// Checks every referenced account exists and is active.
pub fn validate_accounts_postable<'a>(
    account_ids: impl IntoIterator<Item = &'a AccountId>,
    accounts: &HashMap<AccountId, Account>,
) -> Result<(), LedgerError> {
    for id in account_ids {
        match accounts.get(id) {
            None => return Err(LedgerError::AccountNotFound(*id)),
            Some(account) if !account.is_active => {
                return Err(LedgerError::AccountInactive(*id));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Checks the entry is still a draft.
pub fn ensure_draft(entry: &JournalEntry) -> Result<(), LedgerError> {
    if entry.status.is_editable() {
        Ok(())
    } else {
        Err(LedgerError::NotDraft {
            id: entry.id,
            status: entry.status,
        })
    }
}

/// Checks the entry can be cancelled (posted, not yet reversed).
pub fn ensure_cancellable(entry: &JournalEntry) -> Result<(), LedgerError> {
    match entry.status {
        EntryStatus::Posted => Ok(()),
        EntryStatus::Cancelled => Err(LedgerError::AlreadyCancelled(entry.id)),
        EntryStatus::Draft => Err(LedgerError::NotPosted(entry.id)),
    }
}

/// Full post-time check of a stored draft.
pub fn validate_postable(
    entry: &JournalEntry,
    accounts: &HashMap<AccountId, Account>,
) -> Result<EntryTotals, LedgerError> {
    ensure_draft(entry)?;
    let totals = validate_balanced(&entry.items)?;
    validate_accounts_postable(entry.items.iter().map(|item| &item.account_id), accounts)?;
    Ok(totals)
}
