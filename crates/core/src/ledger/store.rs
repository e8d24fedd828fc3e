//! Persistence port for the ledger.
//!
//! The posting engine is a stateless service; everything durable goes
//! through these traits. Writes that depend on the current state of an entry
//! take a guard or transform closure which the store runs while holding the
//! entry exclusively (row lock, write lock), so the check and the write form
//! one atomic unit. Closures that check accounts receive the accounts the
//! entry references as read inside that unit; an account cannot change
//! between the check and the write.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::LedgerContext;
use tally_shared::types::{AccountId, FinancialYearId, JournalEntryId, JournalItemId};

use super::error::LedgerError;
use super::types::{CashFlowCategory, EntryStatus, EntryType, JournalEntry, Leg};
use crate::account::{Account, SystemAccountRole};
use crate::fiscal::FinancialYear;

/// Check run against the locked entry before a state-dependent write.
pub type EntryGuard<'a> = &'a (dyn Fn(&JournalEntry) -> Result<(), LedgerError> + Send + Sync);

/// Builds the companion entry from the locked entry.
pub type EntryTransform<'a> =
    &'a (dyn Fn(&JournalEntry) -> Result<JournalEntry, LedgerError> + Send + Sync);

/// Accounts keyed by id.
pub type AccountMap = HashMap<AccountId, Account>;

/// Builds the replacement entry from the locked entry and the accounts its
/// items reference.
pub type EntryRewrite<'a> =
    &'a (dyn Fn(&JournalEntry, &AccountMap) -> Result<JournalEntry, LedgerError> + Send + Sync);

/// Check run against the accounts a new entry references before it is stored.
pub type AccountGuard<'a> = &'a (dyn Fn(&AccountMap) -> Result<(), LedgerError> + Send + Sync);

/// Read-only view of master data owned outside the ledger.
#[async_trait]
pub trait AccountRegistry: Send + Sync {
    /// All accounts of the business.
    async fn accounts(&self, ctx: &LedgerContext) -> Result<Vec<Account>, LedgerError>;

    /// One account by id.
    async fn find_account(
        &self,
        ctx: &LedgerContext,
        id: AccountId,
    ) -> Result<Option<Account>, LedgerError>;

    /// The account holding a system role, if configured.
    async fn system_account(
        &self,
        ctx: &LedgerContext,
        role: SystemAccountRole,
    ) -> Result<Option<Account>, LedgerError> {
        Ok(self
            .accounts(ctx)
            .await?
            .into_iter()
            .find(|account| account.system_role == Some(role)))
    }

    /// One financial year by id.
    async fn financial_year(
        &self,
        ctx: &LedgerContext,
        id: FinancialYearId,
    ) -> Result<Option<FinancialYear>, LedgerError>;

    /// The active financial year, if any.
    async fn active_financial_year(
        &self,
        ctx: &LedgerContext,
    ) -> Result<Option<FinancialYear>, LedgerError>;
}

/// Durable record of journal entries and items.
#[async_trait]
pub trait LedgerStore: AccountRegistry {
    /// Inserts a new entry with its items in one atomic unit, once the guard
    /// accepts the accounts the items reference.
    ///
    /// Fails with `DuplicateReference` if the reference is taken.
    async fn insert_entry(
        &self,
        ctx: &LedgerContext,
        entry: &JournalEntry,
        guard: AccountGuard<'_>,
    ) -> Result<(), LedgerError>;

    /// Loads an entry with its items.
    async fn find_entry(
        &self,
        ctx: &LedgerContext,
        id: JournalEntryId,
    ) -> Result<Option<JournalEntry>, LedgerError>;

    /// Replaces a stored entry (header and items) with the rewrite's output.
    ///
    /// The rewrite sees the accounts referenced by the stored items; they
    /// stay unchanged until the write commits. Fails with `NotFound` if absent.
    async fn replace_entry(
        &self,
        ctx: &LedgerContext,
        id: JournalEntryId,
        rewrite: EntryRewrite<'_>,
    ) -> Result<JournalEntry, LedgerError>;

    /// Deletes an entry and its items once the guard accepts it.
    async fn delete_entry(
        &self,
        ctx: &LedgerContext,
        id: JournalEntryId,
        guard: EntryGuard<'_>,
    ) -> Result<(), LedgerError>;

    /// Inserts the reversal built from the locked original, links both
    /// entries and marks the original cancelled, atomically.
    ///
    /// At most one reversal may ever exist per original.
    async fn record_reversal(
        &self,
        ctx: &LedgerContext,
        original_id: JournalEntryId,
        build: EntryTransform<'_>,
    ) -> Result<JournalEntry, LedgerError>;

    /// Atomically increments and returns the counter for `prefix`.
    async fn next_sequence(&self, ctx: &LedgerContext, prefix: &str) -> Result<u64, LedgerError>;

    /// Item-level view of the books, ordered by `(entry_date, entry_id, item_id)`.
    async fn ledger_lines(
        &self,
        ctx: &LedgerContext,
        query: &LineQuery,
    ) -> Result<Vec<LedgerLine>, LedgerError>;
}

/// Filter for `LedgerStore::ledger_lines`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineQuery {
    /// Restrict to these accounts; `None` means all.
    pub account_ids: Option<Vec<AccountId>>,
    /// Earliest entry date (inclusive).
    pub from: Option<NaiveDate>,
    /// Latest entry date (inclusive).
    pub to: Option<NaiveDate>,
    /// Also return items of draft entries.
    pub include_drafts: bool,
}

impl LineQuery {
    /// Returns true if an entry with this status and date is selected.
    #[must_use]
    pub fn selects(&self, status: EntryStatus, entry_date: NaiveDate) -> bool {
        let status_ok =
            status.affects_balances() || (self.include_drafts && status == EntryStatus::Draft);
        let from_ok = self.from.is_none_or(|from| entry_date >= from);
        let to_ok = self.to.is_none_or(|to| entry_date <= to);
        status_ok && from_ok && to_ok
    }

    /// Returns true if the account is selected.
    #[must_use]
    pub fn selects_account(&self, account_id: AccountId) -> bool {
        self.account_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&account_id))
    }
}

/// One journal item joined with its entry header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// The entry.
    pub entry_id: JournalEntryId,
    /// The item.
    pub item_id: JournalItemId,
    /// Entry reference number.
    pub reference_number: String,
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Entry narration.
    pub narration: String,
    /// Entry status.
    pub status: EntryStatus,
    /// Explicit cash-flow tag of the entry.
    pub cash_flow_category: Option<CashFlowCategory>,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// The account.
    pub account_id: AccountId,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Amount.
    pub amount: Decimal,
    /// Item description.
    pub description: Option<String>,
}

impl Leg for LedgerLine {
    fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    fn amount(&self) -> Decimal {
        self.amount
    }
}

impl LedgerLine {
    /// Flattens an entry into its lines.
    pub fn from_entry(entry: &JournalEntry) -> impl Iterator<Item = Self> + '_ {
        entry.items.iter().map(move |item| Self {
            entry_id: entry.id,
            item_id: item.id,
            reference_number: entry.reference_number.clone(),
            entry_date: entry.entry_date,
            narration: entry.narration.clone(),
            status: entry.status,
            cash_flow_category: entry.cash_flow_category,
            created_at: entry.created_at,
            account_id: item.account_id,
            entry_type: item.entry_type,
            amount: item.amount,
            description: item.description.clone(),
        })
    }

    /// Chronological sort key: `(entry_date, entry_id, item_id)`.
    #[must_use]
    pub fn sort_key(&self) -> (NaiveDate, JournalEntryId, JournalItemId) {
        (self.entry_date, self.entry_id, self.item_id)
    }
}
