//! In-process ledger store.
//!
//! Backs tests, demos and embedded use. One `RwLock` guards the whole state;
//! every write, including the guard or transform it runs, happens under the
//! write lock, which gives the same atomicity as a database transaction.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tally_shared::LedgerContext;
use tally_shared::types::{AccountId, BusinessId, FinancialYearId, JournalEntryId};

use super::error::LedgerError;
use super::reversal::ReversalService;
use super::store::{
    AccountGuard, AccountMap, AccountRegistry, EntryGuard, EntryRewrite, EntryTransform,
    LedgerLine, LedgerStore, LineQuery,
};
use super::types::JournalEntry;
use crate::account::Account;
use crate::fiscal::FinancialYear;

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<AccountId, Account>,
    years: HashMap<FinancialYearId, FinancialYear>,
    entries: BTreeMap<JournalEntryId, JournalEntry>,
    references: HashMap<(BusinessId, String), JournalEntryId>,
    sequences: HashMap<(BusinessId, String), u64>,
}

impl State {
    fn entry(
        &self,
        ctx: &LedgerContext,
        id: JournalEntryId,
    ) -> Result<&JournalEntry, LedgerError> {
        self.entries
            .get(&id)
            .filter(|entry| entry.business_id == ctx.business_id)
            .ok_or(LedgerError::NotFound(id))
    }

    /// The business's accounts referenced by the entry's items.
    fn referenced_accounts(&self, entry: &JournalEntry) -> AccountMap {
        entry
            .items
            .iter()
            .filter_map(|item| self.accounts.get(&item.account_id))
            .filter(|account| account.business_id == entry.business_id)
            .map(|account| (account.id, account.clone()))
            .collect()
    }

    fn claim_reference(&mut self, entry: &JournalEntry) -> Result<(), LedgerError> {
        let key = (entry.business_id, entry.reference_number.clone());
        match self.references.get(&key) {
            Some(owner) if *owner != entry.id => Err(LedgerError::DuplicateReference(
                entry.reference_number.clone(),
            )),
            _ => {
                self.references.insert(key, entry.id);
                Ok(())
            }
        }
    }

    fn release_reference(&mut self, entry: &JournalEntry) {
        self.references
            .remove(&(entry.business_id, entry.reference_number.clone()));
    }
}

/// Ledger store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<State>,
}

impl InMemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, LedgerError> {
        self.state
            .read()
            .map_err(|_| LedgerError::Store("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, LedgerError> {
        self.state
            .write()
            .map_err(|_| LedgerError::Store("lock poisoned".to_string()))
    }

    /// Adds or replaces an account.
    pub fn insert_account(&self, account: Account) -> Result<(), LedgerError> {
        self.write()?.accounts.insert(account.id, account);
        Ok(())
    }

    /// Activates or deactivates an account.
    pub fn set_account_active(&self, id: AccountId, is_active: bool) -> Result<(), LedgerError> {
        let mut state = self.write()?;
        let account = state
            .accounts
            .get_mut(&id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        account.is_active = is_active;
        Ok(())
    }

    /// Adds or replaces a financial year.
    ///
    /// Adding an active year deactivates the business's other years.
    pub fn insert_financial_year(&self, year: FinancialYear) -> Result<(), LedgerError> {
        let mut state = self.write()?;
        if year.is_active {
            for other in state
                .years
                .values_mut()
                .filter(|other| other.business_id == year.business_id)
            {
                other.is_active = false;
            }
        }
        state.years.insert(year.id, year);
        Ok(())
    }

    /// Number of entries stored for the business, any status.
    pub fn entry_count(&self, ctx: &LedgerContext) -> Result<usize, LedgerError> {
        Ok(self
            .read()?
            .entries
            .values()
            .filter(|entry| entry.business_id == ctx.business_id)
            .count())
    }
}

#[async_trait]
impl AccountRegistry for InMemoryLedgerStore {
    async fn accounts(&self, ctx: &LedgerContext) -> Result<Vec<Account>, LedgerError> {
        let mut accounts: Vec<Account> = self
            .read()?
            .accounts
            .values()
            .filter(|account| account.business_id == ctx.business_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    async fn find_account(
        &self,
        ctx: &LedgerContext,
        id: AccountId,
    ) -> Result<Option<Account>, LedgerError> {
        Ok(self
            .read()?
            .accounts
            .get(&id)
            .filter(|account| account.business_id == ctx.business_id)
            .cloned())
    }

    async fn financial_year(
        &self,
        ctx: &LedgerContext,
        id: FinancialYearId,
    ) -> Result<Option<FinancialYear>, LedgerError> {
        Ok(self
            .read()?
            .years
            .get(&id)
            .filter(|year| year.business_id == ctx.business_id)
            .cloned())
    }

    async fn active_financial_year(
        &self,
        ctx: &LedgerContext,
    ) -> Result<Option<FinancialYear>, LedgerError> {
        Ok(self
            .read()?
            .years
            .values()
            .find(|year| year.business_id == ctx.business_id && year.is_active)
            .cloned())
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn insert_entry(
        &self,
        ctx: &LedgerContext,
        entry: &JournalEntry,
        guard: AccountGuard<'_>,
    ) -> Result<(), LedgerError> {
        if entry.business_id != ctx.business_id {
            return Err(LedgerError::Store(
                "entry belongs to another business".to_string(),
            ));
        }
        let mut state = self.write()?;
        guard(&state.referenced_accounts(entry))?;
        state.claim_reference(entry)?;
        state.entries.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn find_entry(
        &self,
        ctx: &LedgerContext,
        id: JournalEntryId,
    ) -> Result<Option<JournalEntry>, LedgerError> {
        let state = self.read()?;
        match state.entry(ctx, id) {
            Ok(entry) => Ok(Some(entry.clone())),
            Err(LedgerError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn replace_entry(
        &self,
        ctx: &LedgerContext,
        id: JournalEntryId,
        rewrite: EntryRewrite<'_>,
    ) -> Result<JournalEntry, LedgerError> {
        let mut state = self.write()?;
        let current = state.entry(ctx, id)?.clone();
        let updated = rewrite(&current, &state.referenced_accounts(&current))?;
        if updated.reference_number != current.reference_number {
            state.claim_reference(&updated)?;
            state.release_reference(&current);
        }
        state.entries.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_entry(
        &self,
        ctx: &LedgerContext,
        id: JournalEntryId,
        guard: EntryGuard<'_>,
    ) -> Result<(), LedgerError> {
        let mut state = self.write()?;
        let current = state.entry(ctx, id)?.clone();
        guard(&current)?;
        state.release_reference(&current);
        state.entries.remove(&id);
        Ok(())
    }

    async fn record_reversal(
        &self,
        ctx: &LedgerContext,
        original_id: JournalEntryId,
        build: EntryTransform<'_>,
    ) -> Result<JournalEntry, LedgerError> {
        let mut state = self.write()?;
        let original = state.entry(ctx, original_id)?.clone();
        let already_reversed = original.reversed_by_entry_id.is_some()
            || state
                .entries
                .values()
                .any(|entry| entry.reverses_entry_id == Some(original_id));
        if already_reversed {
            return Err(LedgerError::AlreadyCancelled(original_id));
        }

        let reversal = build(&original)?;
        state.claim_reference(&reversal)?;
        state.entries.insert(reversal.id, reversal.clone());
        state.entries.insert(
            original_id,
            ReversalService::cancelled(&original, &reversal),
        );
        Ok(reversal)
    }

    async fn next_sequence(&self, ctx: &LedgerContext, prefix: &str) -> Result<u64, LedgerError> {
        let mut state = self.write()?;
        let counter = state
            .sequences
            .entry((ctx.business_id, prefix.to_string()))
            .or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn ledger_lines(
        &self,
        ctx: &LedgerContext,
        query: &LineQuery,
    ) -> Result<Vec<LedgerLine>, LedgerError> {
        let state = self.read()?;
        let mut lines: Vec<LedgerLine> = state
            .entries
            .values()
            .filter(|entry| entry.business_id == ctx.business_id)
            .filter(|entry| query.selects(entry.status, entry.entry_date))
            .flat_map(LedgerLine::from_entry)
            .filter(|line| query.selects_account(line.account_id))
            .collect();
        lines.sort_by_key(LedgerLine::sort_key);
        Ok(lines)
    }
}
