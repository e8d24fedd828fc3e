//! Posting engine: the only component that changes entry state.
//!
//! The engine is stateless. It validates inputs, then hands the store a guard
//! or transform that the store runs while holding the entry, so validation and
//! the write it protects are one atomic unit.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tally_shared::LedgerContext;
use tally_shared::types::{AccountId, FinancialYearId, JournalEntryId};
use tracing::{info, warn};

use super::clock::{Clock, SystemClock};
use super::error::LedgerError;
use super::reversal::{ReversalInput, ReversalService};
use super::store::LedgerStore;
use super::types::{DraftUpdate, EntryStatus, JournalEntry, JournalItem, NewJournalEntry};
use super::validation::{
    ensure_cancellable, ensure_draft, validate_accounts_exist, validate_accounts_postable,
    validate_amounts, validate_balanced, validate_entry_date, validate_postable,
};
use crate::account::Account;
use crate::fiscal::FinancialYear;

/// Default prefix for generated reference numbers.
pub const DEFAULT_REFERENCE_PREFIX: &str = "JE";

/// Validates and transitions journal entries.
///
/// `draft --post--> posted --cancel--> cancelled`, `draft --delete--> removed`.
pub struct PostingEngine<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    reference_prefix: String,
}

impl<S> Clone for PostingEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            reference_prefix: self.reference_prefix.clone(),
        }
    }
}

impl<S: LedgerStore> PostingEngine<S> {
    /// Creates an engine over the store using the wall clock.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            reference_prefix: DEFAULT_REFERENCE_PREFIX.to_string(),
        }
    }

    /// Replaces the clock reversals are dated from.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the prefix of generated reference numbers.
    #[must_use]
    pub fn with_reference_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reference_prefix = prefix.into();
        self
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Allocates the next reference number, e.g. `JE-000042`.
    ///
    /// Backed by an atomic per-business counter, so concurrent callers never
    /// receive the same number.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn next_reference_number(&self, ctx: &LedgerContext) -> Result<String, LedgerError> {
        let n = self
            .store
            .next_sequence(ctx, &self.reference_prefix)
            .await?;
        Ok(format!("{}-{n:06}", self.reference_prefix))
    }

    /// The business's active financial year.
    ///
    /// # Errors
    ///
    /// `MissingActiveFinancialYear` if none is active.
    pub async fn active_financial_year(
        &self,
        ctx: &LedgerContext,
    ) -> Result<FinancialYear, LedgerError> {
        self.store
            .active_financial_year(ctx)
            .await?
            .ok_or_else(|| LedgerError::MissingActiveFinancialYear(self.clock.today()))
    }

    /// Loads an entry with its items.
    ///
    /// # Errors
    ///
    /// `NotFound` if the entry does not exist.
    pub async fn get_entry(
        &self,
        ctx: &LedgerContext,
        id: JournalEntryId,
    ) -> Result<JournalEntry, LedgerError> {
        self.store
            .find_entry(ctx, id)
            .await?
            .ok_or(LedgerError::NotFound(id))
    }

    /// Persists a draft with its items verbatim; balance is not checked.
    ///
    /// # Errors
    ///
    /// `NonPositiveAmount`, `FinancialYearNotFound`,
    /// `EntryDateOutsideFinancialYear`, `AccountNotFound` or
    /// `DuplicateReference`.
    #[tracing::instrument(skip_all, fields(business_id = %ctx.business_id, reference = %input.reference_number))]
    pub async fn create_draft(
        &self,
        ctx: &LedgerContext,
        input: NewJournalEntry,
    ) -> Result<JournalEntryId, LedgerError> {
        validate_amounts(&input.items)?;
        let year = self.financial_year(ctx, input.financial_year_id).await?;
        validate_entry_date(&year, input.entry_date)?;

        let entry = build_entry(ctx, input, EntryStatus::Draft, self.clock.now());
        self.store
            .insert_entry(ctx, &entry, &|accounts| {
                validate_accounts_exist(entry.items.iter().map(|item| &item.account_id), accounts)
            })
            .await?;

        info!(
            business_id = %ctx.business_id,
            entry_id = %entry.id,
            reference = %entry.reference_number,
            "Draft entry created"
        );
        Ok(entry.id)
    }

    /// Posts a draft.
    ///
    /// Validation and the status flip run under the store's lock on the
    /// entry, against the referenced accounts as read under that lock; a
    /// failed post leaves the draft untouched.
    ///
    /// # Errors
    ///
    /// `NotFound`, `NotDraft`, `Unbalanced` or `AccountInactive`.
    #[tracing::instrument(skip_all, fields(business_id = %ctx.business_id, entry_id = %id))]
    pub async fn post(&self, ctx: &LedgerContext, id: JournalEntryId) -> Result<(), LedgerError> {
        let now = self.clock.now();

        let result = self
            .store
            .replace_entry(ctx, id, &|entry, accounts| {
                validate_postable(entry, accounts)?;
                Ok(JournalEntry {
                    status: EntryStatus::Posted,
                    posted_at: Some(now),
                    ..entry.clone()
                })
            })
            .await;

        match result {
            Ok(entry) => {
                info!(
                    business_id = %ctx.business_id,
                    entry_id = %entry.id,
                    reference = %entry.reference_number,
                    "Entry posted"
                );
                Ok(())
            }
            Err(e) => {
                warn!(entry_id = %id, error = %e, "Posting rejected");
                Err(e)
            }
        }
    }

    /// Creates and posts a balanced entry as one atomic unit.
    ///
    /// This is the entry point for collaborators (invoicing, payments,
    /// payroll): nothing is stored unless the entry is valid and posted.
    ///
    /// # Errors
    ///
    /// Any error of [`Self::create_draft`] or [`Self::post`].
    #[tracing::instrument(skip_all, fields(business_id = %ctx.business_id, reference = %input.reference_number))]
    pub async fn submit_balanced_entry(
        &self,
        ctx: &LedgerContext,
        input: NewJournalEntry,
    ) -> Result<JournalEntryId, LedgerError> {
        validate_amounts(&input.items)?;
        if let Err(e) = validate_balanced(&input.items) {
            warn!(reference = %input.reference_number, error = %e, "Posting rejected");
            return Err(e);
        }
        let year = self.financial_year(ctx, input.financial_year_id).await?;
        validate_entry_date(&year, input.entry_date)?;

        let entry = build_entry(ctx, input, EntryStatus::Posted, self.clock.now());
        let stored = self
            .store
            .insert_entry(ctx, &entry, &|accounts| {
                validate_accounts_postable(entry.items.iter().map(|item| &item.account_id), accounts)
            })
            .await;
        if let Err(e) = stored {
            warn!(reference = %entry.reference_number, error = %e, "Posting rejected");
            return Err(e);
        }

        info!(
            business_id = %ctx.business_id,
            entry_id = %entry.id,
            reference = %entry.reference_number,
            "Entry posted"
        );
        Ok(entry.id)
    }

    /// Cancels a posted entry by booking its reversal.
    ///
    /// The reversal is dated today in the active financial year, posted
    /// immediately and linked both ways. At most one reversal ever exists
    /// per original.
    ///
    /// # Errors
    ///
    /// `NotFound`, `AlreadyCancelled`, `NotPosted` for drafts, or
    /// `MissingActiveFinancialYear` if no active year covers today.
    #[tracing::instrument(skip_all, fields(business_id = %ctx.business_id, entry_id = %id))]
    pub async fn cancel(
        &self,
        ctx: &LedgerContext,
        id: JournalEntryId,
    ) -> Result<JournalEntryId, LedgerError> {
        // Fail fast before a reference number is allocated.
        ensure_cancellable(&self.get_entry(ctx, id).await?)?;

        let now = self.clock.now();
        let today = now.date_naive();
        let year = self.active_financial_year(ctx).await?;
        if !year.contains_date(today) {
            return Err(LedgerError::MissingActiveFinancialYear(today));
        }

        let input = ReversalInput {
            reference_number: self.next_reference_number(ctx).await?,
            financial_year_id: year.id,
            entry_date: today,
            now,
        };
        let reversal = self
            .store
            .record_reversal(ctx, id, &|original| {
                ensure_cancellable(original)?;
                Ok(ReversalService::build(ctx, original, &input))
            })
            .await?;

        info!(
            business_id = %ctx.business_id,
            entry_id = %id,
            reversal_id = %reversal.id,
            reference = %reversal.reference_number,
            "Entry cancelled"
        );
        Ok(reversal.id)
    }

    /// Collaborator-facing name for [`Self::cancel`], used when voiding a
    /// source document.
    ///
    /// # Errors
    ///
    /// Same as [`Self::cancel`].
    pub async fn cancel_entry(
        &self,
        ctx: &LedgerContext,
        id: JournalEntryId,
    ) -> Result<JournalEntryId, LedgerError> {
        self.cancel(ctx, id).await
    }

    /// Replaces a draft's items, narration and date.
    ///
    /// # Errors
    ///
    /// `NotFound`, `NotDraft`, `NonPositiveAmount`, `AccountNotFound` or
    /// `EntryDateOutsideFinancialYear`.
    #[tracing::instrument(skip_all, fields(business_id = %ctx.business_id, entry_id = %id))]
    pub async fn update_draft(
        &self,
        ctx: &LedgerContext,
        id: JournalEntryId,
        update: DraftUpdate,
    ) -> Result<(), LedgerError> {
        validate_amounts(&update.items)?;
        let current = self.get_entry(ctx, id).await?;
        ensure_draft(&current)?;
        let year = self.financial_year(ctx, current.financial_year_id).await?;
        validate_entry_date(&year, update.entry_date)?;
        let accounts = self.account_map(ctx).await?;
        validate_accounts_exist(update.items.iter().map(|item| &item.account_id), &accounts)?;

        self.store
            .replace_entry(ctx, id, &|entry, _| {
                ensure_draft(entry)?;
                Ok(JournalEntry {
                    entry_date: update.entry_date,
                    narration: update.narration.clone(),
                    items: update
                        .items
                        .iter()
                        .cloned()
                        .map(|input| JournalItem::from_input(entry.id, input))
                        .collect(),
                    ..entry.clone()
                })
            })
            .await?;

        info!(business_id = %ctx.business_id, entry_id = %id, "Draft entry updated");
        Ok(())
    }

    /// Hard-deletes a draft.
    ///
    /// # Errors
    ///
    /// `NotFound` or `NotDraft`.
    #[tracing::instrument(skip_all, fields(business_id = %ctx.business_id, entry_id = %id))]
    pub async fn delete_draft(
        &self,
        ctx: &LedgerContext,
        id: JournalEntryId,
    ) -> Result<(), LedgerError> {
        self.store.delete_entry(ctx, id, &ensure_draft).await?;
        info!(business_id = %ctx.business_id, entry_id = %id, "Draft entry deleted");
        Ok(())
    }

    async fn financial_year(
        &self,
        ctx: &LedgerContext,
        id: FinancialYearId,
    ) -> Result<FinancialYear, LedgerError> {
        self.store
            .financial_year(ctx, id)
            .await?
            .ok_or(LedgerError::FinancialYearNotFound(id))
    }

    async fn account_map(
        &self,
        ctx: &LedgerContext,
    ) -> Result<HashMap<AccountId, Account>, LedgerError> {
        Ok(self
            .store
            .accounts(ctx)
            .await?
            .into_iter()
            .map(|account| (account.id, account))
            .collect())
    }
}

fn build_entry(
    ctx: &LedgerContext,
    input: NewJournalEntry,
    status: EntryStatus,
    now: DateTime<Utc>,
) -> JournalEntry {
    let id = JournalEntryId::new();
    JournalEntry {
        id,
        business_id: ctx.business_id,
        reference_number: input.reference_number,
        financial_year_id: input.financial_year_id,
        entry_date: input.entry_date,
        narration: input.narration,
        status,
        cash_flow_category: input.cash_flow_category,
        created_by: ctx.actor_id,
        created_at: now,
        posted_at: (status == EntryStatus::Posted).then_some(now),
        reverses_entry_id: None,
        reversed_by_entry_id: None,
        items: input
            .items
            .into_iter()
            .map(|item| JournalItem::from_input(id, item))
            .collect(),
    }
}
