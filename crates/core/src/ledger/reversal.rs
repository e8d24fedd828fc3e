//! Reversal construction for cancelling posted entries.
//!
//! A posted entry is never edited or deleted. Cancelling it books a new,
//! immediately posted entry with every item's side swapped.

use chrono::{DateTime, NaiveDate, Utc};
use tally_shared::LedgerContext;
use tally_shared::types::{FinancialYearId, JournalEntryId, JournalItemId};

use super::types::{EntryStatus, JournalEntry, JournalItem};

/// Everything a reversal needs besides the original entry.
#[derive(Debug, Clone)]
pub struct ReversalInput {
    /// Reference number allocated for the reversal.
    pub reference_number: String,
    /// Financial year the reversal is booked in.
    pub financial_year_id: FinancialYearId,
    /// Accounting date of the reversal.
    pub entry_date: NaiveDate,
    /// Creation (and posting) instant.
    pub now: DateTime<Utc>,
}

/// Stateless builder for reversing entries.
pub struct ReversalService;

impl ReversalService {
    /// Builds the posted reversal of `original`.
    ///
    /// Each item keeps its account, amount and description; only the side
    /// flips. The reversal points back at the original.
    #[must_use]
    pub fn build(
        ctx: &LedgerContext,
        original: &JournalEntry,
        input: &ReversalInput,
    ) -> JournalEntry {
        let id = JournalEntryId::new();
        let items = original
            .items
            .iter()
            .map(|item| JournalItem {
                id: JournalItemId::new(),
                entry_id: id,
                account_id: item.account_id,
                entry_type: item.entry_type.opposite(),
                amount: item.amount,
                description: item.description.clone(),
            })
            .collect();

        JournalEntry {
            id,
            business_id: ctx.business_id,
            reference_number: input.reference_number.clone(),
            financial_year_id: input.financial_year_id,
            entry_date: input.entry_date,
            narration: format!("Reversal of {}", original.reference_number),
            status: EntryStatus::Posted,
            cash_flow_category: original.cash_flow_category,
            created_by: ctx.actor_id,
            created_at: input.now,
            posted_at: Some(input.now),
            reverses_entry_id: Some(original.id),
            reversed_by_entry_id: None,
            items,
        }
    }

    /// Marks `original` as cancelled by `reversal`.
    #[must_use]
    pub fn cancelled(original: &JournalEntry, reversal: &JournalEntry) -> JournalEntry {
        JournalEntry {
            status: EntryStatus::Cancelled,
            reversed_by_entry_id: Some(reversal.id),
            ..original.clone()
        }
    }
}
