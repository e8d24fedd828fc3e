//! Ledger error types for validation, state and configuration errors.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, FinancialYearId, JournalEntryId};
use thiserror::Error;

use super::types::EntryStatus;
use crate::account::SystemAccountRole;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Debits and credits differ, or the entry has fewer than two items.
    #[error("Entry is not balanced. Debit: {debit}, Credit: {credit}, Items: {item_count}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
        /// Number of items on the entry.
        item_count: usize,
    },

    /// An item amount is zero or negative.
    #[error("Item {index} amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// Position of the item in the entry.
        index: usize,
        /// The rejected amount.
        amount: Decimal,
    },

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account is inactive and cannot be posted to.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    /// Entry date is outside the referenced financial year.
    #[error("Entry date {date} is outside financial year {financial_year_id}")]
    EntryDateOutsideFinancialYear {
        /// The entry date.
        date: NaiveDate,
        /// The financial year.
        financial_year_id: FinancialYearId,
    },

    // ========== State Errors ==========
    /// Entry not found.
    #[error("Journal entry not found: {0}")]
    NotFound(JournalEntryId),

    /// Operation requires a draft entry.
    #[error("Journal entry {id} is {status}, only drafts can be changed or posted")]
    NotDraft {
        /// The entry.
        id: JournalEntryId,
        /// Its current status.
        status: EntryStatus,
    },

    /// Cancellation requires a posted entry; drafts are deleted instead.
    #[error("Journal entry {0} is a draft and has nothing to reverse")]
    NotPosted(JournalEntryId),

    /// Entry has already been cancelled.
    #[error("Journal entry {0} is already cancelled")]
    AlreadyCancelled(JournalEntryId),

    /// Reference number already used.
    #[error("Reference number {0} already exists")]
    DuplicateReference(String),

    // ========== Configuration Errors ==========
    /// No active financial year.
    #[error("No active financial year covers {0}")]
    MissingActiveFinancialYear(NaiveDate),

    /// Financial year not found.
    #[error("Financial year not found: {0}")]
    FinancialYearNotFound(FinancialYearId),

    /// A required system account is not configured.
    #[error("System account with role {0} is not configured")]
    MissingSystemAccount(SystemAccountRole),

    // ========== Store Errors ==========
    /// Persistence failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unbalanced { .. } => "UNBALANCED",
            Self::NonPositiveAmount { .. } => "NON_POSITIVE_AMOUNT",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::EntryDateOutsideFinancialYear { .. } => "ENTRY_DATE_OUTSIDE_FINANCIAL_YEAR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::NotDraft { .. } => "NOT_DRAFT",
            Self::NotPosted(_) => "NOT_POSTED",
            Self::AlreadyCancelled(_) => "ALREADY_CANCELLED",
            Self::DuplicateReference(_) => "DUPLICATE_REFERENCE",
            Self::MissingActiveFinancialYear(_) => "MISSING_ACTIVE_FINANCIAL_YEAR",
            Self::FinancialYearNotFound(_) => "FINANCIAL_YEAR_NOT_FOUND",
            Self::MissingSystemAccount(_) => "MISSING_SYSTEM_ACCOUNT",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns true for errors an administrator must fix before retrying.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingActiveFinancialYear(_)
                | Self::FinancialYearNotFound(_)
                | Self::MissingSystemAccount(_)
        )
    }

    /// Returns true for conflicts with the current stored state.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DuplicateReference(_) | Self::AlreadyCancelled(_) | Self::NotDraft { .. }
        )
    }
}
