//! Database error mapping.
//!
//! Unique violations are told apart by constraint name, so the migration's
//! constraint names are part of the contract.

use sea_orm::{DbErr, SqlErr};
use tally_core::ledger::LedgerError;
use tally_shared::types::{AccountId, FinancialYearId};
use thiserror::Error;

/// Unique constraint on `(business_id, reference_number)`.
pub const REFERENCE_CONSTRAINT: &str = "uq_journal_entries_reference";

/// Unique constraint allowing one reversal per original entry.
pub const REVERSAL_CONSTRAINT: &str = "uq_journal_entries_reverses";

/// Unique constraint on `(business_id, code)` of accounts.
pub const ACCOUNT_CODE_CONSTRAINT: &str = "uq_accounts_code";

/// Which ledger constraint a write ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The reference number is taken.
    Reference,
    /// The original already has a reversal.
    Reversal,
    /// The account code is taken.
    AccountCode,
}

impl Violation {
    /// Classifies a unique-violation message by constraint name.
    #[must_use]
    pub fn from_message(message: &str) -> Option<Self> {
        if message.contains(REFERENCE_CONSTRAINT) {
            Some(Self::Reference)
        } else if message.contains(REVERSAL_CONSTRAINT) {
            Some(Self::Reversal)
        } else if message.contains(ACCOUNT_CODE_CONSTRAINT) {
            Some(Self::AccountCode)
        } else {
            None
        }
    }

    /// Classifies a database error.
    #[must_use]
    pub fn of(err: &DbErr) -> Option<Self> {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => Self::from_message(&message),
            _ => None,
        }
    }
}

/// Errors from the master-data repository.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Financial year not found.
    #[error("Financial year not found: {0}")]
    FinancialYearNotFound(FinancialYearId),

    /// Account code already used in the business.
    #[error("Account code already exists: {0}")]
    DuplicateAccountCode(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AccountNotFound(id) => Self::AccountNotFound(id),
            StoreError::FinancialYearNotFound(id) => Self::FinancialYearNotFound(id),
            other => Self::Store(other.to_string()),
        }
    }
}

/// Maps a database error with no ledger meaning.
pub(crate) fn store_error(err: DbErr) -> LedgerError {
    LedgerError::Store(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_from_postgres_message() {
        let message = format!(
            "duplicate key value violates unique constraint \"{REFERENCE_CONSTRAINT}\""
        );
        assert_eq!(Violation::from_message(&message), Some(Violation::Reference));

        let message =
            format!("duplicate key value violates unique constraint \"{REVERSAL_CONSTRAINT}\"");
        assert_eq!(Violation::from_message(&message), Some(Violation::Reversal));

        assert_eq!(
            Violation::from_message("duplicate key value violates unique constraint \"other\""),
            None
        );
    }

    #[test]
    fn test_store_error_into_ledger_error() {
        let id = AccountId::new();
        assert_eq!(
            LedgerError::from(StoreError::AccountNotFound(id)),
            LedgerError::AccountNotFound(id)
        );
        assert!(matches!(
            LedgerError::from(StoreError::DuplicateAccountCode("1000".to_string())),
            LedgerError::Store(_)
        ));
    }

    #[test]
    fn test_plain_db_error_is_not_a_violation() {
        let err = DbErr::Custom("boom".to_string());
        assert_eq!(Violation::of(&err), None);
        assert!(matches!(store_error(err), LedgerError::Store(m) if m.contains("boom")));
    }
}
