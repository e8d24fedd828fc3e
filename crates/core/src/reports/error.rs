//! Report error types.

use chrono::NaiveDate;
use tally_shared::types::{AccountId, FinancialYearId};
use thiserror::Error;

use crate::ledger::LedgerError;

/// Errors that can occur during report generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Financial year not found.
    #[error("Financial year not found: {0}")]
    FinancialYearNotFound(FinancialYearId),

    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// The range is not inside the financial year.
    #[error("Date range {start} to {end} is outside financial year {financial_year_id}")]
    RangeOutsideFinancialYear {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
        /// The financial year.
        financial_year_id: FinancialYearId,
    },

    /// Failure reading the ledger.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::FinancialYearNotFound(_) => "FINANCIAL_YEAR_NOT_FOUND",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::RangeOutsideFinancialYear { .. } => "RANGE_OUTSIDE_FINANCIAL_YEAR",
            Self::Ledger(e) => e.error_code(),
        }
    }
}
