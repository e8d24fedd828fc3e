//! Financial year and date range types.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tally_shared::types::{BusinessId, FinancialYearId};

/// Financial year definition.
///
/// Exactly one financial year is active per business. Entries are dated
/// inside the bounds of the year they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialYear {
    /// Unique identifier.
    pub id: FinancialYearId,
    /// Business this financial year belongs to.
    pub business_id: BusinessId,
    /// Year name (e.g., "FY2026").
    pub name: String,
    /// First day of the year.
    pub start_date: NaiveDate,
    /// Last day of the year (inclusive).
    pub end_date: NaiveDate,
    /// Whether this is the current active financial year.
    pub is_active: bool,
}

impl FinancialYear {
    /// Returns true if the given date falls within this year.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if the whole range lies inside this year.
    #[must_use]
    pub fn contains_range(&self, range: &DateRange) -> bool {
        self.contains_date(range.start) && self.contains_date(range.end)
    }

    /// The full year as a date range.
    #[must_use]
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

/// An inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day (inclusive).
    pub start: NaiveDate,
    /// Last day (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, returning `None` when `start` is after `end`.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Returns true if the date falls within the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// The day before the range starts; `None` at the calendar minimum.
    ///
    /// Opening balances are point-in-time balances as of this day.
    #[must_use]
    pub fn day_before_start(&self) -> Option<NaiveDate> {
        self.start.checked_sub_days(Days::new(1))
    }
}
