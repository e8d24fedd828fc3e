//! Ledger domain types for journal entry creation and posting.
//!
//! This module defines the value objects the posting engine operates on.
//! Stores persist them verbatim; they never mutate themselves.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{
    AccountId, BusinessId, FinancialYearId, JournalEntryId, JournalItemId, UserId,
};

/// Entry type: either Debit or Credit.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/equity/revenue accounts
/// - Credits decrease asset/expense accounts, increase liability/equity/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit leg.
    Debit,
    /// Credit leg.
    Credit,
}

impl EntryType {
    /// The other side; used to build reversals.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }

    /// Stable lowercase name, as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

/// Journal entry lifecycle status.
///
/// `draft --post--> posted --cancel--> cancelled`; drafts may also be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Entry is being prepared and can be modified or deleted.
    Draft,
    /// Entry is part of the books (immutable).
    Posted,
    /// Entry was neutralised by a posted reversal (immutable).
    Cancelled,
}

impl EntryStatus {
    /// Returns true if the entry can be modified or deleted.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the entry's items count towards posted balances.
    ///
    /// A cancelled entry keeps counting: its posted reversal offsets it.
    #[must_use]
    pub const fn affects_balances(self) -> bool {
        matches!(self, Self::Posted | Self::Cancelled)
    }

    /// Stable lowercase name, as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses the stored name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "posted" => Some(Self::Posted),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cash-flow statement section an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashFlowCategory {
    /// Day-to-day trading: sales, purchases, wages, expenses.
    Operating,
    /// Long-lived assets and investments.
    Investing,
    /// Loans, owner capital, dividends.
    Financing,
}

impl CashFlowCategory {
    /// Stable lowercase name, as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Operating => "operating",
            Self::Investing => "investing",
            Self::Financing => "financing",
        }
    }

    /// Parses the stored name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "operating" => Some(Self::Operating),
            "investing" => Some(Self::Investing),
            "financing" => Some(Self::Financing),
            _ => None,
        }
    }
}

/// Anything with a side and an amount: item inputs, stored items, ledger lines.
pub trait Leg {
    /// Debit or credit.
    fn entry_type(&self) -> EntryType;
    /// Strictly positive amount.
    fn amount(&self) -> Decimal;

    /// The amount if this is a debit, zero otherwise.
    fn debit(&self) -> Decimal {
        match self.entry_type() {
            EntryType::Debit => self.amount(),
            EntryType::Credit => Decimal::ZERO,
        }
    }

    /// The amount if this is a credit, zero otherwise.
    fn credit(&self) -> Decimal {
        match self.entry_type() {
            EntryType::Debit => Decimal::ZERO,
            EntryType::Credit => self.amount(),
        }
    }
}

/// Input for a single journal item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalItemInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Whether this is a debit or credit item.
    pub entry_type: EntryType,
    /// The amount (must be positive).
    pub amount: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

impl JournalItemInput {
    /// A debit item without description.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            entry_type: EntryType::Debit,
            amount,
            description: None,
        }
    }

    /// A credit item without description.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            entry_type: EntryType::Credit,
            amount,
            description: None,
        }
    }

    /// Attaches a line description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Leg for JournalItemInput {
    fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    fn amount(&self) -> Decimal {
        self.amount
    }
}

/// A stored journal item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalItem {
    /// Unique identifier (time ordered, so items keep their input order).
    pub id: JournalItemId,
    /// The entry this item belongs to.
    pub entry_id: JournalEntryId,
    /// The account affected.
    pub account_id: AccountId,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Strictly positive amount.
    pub amount: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

impl JournalItem {
    /// Materialises an input for the given entry.
    #[must_use]
    pub fn from_input(entry_id: JournalEntryId, input: JournalItemInput) -> Self {
        Self {
            id: JournalItemId::new(),
            entry_id,
            account_id: input.account_id,
            entry_type: input.entry_type,
            amount: input.amount,
            description: input.description,
        }
    }
}

impl Leg for JournalItem {
    fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Input for creating a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJournalEntry {
    /// Reference number, unique per business.
    pub reference_number: String,
    /// Financial year the entry is booked in.
    pub financial_year_id: FinancialYearId,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Narration describing the transaction.
    pub narration: String,
    /// Explicit cash-flow section; overrides narration keywords.
    pub cash_flow_category: Option<CashFlowCategory>,
    /// Items, kept verbatim.
    pub items: Vec<JournalItemInput>,
}

impl NewJournalEntry {
    /// Creates an entry input without a cash-flow tag.
    #[must_use]
    pub fn new(
        reference_number: impl Into<String>,
        financial_year_id: FinancialYearId,
        entry_date: NaiveDate,
        narration: impl Into<String>,
        items: Vec<JournalItemInput>,
    ) -> Self {
        Self {
            reference_number: reference_number.into(),
            financial_year_id,
            entry_date,
            narration: narration.into(),
            cash_flow_category: None,
            items,
        }
    }

    /// Tags the entry with an explicit cash-flow section.
    #[must_use]
    pub fn with_cash_flow_category(mut self, category: CashFlowCategory) -> Self {
        self.cash_flow_category = Some(category);
        self
    }
}

/// Replacement content for a draft entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftUpdate {
    /// New items, replacing all existing ones.
    pub items: Vec<JournalItemInput>,
    /// New narration.
    pub narration: String,
    /// New accounting date.
    pub entry_date: NaiveDate,
}

/// A journal entry with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier (UUID v7).
    pub id: JournalEntryId,
    /// Owning business.
    pub business_id: BusinessId,
    /// Reference number, unique per business.
    pub reference_number: String,
    /// Financial year the entry is booked in.
    pub financial_year_id: FinancialYearId,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Narration.
    pub narration: String,
    /// Lifecycle status.
    pub status: EntryStatus,
    /// Explicit cash-flow section.
    pub cash_flow_category: Option<CashFlowCategory>,
    /// Creator.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// When the entry became posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// The entry this one reverses.
    pub reverses_entry_id: Option<JournalEntryId>,
    /// The reversal that cancelled this entry.
    pub reversed_by_entry_id: Option<JournalEntryId>,
    /// Items in input order.
    pub items: Vec<JournalItem>,
}

impl JournalEntry {
    /// Debit and credit totals of the items.
    #[must_use]
    pub fn totals(&self) -> EntryTotals {
        EntryTotals::of(&self.items)
    }

    /// Returns true if this entry is a reversal of another entry.
    #[must_use]
    pub fn is_reversal(&self) -> bool {
        self.reverses_entry_id.is_some()
    }
}

/// Entry totals for validation and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTotals {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
    /// Whether the entry is balanced (debits == credits).
    pub is_balanced: bool,
}

impl EntryTotals {
    /// Creates totals from debit and credit sums.
    #[must_use]
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self {
            debit,
            credit,
            is_balanced: debit == credit,
        }
    }

    /// Sums the legs.
    #[must_use]
    pub fn of<L: Leg>(legs: &[L]) -> Self {
        let debit: Decimal = legs.iter().map(Leg::debit).sum();
        let credit: Decimal = legs.iter().map(Leg::credit).sum();
        Self::new(debit, credit)
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}
