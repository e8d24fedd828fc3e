//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, FinancialYearId, JournalEntryId, JournalItemId};

use crate::account::{Account, AccountCategory};
use crate::fiscal::DateRange;
use crate::ledger::{AccountBalance, CashFlowCategory};

/// One account's figures in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLine {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account category.
    pub category: AccountCategory,
    /// Total debit amount.
    pub total_debit: Decimal,
    /// Total credit amount.
    pub total_credit: Decimal,
    /// Net balance, signed by the account's normal side.
    pub balance: Decimal,
}

impl AccountLine {
    /// Joins an account with its computed balance.
    #[must_use]
    pub fn new(account: &Account, balance: &AccountBalance) -> Self {
        Self {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            category: account.category,
            total_debit: balance.debit_total,
            total_credit: balance.credit_total,
            balance: balance.balance,
        }
    }
}

/// Trial balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Financial year the report is scoped to.
    pub financial_year_id: FinancialYearId,
    /// Reporting period.
    pub period: DateRange,
    /// Accounts with activity in the period, by code.
    pub accounts: Vec<AccountLine>,
    /// Totals.
    pub totals: TrialBalanceTotals,
}

/// Trial balance totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Total debit.
    pub total_debit: Decimal,
    /// Total credit.
    pub total_credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

/// Balance sheet section (assets, liabilities, equity).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSection {
    /// Section total.
    pub total: Decimal,
    /// Accounts in this section.
    pub accounts: Vec<AccountLine>,
}

impl ReportSection {
    pub(crate) fn push(&mut self, line: AccountLine) {
        self.total += line.balance;
        self.accounts.push(line);
    }
}

/// Balance sheet report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// As of date.
    pub as_of: NaiveDate,
    /// Assets section.
    pub assets: ReportSection,
    /// Liabilities section.
    pub liabilities: ReportSection,
    /// Equity accounts section.
    pub equity: ReportSection,
    /// Cumulative revenue minus expense through `as_of`.
    pub retained_earnings: Decimal,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
    /// Equity accounts plus retained earnings.
    pub total_equity: Decimal,
    /// Liabilities plus equity.
    pub liabilities_and_equity: Decimal,
    /// Whether assets equal liabilities plus equity.
    pub is_balanced: bool,
}

/// Income statement report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatementReport {
    /// Financial year the report is scoped to.
    pub financial_year_id: FinancialYearId,
    /// Reporting period.
    pub period: DateRange,
    /// Revenue section.
    pub revenue: ReportSection,
    /// Expense section.
    pub expenses: ReportSection,
    /// Revenue minus expenses.
    pub net_income: Decimal,
}

/// How an entry's cash-flow section was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    /// Explicit tag on the entry.
    Tag,
    /// A narration keyword matched.
    Keyword,
    /// Nothing matched; operating by default.
    Default,
}

/// One entry's net cash movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowLine {
    /// The entry.
    pub entry_id: JournalEntryId,
    /// Entry reference number.
    pub reference_number: String,
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Entry narration.
    pub narration: String,
    /// Section the entry was classified into.
    pub category: CashFlowCategory,
    /// How the section was decided.
    pub source: ClassificationSource,
    /// Inflow (positive) or outflow (negative) across all cash accounts.
    pub amount: Decimal,
}

/// One section of the cash-flow statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowSection {
    /// The section.
    pub category: CashFlowCategory,
    /// Net cash of the section.
    pub total: Decimal,
    /// Classified entries, chronologically.
    pub lines: Vec<CashFlowLine>,
}

impl CashFlowSection {
    pub(crate) fn new(category: CashFlowCategory) -> Self {
        Self {
            category,
            total: Decimal::ZERO,
            lines: Vec::new(),
        }
    }
}

/// Cash-flow statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowReport {
    /// Financial year the report is scoped to.
    pub financial_year_id: FinancialYearId,
    /// Reporting period.
    pub period: DateRange,
    /// Cash accounts included.
    pub cash_accounts: Vec<AccountId>,
    /// Cash as of the day before the period.
    pub opening_cash: Decimal,
    /// Operating activities.
    pub operating: CashFlowSection,
    /// Investing activities.
    pub investing: CashFlowSection,
    /// Financing activities.
    pub financing: CashFlowSection,
    /// Sum of the three sections.
    pub net_change: Decimal,
    /// Cash as of the period end.
    pub closing_cash: Decimal,
    /// Whether opening plus net change equals closing.
    pub reconciles: bool,
}

/// One item in an account ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralLedgerLine {
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
    /// Item description.
    pub description: Option<String>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Balance after this item.
    pub running_balance: Decimal,
}

/// Ledger of one account over the period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountLedger {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account category.
    pub category: AccountCategory,
    /// Balance as of the day before the period.
    pub opening_balance: Decimal,
    /// Items in `(entry_date, entry_id)` order.
    pub lines: Vec<GeneralLedgerLine>,
    /// Total debits in the period.
    pub total_debit: Decimal,
    /// Total credits in the period.
    pub total_credit: Decimal,
    /// Balance as of the period end.
    pub closing_balance: Decimal,
}

/// General ledger report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralLedgerReport {
    /// Financial year the report is scoped to.
    pub financial_year_id: FinancialYearId,
    /// Reporting period.
    pub period: DateRange,
    /// Selected accounts, by code.
    pub accounts: Vec<AccountLedger>,
}
