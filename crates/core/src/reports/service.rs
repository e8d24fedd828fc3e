//! Report generation service.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, FinancialYearId, JournalEntryId};
use tally_shared::{CashFlowMode, LedgerContext};
use tracing::debug;

use super::builder;
use super::cash_flow::classify;
use super::error::ReportError;
use super::types::{
    AccountLine, BalanceSheetReport, CashFlowLine, CashFlowReport, GeneralLedgerReport,
    IncomeStatementReport, TrialBalanceReport,
};
use crate::account::Account;
use crate::fiscal::DateRange;
use crate::ledger::{
    AccountBalance, BalanceCalculator, BalanceQuery, LedgerError, LedgerLine, LedgerStore, Leg,
};

/// Service for generating financial reports.
///
/// Every figure is read through the [`BalanceCalculator`], so an account
/// shows the same balance in every report.
pub struct ReportService<S> {
    store: Arc<S>,
    calculator: BalanceCalculator<S>,
    cash_flow_mode: CashFlowMode,
}

impl<S> Clone for ReportService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            calculator: self.calculator.clone(),
            cash_flow_mode: self.cash_flow_mode,
        }
    }
}

impl<S: LedgerStore> ReportService<S> {
    /// Creates a report service over the store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            calculator: BalanceCalculator::new(Arc::clone(&store)),
            store,
            cash_flow_mode: CashFlowMode::default(),
        }
    }

    /// Sets how cash-flow entries are classified.
    #[must_use]
    pub fn with_cash_flow_mode(mut self, mode: CashFlowMode) -> Self {
        self.cash_flow_mode = mode;
        self
    }

    /// The balance calculator backing every report.
    #[must_use]
    pub fn calculator(&self) -> &BalanceCalculator<S> {
        &self.calculator
    }

    /// Posted balance of one account.
    pub async fn account_balance(
        &self,
        ctx: &LedgerContext,
        account_id: AccountId,
        query: BalanceQuery,
    ) -> Result<AccountBalance, ReportError> {
        self.calculator
            .balance(ctx, account_id, query, true)
            .await
            .map_err(|e| match e {
                LedgerError::AccountNotFound(id) => ReportError::AccountNotFound(id),
                other => other.into(),
            })
    }

    /// Trial balance of the accounts with activity inside the period.
    pub async fn trial_balance(
        &self,
        ctx: &LedgerContext,
        financial_year_id: FinancialYearId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TrialBalanceReport, ReportError> {
        let period = self.period(ctx, financial_year_id, start, end).await?;
        let lines = self.active_lines(ctx, BalanceQuery::Range(period)).await?;

        let report = builder::trial_balance(financial_year_id, period, lines);
        debug!(
            business_id = %ctx.business_id,
            accounts = report.accounts.len(),
            is_balanced = report.totals.is_balanced,
            "Trial balance generated"
        );
        Ok(report)
    }

    /// Balance sheet as of a date, cumulative from ledger inception.
    pub async fn balance_sheet(
        &self,
        ctx: &LedgerContext,
        as_of: NaiveDate,
    ) -> Result<BalanceSheetReport, ReportError> {
        let lines = self.active_lines(ctx, BalanceQuery::AsOf(as_of)).await?;

        let report = builder::balance_sheet(as_of, lines);
        debug!(
            business_id = %ctx.business_id,
            %as_of,
            is_balanced = report.is_balanced,
            "Balance sheet generated"
        );
        Ok(report)
    }

    /// Revenue and expense activity inside the period.
    pub async fn income_statement(
        &self,
        ctx: &LedgerContext,
        financial_year_id: FinancialYearId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<IncomeStatementReport, ReportError> {
        let period = self.period(ctx, financial_year_id, start, end).await?;
        let lines = self.active_lines(ctx, BalanceQuery::Range(period)).await?;

        Ok(builder::income_statement(financial_year_id, period, lines))
    }

    /// Cash-flow statement over the period.
    ///
    /// Each balance-affecting entry touching a cash account contributes its
    /// net cash movement (debit on cash is inflow) to one section. Entries
    /// moving money only between cash accounts net to zero and are left out.
    pub async fn cash_flow(
        &self,
        ctx: &LedgerContext,
        financial_year_id: FinancialYearId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CashFlowReport, ReportError> {
        let period = self.period(ctx, financial_year_id, start, end).await?;
        let cash_accounts: Vec<Account> = self
            .store
            .accounts(ctx)
            .await?
            .into_iter()
            .filter(|account| account.is_cash)
            .collect();
        let cash_ids: Vec<AccountId> = cash_accounts.iter().map(|a| a.id).collect();

        let lines = self
            .store
            .ledger_lines(
                ctx,
                &BalanceQuery::Range(period).line_query(Some(cash_ids.clone()), true),
            )
            .await?;

        let mut by_entry: BTreeMap<(NaiveDate, JournalEntryId), Vec<&LedgerLine>> =
            BTreeMap::new();
        for line in &lines {
            by_entry
                .entry((line.entry_date, line.entry_id))
                .or_default()
                .push(line);
        }

        let classified = by_entry
            .into_values()
            .filter_map(|legs| {
                let amount: Decimal = legs.iter().map(|leg| leg.debit() - leg.credit()).sum();
                let first = legs.first()?;
                if amount.is_zero() {
                    return None;
                }
                let (category, source) =
                    classify(self.cash_flow_mode, first.cash_flow_category, &first.narration);
                Some(CashFlowLine {
                    entry_id: first.entry_id,
                    reference_number: first.reference_number.clone(),
                    entry_date: first.entry_date,
                    narration: first.narration.clone(),
                    category,
                    source,
                    amount,
                })
            })
            .collect();
        let (operating, investing, financing) = builder::cash_flow_sections(classified);

        let opening_cash = match period.day_before_start() {
            Some(day) => self.cash_total(ctx, &cash_accounts, day).await?,
            None => Decimal::ZERO,
        };
        let closing_cash = self.cash_total(ctx, &cash_accounts, period.end).await?;
        let net_change = operating.total + investing.total + financing.total;

        Ok(CashFlowReport {
            financial_year_id,
            period,
            cash_accounts: cash_ids,
            opening_cash,
            operating,
            investing,
            financing,
            net_change,
            closing_cash,
            reconciles: opening_cash + net_change == closing_cash,
        })
    }

    /// General ledger over the period.
    ///
    /// With `account_id`, only that account is reported. Otherwise every
    /// account with an opening balance or activity in the period is, by code.
    pub async fn general_ledger(
        &self,
        ctx: &LedgerContext,
        financial_year_id: FinancialYearId,
        start: NaiveDate,
        end: NaiveDate,
        account_id: Option<AccountId>,
    ) -> Result<GeneralLedgerReport, ReportError> {
        let period = self.period(ctx, financial_year_id, start, end).await?;

        let mut accounts = match account_id {
            Some(id) => vec![
                self.store
                    .find_account(ctx, id)
                    .await?
                    .ok_or(ReportError::AccountNotFound(id))?,
            ],
            None => self.store.accounts(ctx).await?,
        };
        accounts.sort_by(|a, b| a.code.cmp(&b.code));

        let openings = match period.day_before_start() {
            Some(day) => {
                self.calculator
                    .balances(ctx, &accounts, BalanceQuery::AsOf(day))
                    .await?
            }
            None => accounts
                .iter()
                .map(|a| (a.id, AccountBalance::zero(a.id)))
                .collect(),
        };

        let ids = accounts.iter().map(|a| a.id).collect();
        let lines = self
            .store
            .ledger_lines(ctx, &BalanceQuery::Range(period).line_query(Some(ids), true))
            .await?;
        let mut by_account: BTreeMap<AccountId, Vec<&LedgerLine>> = BTreeMap::new();
        for line in &lines {
            by_account.entry(line.account_id).or_default().push(line);
        }

        let ledgers = accounts
            .iter()
            .filter_map(|account| {
                let opening = openings
                    .get(&account.id)
                    .map_or(Decimal::ZERO, |b| b.balance);
                let account_lines = by_account.get(&account.id).map(Vec::as_slice);
                let has_lines = account_lines.is_some_and(|l| !l.is_empty());
                if account_id.is_none() && opening.is_zero() && !has_lines {
                    return None;
                }
                Some(builder::account_ledger(
                    account,
                    opening,
                    account_lines.unwrap_or_default(),
                ))
            })
            .collect();

        Ok(GeneralLedgerReport {
            financial_year_id,
            period,
            accounts: ledgers,
        })
    }

    /// Validates a period against its financial year.
    async fn period(
        &self,
        ctx: &LedgerContext,
        financial_year_id: FinancialYearId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DateRange, ReportError> {
        let period = DateRange::new(start, end).ok_or(ReportError::InvalidDateRange { start, end })?;
        let year = self
            .store
            .financial_year(ctx, financial_year_id)
            .await?
            .ok_or(ReportError::FinancialYearNotFound(financial_year_id))?;
        if !year.contains_range(&period) {
            return Err(ReportError::RangeOutsideFinancialYear {
                start,
                end,
                financial_year_id,
            });
        }
        Ok(period)
    }

    /// Report lines of every account with activity under the query.
    async fn active_lines(
        &self,
        ctx: &LedgerContext,
        query: BalanceQuery,
    ) -> Result<Vec<AccountLine>, ReportError> {
        let accounts = self.store.accounts(ctx).await?;
        let balances = self.calculator.balances(ctx, &accounts, query).await?;

        Ok(accounts
            .iter()
            .filter_map(|account| {
                balances
                    .get(&account.id)
                    .filter(|balance| balance.has_activity())
                    .map(|balance| AccountLine::new(account, balance))
            })
            .collect())
    }

    async fn cash_total(
        &self,
        ctx: &LedgerContext,
        cash_accounts: &[Account],
        as_of: NaiveDate,
    ) -> Result<Decimal, ReportError> {
        let balances = self
            .calculator
            .balances(ctx, cash_accounts, BalanceQuery::AsOf(as_of))
            .await?;
        Ok(balances.values().map(|b| b.balance).sum())
    }
}
