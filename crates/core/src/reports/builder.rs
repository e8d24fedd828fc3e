//! Pure report assembly from computed balances and ledger lines.
//!
//! Nothing here reads the store; `ReportService` gathers the inputs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::FinancialYearId;

use super::types::{
    AccountLedger, AccountLine, BalanceSheetReport, CashFlowLine, CashFlowSection,
    GeneralLedgerLine, IncomeStatementReport, ReportSection, TrialBalanceReport,
    TrialBalanceTotals,
};
use crate::account::{Account, AccountCategory};
use crate::fiscal::DateRange;
use crate::ledger::{CashFlowCategory, LedgerLine, Leg, RunningBalance};

fn by_code(mut lines: Vec<AccountLine>) -> Vec<AccountLine> {
    lines.sort_by(|a, b| a.code.cmp(&b.code));
    lines
}

/// Trial balance over the period's account activity.
///
/// `is_balanced` is an assertion surface: posting keeps every entry
/// balanced, so a false value means an upstream defect.
#[must_use]
pub fn trial_balance(
    financial_year_id: FinancialYearId,
    period: DateRange,
    lines: Vec<AccountLine>,
) -> TrialBalanceReport {
    let accounts = by_code(lines);
    let total_debit: Decimal = accounts.iter().map(|a| a.total_debit).sum();
    let total_credit: Decimal = accounts.iter().map(|a| a.total_credit).sum();

    TrialBalanceReport {
        financial_year_id,
        period,
        accounts,
        totals: TrialBalanceTotals {
            total_debit,
            total_credit,
            is_balanced: total_debit == total_credit,
        },
    }
}

/// Balance sheet from point-in-time balances of every account.
///
/// Revenue and expense accounts are folded into a synthetic retained
/// earnings figure on the equity side.
#[must_use]
pub fn balance_sheet(as_of: NaiveDate, lines: Vec<AccountLine>) -> BalanceSheetReport {
    let mut assets = ReportSection::default();
    let mut liabilities = ReportSection::default();
    let mut equity = ReportSection::default();
    let mut retained_earnings = Decimal::ZERO;

    for line in by_code(lines) {
        match line.category {
            AccountCategory::Asset => assets.push(line),
            AccountCategory::Liability => liabilities.push(line),
            AccountCategory::Equity => equity.push(line),
            AccountCategory::Revenue => retained_earnings += line.balance,
            AccountCategory::Expense => retained_earnings -= line.balance,
        }
    }

    let total_assets = assets.total;
    let total_liabilities = liabilities.total;
    let total_equity = equity.total + retained_earnings;
    let liabilities_and_equity = total_liabilities + total_equity;

    BalanceSheetReport {
        as_of,
        assets,
        liabilities,
        equity,
        retained_earnings,
        total_assets,
        total_liabilities,
        total_equity,
        liabilities_and_equity,
        is_balanced: total_assets == liabilities_and_equity,
    }
}

/// Income statement over the period's revenue and expense activity.
#[must_use]
pub fn income_statement(
    financial_year_id: FinancialYearId,
    period: DateRange,
    lines: Vec<AccountLine>,
) -> IncomeStatementReport {
    let mut revenue = ReportSection::default();
    let mut expenses = ReportSection::default();

    for line in by_code(lines) {
        match line.category {
            AccountCategory::Revenue => revenue.push(line),
            AccountCategory::Expense => expenses.push(line),
            AccountCategory::Asset | AccountCategory::Liability | AccountCategory::Equity => {}
        }
    }

    let net_income = revenue.total - expenses.total;
    IncomeStatementReport {
        financial_year_id,
        period,
        revenue,
        expenses,
        net_income,
    }
}

/// Splits classified cash movements into the three sections.
#[must_use]
pub fn cash_flow_sections(
    lines: Vec<CashFlowLine>,
) -> (CashFlowSection, CashFlowSection, CashFlowSection) {
    let mut operating = CashFlowSection::new(CashFlowCategory::Operating);
    let mut investing = CashFlowSection::new(CashFlowCategory::Investing);
    let mut financing = CashFlowSection::new(CashFlowCategory::Financing);

    for line in lines {
        let section = match line.category {
            CashFlowCategory::Operating => &mut operating,
            CashFlowCategory::Investing => &mut investing,
            CashFlowCategory::Financing => &mut financing,
        };
        section.total += line.amount;
        section.lines.push(line);
    }

    (operating, investing, financing)
}

/// One account's ledger: opening balance, items with running balance, and
/// the closing balance.
///
/// `lines` must be the account's items in the period, already in
/// `(entry_date, entry_id)` order.
#[must_use]
pub fn account_ledger(account: &Account, opening: Decimal, lines: &[&LedgerLine]) -> AccountLedger {
    let normal = account.normal_balance();
    let mut running = RunningBalance::opening(opening);
    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;

    let ledger_lines = lines
        .iter()
        .map(|line| {
            let (debit, credit) = (line.debit(), line.credit());
            total_debit += debit;
            total_credit += credit;
            running = running.next(normal.signed(debit, credit));
            GeneralLedgerLine {
                entry_id: line.entry_id,
                item_id: line.item_id,
                reference_number: line.reference_number.clone(),
                entry_date: line.entry_date,
                narration: line.narration.clone(),
                description: line.description.clone(),
                debit,
                credit,
                running_balance: running.current_balance,
            }
        })
        .collect();

    AccountLedger {
        account_id: account.id,
        code: account.code.clone(),
        name: account.name.clone(),
        category: account.category,
        opening_balance: opening,
        lines: ledger_lines,
        total_debit,
        total_credit,
        closing_balance: running.current_balance,
    }
}
