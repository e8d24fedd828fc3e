//! Seeded books shared by the ledger and report tests.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::LedgerContext;
use tally_shared::types::{AccountId, BusinessId, FinancialYearId, JournalEntryId, UserId};

use super::clock::FixedClock;
use super::memory::InMemoryLedgerStore;
use super::service::PostingEngine;
use super::types::{CashFlowCategory, JournalItemInput, NewJournalEntry};
use crate::account::{Account, AccountCategory, SystemAccountRole};
use crate::fiscal::FinancialYear;

pub(crate) fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).unwrap()
}

/// A business with a chart of accounts and an active FY2026.
pub(crate) struct Books {
    pub store: Arc<InMemoryLedgerStore>,
    pub engine: PostingEngine<InMemoryLedgerStore>,
    pub ctx: LedgerContext,
    pub year: FinancialYear,
    pub cash: Account,
    pub bank: Account,
    pub receivable: Account,
    pub equipment: Account,
    pub payable: Account,
    pub loan: Account,
    pub capital: Account,
    pub opening_equity: Account,
    pub revenue: Account,
    pub expense: Account,
}

impl Books {
    /// Books whose clock reads 2026-06-30.
    pub fn new() -> Self {
        Self::on(date(6, 30))
    }

    pub fn on(today: NaiveDate) -> Self {
        let store = Arc::new(InMemoryLedgerStore::new());
        let ctx = LedgerContext::new(BusinessId::new(), UserId::new());
        let year = FinancialYear {
            id: FinancialYearId::new(),
            business_id: ctx.business_id,
            name: "FY2026".to_string(),
            start_date: date(1, 1),
            end_date: date(12, 31),
            is_active: true,
        };
        store.insert_financial_year(year.clone()).unwrap();

        let account = |code: &str, name: &str, category: AccountCategory| Account {
            id: AccountId::new(),
            business_id: ctx.business_id,
            code: code.to_string(),
            name: name.to_string(),
            category,
            is_active: true,
            is_cash: false,
            system_role: None,
        };
        let cash = Account {
            is_cash: true,
            ..account("1000", "Cash", AccountCategory::Asset)
        };
        let bank = Account {
            is_cash: true,
            ..account("1010", "Bank", AccountCategory::Asset)
        };
        let receivable = Account {
            system_role: Some(SystemAccountRole::Receivable),
            ..account("1200", "Accounts Receivable", AccountCategory::Asset)
        };
        let equipment = account("1500", "Equipment", AccountCategory::Asset);
        let payable = Account {
            system_role: Some(SystemAccountRole::Payable),
            ..account("2000", "Accounts Payable", AccountCategory::Liability)
        };
        let loan = account("2500", "Bank Loan", AccountCategory::Liability);
        let capital = account("3000", "Owner Capital", AccountCategory::Equity);
        let opening_equity = Account {
            system_role: Some(SystemAccountRole::OpeningBalanceEquity),
            ..account("3900", "Opening Balance Equity", AccountCategory::Equity)
        };
        let revenue = account("4000", "Sales", AccountCategory::Revenue);
        let expense = account("5000", "Rent", AccountCategory::Expense);

        for a in [
            &cash,
            &bank,
            &receivable,
            &equipment,
            &payable,
            &loan,
            &capital,
            &opening_equity,
            &revenue,
            &expense,
        ] {
            store.insert_account(a.clone()).unwrap();
        }

        let engine = PostingEngine::new(Arc::clone(&store)).with_clock(Arc::new(FixedClock::on(today)));

        Self {
            store,
            engine,
            ctx,
            year,
            cash,
            bank,
            receivable,
            equipment,
            payable,
            loan,
            capital,
            opening_equity,
            revenue,
            expense,
        }
    }

    /// An entry input in FY2026 with a generated-looking reference.
    pub fn entry(
        &self,
        reference: &str,
        entry_date: NaiveDate,
        narration: &str,
        items: Vec<JournalItemInput>,
    ) -> NewJournalEntry {
        NewJournalEntry::new(reference, self.year.id, entry_date, narration, items)
    }

    /// Posts `debit` against `credit` for `amount` and returns the entry id.
    pub async fn post(
        &self,
        entry_date: NaiveDate,
        narration: &str,
        debit: &Account,
        credit: &Account,
        amount: Decimal,
    ) -> JournalEntryId {
        self.post_tagged(entry_date, narration, debit, credit, amount, None)
            .await
    }

    pub async fn post_tagged(
        &self,
        entry_date: NaiveDate,
        narration: &str,
        debit: &Account,
        credit: &Account,
        amount: Decimal,
        category: Option<CashFlowCategory>,
    ) -> JournalEntryId {
        let reference = self.engine.next_reference_number(&self.ctx).await.unwrap();
        let mut input = self.entry(
            &reference,
            entry_date,
            narration,
            vec![
                JournalItemInput::debit(debit.id, amount),
                JournalItemInput::credit(credit.id, amount),
            ],
        );
        input.cash_flow_category = category;
        self.engine
            .submit_balanced_entry(&self.ctx, input)
            .await
            .unwrap()
    }
}
