//! Account balance calculations.
//!
//! The calculator is the single source of truth for balances: every report
//! reads through it, so the same account shows the same figure everywhere.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::LedgerContext;
use tally_shared::types::AccountId;

use super::error::LedgerError;
use super::store::{LedgerStore, LineQuery};
use super::types::Leg;
use crate::account::{Account, NormalBalance};
use crate::fiscal::DateRange;

/// What a balance is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceQuery {
    /// Cumulative from ledger inception through the date (inclusive).
    AsOf(NaiveDate),
    /// Activity strictly inside the range (inclusive bounds).
    Range(DateRange),
}

impl BalanceQuery {
    /// Store filter for this query.
    #[must_use]
    pub fn line_query(self, account_ids: Option<Vec<AccountId>>, posted_only: bool) -> LineQuery {
        let (from, to) = match self {
            Self::AsOf(date) => (None, Some(date)),
            Self::Range(range) => (Some(range.start), Some(range.end)),
        };
        LineQuery {
            account_ids,
            from,
            to,
            include_drafts: !posted_only,
        }
    }
}

/// Debit and credit sums of an account with the signed balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
    /// Net balance, signed by the account's normal side.
    pub balance: Decimal,
}

impl AccountBalance {
    /// A balance with no activity.
    #[must_use]
    pub fn zero(account_id: AccountId) -> Self {
        Self {
            account_id,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
            balance: Decimal::ZERO,
        }
    }

    /// Adds one leg and re-signs the balance.
    pub fn apply(&mut self, normal: NormalBalance, leg: &impl Leg) {
        self.debit_total += leg.debit();
        self.credit_total += leg.credit();
        self.balance = normal.signed(self.debit_total, self.credit_total);
    }

    /// Returns true if any debit or credit was recorded.
    #[must_use]
    pub fn has_activity(&self) -> bool {
        !self.debit_total.is_zero() || !self.credit_total.is_zero()
    }
}

/// Sums the legs for one account.
pub fn summarize<'a, L: Leg + 'a>(
    account: &Account,
    legs: impl IntoIterator<Item = &'a L>,
) -> AccountBalance {
    let normal = account.normal_balance();
    legs.into_iter()
        .fold(AccountBalance::zero(account.id), |mut acc, leg| {
            acc.apply(normal, leg);
            acc
        })
}

/// Running balance after one ledger line.
///
/// `current_balance[n] = previous_balance[n] + change` and
/// `previous_balance[n] = current_balance[n - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Balance before this line.
    pub previous_balance: Decimal,
    /// Balance after this line.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// Starting point of a ledger: the opening balance.
    #[must_use]
    pub fn opening(balance: Decimal) -> Self {
        Self {
            previous_balance: balance,
            current_balance: balance,
        }
    }

    /// The running balance after applying a signed change.
    #[must_use]
    pub fn next(self, change: Decimal) -> Self {
        Self {
            previous_balance: self.current_balance,
            current_balance: self.current_balance + change,
        }
    }
}

/// Computes account balances from the ledger store.
pub struct BalanceCalculator<S> {
    store: Arc<S>,
}

impl<S> Clone for BalanceCalculator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore> BalanceCalculator<S> {
    /// Creates a calculator over the store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Balance of one account.
    ///
    /// With `posted_only` false, draft entries are included too.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` if the account does not exist, or a store error.
    pub async fn balance(
        &self,
        ctx: &LedgerContext,
        account_id: AccountId,
        query: BalanceQuery,
        posted_only: bool,
    ) -> Result<AccountBalance, LedgerError> {
        let account = self
            .store
            .find_account(ctx, account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;
        let lines = self
            .store
            .ledger_lines(ctx, &query.line_query(Some(vec![account_id]), posted_only))
            .await?;
        Ok(summarize(&account, &lines))
    }

    /// Posted balances of many accounts from one store read.
    ///
    /// Every given account gets an entry, zero when it has no activity.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn balances(
        &self,
        ctx: &LedgerContext,
        accounts: &[Account],
        query: BalanceQuery,
    ) -> Result<HashMap<AccountId, AccountBalance>, LedgerError> {
        let ids = accounts.iter().map(|account| account.id).collect();
        let lines = self
            .store
            .ledger_lines(ctx, &query.line_query(Some(ids), true))
            .await?;

        let mut by_account: HashMap<AccountId, Vec<_>> = HashMap::new();
        for line in &lines {
            by_account.entry(line.account_id).or_default().push(line);
        }

        Ok(accounts
            .iter()
            .map(|account| {
                let legs = by_account.get(&account.id).map(Vec::as_slice).unwrap_or_default();
                (account.id, summarize(account, legs.iter().copied()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountCategory;
    use crate::ledger::types::JournalItemInput;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use tally_shared::types::BusinessId;

    fn account(category: AccountCategory) -> Account {
        Account {
            id: AccountId::new(),
            business_id: BusinessId::new(),
            code: "1000".to_string(),
            name: "Test".to_string(),
            category,
            is_active: true,
            is_cash: false,
            system_role: None,
        }
    }

    #[test]
    fn test_debit_normal_balance() {
        let cash = account(AccountCategory::Asset);
        let legs = vec![
            JournalItemInput::debit(cash.id, dec!(1000)),
            JournalItemInput::credit(cash.id, dec!(300)),
        ];
        let balance = summarize(&cash, &legs);
        assert_eq!(balance.debit_total, dec!(1000));
        assert_eq!(balance.credit_total, dec!(300));
        assert_eq!(balance.balance, dec!(700));
    }

    #[test]
    fn test_credit_normal_balance() {
        let revenue = account(AccountCategory::Revenue);
        let legs = vec![
            JournalItemInput::credit(revenue.id, dec!(1000)),
            JournalItemInput::debit(revenue.id, dec!(250)),
        ];
        assert_eq!(summarize(&revenue, &legs).balance, dec!(750));
    }

    #[test]
    fn test_empty_balance_has_no_activity() {
        let legs: Vec<JournalItemInput> = vec![];
        let balance = summarize(&account(AccountCategory::Expense), &legs);
        assert_eq!(balance.balance, Decimal::ZERO);
        assert!(!balance.has_activity());
    }

    #[test]
    fn test_query_bounds() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let as_of = BalanceQuery::AsOf(day).line_query(None, true);
        assert_eq!(as_of.from, None);
        assert_eq!(as_of.to, Some(day));
        assert!(!as_of.include_drafts);

        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let range = BalanceQuery::Range(DateRange::new(start, day).unwrap()).line_query(None, false);
        assert_eq!(range.from, Some(start));
        assert!(range.include_drafts);
    }

    #[test]
    fn test_running_balance_chain() {
        let opening = RunningBalance::opening(dec!(100));
        let first = opening.next(dec!(50));
        let second = first.next(dec!(-30));
        assert_eq!(first.previous_balance, dec!(100));
        assert_eq!(first.current_balance, dec!(150));
        assert_eq!(second.previous_balance, first.current_balance);
        assert_eq!(second.current_balance, dec!(120));
    }

    fn category() -> impl Strategy<Value = AccountCategory> {
        prop::sample::select(AccountCategory::ALL.to_vec())
    }

    fn legs() -> impl Strategy<Value = Vec<(bool, Decimal)>> {
        prop::collection::vec(
            (any::<bool>(), (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))),
            0..20,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The balance sign follows the account category.
        #[test]
        fn prop_balance_sign_matches_category(category in category(), legs in legs()) {
            let account = account(category);
            let items: Vec<JournalItemInput> = legs
                .iter()
                .map(|(is_debit, amount)| {
                    if *is_debit {
                        JournalItemInput::debit(account.id, *amount)
                    } else {
                        JournalItemInput::credit(account.id, *amount)
                    }
                })
                .collect();

            let balance = summarize(&account, &items);
            let raw = balance.debit_total - balance.credit_total;
            match category {
                AccountCategory::Asset | AccountCategory::Expense => {
                    prop_assert_eq!(balance.balance, raw);
                }
                _ => prop_assert_eq!(balance.balance, -raw),
            }

            prop_assert_eq!(summarize(&account, &items), balance);
        }

        /// The last running balance equals opening plus the sum of changes.
        #[test]
        fn prop_running_balance_consistency(
            opening in -1_000_000i64..1_000_000i64,
            changes in prop::collection::vec(-100_000i64..100_000i64, 1..30),
        ) {
            let opening = Decimal::new(opening, 2);
            let changes: Vec<Decimal> = changes.into_iter().map(|c| Decimal::new(c, 2)).collect();

            let mut running = RunningBalance::opening(opening);
            for change in &changes {
                let next = running.next(*change);
                prop_assert_eq!(next.previous_balance, running.current_balance);
                running = next;
            }
            let total: Decimal = changes.iter().sum();
            prop_assert_eq!(running.current_balance, opening + total);
        }
    }
}
