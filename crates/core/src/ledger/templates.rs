//! Balanced item sets for the ledger's collaborators.
//!
//! Invoicing, purchasing and payments post through
//! `PostingEngine::submit_balanced_entry`; these helpers build their items
//! against system accounts resolved by role.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::LedgerContext;
use tally_shared::types::AccountId;

use super::error::LedgerError;
use super::store::AccountRegistry;
use super::types::JournalItemInput;
use crate::account::{Account, NormalBalance, SystemAccountRole};

/// One revenue or expense line of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLine {
    /// Revenue (invoice) or expense (bill) account.
    pub account_id: AccountId,
    /// Line amount before tax.
    pub amount: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

impl DocumentLine {
    /// A line without description.
    #[must_use]
    pub fn new(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            amount,
            description: None,
        }
    }
}

/// Resolves the account holding `role`.
///
/// # Errors
///
/// `MissingSystemAccount` if no account has the role.
pub async fn system_account<R: AccountRegistry + ?Sized>(
    registry: &R,
    ctx: &LedgerContext,
    role: SystemAccountRole,
) -> Result<Account, LedgerError> {
    registry
        .system_account(ctx, role)
        .await?
        .ok_or(LedgerError::MissingSystemAccount(role))
}

fn line_item(line: &DocumentLine, debit: bool) -> JournalItemInput {
    let item = if debit {
        JournalItemInput::debit(line.account_id, line.amount)
    } else {
        JournalItemInput::credit(line.account_id, line.amount)
    };
    match &line.description {
        Some(description) => item.with_description(description.clone()),
        None => item,
    }
}

fn document_total(lines: &[DocumentLine], tax: Decimal) -> Decimal {
    lines.iter().map(|line| line.amount).sum::<Decimal>() + tax
}

/// Sales invoice: debit Receivable for the total, credit each revenue line
/// and credit TaxPayable when tax is nonzero.
///
/// # Errors
///
/// `MissingSystemAccount` for Receivable, or TaxPayable when taxed.
pub async fn sales_invoice<R: AccountRegistry + ?Sized>(
    registry: &R,
    ctx: &LedgerContext,
    lines: &[DocumentLine],
    tax: Decimal,
) -> Result<Vec<JournalItemInput>, LedgerError> {
    let receivable = system_account(registry, ctx, SystemAccountRole::Receivable).await?;
    let mut items = vec![JournalItemInput::debit(
        receivable.id,
        document_total(lines, tax),
    )];
    items.extend(lines.iter().map(|line| line_item(line, false)));
    if !tax.is_zero() {
        let tax_payable = system_account(registry, ctx, SystemAccountRole::TaxPayable).await?;
        items.push(JournalItemInput::credit(tax_payable.id, tax));
    }
    Ok(items)
}

/// Vendor bill: debit each expense line, debit TaxReceivable when tax is
/// nonzero and credit Payable for the total.
///
/// # Errors
///
/// `MissingSystemAccount` for Payable, or TaxReceivable when taxed.
pub async fn vendor_bill<R: AccountRegistry + ?Sized>(
    registry: &R,
    ctx: &LedgerContext,
    lines: &[DocumentLine],
    tax: Decimal,
) -> Result<Vec<JournalItemInput>, LedgerError> {
    let payable = system_account(registry, ctx, SystemAccountRole::Payable).await?;
    let mut items: Vec<JournalItemInput> = lines.iter().map(|line| line_item(line, true)).collect();
    if !tax.is_zero() {
        let tax_receivable = system_account(registry, ctx, SystemAccountRole::TaxReceivable).await?;
        items.push(JournalItemInput::debit(tax_receivable.id, tax));
    }
    items.push(JournalItemInput::credit(
        payable.id,
        document_total(lines, tax),
    ));
    Ok(items)
}

/// Customer payment: debit the cash account, credit Receivable.
///
/// # Errors
///
/// `MissingSystemAccount` for Receivable.
pub async fn payment_received<R: AccountRegistry + ?Sized>(
    registry: &R,
    ctx: &LedgerContext,
    cash_account_id: AccountId,
    amount: Decimal,
) -> Result<Vec<JournalItemInput>, LedgerError> {
    let receivable = system_account(registry, ctx, SystemAccountRole::Receivable).await?;
    Ok(vec![
        JournalItemInput::debit(cash_account_id, amount),
        JournalItemInput::credit(receivable.id, amount),
    ])
}

/// Vendor payment: debit Payable, credit the cash account.
///
/// # Errors
///
/// `MissingSystemAccount` for Payable.
pub async fn payment_made<R: AccountRegistry + ?Sized>(
    registry: &R,
    ctx: &LedgerContext,
    cash_account_id: AccountId,
    amount: Decimal,
) -> Result<Vec<JournalItemInput>, LedgerError> {
    let payable = system_account(registry, ctx, SystemAccountRole::Payable).await?;
    Ok(vec![
        JournalItemInput::debit(payable.id, amount),
        JournalItemInput::credit(cash_account_id, amount),
    ])
}

/// Opening balance of `account` against OpeningBalanceEquity.
///
/// A positive `balance` lands on the account's normal side; a negative one on
/// the other side.
///
/// # Errors
///
/// `NonPositiveAmount` for a zero balance, `MissingSystemAccount` for
/// OpeningBalanceEquity.
pub async fn opening_balance<R: AccountRegistry + ?Sized>(
    registry: &R,
    ctx: &LedgerContext,
    account: &Account,
    balance: Decimal,
) -> Result<Vec<JournalItemInput>, LedgerError> {
    if balance.is_zero() {
        return Err(LedgerError::NonPositiveAmount {
            index: 0,
            amount: balance,
        });
    }
    let equity = system_account(registry, ctx, SystemAccountRole::OpeningBalanceEquity).await?;
    let amount = balance.abs();
    let debit_account = match (account.normal_balance(), balance.is_sign_positive()) {
        (NormalBalance::Debit, true) | (NormalBalance::Credit, false) => true,
        (NormalBalance::Debit, false) | (NormalBalance::Credit, true) => false,
    };
    Ok(if debit_account {
        vec![
            JournalItemInput::debit(account.id, amount),
            JournalItemInput::credit(equity.id, amount),
        ]
    } else {
        vec![
            JournalItemInput::debit(equity.id, amount),
            JournalItemInput::credit(account.id, amount),
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountCategory;
    use crate::ledger::memory::InMemoryLedgerStore;
    use crate::ledger::types::{EntryTotals, EntryType};
    use rust_decimal_macros::dec;
    use tally_shared::types::{BusinessId, UserId};

    fn account(
        ctx: &LedgerContext,
        code: &str,
        category: AccountCategory,
        role: Option<SystemAccountRole>,
    ) -> Account {
        Account {
            id: AccountId::new(),
            business_id: ctx.business_id,
            code: code.to_string(),
            name: code.to_string(),
            category,
            is_active: true,
            is_cash: false,
            system_role: role,
        }
    }

    fn registry(
        ctx: &LedgerContext,
        roles: &[(SystemAccountRole, AccountCategory)],
    ) -> InMemoryLedgerStore {
        let store = InMemoryLedgerStore::new();
        for (i, (role, category)) in roles.iter().enumerate() {
            store
                .insert_account(account(ctx, &format!("9{i:03}"), *category, Some(*role)))
                .unwrap();
        }
        store
    }

    fn ctx() -> LedgerContext {
        LedgerContext::new(BusinessId::new(), UserId::new())
    }

    #[tokio::test]
    async fn test_sales_invoice_with_tax_balances() {
        let ctx = ctx();
        let store = registry(
            &ctx,
            &[
                (SystemAccountRole::Receivable, AccountCategory::Asset),
                (SystemAccountRole::TaxPayable, AccountCategory::Liability),
            ],
        );
        let sales = AccountId::new();
        let items = sales_invoice(
            &store,
            &ctx,
            &[DocumentLine::new(sales, dec!(1000))],
            dec!(100),
        )
        .await
        .unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].entry_type, EntryType::Debit);
        assert_eq!(items[0].amount, dec!(1100));
        assert!(EntryTotals::of(&items).is_balanced);
    }

    #[tokio::test]
    async fn test_untaxed_invoice_needs_no_tax_account() {
        let ctx = ctx();
        let store = registry(&ctx, &[(SystemAccountRole::Receivable, AccountCategory::Asset)]);
        let items = sales_invoice(
            &store,
            &ctx,
            &[DocumentLine::new(AccountId::new(), dec!(500))],
            Decimal::ZERO,
        )
        .await
        .unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_vendor_bill_missing_payable() {
        let ctx = ctx();
        let store = registry(&ctx, &[]);
        let result = vendor_bill(
            &store,
            &ctx,
            &[DocumentLine::new(AccountId::new(), dec!(50))],
            Decimal::ZERO,
        )
        .await;
        assert_eq!(
            result,
            Err(LedgerError::MissingSystemAccount(SystemAccountRole::Payable))
        );
    }

    #[tokio::test]
    async fn test_vendor_bill_with_tax_balances() {
        let ctx = ctx();
        let store = registry(
            &ctx,
            &[
                (SystemAccountRole::Payable, AccountCategory::Liability),
                (SystemAccountRole::TaxReceivable, AccountCategory::Asset),
            ],
        );
        let items = vendor_bill(
            &store,
            &ctx,
            &[
                DocumentLine::new(AccountId::new(), dec!(200)),
                DocumentLine::new(AccountId::new(), dec!(300)),
            ],
            dec!(50),
        )
        .await
        .unwrap();
        let totals = EntryTotals::of(&items);
        assert!(totals.is_balanced);
        assert_eq!(totals.credit, dec!(550));
    }

    #[tokio::test]
    async fn test_payments_hit_cash() {
        let ctx = ctx();
        let store = registry(
            &ctx,
            &[
                (SystemAccountRole::Receivable, AccountCategory::Asset),
                (SystemAccountRole::Payable, AccountCategory::Liability),
            ],
        );
        let cash = AccountId::new();

        let received = payment_received(&store, &ctx, cash, dec!(75)).await.unwrap();
        assert_eq!(received[0].account_id, cash);
        assert_eq!(received[0].entry_type, EntryType::Debit);

        let made = payment_made(&store, &ctx, cash, dec!(25)).await.unwrap();
        assert_eq!(made[1].account_id, cash);
        assert_eq!(made[1].entry_type, EntryType::Credit);
    }

    #[tokio::test]
    async fn test_opening_balance_sides() {
        let ctx = ctx();
        let store = registry(
            &ctx,
            &[(SystemAccountRole::OpeningBalanceEquity, AccountCategory::Equity)],
        );
        let bank = account(&ctx, "1100", AccountCategory::Asset, None);
        let loan = account(&ctx, "2100", AccountCategory::Liability, None);

        let asset = opening_balance(&store, &ctx, &bank, dec!(5000)).await.unwrap();
        assert_eq!(asset[0].account_id, bank.id);
        assert_eq!(asset[0].entry_type, EntryType::Debit);

        let liability = opening_balance(&store, &ctx, &loan, dec!(2000)).await.unwrap();
        assert_eq!(liability[1].account_id, loan.id);
        assert_eq!(liability[1].entry_type, EntryType::Credit);

        let overdrawn = opening_balance(&store, &ctx, &bank, dec!(-300)).await.unwrap();
        assert_eq!(overdrawn[1].account_id, bank.id);
        assert_eq!(overdrawn[1].amount, dec!(300));

        assert!(matches!(
            opening_balance(&store, &ctx, &bank, Decimal::ZERO).await,
            Err(LedgerError::NonPositiveAmount { .. })
        ));
    }
}
