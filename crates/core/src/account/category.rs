//! Account categories and normal-balance rules.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, BusinessId};

/// Account category.
///
/// - Asset/Expense: debit-normal
/// - Liability/Equity/Revenue: credit-normal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountCategory {
    /// Resources owned by the business.
    Asset,
    /// Obligations owed to others.
    Liability,
    /// Owners' residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountCategory {
    /// All categories in chart-of-accounts order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// The side on which balances of this category grow.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Stable lowercase name, as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for AccountCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown account category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown account category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for AccountCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" => Ok(Self::Revenue),
            "expense" => Ok(Self::Expense),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// Normal-balance side of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalBalance {
    /// Balance = debits - credits.
    Debit,
    /// Balance = credits - debits.
    Credit,
}

impl NormalBalance {
    /// Signed balance for the given debit and credit sums.
    #[must_use]
    pub fn signed(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// Roles the ledger's collaborators resolve accounts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemAccountRole {
    /// Trade receivables (customer invoices).
    Receivable,
    /// Trade payables (vendor bills).
    Payable,
    /// Counterpart of opening balances.
    OpeningBalanceEquity,
    /// Output tax collected on sales.
    TaxPayable,
    /// Input tax paid on purchases.
    TaxReceivable,
}

impl SystemAccountRole {
    /// Stable snake_case name, as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Receivable => "receivable",
            Self::Payable => "payable",
            Self::OpeningBalanceEquity => "opening_balance_equity",
            Self::TaxPayable => "tax_payable",
            Self::TaxReceivable => "tax_receivable",
        }
    }

    /// Parses the stored name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "receivable" => Some(Self::Receivable),
            "payable" => Some(Self::Payable),
            "opening_balance_equity" => Some(Self::OpeningBalanceEquity),
            "tax_payable" => Some(Self::TaxPayable),
            "tax_receivable" => Some(Self::TaxReceivable),
            _ => None,
        }
    }
}

impl fmt::Display for SystemAccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chart-of-accounts entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Owning business.
    pub business_id: BusinessId,
    /// Account code, unique per business and sortable (e.g. "1000").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Category deciding the normal balance.
    pub category: AccountCategory,
    /// Inactive accounts cannot receive new postings.
    pub is_active: bool,
    /// Cash or bank account; drives the cash-flow statement.
    pub is_cash: bool,
    /// Role for system accounts resolved by collaborators.
    pub system_role: Option<SystemAccountRole>,
}

impl Account {
    /// Shortcut for `self.category.normal_balance()`.
    #[must_use]
    pub const fn normal_balance(&self) -> NormalBalance {
        self.category.normal_balance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(AccountCategory::Asset, NormalBalance::Debit)]
    #[case(AccountCategory::Expense, NormalBalance::Debit)]
    #[case(AccountCategory::Liability, NormalBalance::Credit)]
    #[case(AccountCategory::Equity, NormalBalance::Credit)]
    #[case(AccountCategory::Revenue, NormalBalance::Credit)]
    fn test_normal_balance_by_category(
        #[case] category: AccountCategory,
        #[case] expected: NormalBalance,
    ) {
        assert_eq!(category.normal_balance(), expected);
    }

    #[test]
    fn test_debit_normal_signed() {
        let side = NormalBalance::Debit;
        assert_eq!(side.signed(dec!(100), dec!(0)), dec!(100));
        assert_eq!(side.signed(dec!(0), dec!(50)), dec!(-50));
        assert_eq!(side.signed(dec!(100), dec!(30)), dec!(70));
    }

    #[test]
    fn test_credit_normal_signed() {
        let side = NormalBalance::Credit;
        assert_eq!(side.signed(dec!(0), dec!(100)), dec!(100));
        assert_eq!(side.signed(dec!(50), dec!(0)), dec!(-50));
        assert_eq!(side.signed(dec!(30), dec!(100)), dec!(70));
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in AccountCategory::ALL {
            assert_eq!(category.as_str().parse::<AccountCategory>().unwrap(), category);
        }
        assert_eq!("ASSET".parse::<AccountCategory>().unwrap(), AccountCategory::Asset);
        assert!("cash".parse::<AccountCategory>().is_err());
    }

    #[test]
    fn test_system_role_parse() {
        assert_eq!(
            SystemAccountRole::parse("opening_balance_equity"),
            Some(SystemAccountRole::OpeningBalanceEquity)
        );
        assert_eq!(SystemAccountRole::parse("bank"), None);
    }
}
