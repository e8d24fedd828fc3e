//! Chart of accounts and financial year maintenance.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tally_core::account::Account;
use tally_core::fiscal::FinancialYear;
use tally_shared::types::{AccountId, BusinessId};
use tracing::{info, instrument};

use crate::convert::{account_model, financial_year_model};
use crate::entities::{accounts, financial_years};
use crate::error::{StoreError, Violation};

/// Writes the reference data the ledger reads: accounts and financial years.
#[derive(Debug, Clone)]
pub struct MasterDataRepository {
    db: DatabaseConnection,
}

impl MasterDataRepository {
    /// Creates a new repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds an account to the chart of accounts.
    #[instrument(skip_all, fields(business_id = %account.business_id, code = %account.code))]
    pub async fn create_account(&self, account: &Account) -> Result<Account, StoreError> {
        let model = account_model(account)
            .insert(&self.db)
            .await
            .map_err(|err| match Violation::of(&err) {
                Some(Violation::AccountCode) => {
                    StoreError::DuplicateAccountCode(account.code.clone())
                }
                _ => StoreError::Database(err),
            })?;
        info!(account_id = %account.id, "Account created");
        Ok(model.into())
    }

    /// Activates or deactivates an account.
    ///
    /// Deactivation blocks new postings but leaves history and reports intact.
    #[instrument(skip(self))]
    pub async fn set_account_active(
        &self,
        business_id: BusinessId,
        id: AccountId,
        is_active: bool,
    ) -> Result<Account, StoreError> {
        let existing = accounts::Entity::find_by_id(id.into_inner())
            .filter(accounts::Column::BusinessId.eq(business_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(StoreError::AccountNotFound(id))?;

        let mut model: accounts::ActiveModel = existing.into();
        model.is_active = Set(is_active);
        model.updated_at = Set(Utc::now().into());
        let updated = model.update(&self.db).await?;
        Ok(updated.into())
    }

    /// Adds a financial year.
    ///
    /// An active year replaces the business's previously active one.
    #[instrument(skip_all, fields(business_id = %year.business_id, name = %year.name))]
    pub async fn create_financial_year(
        &self,
        year: &FinancialYear,
    ) -> Result<FinancialYear, StoreError> {
        let txn = self.db.begin().await?;

        if year.is_active {
            financial_years::Entity::update_many()
                .col_expr(financial_years::Column::IsActive, Expr::value(false))
                .filter(financial_years::Column::BusinessId.eq(year.business_id.into_inner()))
                .filter(financial_years::Column::IsActive.eq(true))
                .exec(&txn)
                .await?;
        }

        let model = financial_year_model(year).insert(&txn).await?;
        txn.commit().await?;

        info!(financial_year_id = %year.id, active = year.is_active, "Financial year created");
        Ok(model.into())
    }
}
