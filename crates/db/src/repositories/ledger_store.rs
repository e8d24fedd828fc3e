//! PostgreSQL implementation of the ledger store port.
//!
//! Every state-dependent write runs in one database transaction that first
//! locks the entry row with `SELECT ... FOR UPDATE`; the guard or transform
//! closure runs while the lock is held. Accounts handed to a closure are read
//! `FOR SHARE`, so an account cannot be deactivated until the write commits.
//! Unique constraints back up the reference number and the
//! one-reversal-per-entry rules.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
    TransactionTrait, Value,
};
use tally_core::account::Account;
use tally_core::fiscal::FinancialYear;
use tally_core::ledger::{
    AccountGuard, AccountMap, AccountRegistry, EntryGuard, EntryRewrite, EntryTransform,
    JournalEntry, LedgerError, LedgerLine, LedgerStore, LineQuery, ReversalService,
};
use tally_shared::LedgerContext;
use tally_shared::types::{AccountId, FinancialYearId, JournalEntryId, JournalItemId};
use tracing::{debug, instrument};

use crate::convert::{entry_model, item_models, journal_entry};
use crate::entities::sea_orm_active_enums::EntryStatus;
use crate::entities::{accounts, financial_years, journal_entries, journal_items};
use crate::error::{Violation, store_error};

const NEXT_SEQUENCE_SQL: &str = r"
INSERT INTO reference_sequences (business_id, prefix, last_value)
VALUES ($1, $2, 1)
ON CONFLICT (business_id, prefix)
DO UPDATE SET last_value = reference_sequences.last_value + 1
RETURNING last_value
";

/// Maps a failed insert of `entry` to the ledger error it stands for.
fn insert_error(err: DbErr, entry: &JournalEntry) -> LedgerError {
    match Violation::of(&err) {
        Some(Violation::Reference) => {
            LedgerError::DuplicateReference(entry.reference_number.clone())
        }
        Some(Violation::Reversal) => {
            LedgerError::AlreadyCancelled(entry.reverses_entry_id.unwrap_or(entry.id))
        }
        _ => store_error(err),
    }
}

/// Ledger store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    db: DatabaseConnection,
}

impl PgLedgerStore {
    /// Creates a new store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads and row-locks an entry of the business.
    async fn lock_entry(
        txn: &DatabaseTransaction,
        ctx: &LedgerContext,
        id: JournalEntryId,
    ) -> Result<JournalEntry, LedgerError> {
        let header = journal_entries::Entity::find_by_id(id.into_inner())
            .filter(journal_entries::Column::BusinessId.eq(ctx.business_id.into_inner()))
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(store_error)?
            .ok_or(LedgerError::NotFound(id))?;
        let items = Self::items(txn, id).await?;
        Ok(journal_entry(header, items))
    }

    /// Loads the business's accounts the entry references, share-locked.
    async fn lock_accounts(
        txn: &DatabaseTransaction,
        ctx: &LedgerContext,
        entry: &JournalEntry,
    ) -> Result<AccountMap, LedgerError> {
        let mut ids: Vec<_> = entry
            .items
            .iter()
            .map(|item| item.account_id.into_inner())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(AccountMap::new());
        }
        let models = accounts::Entity::find()
            .filter(accounts::Column::BusinessId.eq(ctx.business_id.into_inner()))
            .filter(accounts::Column::Id.is_in(ids))
            .order_by_asc(accounts::Column::Id)
            .lock_shared()
            .all(txn)
            .await
            .map_err(store_error)?;
        Ok(models
            .into_iter()
            .map(|model| {
                let account = Account::from(model);
                (account.id, account)
            })
            .collect())
    }

    async fn items<C: ConnectionTrait>(
        conn: &C,
        id: JournalEntryId,
    ) -> Result<Vec<journal_items::Model>, LedgerError> {
        journal_items::Entity::find()
            .filter(journal_items::Column::EntryId.eq(id.into_inner()))
            .order_by_asc(journal_items::Column::Id)
            .all(conn)
            .await
            .map_err(store_error)
    }

    async fn insert_items(
        txn: &DatabaseTransaction,
        entry: &JournalEntry,
    ) -> Result<(), LedgerError> {
        let items = item_models(entry);
        if items.is_empty() {
            return Ok(());
        }
        journal_items::Entity::insert_many(items)
            .exec(txn)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn insert_with_items(
        txn: &DatabaseTransaction,
        entry: &JournalEntry,
    ) -> Result<(), LedgerError> {
        entry_model(entry)
            .insert(txn)
            .await
            .map_err(|e| insert_error(e, entry))?;
        Self::insert_items(txn, entry).await
    }
}

#[async_trait]
impl AccountRegistry for PgLedgerStore {
    async fn accounts(&self, ctx: &LedgerContext) -> Result<Vec<Account>, LedgerError> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::BusinessId.eq(ctx.business_id.into_inner()))
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(store_error)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_account(
        &self,
        ctx: &LedgerContext,
        id: AccountId,
    ) -> Result<Option<Account>, LedgerError> {
        let model = accounts::Entity::find_by_id(id.into_inner())
            .filter(accounts::Column::BusinessId.eq(ctx.business_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(Into::into))
    }

    async fn financial_year(
        &self,
        ctx: &LedgerContext,
        id: FinancialYearId,
    ) -> Result<Option<FinancialYear>, LedgerError> {
        let model = financial_years::Entity::find_by_id(id.into_inner())
            .filter(financial_years::Column::BusinessId.eq(ctx.business_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(Into::into))
    }

    async fn active_financial_year(
        &self,
        ctx: &LedgerContext,
    ) -> Result<Option<FinancialYear>, LedgerError> {
        let model = financial_years::Entity::find()
            .filter(financial_years::Column::BusinessId.eq(ctx.business_id.into_inner()))
            .filter(financial_years::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.map(Into::into))
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    #[instrument(skip_all, fields(business_id = %ctx.business_id, reference = %entry.reference_number))]
    async fn insert_entry(
        &self,
        ctx: &LedgerContext,
        entry: &JournalEntry,
        guard: AccountGuard<'_>,
    ) -> Result<(), LedgerError> {
        if entry.business_id != ctx.business_id {
            return Err(LedgerError::Store(
                "entry belongs to another business".to_string(),
            ));
        }
        let txn = self.db.begin().await.map_err(store_error)?;
        guard(&Self::lock_accounts(&txn, ctx, entry).await?)?;
        Self::insert_with_items(&txn, entry).await?;
        txn.commit().await.map_err(store_error)?;
        debug!(entry_id = %entry.id, status = %entry.status, "Journal entry stored");
        Ok(())
    }

    async fn find_entry(
        &self,
        ctx: &LedgerContext,
        id: JournalEntryId,
    ) -> Result<Option<JournalEntry>, LedgerError> {
        let Some(header) = journal_entries::Entity::find_by_id(id.into_inner())
            .filter(journal_entries::Column::BusinessId.eq(ctx.business_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_error)?
        else {
            return Ok(None);
        };
        let items = Self::items(&self.db, id).await?;
        Ok(Some(journal_entry(header, items)))
    }

    #[instrument(skip_all, fields(business_id = %ctx.business_id, entry_id = %id))]
    async fn replace_entry(
        &self,
        ctx: &LedgerContext,
        id: JournalEntryId,
        rewrite: EntryRewrite<'_>,
    ) -> Result<JournalEntry, LedgerError> {
        let txn = self.db.begin().await.map_err(store_error)?;
        let current = Self::lock_entry(&txn, ctx, id).await?;
        let accounts = Self::lock_accounts(&txn, ctx, &current).await?;
        let updated = rewrite(&current, &accounts)?;

        // Items change only while the entry is still a draft.
        if updated.items != current.items {
            journal_items::Entity::delete_many()
                .filter(journal_items::Column::EntryId.eq(id.into_inner()))
                .exec(&txn)
                .await
                .map_err(store_error)?;
            Self::insert_items(&txn, &updated).await?;
        }
        entry_model(&updated)
            .update(&txn)
            .await
            .map_err(|e| insert_error(e, &updated))?;

        txn.commit().await.map_err(store_error)?;
        Ok(updated)
    }

    #[instrument(skip_all, fields(business_id = %ctx.business_id, entry_id = %id))]
    async fn delete_entry(
        &self,
        ctx: &LedgerContext,
        id: JournalEntryId,
        guard: EntryGuard<'_>,
    ) -> Result<(), LedgerError> {
        let txn = self.db.begin().await.map_err(store_error)?;
        let current = Self::lock_entry(&txn, ctx, id).await?;
        guard(&current)?;

        journal_entries::Entity::delete_by_id(id.into_inner())
            .exec(&txn)
            .await
            .map_err(store_error)?;
        txn.commit().await.map_err(store_error)?;
        Ok(())
    }

    #[instrument(skip_all, fields(business_id = %ctx.business_id, original_id = %original_id))]
    async fn record_reversal(
        &self,
        ctx: &LedgerContext,
        original_id: JournalEntryId,
        build: EntryTransform<'_>,
    ) -> Result<JournalEntry, LedgerError> {
        let txn = self.db.begin().await.map_err(store_error)?;
        let original = Self::lock_entry(&txn, ctx, original_id).await?;
        if original.reversed_by_entry_id.is_some() {
            return Err(LedgerError::AlreadyCancelled(original_id));
        }

        let reversal = build(&original)?;
        Self::insert_with_items(&txn, &reversal).await?;
        entry_model(&ReversalService::cancelled(&original, &reversal))
            .update(&txn)
            .await
            .map_err(store_error)?;

        txn.commit().await.map_err(store_error)?;
        debug!(reversal_id = %reversal.id, "Reversal stored");
        Ok(reversal)
    }

    async fn next_sequence(&self, ctx: &LedgerContext, prefix: &str) -> Result<u64, LedgerError> {
        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                NEXT_SEQUENCE_SQL,
                [Value::from(ctx.business_id.into_inner()), Value::from(prefix)],
            ))
            .await
            .map_err(store_error)?
            .ok_or_else(|| LedgerError::Store("sequence upsert returned no row".to_string()))?;
        let value: i64 = row.try_get("", "last_value").map_err(store_error)?;
        u64::try_from(value).map_err(|e| LedgerError::Store(e.to_string()))
    }

    async fn ledger_lines(
        &self,
        ctx: &LedgerContext,
        query: &LineQuery,
    ) -> Result<Vec<LedgerLine>, LedgerError> {
        let mut statuses = vec![EntryStatus::Posted, EntryStatus::Cancelled];
        if query.include_drafts {
            statuses.push(EntryStatus::Draft);
        }

        let mut select = journal_items::Entity::find()
            .find_also_related(journal_entries::Entity)
            .filter(journal_entries::Column::BusinessId.eq(ctx.business_id.into_inner()))
            .filter(journal_entries::Column::Status.is_in(statuses));
        if let Some(ids) = &query.account_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            select = select.filter(
                journal_items::Column::AccountId.is_in(ids.iter().map(|id| id.into_inner())),
            );
        }
        if let Some(from) = query.from {
            select = select.filter(journal_entries::Column::EntryDate.gte(from));
        }
        if let Some(to) = query.to {
            select = select.filter(journal_entries::Column::EntryDate.lte(to));
        }

        let rows = select
            .order_by_asc(journal_entries::Column::EntryDate)
            .order_by_asc(journal_entries::Column::Id)
            .order_by_asc(journal_items::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_error)?;

        Ok(rows
            .into_iter()
            .filter_map(|(item, header)| {
                let header = header?;
                Some(LedgerLine {
                    entry_id: JournalEntryId::from_uuid(header.id),
                    item_id: JournalItemId::from_uuid(item.id),
                    reference_number: header.reference_number,
                    entry_date: header.entry_date,
                    narration: header.narration,
                    status: header.status.into(),
                    cash_flow_category: header.cash_flow_category.map(Into::into),
                    created_at: header.created_at.with_timezone(&chrono::Utc),
                    account_id: AccountId::from_uuid(item.account_id),
                    entry_type: item.entry_type.into(),
                    amount: item.amount,
                    description: item.description,
                })
            })
            .collect())
    }
}
