//! PostgreSQL persistence for the Tally ledger.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for accounts, financial years and journal entries
//! - `PgLedgerStore`, the PostgreSQL implementation of the ledger store port
//! - `MasterDataRepository` for chart-of-accounts and financial-year writes
//! - Database migrations with the balance and immutability triggers

pub mod convert;
pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;

pub use error::{StoreError, Violation};
pub use repositories::{MasterDataRepository, PgLedgerStore};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tally_shared::DatabaseConfig;

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}
