//! Repositories over the ledger tables.
//!
//! `PgLedgerStore` implements the ledger store port consumed by the posting
//! engine and the report service; `MasterDataRepository` maintains accounts
//! and financial years.

pub mod ledger_store;
pub mod master_data;

pub use ledger_store::PgLedgerStore;
pub use master_data::MasterDataRepository;
