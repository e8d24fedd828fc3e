//! Core ledger logic for Tally.
//!
//! This crate contains the double-entry engine with ZERO web or database
//! dependencies. Persistence is reached through the `ledger::LedgerStore`
//! port; the `db` crate provides the PostgreSQL implementation and
//! `ledger::InMemoryLedgerStore` serves tests and embedded use.
//!
//! # Modules
//!
//! - `account` - Chart of accounts categories and normal-balance rules
//! - `fiscal` - Financial years and reporting date ranges
//! - `ledger` - Journal entries, posting engine, store port
//! - `reports` - Balance calculator consumers: statements and ledgers
//! - `aging` - Receivable/payable aging buckets

pub mod account;
pub mod aging;
pub mod fiscal;
pub mod ledger;
pub mod reports;
