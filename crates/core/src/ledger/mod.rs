//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Journal entry and item value objects
//! - Business rule validation
//! - The posting engine and its store port
//! - Reversals for cancelling posted entries
//! - Balance calculations
//! - Entry templates for collaborators

pub mod balance;
pub mod clock;
pub mod error;
pub mod memory;
pub mod reversal;
pub mod service;
pub mod store;
pub mod templates;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use balance::{AccountBalance, BalanceCalculator, BalanceQuery, RunningBalance};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::LedgerError;
pub use memory::InMemoryLedgerStore;
pub use reversal::{ReversalInput, ReversalService};
pub use service::{DEFAULT_REFERENCE_PREFIX, PostingEngine};
pub use store::{
    AccountGuard, AccountMap, AccountRegistry, EntryGuard, EntryRewrite, EntryTransform,
    LedgerLine, LedgerStore, LineQuery,
};
pub use templates::DocumentLine;
pub use types::{
    CashFlowCategory, DraftUpdate, EntryStatus, EntryTotals, EntryType, JournalEntry, JournalItem,
    JournalItemInput, Leg, NewJournalEntry,
};
