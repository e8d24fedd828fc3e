//! Chart of accounts as seen by the ledger.
//!
//! Accounts are owned by the master-data module; the ledger only reads them.
//! The category decides the normal-balance side, through one mapping.

pub mod category;

pub use category::{Account, AccountCategory, NormalBalance, SystemAccountRole};
