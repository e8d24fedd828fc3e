//! Financial report generation.
//!
//! Reports are composed from the balance calculator:
//! - Trial Balance
//! - Balance Sheet
//! - Income Statement
//! - Cash Flow Statement
//! - General Ledger

pub mod builder;
pub mod cash_flow;
pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
