//! Receivable and payable aging.
//!
//! Buckets outstanding documents by days overdue relative to a reference
//! date: Current, 1-30, 31-60, 61-90 and Over 90.

pub mod engine;
pub mod types;

pub use engine::aging_report;
pub use types::*;
