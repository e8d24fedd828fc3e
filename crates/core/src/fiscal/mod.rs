//! Financial year and reporting range management.

pub mod period;

pub use period::{DateRange, FinancialYear};
