//! Shared types and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - The explicit request context threaded into every ledger call
//! - Configuration management

pub mod config;
pub mod context;
pub mod types;

pub use config::{AppConfig, CashFlowMode, DatabaseConfig, LedgerConfig, LogFormat, LoggingConfig};
pub use context::LedgerContext;
