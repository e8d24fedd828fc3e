//! `SeaORM` entity prelude.

pub use super::accounts::Entity as Accounts;
pub use super::financial_years::Entity as FinancialYears;
pub use super::journal_entries::Entity as JournalEntries;
pub use super::journal_items::Entity as JournalItems;
pub use super::reference_sequences::Entity as ReferenceSequences;
