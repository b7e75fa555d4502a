//! tally-core: category vocabulary, transaction records and the anonymized report types

pub mod report;
pub mod transaction;
pub mod vocabulary;

pub use report::{AggregateReport, LedgerEntry, Summary};
pub use transaction::TransactionRecord;
pub use vocabulary::{is_excluded, Vocabulary, INCOME, TRANSFER, UNCATEGORIZED};
