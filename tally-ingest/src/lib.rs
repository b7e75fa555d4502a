//! tally-ingest: statement format registry, header detection and row normalization.

pub mod error;
pub mod formats;
pub mod reader;
pub mod rows;

pub use error::{IngestError, RowError};
pub use formats::{detect, AmountColumns, FormatDescriptor, FormatId};
pub use reader::{read_statement, read_statement_from, Statement};
pub use rows::{normalize_row, parse_amount, parse_date, RawRow};
