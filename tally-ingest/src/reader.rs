//! Read a statement CSV into canonical records

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tally_core::TransactionRecord;
use tracing::{debug, warn};

use crate::error::IngestError;
use crate::formats::{detect, FormatId};
use crate::rows::{normalize_row, RawRow};

/// A parsed statement
#[derive(Debug, Clone)]
pub struct Statement {
    pub format: FormatId,
    pub headers: Vec<String>,
    pub records: Vec<TransactionRecord>,
    /// Rows skipped because of a missing column, a bad amount or a broken record
    pub skipped: usize,
}

/// Open and parse a statement file.
///
/// `explicit` bypasses header detection; the caller's choice is trusted.
pub fn read_statement(
    path: impl AsRef<Path>,
    explicit: Option<FormatId>,
) -> Result<Statement, IngestError> {
    let file = File::open(path.as_ref())?;
    read_statement_from(file, explicit)
}

/// Parse a statement from any reader. A leading UTF-8 BOM is tolerated.
pub fn read_statement_from<R: Read>(
    reader: R,
    explicit: Option<FormatId>,
) -> Result<Statement, IngestError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    // Lookup is exact, so headers are stored the way detection sees them
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let format = match explicit {
        Some(f) => f,
        None => detect(&headers).ok_or_else(|| IngestError::UndetectableFormat {
            headers: headers.clone(),
        })?,
    };
    let descriptor = format.descriptor();
    debug!(format = %format, "Reading statement");

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in rdr.records().enumerate() {
        // +2: one for the header row, one for 1-based line numbers
        let line = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = %e, "Skipping unreadable row");
                skipped += 1;
                continue;
            }
        };

        match normalize_row(&RawRow::new(&headers, &record), descriptor) {
            Ok(Some(t)) => records.push(t),
            Ok(None) => debug!(line, "Dropping row without debit or credit"),
            Err(e) => {
                warn!(line, error = %e, "Skipping row");
                skipped += 1;
            }
        }
    }

    debug!(count = records.len(), skipped, "Parsed statement rows");

    Ok(Statement {
        format,
        headers,
        records,
        skipped,
    })
}
