//! Row normalizer: one raw CSV row -> one canonical [`TransactionRecord`]

use chrono::NaiveDate;
use csv::StringRecord;
use tally_core::TransactionRecord;

use crate::error::RowError;
use crate::formats::{AmountColumns, FormatDescriptor};

/// Patterns tried after the format's own date pattern
const FALLBACK_DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y"];

const CURRENCY_SYMBOLS: &[char] = &['$', '£', '€', '¥'];

/// A CSV record viewed through its header row
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    headers: &'a [String],
    record: &'a StringRecord,
}

impl<'a> RawRow<'a> {
    pub fn new(headers: &'a [String], record: &'a StringRecord) -> Self {
        Self { headers, record }
    }

    /// Value of `column` (exact, case-sensitive header match)
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.record.get(idx)
    }

    fn require(&self, column: &str) -> Result<&'a str, RowError> {
        self.get(column)
            .ok_or_else(|| RowError::MissingColumn(column.to_string()))
    }
}

/// Parse a money string such as `"$1,234.50"` or `"-45.00"`.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && !CURRENCY_SYMBOLS.contains(c) && !c.is_whitespace())
        .collect();
    let value: f64 = cleaned.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Normalize a date to `YYYY-MM-DD`.
///
/// Tries `pattern`, then the common fallbacks. If nothing parses the trimmed
/// input is returned as is.
pub fn parse_date(text: &str, pattern: &str) -> String {
    let text = text.trim();
    std::iter::once(pattern)
        .chain(FALLBACK_DATE_FORMATS.iter().copied())
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| text.to_string())
}

fn amount_from(column: &str, value: &str) -> Result<f64, RowError> {
    parse_amount(value).ok_or_else(|| RowError::InvalidAmount {
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Convert one raw row using `format`.
///
/// `Ok(None)` means the row carries no money at all (empty debit and credit)
/// and is dropped without a warning.
pub fn normalize_row(
    row: &RawRow<'_>,
    format: &FormatDescriptor,
) -> Result<Option<TransactionRecord>, RowError> {
    let (amount, is_expense) = match format.amount {
        AmountColumns::Signed { amount } => {
            let value = amount_from(amount, row.require(amount)?)?;
            (value, value > 0.0)
        }
        AmountColumns::DebitCredit { debit, credit } => {
            let debit_raw = row.get(debit);
            let credit_raw = row.get(credit);
            if debit_raw.is_none() && credit_raw.is_none() {
                return Err(RowError::MissingColumn(debit.to_string()));
            }
            let debit_raw = debit_raw.unwrap_or("").trim();
            let credit_raw = credit_raw.unwrap_or("").trim();

            if !debit_raw.is_empty() {
                (amount_from(debit, debit_raw)?, true)
            } else if !credit_raw.is_empty() {
                (amount_from(credit, credit_raw)?, false)
            } else {
                return Ok(None);
            }
        }
    };

    let date = parse_date(row.require(format.date_col)?, format.date_format);
    let description = row.require(format.description_col)?.trim();

    let mut record = TransactionRecord::new(date, amount, is_expense, description);

    if let Some(cat_col) = format.category_col {
        let category = row.get(cat_col).unwrap_or("").trim();
        let sub = format
            .subcategory_col
            .and_then(|c| row.get(c))
            .unwrap_or("")
            .trim();
        if !category.is_empty() {
            record = record.with_source_category(category, sub);
        }
    }

    Ok(Some(record))
}
