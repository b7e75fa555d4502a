//! Anonymized report types. Nothing in here can carry a merchant description.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// A categorized transaction with the description stripped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub date: String,
    pub amount: f64,
    pub category: String,
}

/// Counts and totals. Totals are kept at full precision and rounded to
/// cents only when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_expenses: usize,
    pub total_income: usize,
    #[serde(serialize_with = "serialize_cents")]
    pub expense_total: f64,
    #[serde(serialize_with = "serialize_cents")]
    pub income_total: f64,
    pub by_category: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateReport {
    pub expenses: Vec<LedgerEntry>,
    pub income: Vec<LedgerEntry>,
    pub summary: Summary,
    /// First word of each unresolved merchant, sorted, at most 20. A word
    /// that would spell out a whole description is cut to its first half
    /// plus `*` (`WOOLWORTHS` becomes `WOOLW*`).
    pub uncategorized_hints: Vec<String>,
    /// Transfer/income rows dropped by exclusion (console only)
    #[serde(skip)]
    pub excluded: usize,
}

impl AggregateReport {
    /// Categories by count, most frequent first (ties by name)
    pub fn categories_by_count(&self) -> Vec<(&str, usize)> {
        let mut out: Vec<_> = self
            .summary
            .by_category
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        out
    }
}

/// Round half away from zero to two decimals
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn serialize_cents<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_cents(*value))
}
