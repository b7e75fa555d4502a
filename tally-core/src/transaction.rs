//! Canonical transaction record produced by the row normalizer

use crate::vocabulary::UNCATEGORIZED;

/// One statement line after normalization.
///
/// The description only lives as long as categorization needs it: the
/// record is deliberately not `Serialize`, and the aggregator converts it
/// into a description-free [`crate::LedgerEntry`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// ISO-8601 day, or the original text when no date pattern matched
    pub date: String,
    /// Always >= 0; direction lives in `is_expense`
    pub amount: f64,
    pub is_expense: bool,
    /// Starts as the sentinel until resolution completes
    pub category: String,
    pub description: String,
    /// Category/subcategory the bank already assigned, if the format has them
    pub source_category: Option<(String, String)>,
}

impl TransactionRecord {
    /// Create a new record, uncategorized
    pub fn new(
        date: impl Into<String>,
        amount: f64,
        is_expense: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            amount: amount.abs(),
            is_expense,
            category: UNCATEGORIZED.to_string(),
            description: description.into(),
            source_category: None,
        }
    }

    pub fn with_source_category(
        mut self,
        category: impl Into<String>,
        subcategory: impl Into<String>,
    ) -> Self {
        self.source_category = Some((category.into(), subcategory.into()));
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn is_uncategorized(&self) -> bool {
        self.category == UNCATEGORIZED
    }
}
