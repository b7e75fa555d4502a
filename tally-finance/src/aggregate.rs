//! Fold resolved records into the anonymized report.
//!
//! This is where descriptions are dropped: records go in, description-free
//! [`LedgerEntry`] values come out.
//!
//! Hints are the first word of each unresolved description, but they may be
//! cut: when that word contains any full description (a one-word merchant
//! such as `WOOLWORTHS`) the hint becomes its leading half plus `*`, here
//! `WOOLW*`.

use std::collections::{BTreeSet, HashSet};

use tally_core::{is_excluded, AggregateReport, LedgerEntry, TransactionRecord};

const MAX_HINTS: usize = 20;

/// Running aggregation over resolved transactions
pub struct Aggregator {
    exclude_reserved: bool,
    report: AggregateReport,
    hints: BTreeSet<String>,
    descriptions: HashSet<String>,
}

impl Aggregator {
    /// `exclude_reserved` drops Transfer/Income categorized rows
    pub fn new(exclude_reserved: bool) -> Self {
        Self {
            exclude_reserved,
            report: AggregateReport::default(),
            hints: BTreeSet::new(),
            descriptions: HashSet::new(),
        }
    }

    /// Aggregate a whole statement in one go
    pub fn fold(
        records: impl IntoIterator<Item = TransactionRecord>,
        exclude_reserved: bool,
    ) -> AggregateReport {
        let mut agg = Self::new(exclude_reserved);
        for r in records {
            agg.push(r);
        }
        agg.finish()
    }

    pub fn push(&mut self, record: TransactionRecord) {
        let description = record.description.trim().to_string();

        if record.is_uncategorized() {
            self.hints.insert(first_token(&description));
        }
        if !description.is_empty() {
            self.descriptions.insert(description);
        }

        if self.exclude_reserved && is_excluded(&record.category) {
            self.report.excluded += 1;
            return;
        }

        *self
            .report
            .summary
            .by_category
            .entry(record.category.clone())
            .or_insert(0) += 1;

        let entry = LedgerEntry {
            date: record.date,
            amount: record.amount,
            category: record.category,
        };
        let summary = &mut self.report.summary;
        if record.is_expense {
            summary.expense_total += entry.amount;
            summary.total_expenses += 1;
            self.report.expenses.push(entry);
        } else {
            summary.income_total += entry.amount;
            summary.total_income += 1;
            self.report.income.push(entry);
        }
    }

    pub fn finish(mut self) -> AggregateReport {
        let redacted: BTreeSet<String> = self
            .hints
            .iter()
            .filter_map(|h| redact(h, &self.descriptions))
            .collect();
        self.report.uncategorized_hints = redacted.into_iter().take(MAX_HINTS).collect();
        self.report
    }
}

fn first_token(description: &str) -> String {
    description
        .split_whitespace()
        .next()
        .unwrap_or("Unknown")
        .to_string()
}

/// A hint must never contain a full description. Halve it once if it does,
/// and give up on it if that is still not enough.
fn redact(hint: &str, descriptions: &HashSet<String>) -> Option<String> {
    let leaks = |h: &str| descriptions.iter().any(|d| h.contains(d.as_str()));
    if !leaks(hint) {
        return Some(hint.to_string());
    }
    let keep = hint.chars().count() / 2;
    let prefix: String = hint.chars().take(keep).collect();
    if prefix.is_empty() || leaks(&prefix) {
        None
    } else {
        Some(format!("{prefix}*"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::UNCATEGORIZED;

    fn rec(amount: f64, is_expense: bool, category: &str, desc: &str) -> TransactionRecord {
        TransactionRecord::new("2024-02-01", amount, is_expense, desc).with_category(category)
    }

    #[test]
    fn test_partition_and_totals() {
        let report = Aggregator::fold(
            vec![
                rec(45.0, true, "Groceries", "WOOLWORTHS 1"),
                rec(4.5, true, "Coffee", "BEAN BAR"),
                rec(4.5, true, "Coffee", "BEAN BAR"),
                rec(1000.0, false, "Shopping", "REFUND STORE"),
            ],
            true,
        );
        assert_eq!(report.expenses.len(), 3);
        assert_eq!(report.income.len(), 1);
        assert_eq!(report.summary.total_expenses, 3);
        assert_eq!(report.summary.total_income, 1);
        assert!((report.summary.expense_total - 54.0).abs() < 1e-9);
        assert_eq!(report.summary.income_total, 1000.0);
        assert_eq!(report.summary.by_category["Coffee"], 2);
        assert_eq!(report.summary.by_category["Shopping"], 1);
    }

    #[test]
    fn test_exclusion_on() {
        let report = Aggregator::fold(
            vec![
                rec(500.0, true, "Transfer", "TRANSFER TO SAVINGS"),
                rec(3000.0, false, "Income", "SALARY ACME"),
                rec(12.0, true, "Dining", "THAI PLACE"),
            ],
            true,
        );
        assert_eq!(report.excluded, 2);
        assert_eq!(report.expenses.len(), 1);
        assert!(report.income.is_empty());
        let all = report.expenses.iter().chain(&report.income);
        assert!(all.into_iter().all(|e| !is_excluded(&e.category)));
        assert!(!report.summary.by_category.contains_key("Transfer"));
    }

    #[test]
    fn test_exclusion_off_keeps_by_expense_flag() {
        let report = Aggregator::fold(
            vec![
                rec(500.0, true, "Transfer", "TRANSFER TO SAVINGS"),
                rec(3000.0, false, "Income", "SALARY ACME"),
            ],
            false,
        );
        assert_eq!(report.excluded, 0);
        assert_eq!(report.expenses[0].category, "Transfer");
        assert_eq!(report.income[0].category, "Income");
        assert_eq!(report.summary.by_category["Income"], 1);
    }

    #[test]
    fn test_hints_first_token_deduplicated() {
        let report = Aggregator::fold(
            vec![
                rec(1.0, true, UNCATEGORIZED, "ACME PTY LTD 123"),
                rec(2.0, true, UNCATEGORIZED, "ACME PTY LTD 456"),
                rec(3.0, true, UNCATEGORIZED, "ZORB INDUSTRIES"),
                rec(4.0, true, "Coffee", "BEAN BAR"),
            ],
            true,
        );
        assert_eq!(report.uncategorized_hints, vec!["ACME", "ZORB"]);
    }

    #[test]
    fn test_hint_never_equals_a_description() {
        let report = Aggregator::fold(
            vec![
                rec(1.0, true, UNCATEGORIZED, "WOOLWORTHS"),
                rec(1.0, true, UNCATEGORIZED, ""),
            ],
            true,
        );
        assert_eq!(report.uncategorized_hints, vec!["Unknown", "WOOLW*"]);
    }

    #[test]
    fn test_hint_cut_when_token_is_another_description() {
        let report = Aggregator::fold(
            vec![
                rec(1.0, true, UNCATEGORIZED, "ACME PTY LTD"),
                rec(1.0, true, "Shopping", "ACME"),
                rec(1.0, true, UNCATEGORIZED, "ZORB INDUSTRIES"),
            ],
            true,
        );
        assert_eq!(report.uncategorized_hints, vec!["AC*", "ZORB"]);
    }

    #[test]
    fn test_hints_capped() {
        let records: Vec<_> = (0..30)
            .map(|i| rec(1.0, true, UNCATEGORIZED, &format!("M{i:02} SHOP")))
            .collect();
        let report = Aggregator::fold(records, true);
        assert_eq!(report.uncategorized_hints.len(), 20);
    }

    #[test]
    fn test_amounts_never_negative() {
        let report = Aggregator::fold(vec![rec(-7.25, false, "Fees", "BANK FEE REVERSAL")], true);
        assert_eq!(report.income[0].amount, 7.25);
    }
}
