//! Serialize an [`AggregateReport`] to its two output artifacts

use std::io::Write;

use tally_core::{AggregateReport, LedgerEntry};

use crate::error::Result;

/// Indented JSON report, totals rounded to cents
pub fn to_json(report: &AggregateReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Expense-only import file: `date,amount,category`
pub fn write_import_csv<W: Write>(entries: &[LedgerEntry], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["date", "amount", "category"])?;
    for e in entries {
        wtr.write_record([e.date.as_str(), &format_amount(e.amount), e.category.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: &str, amount: f64, category: &str) -> LedgerEntry {
        LedgerEntry {
            date: date.into(),
            amount,
            category: category.into(),
        }
    }

    #[test]
    fn test_json_shape() {
        let mut report = AggregateReport::default();
        report.expenses.push(entry("2024-02-01", 45.0, "Groceries"));
        report.summary.total_expenses = 1;
        report.summary.expense_total = 45.004;
        report.summary.by_category.insert("Groceries".into(), 1);

        let json = to_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["expenses"][0]["category"], "Groceries");
        assert_eq!(value["expenses"][0]["date"], "2024-02-01");
        assert!(value["expenses"][0].get("description").is_none());
        assert_eq!(value["summary"]["expense_total"], serde_json::json!(45.0));
        assert_eq!(value["summary"]["by_category"]["Groceries"], 1);
        assert!(value["income"].as_array().unwrap().is_empty());
        assert!(json.contains("\n  "));
    }

    #[test]
    fn test_import_csv() {
        let mut buf = Vec::new();
        write_import_csv(
            &[
                entry("2024-02-01", 45.0, "Groceries"),
                entry("2024-02-02", 4.5, "Personal Care"),
            ],
            &mut buf,
        )
        .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "date,amount,category\n2024-02-01,45.00,Groceries\n2024-02-02,4.50,Personal Care\n"
        );
    }

    #[test]
    fn test_import_csv_header_only_when_empty() {
        let mut buf = Vec::new();
        write_import_csv(&[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "date,amount,category\n");
    }
}
