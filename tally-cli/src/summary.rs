use std::path::PathBuf;
use tally_core::AggregateReport;
use tally_finance::ResolveStats;
use tally_ingest::FormatId;

use crate::pipeline::VocabularySource;

pub struct RunInfo {
    pub input: PathBuf,
    pub format: FormatId,
    pub vocabulary_source: VocabularySource,
    pub vocabulary_size: usize,
    pub parsed: usize,
    pub skipped: usize,
    pub stats: ResolveStats,
    pub json: Option<PathBuf>,
    pub csv: Option<PathBuf>,
}

pub fn print_summary(report: &AggregateReport, info: &RunInfo) {
    let s = &report.summary;

    println!("Parsed {} transactions from {} ({})", info.parsed, info.input.display(), info.format);
    if info.skipped > 0 {
        println!("Skipped {} unreadable rows", info.skipped);
    }
    println!(
        "Categories: {} ({})",
        info.vocabulary_size,
        info.vocabulary_source.label()
    );
    println!(
        "Resolved: remapped={} rules={} ai={} web={} default={} unknown={}",
        info.stats.remapped,
        info.stats.rule_matched,
        info.stats.ai_resolved,
        info.stats.web_retried,
        info.stats.defaulted,
        info.stats.uncategorized
    );
    if report.excluded > 0 {
        println!("Excluded {} transfer/income rows (--keep-transfers to keep)", report.excluded);
    }

    println!();
    println!("Expenses: {:>5}  total=${:.2}", s.total_expenses, s.expense_total);
    println!("Income:   {:>5}  total=${:.2}", s.total_income, s.income_total);

    if !s.by_category.is_empty() {
        println!("\nBy category:");
        for (name, count) in report.categories_by_count() {
            println!("  {name:<20} {count:>5}");
        }
    }

    if !report.uncategorized_hints.is_empty() {
        println!("\nUncategorized merchants (add rules to your categories file):");
        for hint in &report.uncategorized_hints {
            println!("  - {hint}");
        }
    }

    println!();
    if let Some(p) = &info.json {
        println!("Wrote {}", p.display());
    }
    if let Some(p) = &info.csv {
        println!("Wrote {}", p.display());
    }
}
