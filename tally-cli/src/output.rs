//! Where the report and the import CSV land

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tally_core::AggregateReport;
use tally_finance::report::{to_json, write_import_csv};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonTarget {
    Stdout,
    File(PathBuf),
}

impl JsonTarget {
    /// `-` means stdout; no `--output` means `<stem>.json` beside the input
    pub fn resolve(input: &Path, output: Option<&Path>) -> Self {
        match output {
            Some(p) if p == Path::new("-") => JsonTarget::Stdout,
            Some(p) => JsonTarget::File(p.to_path_buf()),
            None => JsonTarget::File(input.with_extension("json")),
        }
    }
}

/// `<input stem>.import.csv`, next to the JSON file (or the input when the
/// JSON goes to stdout)
pub fn csv_path(input: &Path, json: &JsonTarget) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "statement".to_string());
    let dir = match json {
        JsonTarget::File(p) => p.parent(),
        JsonTarget::Stdout => input.parent(),
    }
    .unwrap_or_else(|| Path::new(""));
    dir.join(format!("{stem}.import.csv"))
}

#[derive(Debug, Default)]
pub struct Written {
    pub json: Option<PathBuf>,
    pub csv: Option<PathBuf>,
}

pub fn write_outputs(
    report: &AggregateReport,
    input: &Path,
    json: &JsonTarget,
    with_csv: bool,
) -> Result<Written> {
    let mut written = Written::default();
    let body = to_json(report).context("serialize report")?;

    match json {
        JsonTarget::Stdout => {
            let mut out = io::stdout().lock();
            writeln!(out, "{body}").context("write report to stdout")?;
        }
        JsonTarget::File(path) => {
            fs::write(path, format!("{body}\n"))
                .with_context(|| format!("write {}", path.display()))?;
            written.json = Some(path.clone());
        }
    }

    if with_csv && !report.expenses.is_empty() {
        let path = csv_path(input, json);
        let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
        write_import_csv(&report.expenses, BufWriter::new(file))
            .with_context(|| format!("write {}", path.display()))?;
        written.csv = Some(path);
    }

    Ok(written)
}
