//! Known statement layouts and header-based format detection.
//!
//! Supported exports:
//!   amex:       Date,Description,Card Member,Account #,Amount,...
//!   commbank:   Date,Amount,Description,Balance
//!   pocketbook: Transaction Date,Details,Debit,Credit,Category,Subcategory,...

use std::fmt;
use std::str::FromStr;

use crate::error::IngestError;

/// How a layout represents money
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountColumns {
    /// One signed column: positive = spend, zero/negative = money in
    Signed { amount: &'static str },
    /// Separate columns, only one of which is filled per row
    DebitCredit {
        debit: &'static str,
        credit: &'static str,
    },
}

/// Static description of one bank's CSV layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub date_col: &'static str,
    pub description_col: &'static str,
    /// chrono strftime pattern tried before the generic fallbacks
    pub date_format: &'static str,
    pub amount: AmountColumns,
    pub cardholder_col: Option<&'static str>,
    pub category_col: Option<&'static str>,
    pub subcategory_col: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatId {
    Amex,
    CommBank,
    Pocketbook,
}

static AMEX: FormatDescriptor = FormatDescriptor {
    date_col: "Date",
    description_col: "Description",
    date_format: "%d/%m/%Y",
    amount: AmountColumns::Signed { amount: "Amount" },
    cardholder_col: Some("Card Member"),
    category_col: None,
    subcategory_col: None,
};

static COMMBANK: FormatDescriptor = FormatDescriptor {
    date_col: "Date",
    description_col: "Description",
    date_format: "%d/%m/%Y",
    amount: AmountColumns::Signed { amount: "Amount" },
    cardholder_col: None,
    category_col: None,
    subcategory_col: None,
};

static POCKETBOOK: FormatDescriptor = FormatDescriptor {
    date_col: "Transaction Date",
    description_col: "Details",
    // "11 Dec 2025"
    date_format: "%d %b %Y",
    amount: AmountColumns::DebitCredit {
        debit: "Debit",
        credit: "Credit",
    },
    cardholder_col: None,
    category_col: Some("Category"),
    subcategory_col: Some("Subcategory"),
};

impl FormatId {
    pub fn all() -> &'static [FormatId] {
        &[FormatId::Amex, FormatId::CommBank, FormatId::Pocketbook]
    }

    pub fn name(&self) -> &'static str {
        match self {
            FormatId::Amex => "amex",
            FormatId::CommBank => "commbank",
            FormatId::Pocketbook => "pocketbook",
        }
    }

    pub fn descriptor(&self) -> &'static FormatDescriptor {
        match self {
            FormatId::Amex => &AMEX,
            FormatId::CommBank => &COMMBANK,
            FormatId::Pocketbook => &POCKETBOOK,
        }
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormatId {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        FormatId::all()
            .iter()
            .copied()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| IngestError::UnknownFormat {
                name: s.to_string(),
                known: FormatId::all()
                    .iter()
                    .map(|f| f.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Detect the statement format from its header row.
///
/// Case-insensitive, first rule wins: a cardholder column means Amex, a
/// transaction date with a debit column means Pocketbook, and a plain
/// date + amount pair falls through to CommBank.
pub fn detect<S: AsRef<str>>(headers: &[S]) -> Option<FormatId> {
    let lower: Vec<String> = headers
        .iter()
        .map(|h| h.as_ref().trim_start_matches('\u{feff}').trim().to_lowercase())
        .collect();
    let has = |name: &str| lower.iter().any(|h| h == name);

    if has("card member") {
        return Some(FormatId::Amex);
    }
    if has("transaction date") && has("debit") {
        return Some(FormatId::Pocketbook);
    }
    if has("date") && has("amount") {
        return Some(FormatId::CommBank);
    }
    None
}
