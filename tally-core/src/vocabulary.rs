//! The closed set of category names a run may assign.

use serde::{Deserialize, Serialize};

/// Sentinel for descriptions nothing could classify
pub const UNCATEGORIZED: &str = "Uncategorized";
/// Reserved: money moved between own accounts
pub const TRANSFER: &str = "Transfer";
/// Reserved: salary, refunds and other inflows
pub const INCOME: &str = "Income";

const BUILTIN: &[&str] = &[
    "Groceries",
    "Dining",
    "Coffee",
    "Transport",
    "Fuel",
    "Utilities",
    "Rent",
    "Shopping",
    "Entertainment",
    "Subscriptions",
    "Health",
    "Travel",
    "Education",
    "Insurance",
    "Fees",
    "Gifts",
    "Personal Care",
    "Home",
    TRANSFER,
    INCOME,
    UNCATEGORIZED,
];

/// True for the two categories that are not spending and get dropped
/// from the report when exclusion is on.
pub fn is_excluded(category: &str) -> bool {
    category == TRANSFER || category == INCOME
}

/// Ordered, deduplicated category names. Always contains [`UNCATEGORIZED`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    names: Vec<String>,
}

impl Vocabulary {
    /// The bundled default list
    pub fn builtin() -> Self {
        Self::from_names(BUILTIN.iter().copied())
    }

    /// Build from any list of names. Blank entries and duplicates are dropped,
    /// and the sentinel is appended when the source omits it.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || out.iter().any(|n| n == name) {
                continue;
            }
            out.push(name.to_string());
        }
        if !out.iter().any(|n| n == UNCATEGORIZED) {
            out.push(UNCATEGORIZED.to_string());
        }
        Self { names: out }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.names.iter().any(|n| n == category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Everything a classifier may answer with (the sentinel excluded)
    pub fn assignable(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|n| *n != UNCATEGORIZED)
    }

    /// Comma separated list used inside classifier prompts
    pub fn prompt_list(&self) -> String {
        self.assignable().collect::<Vec<_>>().join(", ")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(names: Vec<String>) -> Self {
        Self::from_names(names)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(v: Vocabulary) -> Self {
        v.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_reserved_and_sentinel() {
        let v = Vocabulary::builtin();
        assert!(v.contains(TRANSFER));
        assert!(v.contains(INCOME));
        assert!(v.contains(UNCATEGORIZED));
        assert!(v.contains("Groceries"));
    }

    #[test]
    fn test_sentinel_appended_and_duplicates_dropped() {
        let v = Vocabulary::from_names(["Coffee", " Coffee ", "", "Rent"]);
        let names: Vec<_> = v.iter().collect();
        assert_eq!(names, vec!["Coffee", "Rent", UNCATEGORIZED]);
    }

    #[test]
    fn test_prompt_list_skips_sentinel() {
        let v = Vocabulary::from_names(["Coffee", UNCATEGORIZED, "Rent"]);
        assert_eq!(v.prompt_list(), "Coffee, Rent");
    }

    #[test]
    fn test_exclusion() {
        assert!(is_excluded("Transfer"));
        assert!(is_excluded("Income"));
        assert!(!is_excluded("Groceries"));
        assert!(!is_excluded(UNCATEGORIZED));
    }

    #[test]
    fn test_deserialize_from_plain_list() {
        let v: Vocabulary = serde_json::from_str(r#"["Coffee","Rent"]"#).unwrap();
        assert_eq!(v.len(), 3);
        assert!(v.contains(UNCATEGORIZED));
    }
}
